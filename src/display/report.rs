//! Report formatting utilities for terminal output
//!
//! Small helpers shared by the report views.

use crate::reports::Change;

/// Format a percentage with appropriate precision
pub fn format_percentage(pct: f64) -> String {
    let magnitude = pct.abs();
    if magnitude < 0.1 && magnitude > 0.0 {
        format!("{:.2}%", pct)
    } else if magnitude < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// "+12.5% (+$30.00)" style change against the previous period
pub fn format_change(change: &Change) -> String {
    let sign = if change.diff.is_negative() { "" } else { "+" };
    let pct_sign = if change.pct < 0.0 { "" } else { "+" };
    format!(
        "{}{} ({}{})",
        pct_sign,
        format_percentage(change.pct),
        sign,
        change.diff
    )
}

/// Create a simple bar chart representation
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return " ".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Truncate a string to a maximum number of characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.05), "0.05%");
        assert_eq!(format_percentage(5.5), "5.5%");
        assert_eq!(format_percentage(-25.0), "-25%");
        assert_eq!(format_percentage(100.0), "100%");
    }

    #[test]
    fn test_format_change() {
        let down = Change::between(Money::from_cents(15_000), Money::from_cents(20_000));
        assert_eq!(format_change(&down), "-25% (-$50.00)");

        let up = Change::between(Money::from_cents(500), Money::zero());
        assert_eq!(format_change(&up), "+100% (+$5.00)");
    }

    #[test]
    fn test_format_bar() {
        let bar = format_bar(50.0, 100.0, 10);
        assert_eq!(bar.chars().filter(|c| *c == '█').count(), 5);
        assert_eq!(format_bar(0.0, 100.0, 4), "    ");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 5), "He...");
        assert_eq!(truncate("Hi", 5), "Hi");
        assert_eq!(truncate("Café au lait", 7), "Café...");
    }
}
