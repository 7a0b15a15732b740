//! Processed-period repository
//!
//! Records which months the recurring poster has already handled, as keys
//! like "2024-3". Keys are only ever appended.

use std::path::PathBuf;

use crate::error::TallyError;

use super::file_io::{read_slot, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct PeriodData {
    processed: Vec<String>,
}

pub struct PeriodRepository {
    path: PathBuf,
    keys: Vec<String>,
}

impl PeriodRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            keys: Vec::new(),
        }
    }

    pub fn load(&mut self) {
        let mut keys = read_slot::<PeriodData, _>(&self.path)
            .map(|data| data.processed)
            .unwrap_or_default();
        let mut seen = std::collections::HashSet::new();
        keys.retain(|key| seen.insert(key.clone()));
        self.keys = keys;
    }

    pub fn save(&self) -> Result<(), TallyError> {
        let file_data = PeriodData {
            processed: self.keys.clone(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Record a key; returns false if it was already present
    pub fn mark(&mut self, key: &str) -> bool {
        if self.contains(key) {
            return false;
        }
        self.keys.push(key.to_string());
        true
    }

    pub fn all(&self) -> &[String] {
        &self.keys
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.keys.clone()
    }

    pub fn restore(&mut self, keys: Vec<String>) {
        self.keys = keys;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mark_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = PeriodRepository::new(temp_dir.path().join("processed_periods.json"));

        assert!(repo.mark("2024-3"));
        assert!(!repo.mark("2024-3"));
        assert_eq!(repo.all(), ["2024-3".to_string()]);
    }

    #[test]
    fn test_persisted_duplicates_are_collapsed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("processed_periods.json");
        std::fs::write(&path, r#"{"processed": ["2024-1", "2024-1", "2024-2"]}"#).unwrap();

        let mut repo = PeriodRepository::new(path);
        repo.load();
        assert_eq!(repo.all().len(), 2);
        assert!(repo.contains("2024-2"));
    }

    #[test]
    fn test_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("processed_periods.json");
        let mut repo = PeriodRepository::new(path.clone());
        repo.mark("2023-12");
        repo.save().unwrap();

        let mut reloaded = PeriodRepository::new(path);
        reloaded.load();
        assert!(reloaded.contains("2023-12"));
    }
}
