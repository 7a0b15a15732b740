//! Storage initialization
//!
//! Handles first-run setup and default data creation

use tracing::info;

use crate::config::{Settings, TallyPaths};
use crate::error::TallyError;
use crate::models::{Budget, Category, DefaultCategory, Money};

use super::Storage;

/// The built-in categories in seed order
pub fn default_categories() -> Vec<Category> {
    DefaultCategory::all()
        .iter()
        .map(DefaultCategory::to_category)
        .collect()
}

/// One cap of `amount` for every default expense category
pub fn default_budgets(amount: Money) -> Vec<Budget> {
    DefaultCategory::all()
        .iter()
        .filter(|d| d.kind.is_expense())
        .map(|d| Budget::new(d.id.into(), amount))
        .collect()
}

/// Initialize storage for a fresh installation
///
/// Writes the settings file and any missing slot with its defaults. Existing
/// slots are left as they are.
pub fn initialize_storage(paths: &TallyPaths) -> Result<Storage, TallyError> {
    let settings = Settings::load_or_create(paths)?;
    if !paths.settings_file().exists() {
        settings.save(paths)?;
    }

    let storage = Storage::open(paths.clone(), &settings)?;

    if !paths.categories_file().exists() {
        storage.categories.save()?;
    }
    if !paths.budgets_file().exists() {
        storage.budgets.save()?;
    }
    if !paths.transactions_file().exists() {
        storage.transactions.save()?;
    }
    if !paths.processed_periods_file().exists() {
        storage.periods.save()?;
    }

    info!(base_dir = %paths.base_dir().display(), "initialized ledger storage");
    Ok(storage)
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &TallyPaths) -> bool {
    !paths.is_initialized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_all_slots() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        assert!(needs_initialization(&paths));

        let storage = initialize_storage(&paths).unwrap();
        assert!(!needs_initialization(&paths));
        assert!(paths.categories_file().exists());
        assert!(paths.budgets_file().exists());
        assert!(paths.transactions_file().exists());
        assert!(paths.processed_periods_file().exists());
        assert_eq!(storage.categories.len(), 11);
        assert_eq!(storage.budgets.len(), 8);
    }

    #[test]
    fn test_initialize_keeps_existing_data() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut storage = initialize_storage(&paths).unwrap();
        storage.budgets.remove(&"1".into());
        storage.budgets.save().unwrap();

        let storage = initialize_storage(&paths).unwrap();
        assert_eq!(storage.budgets.len(), 7);
    }

    #[test]
    fn test_default_budgets_only_cover_expenses() {
        let budgets = default_budgets(Money::from_cents(50_000));
        assert_eq!(budgets.len(), 8);
        assert!(budgets.iter().all(|b| b.category_id.as_str().parse::<u32>().unwrap() <= 8));
    }
}
