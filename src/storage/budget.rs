//! Budget repository for JSON storage
//!
//! Manages loading and saving the per-category caps in budgets.json. There is
//! at most one budget per category.

use std::path::PathBuf;

use crate::error::TallyError;
use crate::models::{Budget, CategoryId, Money};

use super::file_io::{read_slot, write_json_atomic};
use super::init::default_budgets;

/// Serializable budget data
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BudgetData {
    #[serde(default)]
    budgets: Vec<Budget>,
}

/// Repository for budget persistence
pub struct BudgetRepository {
    path: PathBuf,
    items: Vec<Budget>,
}

impl BudgetRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            items: Vec::new(),
        }
    }

    /// Load budgets from disk; a missing or damaged slot loads the defaults
    pub fn load(&mut self, default_amount: Money) {
        self.items = read_slot::<BudgetData, _>(&self.path)
            .map(|data| data.budgets)
            .unwrap_or_else(|| default_budgets(default_amount));
    }

    pub fn save(&self) -> Result<(), TallyError> {
        let file_data = BudgetData {
            budgets: self.items.clone(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn get(&self, category_id: &CategoryId) -> Option<&Budget> {
        self.items.iter().find(|b| &b.category_id == category_id)
    }

    pub fn all(&self) -> &[Budget] {
        &self.items
    }

    /// Set the cap for a category, replacing any existing one
    pub fn upsert(&mut self, budget: Budget) {
        match self
            .items
            .iter_mut()
            .find(|b| b.category_id == budget.category_id)
        {
            Some(existing) => existing.amount = budget.amount,
            None => self.items.push(budget),
        }
    }

    /// Remove the cap for a category, returning it if there was one
    pub fn remove(&mut self, category_id: &CategoryId) -> Option<Budget> {
        let index = self
            .items
            .iter()
            .position(|b| &b.category_id == category_id)?;
        Some(self.items.remove(index))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, BudgetRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("budgets.json");
        let repo = BudgetRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_missing_slot_seeds_expense_defaults() {
        let (_temp_dir, mut repo) = create_test_repo();
        repo.load(Money::from_cents(50_000));
        assert_eq!(repo.len(), 8);
        assert!(repo
            .all()
            .iter()
            .all(|b| b.amount == Money::from_cents(50_000)));
        assert!(repo.get(&CategoryId::from("9")).is_none());
    }

    #[test]
    fn test_upsert_keeps_one_per_category() {
        let (_temp_dir, mut repo) = create_test_repo();
        let food = CategoryId::from("3");
        repo.upsert(Budget::new(food.clone(), Money::from_cents(100)));
        repo.upsert(Budget::new(food.clone(), Money::from_cents(250)));

        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get(&food).unwrap().amount.cents(), 250);
    }

    #[test]
    fn test_save_load_and_remove() {
        let (_temp_dir, mut repo) = create_test_repo();
        let travel = CategoryId::from("8");
        repo.upsert(Budget::new(travel.clone(), Money::from_cents(90_000)));
        repo.save().unwrap();

        repo.load(Money::from_cents(1));
        assert_eq!(repo.get(&travel).unwrap().amount.cents(), 90_000);

        assert!(repo.remove(&travel).is_some());
        assert!(repo.remove(&travel).is_none());
        assert!(repo.is_empty());
    }
}
