//! Category repository for JSON storage
//!
//! Manages loading and saving categories to categories.json

use std::path::PathBuf;

use crate::error::TallyError;
use crate::models::{Category, CategoryId};

use super::file_io::{read_slot, write_json_atomic};
use super::init::default_categories;

/// Serializable category data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CategoryData {
    pub categories: Vec<Category>,
}

/// Repository for category persistence
pub struct CategoryRepository {
    path: PathBuf,
    items: Vec<Category>,
}

impl CategoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            items: Vec::new(),
        }
    }

    /// Load categories from disk; a missing or damaged slot loads the defaults
    pub fn load(&mut self) {
        self.items = read_slot::<CategoryData, _>(&self.path)
            .map(|data| data.categories)
            .unwrap_or_else(default_categories);
    }

    pub fn save(&self) -> Result<(), TallyError> {
        let file_data = CategoryData {
            categories: self.items.clone(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.items.iter().find(|c| &c.id == id)
    }

    /// Find a category by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Option<&Category> {
        let name_lower = name.trim().to_lowercase();
        self.items
            .iter()
            .find(|c| c.name.to_lowercase() == name_lower)
    }

    /// All categories in insertion order
    pub fn all(&self) -> &[Category] {
        &self.items
    }

    pub fn expense_categories(&self) -> impl Iterator<Item = &Category> {
        self.items.iter().filter(|c| c.is_expense())
    }

    /// Insert a new category or replace the one with the same id
    pub fn upsert(&mut self, category: Category) {
        match self.items.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category,
            None => self.items.push(category),
        }
    }

    pub fn remove(&mut self, id: &CategoryId) -> Result<Category, TallyError> {
        let index = self
            .items
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| TallyError::category_not_found(id.as_str()))?;
        Ok(self.items.remove(index))
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
    use crate::models::TransactionType;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, CategoryRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("categories.json");
        let repo = CategoryRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_missing_slot_loads_defaults() {
        let (_temp_dir, mut repo) = create_test_repo();
        repo.load();
        assert_eq!(repo.len(), 11);
        assert_eq!(repo.expense_categories().count(), 8);
        assert_eq!(repo.get(&CategoryId::from("9")).unwrap().name, "Salary");
    }

    #[test]
    fn test_malformed_slot_loads_defaults() {
        let (temp_dir, mut repo) = create_test_repo();
        std::fs::write(temp_dir.path().join("categories.json"), "{\"categories\": 7}").unwrap();
        repo.load();
        assert_eq!(repo.len(), 11);
    }

    #[test]
    fn test_saved_empty_list_stays_empty() {
        let (_temp_dir, mut repo) = create_test_repo();
        repo.save().unwrap();
        repo.load();
        assert!(repo.is_empty());
    }

    #[test]
    fn test_upsert_and_lookup() {
        let (_temp_dir, mut repo) = create_test_repo();
        let mut gifts = Category::new("Gifts", TransactionType::Expense);
        repo.upsert(gifts.clone());
        assert_eq!(repo.get_by_name("gifts").unwrap().id, gifts.id);

        gifts.name = "Presents".into();
        repo.upsert(gifts.clone());
        assert_eq!(repo.len(), 1);
        assert!(repo.get_by_name("Gifts").is_none());

        repo.save().unwrap();
        repo.load();
        assert_eq!(repo.get(&gifts.id).unwrap().name, "Presents");
    }

    #[test]
    fn test_remove_unknown_category() {
        let (_temp_dir, mut repo) = create_test_repo();
        let err = repo.remove(&CategoryId::from("nope")).unwrap_err();
        assert!(err.is_not_found());
    }
}
