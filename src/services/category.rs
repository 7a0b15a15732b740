//! Category service
//!
//! Category CRUD. Deleting a category also drops its budget but leaves the
//! transactions that reference it in place; reports show them as "Unknown".

use tracing::debug;

use crate::error::{TallyError, TallyResult};
use crate::models::{Category, CategoryId, Money, TransactionType};
use crate::notify::NotificationSink;
use crate::storage::Storage;

/// Input for creating a new category
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    pub name: String,
    pub kind: TransactionType,
    pub color: Option<String>,
    pub icon: Option<String>,
    /// Fixed amount to auto-post every month
    pub recurring_amount: Option<Money>,
}

/// Fields to change on an existing category; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub kind: Option<TransactionType>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_recurring: Option<bool>,
    pub recurring_amount: Option<Money>,
}

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a mut Storage,
    sink: &'a dyn NotificationSink,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a mut Storage, sink: &'a dyn NotificationSink) -> Self {
        Self { storage, sink }
    }

    pub fn create(&mut self, input: CreateCategoryInput) -> TallyResult<Category> {
        let name = input.name.trim();
        self.ensure_unique_name(name, None)?;

        let mut category = Category::new(name, input.kind);
        if let Some(color) = input.color {
            category.color = color.trim().to_lowercase();
        }
        if let Some(icon) = input.icon {
            category.icon = icon;
        }
        if let Some(amount) = input.recurring_amount {
            category = category.with_recurring(amount);
        }

        category
            .validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone());
        self.storage.categories.save()?;

        debug!(id = %category.id, name = %category.name, "category created");
        self.sink.info("Label created");
        Ok(category)
    }

    /// Edit a category
    ///
    /// Changing the type does not touch existing transactions.
    pub fn update(&mut self, id: &CategoryId, input: UpdateCategoryInput) -> TallyResult<Category> {
        let mut category = self
            .storage
            .categories
            .get(id)
            .cloned()
            .ok_or_else(|| TallyError::category_not_found(id.as_str()))?;

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            self.ensure_unique_name(&name, Some(id))?;
            category.name = name;
        }
        if let Some(kind) = input.kind {
            category.kind = kind;
        }
        if let Some(color) = input.color {
            category.color = color.trim().to_lowercase();
        }
        if let Some(icon) = input.icon {
            category.icon = icon;
        }
        if let Some(amount) = input.recurring_amount {
            category.recurring_amount = Some(amount);
            category.is_recurring = true;
        }
        if let Some(is_recurring) = input.is_recurring {
            category.is_recurring = is_recurring;
            if !is_recurring {
                category.recurring_amount = None;
            }
        }

        category
            .validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone());
        self.storage.categories.save()?;

        debug!(id = %category.id, "category updated");
        self.sink.info("Label updated");
        Ok(category)
    }

    /// Delete a category and its budget
    pub fn delete(&mut self, id: &CategoryId) -> TallyResult<Category> {
        let removed = self.storage.categories.remove(id)?;
        self.storage.categories.save()?;

        if self.storage.budgets.remove(id).is_some() {
            self.storage.budgets.save()?;
        }

        let orphaned = self.storage.transactions.by_category(id).count();
        debug!(id = %id, orphaned, "category deleted");
        self.sink.info("Label deleted");
        Ok(removed)
    }

    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.storage.categories.get(id)
    }

    /// Find a category by name or id
    pub fn find(&self, identifier: &str) -> TallyResult<&Category> {
        self.storage
            .categories
            .get_by_name(identifier)
            .or_else(|| self.storage.categories.get(&CategoryId::from(identifier.trim())))
            .ok_or_else(|| TallyError::category_not_found(identifier))
    }

    pub fn list(&self) -> Vec<Category> {
        self.storage.categories.all().to_vec()
    }

    fn ensure_unique_name(&self, name: &str, except: Option<&CategoryId>) -> TallyResult<()> {
        match self.storage.categories.get_by_name(name) {
            Some(existing) if Some(&existing.id) != except => Err(TallyError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, TallyPaths};
    use crate::models::Transaction;
    use crate::notify::MemorySink;
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths, &Settings::default()).unwrap();
        (temp_dir, storage)
    }

    fn input(name: &str) -> CreateCategoryInput {
        CreateCategoryInput {
            name: name.into(),
            kind: TransactionType::Expense,
            color: None,
            icon: None,
            recurring_amount: None,
        }
    }

    #[test]
    fn test_create_category() {
        let (_temp_dir, mut storage) = create_test_storage();
        let sink = MemorySink::new();
        let mut service = CategoryService::new(&mut storage, &sink);

        let mut rent = input(" Rent ");
        rent.color = Some("#AABBCC".into());
        rent.recurring_amount = Some(Money::from_cents(120_000));
        let category = service.create(rent).unwrap();

        assert_eq!(category.name, "Rent");
        assert_eq!(category.color, "#aabbcc");
        assert_eq!(category.icon, "Tags");
        assert_eq!(category.recurring_commitment(), Some(Money::from_cents(120_000)));
        assert_eq!(sink.messages(), vec!["Label created"]);
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let (_temp_dir, mut storage) = create_test_storage();
        let sink = MemorySink::new();
        let mut service = CategoryService::new(&mut storage, &sink);

        assert!(service.create(input("  ")).unwrap_err().is_validation());
        assert!(matches!(
            service.create(input("housing")),
            Err(TallyError::Duplicate { .. })
        ));

        let mut bad_color = input("Pets");
        bad_color.color = Some("blue".into());
        assert!(service.create(bad_color).unwrap_err().is_validation());

        let mut negative = input("Gym");
        negative.recurring_amount = Some(Money::from_cents(-5));
        assert!(service.create(negative).unwrap_err().is_validation());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_update_category() {
        let (_temp_dir, mut storage) = create_test_storage();
        let sink = MemorySink::new();
        let mut service = CategoryService::new(&mut storage, &sink);
        let id = CategoryId::from("7");

        let updated = service
            .update(
                &id,
                UpdateCategoryInput {
                    name: Some("Bills".into()),
                    recurring_amount: Some(Money::from_cents(8_000)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Bills");
        assert!(updated.is_recurring);

        let stopped = service
            .update(
                &id,
                UpdateCategoryInput {
                    is_recurring: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(stopped.recurring_commitment().is_none());

        // Renaming to its own name is fine, taking another's is not
        assert!(service
            .update(&id, UpdateCategoryInput { name: Some("bills".into()), ..Default::default() })
            .is_ok());
        assert!(matches!(
            service.update(&id, UpdateCategoryInput { name: Some("Travel".into()), ..Default::default() }),
            Err(TallyError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_delete_removes_budget_and_keeps_transactions() {
        let (_temp_dir, mut storage) = create_test_storage();
        let shopping = CategoryId::from("2");
        for _ in 0..5 {
            storage.transactions.insert(Transaction::new(
                Money::from_cents(1_000),
                shopping.clone(),
                TransactionType::Expense,
                Utc::now(),
            ));
        }

        let sink = MemorySink::new();
        let mut service = CategoryService::new(&mut storage, &sink);
        service.delete(&shopping).unwrap();
        assert!(service.get(&shopping).is_none());
        assert!(service.delete(&shopping).unwrap_err().is_not_found());
        assert_eq!(sink.messages(), vec!["Label deleted"]);

        assert!(storage.budgets.get(&shopping).is_none());
        assert_eq!(storage.transactions.by_category(&shopping).count(), 5);
    }

    #[test]
    fn test_find_by_name_or_id() {
        let (_temp_dir, mut storage) = create_test_storage();
        let sink = MemorySink::new();
        let service = CategoryService::new(&mut storage, &sink);

        assert_eq!(service.find("food & dining").unwrap().id.as_str(), "3");
        assert_eq!(service.find("10").unwrap().name, "Investment");
        assert!(service.find("Pets").unwrap_err().is_not_found());
    }
}
