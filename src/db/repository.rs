//! Repository contracts shared by every store implementation.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;

use super::PersistenceError;
use crate::entities::employee;

/// Handle to a staged insert.
///
/// The store assigns the primary key when the owning unit of work commits;
/// until then [`StagedInsert::id`] returns `None`.
#[derive(Debug, Clone, Default)]
pub struct StagedInsert(Arc<OnceLock<i32>>);

impl StagedInsert {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store-assigned id, available after a successful commit.
    pub fn id(&self) -> Option<i32> {
        self.0.get().copied()
    }

    pub(crate) fn resolve(&self, id: i32) {
        let _ = self.0.set(id);
    }
}

/// CRUD access to one entity table.
///
/// Reads go to the store immediately. `add`, `update` and `delete` only
/// stage the change; nothing is written until the unit of work commits.
#[async_trait]
pub trait Repository<T: Send>: Send + Sync {
    /// All rows in the store's natural order.
    async fn get_all(&self) -> Result<Vec<T>, PersistenceError>;

    /// Row with the given primary key, or `None` if there is none.
    async fn get_by_id(&self, id: i32) -> Result<Option<T>, PersistenceError>;

    /// Stage an insert. The entity's own id is ignored.
    fn add(&self, entity: T) -> StagedInsert;

    /// Stage a replace of the row with the entity's id.
    fn update(&self, entity: T);

    /// Stage removal of the row with the entity's id.
    fn delete(&self, entity: T);
}

/// Employee repository with the foreign-key lookups used for headcounts.
#[async_trait]
pub trait EmployeeRepository: Repository<employee::Model> {
    async fn count_by_department(&self, department_id: i32) -> Result<u64, PersistenceError>;

    async fn count_by_position(&self, position_id: i32) -> Result<u64, PersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_insert_resolves_once() {
        let staged = StagedInsert::new();
        let shared = staged.clone();
        assert_eq!(staged.id(), None);

        shared.resolve(7);
        shared.resolve(8);
        assert_eq!(staged.id(), Some(7));
    }
}
