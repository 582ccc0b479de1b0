//! Unit of work over a SeaORM connection.
//!
//! A unit of work owns the change journal for one request. Its repositories
//! read straight from the connection pool and append inserts, updates and
//! deletes to the journal; [`UnitOfWork::commit`] replays the journal in
//! order inside a single transaction.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    IdenStatic, IntoActiveModel, Iterable, ModelTrait, PaginatorTrait, PrimaryKeyToColumn, PrimaryKeyTrait, QueryFilter,
    TransactionTrait,
};
use tracing::debug;

use super::PersistenceError;
use super::repository::{EmployeeRepository, Repository, StagedInsert};
use crate::entities::{department, employee, position};

/// One request's transactional scope over the store.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn employees(&self) -> &dyn EmployeeRepository;

    fn departments(&self) -> &dyn Repository<department::Model>;

    fn positions(&self) -> &dyn Repository<position::Model>;

    /// Persist every staged change atomically.
    ///
    /// The journal is drained whether or not the commit succeeds. On failure
    /// nothing staged since the last commit is persisted.
    async fn commit(&self) -> Result<(), PersistenceError>;
}

/// Source of fresh units of work, one per request.
pub trait UnitOfWorkFactory: Send + Sync {
    fn begin(&self) -> Box<dyn UnitOfWork>;
}

/// Run a store call under the command timeout.
async fn within<T, F>(limit: Duration, call: F) -> Result<T, PersistenceError>
where
    F: Future<Output = Result<T, DbErr>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(PersistenceError::from),
        Err(_) => Err(PersistenceError::Timeout(limit)),
    }
}

/// Build an active model with every non-key column set from `model`.
///
/// With `keep_key` the primary key is carried as unchanged so the change
/// targets the existing row; without it the key is left for the store to
/// assign.
fn staged_active_model<E>(model: &E::Model, keep_key: bool) -> E::ActiveModel
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E>,
{
    let keys: Vec<String> = E::PrimaryKey::iter()
        .map(|key| key.into_column().as_str().to_owned())
        .collect();

    let mut active = if keep_key {
        model.clone().into_active_model()
    } else {
        <E::ActiveModel as ActiveModelTrait>::default()
    };
    for column in E::Column::iter() {
        if !keys.iter().any(|key| key == column.as_str()) {
            active.set(column, model.get(column));
        }
    }
    active
}

type Journal = Arc<Mutex<Vec<Box<dyn StagedChange>>>>;

/// A journal entry with its entity type erased.
#[async_trait]
trait StagedChange: Send {
    /// Apply inside `txn`. Inserts hand back their handle and the new key,
    /// resolved only once the transaction has committed.
    async fn apply(self: Box<Self>, txn: &DatabaseTransaction) -> Result<Option<(StagedInsert, i32)>, DbErr>;
}

enum Pending<E: EntityTrait> {
    Insert(E::ActiveModel, StagedInsert),
    Update(E::ActiveModel),
    Delete(E::ActiveModel),
}

#[async_trait]
impl<E> StagedChange for Pending<E>
where
    E: EntityTrait + Send + Sync + 'static,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync + 'static,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32> + Into<i32>,
{
    async fn apply(self: Box<Self>, txn: &DatabaseTransaction) -> Result<Option<(StagedInsert, i32)>, DbErr> {
        match *self {
            Pending::Insert(active, staged) => {
                let result = E::insert(active).exec(txn).await?;
                Ok(Some((staged, result.last_insert_id.into())))
            }
            Pending::Update(active) => {
                active.update(txn).await?;
                Ok(None)
            }
            Pending::Delete(active) => {
                E::delete(active).exec(txn).await?;
                Ok(None)
            }
        }
    }
}

/// Repository over one SeaORM entity, staging into a shared journal.
pub struct SeaRepository<E> {
    db: DatabaseConnection,
    journal: Journal,
    timeout: Duration,
    _entity: PhantomData<fn() -> E>,
}

impl<E> SeaRepository<E> {
    fn new(db: DatabaseConnection, journal: Journal, timeout: Duration) -> Self {
        Self {
            db,
            journal,
            timeout,
            _entity: PhantomData,
        }
    }
}

impl<E> SeaRepository<E>
where
    E: EntityTrait + Send + Sync + 'static,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync + 'static,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32> + Into<i32>,
{
    fn stage(&self, change: Pending<E>) {
        self.journal.lock().push(Box::new(change));
    }
}

#[async_trait]
impl<E> Repository<E::Model> for SeaRepository<E>
where
    E: EntityTrait + Send + Sync + 'static,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync + 'static,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32> + Into<i32>,
{
    async fn get_all(&self) -> Result<Vec<E::Model>, PersistenceError> {
        within(self.timeout, E::find().all(&self.db)).await
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<E::Model>, PersistenceError> {
        within(self.timeout, E::find_by_id(id).one(&self.db)).await
    }

    fn add(&self, entity: E::Model) -> StagedInsert {
        let staged = StagedInsert::new();
        self.stage(Pending::Insert(staged_active_model::<E>(&entity, false), staged.clone()));
        staged
    }

    fn update(&self, entity: E::Model) {
        self.stage(Pending::Update(staged_active_model::<E>(&entity, true)));
    }

    fn delete(&self, entity: E::Model) {
        self.stage(Pending::Delete(entity.into_active_model()));
    }
}

#[async_trait]
impl EmployeeRepository for SeaRepository<employee::Entity> {
    async fn count_by_department(&self, department_id: i32) -> Result<u64, PersistenceError> {
        let query = employee::Entity::find().filter(employee::Column::DepartmentId.eq(department_id));
        within(self.timeout, query.count(&self.db)).await
    }

    async fn count_by_position(&self, position_id: i32) -> Result<u64, PersistenceError> {
        let query = employee::Entity::find().filter(employee::Column::PositionId.eq(position_id));
        within(self.timeout, query.count(&self.db)).await
    }
}

/// SeaORM-backed unit of work. Repositories are created on first use.
pub struct SeaUnitOfWork {
    db: DatabaseConnection,
    journal: Journal,
    timeout: Duration,
    employees: OnceLock<SeaRepository<employee::Entity>>,
    departments: OnceLock<SeaRepository<department::Entity>>,
    positions: OnceLock<SeaRepository<position::Entity>>,
}

impl SeaUnitOfWork {
    pub fn new(db: DatabaseConnection, timeout: Duration) -> Self {
        Self {
            db,
            journal: Journal::default(),
            timeout,
            employees: OnceLock::new(),
            departments: OnceLock::new(),
            positions: OnceLock::new(),
        }
    }

    /// Number of changes staged and not yet committed.
    pub fn pending(&self) -> usize {
        self.journal.lock().len()
    }

    fn repository<'a, E>(&self, slot: &'a OnceLock<SeaRepository<E>>) -> &'a SeaRepository<E> {
        slot.get_or_init(|| SeaRepository::new(self.db.clone(), Arc::clone(&self.journal), self.timeout))
    }
}

#[async_trait]
impl UnitOfWork for SeaUnitOfWork {
    fn employees(&self) -> &dyn EmployeeRepository {
        self.repository(&self.employees)
    }

    fn departments(&self) -> &dyn Repository<department::Model> {
        self.repository(&self.departments)
    }

    fn positions(&self) -> &dyn Repository<position::Model> {
        self.repository(&self.positions)
    }

    async fn commit(&self) -> Result<(), PersistenceError> {
        let changes = std::mem::take(&mut *self.journal.lock());
        if changes.is_empty() {
            return Ok(());
        }
        let count = changes.len();

        let inserted = within(self.timeout, async {
            let txn = self.db.begin().await?;
            let mut inserted = Vec::new();
            for change in changes {
                if let Some(key) = change.apply(&txn).await? {
                    inserted.push(key);
                }
            }
            txn.commit().await?;
            Ok::<_, DbErr>(inserted)
        })
        .await?;

        for (staged, id) in inserted {
            staged.resolve(id);
        }
        debug!("Committed {} staged change(s)", count);
        Ok(())
    }
}

/// Hands out [`SeaUnitOfWork`]s sharing one connection pool.
#[derive(Clone)]
pub struct SeaUnitOfWorkFactory {
    db: DatabaseConnection,
    timeout: Duration,
}

impl SeaUnitOfWorkFactory {
    pub fn new(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub fn unit_of_work(&self) -> SeaUnitOfWork {
        SeaUnitOfWork::new(self.db.clone(), self.timeout)
    }
}

impl UnitOfWorkFactory for SeaUnitOfWorkFactory {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(self.unit_of_work())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn department() -> department::Model {
        department::Model {
            id: 4,
            name: "Finance".to_string(),
            description: "Money".to_string(),
        }
    }

    #[test]
    fn test_insert_leaves_key_for_store() {
        let active = staged_active_model::<department::Entity>(&department(), false);
        assert!(matches!(active.id, ActiveValue::NotSet));
        assert!(matches!(active.name, ActiveValue::Set(ref name) if name == "Finance"));
        assert!(matches!(active.description, ActiveValue::Set(ref text) if text == "Money"));
    }

    #[tokio::test]
    async fn test_store_call_past_deadline_times_out() {
        let limit = Duration::from_millis(20);
        let err = within(limit, std::future::pending::<Result<(), DbErr>>())
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Timeout(elapsed) if elapsed == limit));
    }

    #[tokio::test]
    async fn test_store_call_within_deadline_passes_through() {
        let value = within(Duration::from_secs(1), async { Ok::<_, DbErr>(7) }).await.unwrap();
        assert_eq!(value, 7);

        let err = within(Duration::from_secs(1), async { Err::<(), _>(DbErr::Custom("boom".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Database(_)));
    }

    #[test]
    fn test_update_targets_existing_key() {
        let active = staged_active_model::<department::Entity>(&department(), true);
        assert!(matches!(active.id, ActiveValue::Unchanged(4)));
        assert!(matches!(active.name, ActiveValue::Set(ref name) if name == "Finance"));
    }
}
