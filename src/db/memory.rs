//! In-process store implementing the same unit-of-work contract.
//!
//! Tables live behind one lock. A commit applies the journal to a copy of
//! the tables and swaps it in only if every change succeeded, so a failed
//! commit leaves the store untouched. Foreign keys are checked the way the
//! relational schema enforces them: employees must reference existing rows,
//! and referenced departments or positions cannot be deleted.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use super::PersistenceError;
use super::repository::{EmployeeRepository, Repository, StagedInsert};
use super::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use crate::entities::{department, employee, position};

/// The three tables of one store, each with the last key it handed out.
#[doc(hidden)]
#[derive(Debug, Clone, Default)]
pub struct Tables {
    departments: BTreeMap<i32, department::Model>,
    positions: BTreeMap<i32, position::Model>,
    employees: BTreeMap<i32, employee::Model>,
    department_seq: i32,
    position_seq: i32,
    employee_seq: i32,
}

impl Tables {
    /// Next key for `T`. Keys are never reused, even after the row holding
    /// the highest one is deleted.
    fn next_id<T: MemoryRecord>(&mut self) -> i32 {
        let seq = T::sequence(self);
        *seq += 1;
        *seq
    }

    /// Keep the sequence ahead of an explicitly keyed row.
    fn observe_id<T: MemoryRecord>(&mut self, id: i32) {
        let seq = T::sequence(self);
        *seq = (*seq).max(id);
    }

    fn check_references(&self, employee: &employee::Model) -> Result<(), PersistenceError> {
        if !self.departments.contains_key(&employee.department_id) {
            return Err(PersistenceError::Constraint(format!(
                "employee references missing department {}",
                employee.department_id
            )));
        }
        if !self.positions.contains_key(&employee.position_id) {
            return Err(PersistenceError::Constraint(format!(
                "employee references missing position {}",
                employee.position_id
            )));
        }
        Ok(())
    }
}

/// A row type stored by [`MemoryStore`].
pub trait MemoryRecord: Clone + Send + Sync + 'static {
    const TABLE: &'static str;

    fn id(&self) -> i32;

    fn set_id(&mut self, id: i32);

    #[doc(hidden)]
    fn rows(tables: &Tables) -> &BTreeMap<i32, Self>;

    #[doc(hidden)]
    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<i32, Self>;

    #[doc(hidden)]
    fn sequence(tables: &mut Tables) -> &mut i32;

    /// Foreign-key checks before the row is written.
    #[doc(hidden)]
    fn check_write(&self, _tables: &Tables) -> Result<(), PersistenceError> {
        Ok(())
    }

    /// Foreign-key checks before the row is removed.
    #[doc(hidden)]
    fn check_delete(&self, _tables: &Tables) -> Result<(), PersistenceError> {
        Ok(())
    }

    #[doc(hidden)]
    fn into_change(self, op: Op) -> Change;
}

impl MemoryRecord for department::Model {
    const TABLE: &'static str = "department";

    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    fn rows(tables: &Tables) -> &BTreeMap<i32, Self> {
        &tables.departments
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<i32, Self> {
        &mut tables.departments
    }

    fn sequence(tables: &mut Tables) -> &mut i32 {
        &mut tables.department_seq
    }

    fn check_delete(&self, tables: &Tables) -> Result<(), PersistenceError> {
        if tables.employees.values().any(|e| e.department_id == self.id) {
            return Err(PersistenceError::Constraint(format!(
                "department {} is still referenced by employees",
                self.id
            )));
        }
        Ok(())
    }

    fn into_change(self, op: Op) -> Change {
        Change::Department(op, self)
    }
}

impl MemoryRecord for position::Model {
    const TABLE: &'static str = "position";

    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    fn rows(tables: &Tables) -> &BTreeMap<i32, Self> {
        &tables.positions
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<i32, Self> {
        &mut tables.positions
    }

    fn sequence(tables: &mut Tables) -> &mut i32 {
        &mut tables.position_seq
    }

    fn check_delete(&self, tables: &Tables) -> Result<(), PersistenceError> {
        if tables.employees.values().any(|e| e.position_id == self.id) {
            return Err(PersistenceError::Constraint(format!(
                "position {} is still referenced by employees",
                self.id
            )));
        }
        Ok(())
    }

    fn into_change(self, op: Op) -> Change {
        Change::Position(op, self)
    }
}

impl MemoryRecord for employee::Model {
    const TABLE: &'static str = "employee";

    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    fn rows(tables: &Tables) -> &BTreeMap<i32, Self> {
        &tables.employees
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<i32, Self> {
        &mut tables.employees
    }

    fn sequence(tables: &mut Tables) -> &mut i32 {
        &mut tables.employee_seq
    }

    fn check_write(&self, tables: &Tables) -> Result<(), PersistenceError> {
        tables.check_references(self)
    }

    fn into_change(self, op: Op) -> Change {
        Change::Employee(op, self)
    }
}

#[doc(hidden)]
#[derive(Debug, Clone)]
pub enum Op {
    Insert(StagedInsert),
    Update,
    Delete,
}

#[doc(hidden)]
#[derive(Debug, Clone)]
pub enum Change {
    Department(Op, department::Model),
    Position(Op, position::Model),
    Employee(Op, employee::Model),
}

/// Apply one change to the working copy. Returns the assigned id for inserts.
fn apply<T: MemoryRecord>(tables: &mut Tables, op: Op, mut row: T) -> Result<Option<(StagedInsert, i32)>, PersistenceError> {
    match op {
        Op::Insert(staged) => {
            row.check_write(tables)?;
            let id = tables.next_id::<T>();
            row.set_id(id);
            T::rows_mut(tables).insert(id, row);
            Ok(Some((staged, id)))
        }
        Op::Update => {
            if !T::rows(tables).contains_key(&row.id()) {
                return Err(PersistenceError::Constraint(format!("{} {} does not exist", T::TABLE, row.id())));
            }
            row.check_write(tables)?;
            T::rows_mut(tables).insert(row.id(), row);
            Ok(None)
        }
        Op::Delete => {
            if !T::rows(tables).contains_key(&row.id()) {
                return Err(PersistenceError::Constraint(format!("{} {} does not exist", T::TABLE, row.id())));
            }
            row.check_delete(tables)?;
            T::rows_mut(tables).remove(&row.id());
            Ok(None)
        }
    }
}

/// Counts of what one successful commit wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitRecord {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// Shared in-memory tables plus a log of successful commits.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    history: Arc<Mutex<Vec<CommitRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing the journal. An id of 0 is assigned
    /// the next free key. Returns the stored row.
    pub fn seed<T: MemoryRecord>(&self, mut row: T) -> T {
        let mut tables = self.tables.lock();
        if row.id() == 0 {
            row.set_id(tables.next_id::<T>());
        } else {
            tables.observe_id::<T>(row.id());
        }
        T::rows_mut(&mut tables).insert(row.id(), row.clone());
        row
    }

    /// Snapshot of one table in key order.
    pub fn rows<T: MemoryRecord>(&self) -> Vec<T> {
        T::rows(&self.tables.lock()).values().cloned().collect()
    }

    /// Successful commits, oldest first.
    pub fn history(&self) -> Vec<CommitRecord> {
        self.history.lock().clone()
    }

    pub fn unit_of_work(&self) -> MemoryUnitOfWork {
        MemoryUnitOfWork {
            store: self.clone(),
            journal: Arc::default(),
            commits: AtomicUsize::new(0),
            employees: OnceLock::new(),
            departments: OnceLock::new(),
            positions: OnceLock::new(),
        }
    }

    fn commit(&self, changes: Vec<Change>) -> Result<CommitRecord, PersistenceError> {
        let mut tables = self.tables.lock();
        let mut working = tables.clone();
        let mut record = CommitRecord::default();
        let mut inserted = Vec::new();

        for change in changes {
            let (op, result) = match change {
                Change::Department(op, row) => (op.clone(), apply(&mut working, op, row)),
                Change::Position(op, row) => (op.clone(), apply(&mut working, op, row)),
                Change::Employee(op, row) => (op.clone(), apply(&mut working, op, row)),
            };
            if let Some(key) = result? {
                inserted.push(key);
            }
            match op {
                Op::Insert(_) => record.inserted += 1,
                Op::Update => record.updated += 1,
                Op::Delete => record.deleted += 1,
            }
        }

        *tables = working;
        drop(tables);

        for (staged, id) in inserted {
            staged.resolve(id);
        }
        self.history.lock().push(record);
        Ok(record)
    }
}

impl UnitOfWorkFactory for MemoryStore {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(self.unit_of_work())
    }
}

/// Repository over one in-memory table.
pub struct MemoryRepository<T> {
    store: MemoryStore,
    journal: Arc<Mutex<Vec<Change>>>,
    _row: std::marker::PhantomData<fn() -> T>,
}

#[async_trait]
impl<T: MemoryRecord> Repository<T> for MemoryRepository<T> {
    async fn get_all(&self) -> Result<Vec<T>, PersistenceError> {
        Ok(self.store.rows())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<T>, PersistenceError> {
        Ok(T::rows(&self.store.tables.lock()).get(&id).cloned())
    }

    fn add(&self, entity: T) -> StagedInsert {
        let staged = StagedInsert::new();
        self.journal.lock().push(entity.into_change(Op::Insert(staged.clone())));
        staged
    }

    fn update(&self, entity: T) {
        self.journal.lock().push(entity.into_change(Op::Update));
    }

    fn delete(&self, entity: T) {
        self.journal.lock().push(entity.into_change(Op::Delete));
    }
}

#[async_trait]
impl EmployeeRepository for MemoryRepository<employee::Model> {
    async fn count_by_department(&self, department_id: i32) -> Result<u64, PersistenceError> {
        let tables = self.store.tables.lock();
        Ok(tables.employees.values().filter(|e| e.department_id == department_id).count() as u64)
    }

    async fn count_by_position(&self, position_id: i32) -> Result<u64, PersistenceError> {
        let tables = self.store.tables.lock();
        Ok(tables.employees.values().filter(|e| e.position_id == position_id).count() as u64)
    }
}

/// Unit of work over a [`MemoryStore`].
pub struct MemoryUnitOfWork {
    store: MemoryStore,
    journal: Arc<Mutex<Vec<Change>>>,
    commits: AtomicUsize,
    employees: OnceLock<MemoryRepository<employee::Model>>,
    departments: OnceLock<MemoryRepository<department::Model>>,
    positions: OnceLock<MemoryRepository<position::Model>>,
}

impl MemoryUnitOfWork {
    /// Number of changes staged and not yet committed.
    pub fn pending(&self) -> usize {
        self.journal.lock().len()
    }

    /// How many times `commit` has been called, successful or not.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    fn repository<'a, T>(&self, slot: &'a OnceLock<MemoryRepository<T>>) -> &'a MemoryRepository<T> {
        slot.get_or_init(|| MemoryRepository {
            store: self.store.clone(),
            journal: Arc::clone(&self.journal),
            _row: std::marker::PhantomData,
        })
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
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
        self.commits.fetch_add(1, Ordering::SeqCst);
        let changes = std::mem::take(&mut *self.journal.lock());
        if changes.is_empty() {
            return Ok(());
        }
        let record = self.store.commit(changes)?;
        debug!(
            "Committed {} insert(s), {} update(s), {} delete(s)",
            record.inserted, record.updated, record.deleted
        );
        Ok(())
    }
}
