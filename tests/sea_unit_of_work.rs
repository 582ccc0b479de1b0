use std::time::Duration;

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};

use employee_management::AppError;
use employee_management::config::DatabaseConfig;
use employee_management::db::{self, PersistenceError, SeaUnitOfWorkFactory, UnitOfWork};
use employee_management::entities::{department, employee, prelude::*};
use employee_management::models::{DepartmentDto, EmployeeDto, PositionDto};
use employee_management::services::{DepartmentService, EmployeeService, PositionService};

async fn setup() -> (DatabaseConnection, SeaUnitOfWorkFactory) {
    let config = DatabaseConfig {
        url: Some("sqlite::memory:".to_string()),
        max_connections: 1,
        ..Default::default()
    };
    let conn = db::connect(&config).await.unwrap();
    db::ensure_schema(&conn).await.unwrap();
    let factory = SeaUnitOfWorkFactory::new(conn.clone(), Duration::from_secs(5));
    (conn, factory)
}

async fn create_parents(factory: &SeaUnitOfWorkFactory) -> (DepartmentDto, PositionDto) {
    let uow = factory.unit_of_work();
    let department = DepartmentService::new(&uow)
        .create(DepartmentDto {
            name: "IT".to_string(),
            description: "Computers".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let position = PositionService::new(&uow)
        .create(PositionDto {
            title: "Developer".to_string(),
            description: "Writes code".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    (department, position)
}

fn employee_dto(department_id: i32, position_id: i32) -> EmployeeDto {
    EmployeeDto {
        first_name: "Name".to_string(),
        last_name: "LastName".to_string(),
        email: "email@email.com".to_string(),
        phone_number: "+37063444111".to_string(),
        department_id,
        position_id,
        salary: Decimal::new(5000, 0),
        ..Default::default()
    }
}

#[tokio::test]
async fn schema_is_idempotent() {
    let (conn, _) = setup().await;
    db::ensure_schema(&conn).await.unwrap();

    let counts = db::get_table_counts(&conn).await.unwrap();
    assert_eq!(counts.departments, 0);
    assert_eq!(counts.positions, 0);
    assert_eq!(counts.employees, 0);
}

#[tokio::test]
async fn employee_lifecycle() {
    let (conn, factory) = setup().await;
    let (department, position) = create_parents(&factory).await;

    let uow = factory.unit_of_work();
    let created = EmployeeService::new(&uow)
        .create(employee_dto(department.id, position.id))
        .await
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.department_name.as_deref(), Some("IT"));

    let uow = factory.unit_of_work();
    EmployeeService::new(&uow)
        .update(EmployeeDto {
            id: created.id,
            first_name: "John".to_string(),
            ..employee_dto(department.id, position.id)
        })
        .await
        .unwrap();

    let stored = Employees::find_by_id(created.id).one(&conn).await.unwrap().unwrap();
    assert_eq!(stored.first_name, "John");
    assert_eq!(Some(stored.hire_date), created.hire_date);

    let uow = factory.unit_of_work();
    let found = DepartmentService::new(&uow).get_by_id(department.id).await.unwrap();
    assert_eq!(found.employee_count, 1);

    let uow = factory.unit_of_work();
    EmployeeService::new(&uow).delete(created.id).await.unwrap();
    assert!(Employees::find().all(&conn).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_department_is_rejected_by_store() {
    let (conn, factory) = setup().await;
    let (_, position) = create_parents(&factory).await;

    let uow = factory.unit_of_work();
    let err = EmployeeService::new(&uow)
        .create(employee_dto(404, position.id))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Persistence(_)));
    assert!(Employees::find().all(&conn).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_commit_applies_nothing() {
    let (conn, factory) = setup().await;
    let (department, position) = create_parents(&factory).await;

    let uow = factory.unit_of_work();
    uow.departments().add(department::Model {
        id: 0,
        name: "Finance".to_string(),
        description: "Books".to_string(),
    });
    uow.employees().add(employee::Model {
        id: 0,
        first_name: "Ona".to_string(),
        last_name: "Onaite".to_string(),
        email: "ona@example.com".to_string(),
        phone_number: "+37060000001".to_string(),
        department_id: 404,
        position_id: position.id,
        salary: Decimal::new(3000, 0),
        hire_date: chrono::NaiveDate::from_ymd_opt(2022, 1, 10).unwrap(),
    });
    assert_eq!(uow.pending(), 2);

    assert!(uow.commit().await.is_err());
    assert_eq!(uow.pending(), 0);

    let departments = Departments::find().all(&conn).await.unwrap();
    assert_eq!(departments.len(), 1);
    assert_eq!(departments[0].id, department.id);
    assert!(Employees::find().all(&conn).await.unwrap().is_empty());
}

#[tokio::test]
async fn staged_changes_are_invisible_until_commit() {
    let (conn, factory) = setup().await;

    let uow = factory.unit_of_work();
    let staged = uow.departments().add(department::Model {
        id: 0,
        name: "HR".to_string(),
        description: "People".to_string(),
    });
    assert_eq!(staged.id(), None);
    assert!(Departments::find().all(&conn).await.unwrap().is_empty());

    uow.commit().await.unwrap();
    let id = staged.id().unwrap();
    assert!(Departments::find_by_id(id).one(&conn).await.unwrap().is_some());
}

#[tokio::test]
async fn commit_past_command_timeout_persists_nothing() {
    let (conn, _) = setup().await;
    let limit = Duration::from_millis(100);
    let factory = SeaUnitOfWorkFactory::new(conn.clone(), limit);

    // The pool has a single connection; holding it stalls the commit.
    let holder = conn.begin().await.unwrap();

    let uow = factory.unit_of_work();
    let staged = uow.departments().add(department::Model {
        id: 0,
        name: "HR".to_string(),
        description: "People".to_string(),
    });
    let err = uow.commit().await.unwrap_err();
    assert!(matches!(err, PersistenceError::Timeout(elapsed) if elapsed == limit));
    assert_eq!(uow.pending(), 0);
    assert_eq!(staged.id(), None);

    holder.rollback().await.unwrap();
    assert!(Departments::find().all(&conn).await.unwrap().is_empty());
}
