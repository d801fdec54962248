use chrono::NaiveDate;
use roster_core::db::open_db_in_memory;
use roster_core::{
    Address, Department, DepartmentStore, EmployeeStore, EntityKind, Gateway, NewEmployee,
    SportStore, SqliteDepartmentStore, SqliteEmployeeStore, SqliteSportStore, StoreError,
};

fn address() -> Address {
    Address::new("1 Main St", "Springfield", "IL", "62701")
}

fn new_employee(name: &str, email: &str, department: &Department) -> NewEmployee {
    NewEmployee {
        name: name.to_string(),
        dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        department: department.clone(),
        email: email.to_string(),
        address: address(),
    }
}

fn count_rows(gateway: &Gateway, table: &str) -> i64 {
    gateway
        .connection()
        .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
            row.get(0)
        })
        .unwrap()
}

#[test]
fn add_persists_employee_with_address() {
    let gateway = open_db_in_memory().unwrap();
    let departments = SqliteDepartmentStore::new(&gateway);
    let store = SqliteEmployeeStore::new(&gateway);

    let engineering = departments.add("Engineering").unwrap();
    let alice = store.add(&new_employee("Alice", "a@x.com", &engineering)).unwrap();

    assert_eq!(alice.id, 1);
    assert!(alice.is_active);
    assert!(alice.sports.is_empty());
    assert_eq!(alice.department, engineering);
    assert_eq!(alice.address, address());
    assert_eq!(store.find_by_id(alice.id).unwrap(), Some(alice));
    assert_eq!(count_rows(&gateway, "addresses"), 1);
}

#[test]
fn add_with_missing_department_writes_nothing() {
    let gateway = open_db_in_memory().unwrap();
    let store = SqliteEmployeeStore::new(&gateway);

    let ghost = Department::new(9999, "Ghost");
    let err = store.add(&new_employee("Alice", "a@x.com", &ghost)).unwrap_err();

    assert!(matches!(
        err,
        StoreError::NotFound {
            kind: EntityKind::Department,
            id: 9999
        }
    ));
    assert_eq!(count_rows(&gateway, "employees"), 0);
    assert_eq!(count_rows(&gateway, "addresses"), 0);
}

#[test]
fn failure_after_address_insert_rolls_back_address() {
    let gateway = open_db_in_memory().unwrap();
    let departments = SqliteDepartmentStore::new(&gateway);
    let store = SqliteEmployeeStore::new(&gateway);
    let engineering = departments.add("Engineering").unwrap();

    gateway
        .connection()
        .execute_batch(
            "CREATE TEMP TRIGGER reject_employee_insert BEFORE INSERT ON employees
             BEGIN SELECT RAISE(ABORT, 'employee insert rejected'); END;",
        )
        .unwrap();

    let err = store.add(&new_employee("Alice", "a@x.com", &engineering)).unwrap_err();
    assert!(matches!(err, StoreError::Db(_)));
    assert_eq!(count_rows(&gateway, "addresses"), 0);
    assert_eq!(count_rows(&gateway, "employees"), 0);
}

#[test]
fn duplicate_email_conflicts_even_when_inactive() {
    let gateway = open_db_in_memory().unwrap();
    let departments = SqliteDepartmentStore::new(&gateway);
    let store = SqliteEmployeeStore::new(&gateway);
    let engineering = departments.add("Engineering").unwrap();

    let alice = store.add(&new_employee("Alice", "a@x.com", &engineering)).unwrap();
    store.remove(alice.id).unwrap();

    let err = store.add(&new_employee("Alicia", "a@x.com", &engineering)).unwrap_err();
    match err {
        StoreError::Conflict { kind, field, value } => {
            assert_eq!(kind, EntityKind::Employee);
            assert_eq!(field, "email");
            assert_eq!(value, "a@x.com");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(count_rows(&gateway, "addresses"), 1);
}

#[test]
fn remove_deactivates_but_keeps_record() {
    let gateway = open_db_in_memory().unwrap();
    let departments = SqliteDepartmentStore::new(&gateway);
    let store = SqliteEmployeeStore::new(&gateway);
    let engineering = departments.add("Engineering").unwrap();

    let alice = store.add(&new_employee("Alice", "a@x.com", &engineering)).unwrap();
    let bob = store.add(&new_employee("Bob", "b@x.com", &engineering)).unwrap();
    store.remove(alice.id).unwrap();

    let active: Vec<i64> = store.list_all().unwrap().iter().map(|e| e.id).collect();
    assert_eq!(active, vec![bob.id]);
    let inactive = store.find_by_id(alice.id).unwrap().unwrap();
    assert!(!inactive.is_active);
    assert_eq!(inactive.email, "a@x.com");

    assert!(matches!(
        store.remove(404).unwrap_err(),
        StoreError::NotFound {
            kind: EntityKind::Employee,
            id: 404
        }
    ));
}

#[test]
fn update_overwrites_fields_and_keeps_flags_and_sports() {
    let gateway = open_db_in_memory().unwrap();
    let departments = SqliteDepartmentStore::new(&gateway);
    let sports = SqliteSportStore::new(&gateway);
    let store = SqliteEmployeeStore::new(&gateway);
    let engineering = departments.add("Engineering").unwrap();
    let sales = departments.add("Sales").unwrap();
    let chess = sports.add("Chess").unwrap();

    let mut alice = store.add(&new_employee("Alice", "a@x.com", &engineering)).unwrap();
    store.add_sport(alice.id, chess.id).unwrap();

    alice.name = "Alice Smith".to_string();
    alice.email = "alice@x.com".to_string();
    alice.department = sales.clone();
    alice.address = Address::new("9 Elm St", "Shelbyville", "IL", "62565");
    alice.sports.clear();
    let updated = store.update(&alice).unwrap();

    assert_eq!(updated.name, "Alice Smith");
    assert_eq!(updated.email, "alice@x.com");
    assert_eq!(updated.department, sales);
    assert_eq!(updated.address.city, "Shelbyville");
    assert!(updated.is_active);
    assert_eq!(updated.sport_ids(), vec![chess.id]);
    assert_eq!(count_rows(&gateway, "addresses"), 1);
    assert_eq!(store.find_by_id(alice.id).unwrap(), Some(updated));
}

#[test]
fn update_rejects_email_of_another_employee() {
    let gateway = open_db_in_memory().unwrap();
    let departments = SqliteDepartmentStore::new(&gateway);
    let store = SqliteEmployeeStore::new(&gateway);
    let engineering = departments.add("Engineering").unwrap();

    let mut alice = store.add(&new_employee("Alice", "a@x.com", &engineering)).unwrap();
    store.add(&new_employee("Bob", "b@x.com", &engineering)).unwrap();

    alice.email = "b@x.com".to_string();
    assert!(matches!(
        store.update(&alice).unwrap_err(),
        StoreError::Conflict { .. }
    ));
    assert_eq!(store.find_by_id(alice.id).unwrap().unwrap().email, "a@x.com");
}

#[test]
fn sport_association_is_idempotent_both_ways() {
    let gateway = open_db_in_memory().unwrap();
    let departments = SqliteDepartmentStore::new(&gateway);
    let sports = SqliteSportStore::new(&gateway);
    let store = SqliteEmployeeStore::new(&gateway);
    let engineering = departments.add("Engineering").unwrap();
    let chess = sports.add("Chess").unwrap();
    let tennis = sports.add("Tennis").unwrap();
    let alice = store.add(&new_employee("Alice", "a@x.com", &engineering)).unwrap();

    store.add_sport(alice.id, tennis.id).unwrap();
    store.add_sport(alice.id, chess.id).unwrap();
    store.add_sport(alice.id, chess.id).unwrap();
    assert_eq!(
        store.find_by_id(alice.id).unwrap().unwrap().sport_ids(),
        vec![chess.id, tennis.id]
    );
    assert_eq!(count_rows(&gateway, "employee_sports"), 2);

    store.remove_sport(alice.id, chess.id).unwrap();
    store.remove_sport(alice.id, chess.id).unwrap();
    assert_eq!(
        store.find_by_id(alice.id).unwrap().unwrap().sport_ids(),
        vec![tennis.id]
    );
    assert!(sports.employees_of(chess.id).unwrap().is_empty());
}

#[test]
fn sport_association_requires_both_sides() {
    let gateway = open_db_in_memory().unwrap();
    let departments = SqliteDepartmentStore::new(&gateway);
    let sports = SqliteSportStore::new(&gateway);
    let store = SqliteEmployeeStore::new(&gateway);
    let engineering = departments.add("Engineering").unwrap();
    let chess = sports.add("Chess").unwrap();
    let alice = store.add(&new_employee("Alice", "a@x.com", &engineering)).unwrap();

    assert!(matches!(
        store.add_sport(alice.id, 99).unwrap_err(),
        StoreError::NotFound {
            kind: EntityKind::Sport,
            id: 99
        }
    ));
    assert!(matches!(
        store.add_sport(99, chess.id).unwrap_err(),
        StoreError::NotFound {
            kind: EntityKind::Employee,
            id: 99
        }
    ));
    assert!(matches!(
        store.remove_sport(alice.id, 99).unwrap_err(),
        StoreError::NotFound { .. }
    ));
    assert_eq!(count_rows(&gateway, "employee_sports"), 0);
}
