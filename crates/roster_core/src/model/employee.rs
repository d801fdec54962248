//! Employee aggregate and its owned address.
//!
//! # Responsibility
//! - Define the employee record with its eagerly resolved department,
//!   embedded address and sport memberships.
//!
//! # Invariants
//! - `email` is unique across active and inactive employees.
//! - `address` is owned by exactly one employee and shares its lifecycle.
//! - `sports` mirrors the employee/sport association; it is kept in id order.

use crate::model::department::Department;
use crate::model::sport::{Sport, SportId};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type EmployeeId = i64;

/// Postal address embedded in an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {} - {}",
            self.street, self.city, self.state, self.zip
        )
    }
}

/// Creation payload for an employee.
///
/// The department must already be resolved; the store assigns the id and
/// starts the employee as active with no sports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub dob: NaiveDate,
    pub department: Department,
    pub email: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub dob: NaiveDate,
    /// Always loaded, even when the department is soft-deleted.
    pub department: Department,
    pub email: String,
    pub is_active: bool,
    pub address: Address,
    pub sports: Vec<Sport>,
}

impl Employee {
    pub fn has_sport(&self, sport_id: SportId) -> bool {
        self.sports.iter().any(|sport| sport.id == sport_id)
    }

    pub fn sport_ids(&self) -> Vec<SportId> {
        self.sports.iter().map(|sport| sport.id).collect()
    }

    /// Completed years between `dob` and `today`; zero for future dates.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let mut years = today.year() - self.dob.year();
        if (today.month(), today.day()) < (self.dob.month(), self.dob.day()) {
            years -= 1;
        }
        u32::try_from(years).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Address, Employee};
    use crate::model::department::Department;
    use crate::model::sport::Sport;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Employee {
        Employee {
            id: 1,
            name: "Alice".to_string(),
            dob: date(1990, 6, 15),
            department: Department::new(1, "Engineering"),
            email: "a@x.com".to_string(),
            is_active: true,
            address: Address::new("1 Main St", "Springfield", "IL", "62701"),
            sports: vec![Sport::new(3, "Chess")],
        }
    }

    #[test]
    fn age_counts_only_completed_years() {
        let employee = sample();
        assert_eq!(employee.age_on(date(2020, 6, 14)), 29);
        assert_eq!(employee.age_on(date(2020, 6, 15)), 30);
        assert_eq!(employee.age_on(date(1980, 1, 1)), 0);
    }

    #[test]
    fn address_display_matches_roster_format() {
        let address = Address::new("1 Main St", "Springfield", "IL", "62701");
        assert_eq!(address.to_string(), "1 Main St, Springfield, IL - 62701");
    }

    #[test]
    fn sport_membership_helpers() {
        let employee = sample();
        assert!(employee.has_sport(3));
        assert!(!employee.has_sport(4));
        assert_eq!(employee.sport_ids(), vec![3]);
    }
}
