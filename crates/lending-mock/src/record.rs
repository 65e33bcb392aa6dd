//! User record types held by the mock store.
//!
//! The serialized layout (camelCase keys, status spelled as its display name)
//! matches what the dashboard screens persist and read back, so a stored
//! collection stays readable across versions of this crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account status of a user.
///
/// Transitions are unconstrained: any status may be replaced by any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserStatus {
    /// Active account.
    Active,
    /// Dormant account.
    Inactive,
    /// Account awaiting review.
    Pending,
    /// Account barred from borrowing.
    Blacklisted,
}

impl UserStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 4] = [
        Self::Active,
        Self::Inactive,
        Self::Pending,
        Self::Blacklisted,
    ];

    /// Returns the display name used in storage and on screen.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Pending => "Pending",
            Self::Blacklisted => "Blacklisted",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when text does not name a [`UserStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown user status '{value}'")]
pub struct ParseStatusError {
    /// The rejected text.
    pub value: String,
}

impl FromStr for UserStatus {
    type Err = ParseStatusError;

    /// Parses a status name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStatusError {
                value: s.to_owned(),
            })
    }
}

/// A loan guarantor attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guarantor {
    /// Guarantor's full name.
    pub full_name: String,
    /// Guarantor's phone number.
    pub phone_number: String,
    /// Guarantor's email address.
    pub email_address: String,
    /// Relationship to the user.
    pub relationship: String,
}

/// A single user's profile as held by the mock store.
///
/// Apart from `status`, which the query service mutates, every field is set
/// once by the generator. Profile strings are free-form; nothing validates one
/// field against another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Opaque identifier, unique within a dataset.
    pub id: String,
    /// Lending organization the user belongs to.
    pub organization: String,
    /// Login name shown in the users table.
    pub username: String,
    /// Personal email address.
    pub email: String,
    /// Personal phone number.
    pub phone_number: String,
    /// Human-readable join date.
    pub date_joined: String,
    /// Account status.
    pub status: UserStatus,
    /// Full legal name.
    pub full_name: String,
    /// Bank verification number.
    pub bvn: String,
    /// Gender.
    pub gender: String,
    /// Marital status.
    pub marital_status: String,
    /// Number of children, or `None`.
    pub children: String,
    /// Type of residence.
    pub type_of_residence: String,
    /// Highest level of education.
    pub level_of_education: String,
    /// Employment status.
    pub employment_status: String,
    /// Sector of employment.
    pub sector_of_employment: String,
    /// Duration of employment.
    pub duration_of_employment: String,
    /// Office email address.
    pub office_email: String,
    /// Monthly income range.
    pub monthly_income: String,
    /// Loan repayment amount.
    pub loan_repayment: String,
    /// Twitter handle.
    pub twitter: String,
    /// Facebook name.
    pub facebook: String,
    /// Instagram handle.
    pub instagram: String,
    /// Loan guarantors, in order.
    pub guarantors: Vec<Guarantor>,
    /// User tier, 1 to 3.
    pub tier: u8,
    /// Account balance.
    pub account_balance: String,
    /// Bank account number.
    pub account_number: String,
    /// Bank name.
    pub bank: String,
}

/// Aggregate figures shown on the dashboard.
///
/// `users_with_loans` and `users_with_savings` are fixed fractions of the
/// total (80% and 90%, rounded down), not counts over loan or savings data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Total number of users.
    pub users: usize,
    /// Users whose status is [`UserStatus::Active`].
    pub active_users: usize,
    /// Placeholder: 80% of `users`.
    pub users_with_loans: usize,
    /// Placeholder: 90% of `users`.
    pub users_with_savings: usize,
}

impl DashboardStats {
    /// Derives the dashboard figures from a user collection.
    ///
    /// # Example
    ///
    /// ```
    /// use lending_mock::DashboardStats;
    ///
    /// let stats = DashboardStats::from_users(&[]);
    /// assert_eq!(stats.users, 0);
    /// assert_eq!(stats.users_with_loans, 0);
    /// ```
    #[must_use]
    pub fn from_users(users: &[UserRecord]) -> Self {
        let total = users.len();
        Self {
            users: total,
            active_users: users
                .iter()
                .filter(|user| user.status == UserStatus::Active)
                .count(),
            users_with_loans: floor_ratio(total, 4, 5),
            users_with_savings: floor_ratio(total, 9, 10),
        }
    }
}

#[expect(
    clippy::integer_division,
    reason = "the placeholder ratios are defined as floor-rounded fractions"
)]
const fn floor_ratio(total: usize, numerator: usize, denominator: usize) -> usize {
    total.saturating_mul(numerator) / denominator
}
