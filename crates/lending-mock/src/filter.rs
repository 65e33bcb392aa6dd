//! Partial field filters over user records.
//!
//! A [`UserFilter`] maps fields to values. A record passes when it satisfies
//! every criterion:
//!
//! - text against a text field: case-insensitive substring match;
//! - anything else: exact equality. A status is matched by name, a tier by
//!   number, and mismatched kinds never match.
//!
//! A criterion with empty text or the number zero imposes no constraint, and
//! fields absent from the filter are unconstrained.

use std::collections::BTreeMap;

use crate::record::{UserRecord, UserStatus};

/// A filterable field of [`UserRecord`].
///
/// `guarantors` is a nested sequence and cannot be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[expect(missing_docs, reason = "variants mirror the UserRecord fields")]
pub enum UserField {
    Id,
    Organization,
    Username,
    Email,
    PhoneNumber,
    DateJoined,
    Status,
    FullName,
    Bvn,
    Gender,
    MaritalStatus,
    Children,
    TypeOfResidence,
    LevelOfEducation,
    EmploymentStatus,
    SectorOfEmployment,
    DurationOfEmployment,
    OfficeEmail,
    MonthlyIncome,
    LoanRepayment,
    Twitter,
    Facebook,
    Instagram,
    Tier,
    AccountBalance,
    AccountNumber,
    Bank,
}

/// A value a filter criterion compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Free text; substring match against text fields.
    Text(String),
    /// An exact status.
    Status(UserStatus),
    /// An exact number.
    Number(i64),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<UserStatus> for FilterValue {
    fn from(value: UserStatus) -> Self {
        Self::Status(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// A record-side view of one field's value.
enum FieldValue<'a> {
    Text(&'a str),
    Status(UserStatus),
    Number(u8),
}

/// A partial mapping from fields to required values, combined with AND.
///
/// # Example
///
/// ```
/// use lending_mock::{UserField, UserFilter, UserStatus};
///
/// let filter = UserFilter::new()
///     .with(UserField::Organization, "lend")
///     .with(UserField::Status, UserStatus::Active);
///
/// assert_eq!(filter.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    criteria: BTreeMap<UserField, FilterValue>,
}

impl UserFilter {
    /// Creates a filter with no criteria; it matches every record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a criterion, replacing any previous one for the same field.
    #[must_use]
    pub fn with(mut self, field: UserField, value: impl Into<FilterValue>) -> Self {
        self.criteria.insert(field, value.into());
        self
    }

    /// Returns the number of criteria, including empty-text ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Returns `true` when no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Returns `true` when `user` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, user: &UserRecord) -> bool {
        self.criteria
            .iter()
            .all(|(field, value)| criterion_matches(field_value(user, *field), value))
    }

    /// Keeps the records that match, preserving their order.
    #[must_use]
    pub fn apply(&self, users: Vec<UserRecord>) -> Vec<UserRecord> {
        if self.is_empty() {
            return users;
        }
        users.into_iter().filter(|user| self.matches(user)).collect()
    }
}

fn criterion_matches(actual: FieldValue<'_>, expected: &FilterValue) -> bool {
    match expected {
        FilterValue::Text(text) if text.is_empty() => return true,
        FilterValue::Number(0) => return true,
        _ => {}
    }

    match (actual, expected) {
        (FieldValue::Text(haystack), FilterValue::Text(needle)) => haystack
            .to_lowercase()
            .contains(needle.to_lowercase().as_str()),
        (FieldValue::Status(status), FilterValue::Status(wanted)) => status == *wanted,
        (FieldValue::Status(status), FilterValue::Text(name)) => {
            name.parse::<UserStatus>().is_ok_and(|wanted| wanted == status)
        }
        (FieldValue::Number(number), FilterValue::Number(wanted)) => i64::from(number) == *wanted,
        _ => false,
    }
}

fn field_value(user: &UserRecord, field: UserField) -> FieldValue<'_> {
    let text = match field {
        UserField::Status => return FieldValue::Status(user.status),
        UserField::Tier => return FieldValue::Number(user.tier),
        UserField::Id => &user.id,
        UserField::Organization => &user.organization,
        UserField::Username => &user.username,
        UserField::Email => &user.email,
        UserField::PhoneNumber => &user.phone_number,
        UserField::DateJoined => &user.date_joined,
        UserField::FullName => &user.full_name,
        UserField::Bvn => &user.bvn,
        UserField::Gender => &user.gender,
        UserField::MaritalStatus => &user.marital_status,
        UserField::Children => &user.children,
        UserField::TypeOfResidence => &user.type_of_residence,
        UserField::LevelOfEducation => &user.level_of_education,
        UserField::EmploymentStatus => &user.employment_status,
        UserField::SectorOfEmployment => &user.sector_of_employment,
        UserField::DurationOfEmployment => &user.duration_of_employment,
        UserField::OfficeEmail => &user.office_email,
        UserField::MonthlyIncome => &user.monthly_income,
        UserField::LoanRepayment => &user.loan_repayment,
        UserField::Twitter => &user.twitter,
        UserField::Facebook => &user.facebook,
        UserField::Instagram => &user.instagram,
        UserField::AccountBalance => &user.account_balance,
        UserField::AccountNumber => &user.account_number,
        UserField::Bank => &user.bank,
    };
    FieldValue::Text(text)
}

/// The users screen's filter form. Blank fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Organization substring.
    pub organization: String,
    /// Username substring.
    pub username: String,
    /// Email substring.
    pub email: String,
    /// Join date substring.
    pub date: String,
    /// Phone number substring.
    pub phone_number: String,
    /// Exact status name.
    pub status: String,
}

impl From<&FilterOptions> for UserFilter {
    fn from(options: &FilterOptions) -> Self {
        [
            (UserField::Organization, &options.organization),
            (UserField::Username, &options.username),
            (UserField::Email, &options.email),
            (UserField::DateJoined, &options.date),
            (UserField::PhoneNumber, &options.phone_number),
            (UserField::Status, &options.status),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .fold(Self::new(), |filter, (field, value)| {
            filter.with(field, value.trim())
        })
    }
}
