//! Synthetic user generation.
//!
//! Every field is drawn from a fixed categorical catalogue or built from a
//! template, so generated records always have the expected shape. The random
//! source is injected: pass any [`Rng`] to [`generate_users`], or use a
//! [`RecordGenerator`] seeded for reproducible output.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::GenerationError;
use crate::record::{Guarantor, UserRecord, UserStatus};

/// Number of users in a freshly generated dataset.
pub const DEFAULT_USER_COUNT: usize = 500;

/// Prefix shared by every generated user id.
pub const ID_PREFIX: &str = "LSQFf";

/// Number of random base-36 characters following [`ID_PREFIX`].
const ID_TOKEN_LEN: usize = 8;

/// Maximum number of draws when looking for an unused id.
const MAX_ID_ATTEMPTS: usize = 32;

/// Year every generated join date falls in.
const JOIN_YEAR: i32 = 2020;

/// Currency symbol prefixed to money amounts.
const CURRENCY: &str = "₦";

const ORGANIZATIONS: [&str; 5] = ["Lendsqr", "Irorun", "Lendstar", "Lendstack", "Lendflow"];
const GENDERS: [&str; 2] = ["Male", "Female"];
const MARITAL_STATUSES: [&str; 4] = ["Single", "Married", "Divorced", "Widowed"];
const EDUCATION_LEVELS: [&str; 5] = ["B.Sc", "M.Sc", "Ph.D", "HND", "OND"];
const EMPLOYMENT_SECTORS: [&str; 5] = [
    "FinTech",
    "Healthcare",
    "Education",
    "Technology",
    "Finance",
];
const RESIDENCE_TYPES: [&str; 4] = ["Own Apartment", "Parent's Apartment", "Rented", "Own House"];
const BANKS: [&str; 5] = [
    "Providus Bank",
    "Access Bank",
    "GT Bank",
    "Zenith Bank",
    "First Bank",
];
const RELATIONSHIPS: [&str; 2] = ["Sister", "Brother"];

/// A random source bound to a dataset size.
///
/// The store owns one of these and calls [`RecordGenerator::generate`] only
/// when no persisted dataset exists.
#[derive(Debug, Clone)]
pub struct RecordGenerator {
    rng: ChaCha8Rng,
    user_count: usize,
}

impl RecordGenerator {
    /// Creates a generator whose output is fully determined by `seed`.
    ///
    /// # Example
    ///
    /// ```
    /// use lending_mock::RecordGenerator;
    ///
    /// let first = RecordGenerator::seeded(7, 3).generate().expect("generated");
    /// let second = RecordGenerator::seeded(7, 3).generate().expect("generated");
    /// assert_eq!(first, second);
    /// ```
    #[must_use]
    pub fn seeded(seed: u64, user_count: usize) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            user_count,
        }
    }

    /// Creates a generator seeded from the thread-local entropy source.
    #[must_use]
    pub fn from_entropy(user_count: usize) -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
            user_count,
        }
    }

    /// Seeds from `seed` when given, otherwise from entropy.
    #[must_use]
    pub fn with_seed(seed: Option<u64>, user_count: usize) -> Self {
        seed.map_or_else(
            || Self::from_entropy(user_count),
            |value| Self::seeded(value, user_count),
        )
    }

    /// Returns the number of records each call to `generate` produces.
    #[must_use]
    pub const fn user_count(&self) -> usize {
        self.user_count
    }

    /// Generates a full dataset, advancing the internal RNG.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::IdGenerationExhausted`] if a unique id
    /// cannot be drawn.
    pub fn generate(&mut self) -> Result<Vec<UserRecord>, GenerationError> {
        generate_users(&mut self.rng, self.user_count)
    }
}

/// Generates `count` user records from the given random source.
///
/// Records are numbered from 1; the number appears in templated fields such
/// as `User{i} Last{i}`. Ids are checked for uniqueness within the batch and
/// redrawn on collision.
///
/// # Errors
///
/// Returns [`GenerationError::IdGenerationExhausted`] if an unused id cannot
/// be drawn within a bounded number of attempts.
///
/// # Example
///
/// ```
/// use lending_mock::generate_users;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(42);
/// let users = generate_users(&mut rng, 5).expect("generated");
///
/// assert_eq!(users.len(), 5);
/// assert_eq!(users[0].full_name, "User1 Last1");
/// ```
pub fn generate_users<R>(rng: &mut R, count: usize) -> Result<Vec<UserRecord>, GenerationError>
where
    R: Rng + ?Sized,
{
    let mut seen = HashSet::with_capacity(count);
    let mut users = Vec::with_capacity(count);

    for index in 1..=count {
        let id = claim_unique_id(&mut seen, || random_id(rng))?;
        users.push(generate_single_user(rng, index, id));
    }

    Ok(users)
}

/// Draws candidates until one is not yet in `seen`, then records it.
fn claim_unique_id<F>(seen: &mut HashSet<String>, mut candidate: F) -> Result<String, GenerationError>
where
    F: FnMut() -> String,
{
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = candidate();
        if seen.insert(id.clone()) {
            return Ok(id);
        }
    }

    Err(GenerationError::IdGenerationExhausted {
        max_attempts: MAX_ID_ATTEMPTS,
    })
}

fn random_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let token: String = (0..ID_TOKEN_LEN)
        .map(|_| char::from_digit(rng.random_range(0..36), 36).unwrap_or('0'))
        .collect();
    format!("{ID_PREFIX}{token}")
}

fn generate_single_user<R: Rng + ?Sized>(rng: &mut R, index: usize, id: String) -> UserRecord {
    let first_name = format!("User{index}");
    let last_name = format!("Last{index}");
    let full_name = format!("{first_name} {last_name}");
    let handle = format!(
        "@{}_{}",
        first_name.to_lowercase(),
        last_name.to_lowercase()
    );
    let email = format!(
        "{}@{}.com",
        first_name.to_lowercase(),
        pick(rng, &ORGANIZATIONS).to_lowercase()
    );

    UserRecord {
        id,
        organization: pick(rng, &ORGANIZATIONS).to_owned(),
        username: full_name.clone(),
        email: email.clone(),
        phone_number: prefixed_number(rng, "080"),
        date_joined: random_join_date(rng),
        status: UserStatus::ALL
            .choose(rng)
            .copied()
            .unwrap_or(UserStatus::Pending),
        full_name: full_name.clone(),
        bvn: prefixed_number(rng, "070"),
        gender: pick(rng, &GENDERS).to_owned(),
        marital_status: pick(rng, &MARITAL_STATUSES).to_owned(),
        children: if rng.random_ratio(1, 2) {
            "None".to_owned()
        } else {
            rng.random_range(1..=4_u8).to_string()
        },
        type_of_residence: pick(rng, &RESIDENCE_TYPES).to_owned(),
        level_of_education: pick(rng, &EDUCATION_LEVELS).to_owned(),
        employment_status: "Employed".to_owned(),
        sector_of_employment: pick(rng, &EMPLOYMENT_SECTORS).to_owned(),
        duration_of_employment: format!("{} years", rng.random_range(1..=10_u8)),
        office_email: email,
        monthly_income: format!(
            "{} - {}",
            money(rng.random_range(100_000..=999_999)),
            money(rng.random_range(100_000..=999_999))
        ),
        loan_repayment: group_thousands(rng.random_range(10_000..=109_999)),
        twitter: handle.clone(),
        facebook: full_name,
        instagram: handle,
        guarantors: vec![Guarantor {
            full_name: format!("Guarantor {index}"),
            phone_number: prefixed_number(rng, "081"),
            email_address: format!("guarantor{index}@email.com"),
            relationship: pick(rng, &RELATIONSHIPS).to_owned(),
        }],
        tier: rng.random_range(1..=3),
        account_balance: money(rng.random_range(50_000..=1_049_999)),
        account_number: rng
            .random_range(1_000_000_000..=9_999_999_999_u64)
            .to_string(),
        bank: pick(rng, &BANKS).to_owned(),
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, options: &[&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or_default()
}

/// A fixed three-digit prefix followed by eight random digits.
fn prefixed_number<R: Rng + ?Sized>(rng: &mut R, prefix: &str) -> String {
    format!("{prefix}{}", rng.random_range(10_000_000..=99_999_999_u32))
}

/// A random midnight in the join year, e.g. `Mar 5, 2020, 12:00 AM`.
fn random_join_date<R: Rng + ?Sized>(rng: &mut R) -> String {
    let month = rng.random_range(1..=12);
    let day = rng.random_range(1..=28);
    NaiveDate::from_ymd_opt(JOIN_YEAR, month, day)
        .map(|date| {
            date.and_time(NaiveTime::MIN)
                .format("%b %-d, %Y, %I:%M %p")
                .to_string()
        })
        .unwrap_or_default()
}

fn money(amount: u64) -> String {
    format!("{CURRENCY}{}.00", group_thousands(amount))
}

/// Formats `value` with comma thousands separators.
fn group_thousands(value: u64) -> String {
    let digits: Vec<char> = value.to_string().chars().collect();
    let groups: Vec<String> = digits
        .rchunks(3)
        .rev()
        .map(|group| group.iter().collect())
        .collect();
    groups.join(",")
}
