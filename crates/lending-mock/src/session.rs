//! Mock sign-in for the admin dashboard.
//!
//! Any well-formed email paired with a password of at least eight characters
//! is accepted. The session, a fixed admin profile derived from the email, is
//! persisted under [`AUTH_KEY`] until logout.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{SessionError, StoreError};
use crate::record::{UserRecord, UserStatus};
use crate::storage::KeyValueStorage;

/// Storage key holding the serialized session.
pub const AUTH_KEY: &str = "lendsqr_auth";

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN_LEN: usize = 8;

#[expect(clippy::expect_used, reason = "the pattern is a constant")]
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
});

/// Reason a login form was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email is not of the form `local@domain.tld`.
    InvalidEmail,
    /// Password is shorter than [`PASSWORD_MIN_LEN`].
    PasswordTooShort,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "Please enter a valid email address"),
            Self::PasswordTooShort => write!(
                f,
                "Password must be at least {PASSWORD_MIN_LEN} characters long"
            ),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login form values.
///
/// ## Invariants
/// - `email` has no whitespace, exactly one `@`-separated domain, and a dot
///   in the domain.
/// - `password` holds at least [`PASSWORD_MIN_LEN`] characters and is wiped
///   on drop.
///
/// # Examples
/// ```
/// use lending_mock::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada@lendsqr.com", "password1")
///     .expect("valid credentials");
/// assert_eq!(creds.email(), "ada@lendsqr.com");
/// assert_eq!(creds.local_part(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validates raw form inputs. The email is checked first.
    ///
    /// # Errors
    ///
    /// Returns the first [`LoginValidationError`] that applies.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        if !EMAIL_RE.is_match(email) {
            return Err(LoginValidationError::InvalidEmail);
        }
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(LoginValidationError::PasswordTooShort);
        }

        Ok(Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address as submitted.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password as submitted.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// The part of the email before `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.email
            .split_once('@')
            .map_or(self.email.as_str(), |(local, _)| local)
    }
}

/// A signed-in admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Profile shown in the dashboard header.
    pub user: UserRecord,
    /// Opaque token minted at login.
    pub token: Uuid,
}

impl Session {
    /// Builds the fixed admin profile for `credentials`.
    #[must_use]
    pub fn for_credentials(credentials: &LoginCredentials) -> Self {
        let email = credentials.email();
        let handle = credentials.local_part();

        let user = UserRecord {
            id: "1".to_owned(),
            organization: "Lendsqr".to_owned(),
            username: handle.to_owned(),
            email: email.to_owned(),
            phone_number: "08012345678".to_owned(),
            date_joined: "2020-01-01".to_owned(),
            status: UserStatus::Active,
            full_name: handle.to_owned(),
            bvn: "12345678901".to_owned(),
            gender: "Male".to_owned(),
            marital_status: "Single".to_owned(),
            children: "None".to_owned(),
            type_of_residence: "Own Apartment".to_owned(),
            level_of_education: "M.Sc".to_owned(),
            employment_status: "Employed".to_owned(),
            sector_of_employment: "FinTech".to_owned(),
            duration_of_employment: "5 years".to_owned(),
            office_email: email.to_owned(),
            monthly_income: "₦500,000.00 - ₦1,000,000.00".to_owned(),
            loan_repayment: "100,000".to_owned(),
            twitter: format!("@{handle}"),
            facebook: handle.to_owned(),
            instagram: format!("@{handle}"),
            guarantors: Vec::new(),
            tier: 3,
            account_balance: "₦500,000.00".to_owned(),
            account_number: "1234567890".to_owned(),
            bank: "Providus Bank".to_owned(),
        };

        Self {
            user,
            token: Uuid::new_v4(),
        }
    }
}

/// Persists the signed-in session in a [`KeyValueStorage`].
#[derive(Debug, Clone)]
pub struct SessionGuard<S> {
    storage: S,
}

impl<S> SessionGuard<S> {
    /// Creates a guard over `storage`.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }
}

impl<S: KeyValueStorage> SessionGuard<S> {
    /// Validates the form and, if accepted, persists a new session.
    ///
    /// A new login replaces any existing session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Invalid`] with the user-facing reason, or
    /// [`SessionError::Store`] if the session cannot be written.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let credentials = LoginCredentials::try_from_parts(email, password).inspect_err(|err| {
            warn!(reason = %err, "login rejected");
        })?;

        let session = Session::for_credentials(&credentials);
        let json = serde_json::to_string(&session).map_err(|err| StoreError::Serialize {
            key: AUTH_KEY.to_owned(),
            message: err.to_string(),
        })?;
        self.storage.set_item(AUTH_KEY, &json)?;
        info!(username = %session.user.username, "login accepted");
        Ok(session)
    }

    /// Ends the current session. Logging out twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the key cannot be removed.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.storage.remove_item(AUTH_KEY)?;
        info!("logged out");
        Ok(())
    }

    /// Returns the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the stored session is unreadable.
    pub fn current(&self) -> Result<Option<Session>, SessionError> {
        let Some(json) = self.storage.get_item(AUTH_KEY)? else {
            return Ok(None);
        };
        let session = serde_json::from_str(&json).map_err(|err| StoreError::Corrupt {
            key: AUTH_KEY.to_owned(),
            message: err.to_string(),
        })?;
        Ok(Some(session))
    }

    /// Returns `true` while a session is persisted.
    ///
    /// # Errors
    ///
    /// See [`SessionGuard::current`].
    pub fn is_authenticated(&self) -> Result<bool, SessionError> {
        Ok(self.current()?.is_some())
    }
}
