//! Authentication primitives: login credentials and registration input.
//!
//! Handlers build these from raw strings before talking to the account
//! service, so the service only ever sees validated input. Passwords are held
//! in [`Zeroizing`] buffers and wiped on drop.

use std::fmt;

use zeroize::Zeroizing;

use super::{Email, UserValidationError};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length accepted at registration.
pub const PASSWORD_MAX: usize = 128;

/// Errors raised while validating credential payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// The email address is malformed.
    InvalidEmail,
    /// The password was blank.
    EmptyPassword,
    /// The password is outside the accepted length range.
    WeakPassword { min: usize, max: usize },
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::WeakPassword { min, max } => {
                write!(f, "password must be between {min} and {max} characters")
            }
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(_: UserValidationError) -> Self {
        Self::InvalidEmail
    }
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use anitrack::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.com", "hunter22").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs; the password only has to be
    /// non-empty here because length rules apply at registration.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password as supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    credentials: LoginCredentials,
    nickname: Option<String>,
}

impl Registration {
    /// Validate registration input, enforcing password length bounds.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        nickname: Option<String>,
    ) -> Result<Self, CredentialsValidationError> {
        let credentials = LoginCredentials::try_from_parts(email, password)?;
        let length = password.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(CredentialsValidationError::WeakPassword {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self {
            credentials,
            nickname,
        })
    }

    /// Login part of the registration.
    pub fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }

    /// Optional initial nickname; validated by the profile rules on save.
    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }
}
