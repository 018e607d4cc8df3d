//! Sign-up and sign-in flows.
//!
//! These tie the auth endpoints to the [`Session`]: a successful login stores
//! the profile and token, registration validates the form before any call.

use secrecy::{ExposeSecret, SecretString};
use stockroom_core::{Email, ValidationErrors};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, GatewayError, NewUser, UserProfile};
use crate::session::{Session, SessionError};
use crate::storage::KeyValueStorage;

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;
const MIN_AGE: u32 = 18;
const MAX_AGE: u32 = 100;

/// Errors from the account flows.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Authentication failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Sign-up form as entered by the user.
#[derive(Debug)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub age: u32,
    pub gender: String,
    /// Avatar URL; a generated one is used when empty.
    pub image: Option<String>,
}

impl Default for Registration {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            username: String::new(),
            email: String::new(),
            password: SecretString::from(""),
            confirm_password: SecretString::from(""),
            age: 0,
            gender: String::new(),
            image: None,
        }
    }
}

impl Registration {
    /// Check every field and build the registration request.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn validate(&self) -> Result<NewUser, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.first_name.trim().is_empty() {
            errors.push("firstName", "First name is required");
        }
        if self.last_name.trim().is_empty() {
            errors.push("lastName", "Last name is required");
        }

        let username = self.username.trim();
        if username.is_empty() {
            errors.push("username", "Username is required");
        } else if username.chars().count() < MIN_USERNAME_LEN {
            errors.push("username", "Username must be at least 3 characters");
        }

        let email = Email::parse(&self.email);
        if let Err(e) = &email {
            errors.push("email", format!("Invalid email: {e}"));
        }

        let password = self.password.expose_secret();
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push("password", "Password must be at least 6 characters");
        } else if !is_strong(password) {
            errors.push(
                "password",
                "Password must contain an uppercase letter, a lowercase letter and a number",
            );
        }
        if password != self.confirm_password.expose_secret() {
            errors.push("confirmPassword", "Passwords do not match");
        }

        let age = u8::try_from(self.age)
            .ok()
            .filter(|_| (MIN_AGE..=MAX_AGE).contains(&self.age));
        if age.is_none() {
            errors.push("age", "Age must be between 18 and 100");
        }

        if self.gender.trim().is_empty() {
            errors.push("gender", "Gender is required");
        }

        errors.into_result()?;

        let (Ok(email), Some(age)) = (email, age) else {
            return Err(ValidationErrors::new());
        };
        Ok(NewUser {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            username: username.to_owned(),
            email: email.as_str().to_owned(),
            password: password.to_owned(),
            age,
            gender: self.gender.trim().to_owned(),
            image: self
                .image
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map_or_else(|| default_avatar(username), str::to_owned),
        })
    }
}

fn is_strong(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Generated avatar for users who did not pick one.
#[must_use]
pub fn default_avatar(username: &str) -> String {
    format!("https://i.pravatar.cc/150?u={username}")
}

/// Outcome of [`register_and_login`].
#[derive(Debug, Clone, PartialEq)]
pub enum Registered {
    /// The account was created and the session now holds it.
    LoggedIn(UserProfile),
    /// The account was created but signing in failed; the user has to log in
    /// manually.
    RegisteredOnly(UserProfile),
}

/// Sign in and store the result in `session`.
///
/// # Errors
///
/// Returns the gateway error for rejected credentials and a session error if
/// the credentials cannot be persisted.
#[instrument(skip(api, session, password))]
pub async fn login<S: KeyValueStorage>(
    api: &ApiClient,
    session: &mut Session<S>,
    username: &str,
    password: &SecretString,
) -> Result<UserProfile, AccountError> {
    let login = api.login(username.trim(), password).await?;
    let user = login.user.clone();
    session.set_credentials(login.user, login.tokens.access_token)?;
    info!(username = %user.username, "logged in");
    Ok(user)
}

/// Validate the form, create the account, then try to sign in with it.
///
/// # Errors
///
/// Returns [`AccountError::Validation`] before any call for a bad form and
/// the gateway error if registration is rejected. A failed sign-in after a
/// successful registration is not an error.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn register_and_login<S: KeyValueStorage>(
    api: &ApiClient,
    session: &mut Session<S>,
    form: &Registration,
) -> Result<Registered, AccountError> {
    let new_user = form.validate()?;
    let created = api.register(&new_user).await?;
    info!(id = %created.id, "account registered");

    match login(api, session, &new_user.username, &form.password).await {
        Ok(user) => Ok(Registered::LoggedIn(user)),
        Err(e) => {
            warn!(error = %e, "sign-in after registration failed");
            Ok(Registered::RegisteredOnly(created))
        }
    }
}
