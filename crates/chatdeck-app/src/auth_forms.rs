//! Login and registration forms.
//!
//! Forms validate locally before any request is made. A successful login
//! stores the token and publishes `Authenticated`. Registration is followed
//! by a login with the same credentials unless the backend already issued a
//! token.

use tracing::{debug, info};

use chatdeck_client::ApiError;
use chatdeck_core::{AuthStatus, AuthToken, Credentials, Registration, StorageError};

use crate::context::AppContext;

/// Local validation failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("username is required")]
    MissingUsername,
    #[error("password is required")]
    MissingPassword,
    #[error("e-mail address is required")]
    MissingEmail,
    #[error("e-mail address looks invalid")]
    InvalidEmail,
    #[error("passwords do not match")]
    PasswordMismatch,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
    #[error("could not store token: {0}")]
    Storage(#[from] StorageError),
}

// ─────────────────────────────────────────────
// Forms
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<Credentials, FormError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(FormError::MissingUsername);
        }
        if self.password.is_empty() {
            return Err(FormError::MissingPassword);
        }
        Ok(Credentials::new(username, self.password.clone()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Repeated password. `None` skips the check.
    pub confirm_password: Option<String>,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, FormError> {
        let credentials = LoginForm::new(self.username.clone(), self.password.clone()).validate()?;

        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::MissingEmail);
        }
        if !looks_like_email(email) {
            return Err(FormError::InvalidEmail);
        }
        if let Some(confirm) = &self.confirm_password {
            if *confirm != self.password {
                return Err(FormError::PasswordMismatch);
            }
        }

        Ok(Registration {
            credentials,
            email: email.to_string(),
        })
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

// ─────────────────────────────────────────────
// Submission
// ─────────────────────────────────────────────

/// Validate, log in, persist the token and publish the new status.
pub async fn submit_login(ctx: &AppContext, form: &LoginForm) -> Result<(), AuthError> {
    let credentials = form.validate()?;
    let token = ctx.api().login(&credentials).await?;
    sign_in(ctx, &token, credentials.username)
}

/// Validate, register, then sign in.
pub async fn submit_register(ctx: &AppContext, form: &RegisterForm) -> Result<(), AuthError> {
    let registration = form.validate()?;
    let issued = ctx.api().register(&registration).await?;
    info!(username = %registration.credentials.username, "account registered");

    let token = match issued {
        Some(token) => token,
        None => {
            debug!("registration issued no token, logging in");
            ctx.api().login(&registration.credentials).await?
        }
    };
    sign_in(ctx, &token, registration.credentials.username)
}

fn sign_in(ctx: &AppContext, token: &AuthToken, username: String) -> Result<(), AuthError> {
    ctx.store_token(token)?;
    ctx.auth().set(AuthStatus::Authenticated {
        username: Some(username),
    });
    Ok(())
}
