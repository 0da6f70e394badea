//! Login flow

use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::{TrackerError, TrackerResult},
    forms::LoginForm,
    models::UserAccount,
    repositories::UserRepository,
};

/// The one message for every rejected credential
pub const INVALID_CREDENTIALS: &str = "user/pw invalid.";

/// Checks submitted credentials against stored accounts
#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Resolve the account for a login form.
    ///
    /// Empty fields fail validation. An unknown username and a wrong password
    /// both fail with the same [`TrackerError::AuthenticationFailure`].
    pub async fn login(&self, form: &LoginForm) -> TrackerResult<UserAccount> {
        form.validate()?;

        let username = form.username.trim();
        match self.users.find_by_username(username).await? {
            Some(user) if user.verify_password(&form.password) => {
                info!("User {} logged in", user.username);
                Ok(user)
            }
            _ => {
                warn!("Rejected login attempt for {}", username);
                Err(TrackerError::AuthenticationFailure)
            }
        }
    }
}
