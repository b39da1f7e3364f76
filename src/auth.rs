/// Credential check against stored users.
///
/// A [`Principal`] can only be obtained through [`authenticate`], and every
/// mutating service call takes one, so nothing reaches the entry pipeline
/// without passing this gate first.
use anyhow::Result;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Reject, TimesheetError};
use crate::store::UserStore;
use crate::types::{User, UserId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    name: String,
    email: String,
}

impl Principal {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Display name, the email when the user has no name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

pub fn authenticate<U: UserStore + ?Sized>(
    users: &U,
    email: &str,
    password: &str,
) -> Result<Option<Principal>> {
    if email.is_empty() || password.is_empty() {
        return Ok(None);
    }
    let Some(user) = users.find_user_by_email(email)? else {
        debug!(email, "login for unknown user");
        return Ok(None);
    };
    if user.password_hash != hash_password(password) {
        debug!(email, "login with wrong password");
        return Ok(None);
    }
    Ok(Some(Principal {
        user_id: user.id,
        name: user.name.unwrap_or_else(|| user.email.clone()),
        email: user.email,
    }))
}

pub fn register_user<U: UserStore + ?Sized>(
    users: &U,
    email: &str,
    name: Option<String>,
    password: &str,
) -> Result<User, TimesheetError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(Reject::invalid("email", format!("'{email}' is not an email address")).into());
    }
    if password.is_empty() {
        return Err(Reject::invalid("password", "a password is required").into());
    }
    if users.find_user_by_email(email)?.is_some() {
        return Err(Reject::invalid("email", format!("{email} is already registered")).into());
    }
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        name: name.filter(|n| !n.trim().is_empty()),
        password_hash: hash_password(password),
    };
    users.save_user(&user)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}
