//! Account store and sessions. Stands in for the hosted auth provider:
//! sign-up, sign-in with argon2 verification, bearer-token sessions.

use crate::errors::AuthError;
use crate::models::{Account, AppData, Profile};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::password_hash::rand_core::OsRng;
use argon2::Argon2;
use chrono::{DateTime, Utc};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::Hash)
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Just enough structure to reject obvious typos; real deliverability is
/// the mail system's problem.
fn validate_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_ascii_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::MalformedEmail);
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AuthError::MalformedEmail);
    }
    Ok(email)
}

/// Creates the account, its initial profile (preferences empty, filled in
/// by onboarding) and a session, all in the caller's working copy.
pub fn sign_up(
    data: &mut AppData,
    email: &str,
    password: &str,
    full_name: &str,
    now: DateTime<Utc>,
) -> Result<(Uuid, Uuid), AuthError> {
    let email = validate_email(email)?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    if data.accounts.values().any(|account| account.email == email) {
        return Err(AuthError::DuplicateEmail);
    }

    let user_id = Uuid::new_v4();
    let password_hash = hash_password(password)?;
    data.accounts.insert(
        user_id,
        Account {
            id: user_id,
            email: email.clone(),
            full_name: full_name.trim().to_string(),
            password_hash,
            created_at: now,
        },
    );
    data.profiles.insert(
        user_id,
        Profile {
            id: user_id,
            email,
            full_name: full_name.trim().to_string(),
            age_bracket: None,
            main_goal: None,
            activity_level: None,
            skin_type: None,
            created_at: now,
            updated_at: now,
        },
    );

    let token = open_session(data, user_id);
    Ok((token, user_id))
}

pub fn sign_in(data: &mut AppData, email: &str, password: &str) -> Result<(Uuid, Uuid), AuthError> {
    let email = email.trim().to_ascii_lowercase();
    // Unknown email and wrong password are indistinguishable to the caller.
    let account = data
        .accounts
        .values()
        .find(|account| account.email == email)
        .ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(&account.password_hash, password) {
        return Err(AuthError::InvalidCredentials);
    }

    let user_id = account.id;
    let token = open_session(data, user_id);
    Ok((token, user_id))
}

pub fn sign_out(data: &mut AppData, token: Uuid) {
    data.sessions.remove(&token);
}

pub fn current_user(data: &AppData, token: Uuid) -> Option<Uuid> {
    data.sessions.get(&token).copied()
}

fn open_session(data: &mut AppData, user_id: Uuid) -> Uuid {
    let token = Uuid::new_v4();
    data.sessions.insert(token, user_id);
    token
}
