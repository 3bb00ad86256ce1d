use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use base64::{URL_SAFE_NO_PAD, encode_config};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use std::collections::HashMap;
use std::sync::Mutex;

pub const WIDGET_TOKEN_PREFIX: &str = "fp_";
const WIDGET_TOKEN_LEN: usize = 16;
const SESSION_TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("failed to generate token")]
    Token,
    #[error("session lifetime {0} reaches past the supported date range")]
    TtlOutOfRange(Duration),
}

#[derive(Debug, Clone)]
struct Session {
    user_id: String,
    expires_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

/// Bearer sessions keyed by token. Expired entries stay until someone looks
/// them up.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn issue(
        &self,
        user_id: &str,
        now: OffsetDateTime,
        ttl: Duration,
    ) -> Result<IssuedSession, AuthError> {
        let mut rng = OsRng;
        self.issue_with_rng(&mut rng, user_id, now, ttl)
    }

    pub(crate) fn issue_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        user_id: &str,
        now: OffsetDateTime,
        ttl: Duration,
    ) -> Result<IssuedSession, AuthError> {
        let expires_at = now
            .checked_add(ttl)
            .ok_or(AuthError::TtlOutOfRange(ttl))?;
        let token = generate_session_token_with_rng(rng)?;
        let mut sessions = self.sessions.lock().expect("sessions lock");
        sessions.insert(
            token.clone(),
            Session {
                user_id: user_id.to_string(),
                expires_at,
            },
        );
        Ok(IssuedSession { token, expires_at })
    }

    /// Returns the session's user id, or `None` for unknown tokens. An expired
    /// session is removed on the way out.
    pub fn validate(&self, token: &str, now: OffsetDateTime) -> Option<String> {
        let mut sessions = self.sessions.lock().expect("sessions lock");
        let session = sessions.get(token)?;
        if session.expires_at < now {
            sessions.remove(token);
            return None;
        }
        Some(session.user_id.clone())
    }

    pub fn revoke(&self, token: &str) -> bool {
        let mut sessions = self.sessions.lock().expect("sessions lock");
        sessions.remove(token).is_some()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.sessions.lock().expect("sessions lock").contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("sessions lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|err| AuthError::Hash(err.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hash(err.to_string()))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let hash = match PasswordHash::new(password_hash) {
        Ok(hash) => hash,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
}

/// Extracts the token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

pub(crate) fn generate_session_token_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<String, AuthError> {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rng.fill_bytes(&mut bytes);
    let encoded = encode_config(bytes, URL_SAFE_NO_PAD);
    if encoded.is_empty() {
        return Err(AuthError::Token);
    }
    Ok(encoded)
}

pub fn generate_widget_token() -> String {
    let mut rng = OsRng;
    generate_widget_token_with_rng(&mut rng)
}

pub(crate) fn generate_widget_token_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    let suffix: String = rng
        .sample_iter(&Alphanumeric)
        .take(WIDGET_TOKEN_LEN)
        .map(char::from)
        .collect();
    format!("{WIDGET_TOKEN_PREFIX}{}", suffix.to_ascii_lowercase())
}

/// Human readable session lifetime, e.g. `30 days`.
pub fn describe_ttl(ttl: Duration) -> String {
    let (amount, unit) = if ttl.whole_days() > 0 && ttl == Duration::days(ttl.whole_days()) {
        (ttl.whole_days(), "day")
    } else if ttl.whole_hours() > 0 && ttl == Duration::hours(ttl.whole_hours()) {
        (ttl.whole_hours(), "hour")
    } else if ttl.whole_minutes() > 0 && ttl == Duration::minutes(ttl.whole_minutes()) {
        (ttl.whole_minutes(), "minute")
    } else {
        (ttl.whole_seconds(), "second")
    };
    if amount == 1 {
        format!("1 {unit}")
    } else {
        format!("{amount} {unit}s")
    }
}
