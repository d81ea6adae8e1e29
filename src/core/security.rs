use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum SecurityError {
    #[error("could not hash password")]
    PasswordHash,
    #[error("could not verify password")]
    PasswordVerify,
    #[error("token could not be issued")]
    TokenIssue,
    #[error("token is invalid or expired")]
    TokenInvalid,
    #[error("jwt algorithm {0:?} is not supported")]
    Algorithm(String),
}

/// Bearer token payload: the user id plus a unix expiry timestamp.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) exp: i64,
}

// argon2id, ~100 MiB memory cost, matches the hashes already in the database.
fn hasher() -> Result<Argon2<'static>, argon2::Error> {
    let params = argon2::Params::new(102_400, 2, 8, None)?;
    Ok(Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params))
}

pub(crate) fn hash_password(password: &str) -> Result<String, SecurityError> {
    let argon2 = hasher().map_err(|_| SecurityError::PasswordHash)?;
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| SecurityError::PasswordHash)
}

/// Ok(false) means a well-formed hash that does not match; anything else
/// malformed is an error.
pub(crate) fn verify_password(password: &str, hash: &str) -> Result<bool, SecurityError> {
    let argon2 = hasher().map_err(|_| SecurityError::PasswordVerify)?;
    let parsed = PasswordHash::new(hash).map_err(|_| SecurityError::PasswordVerify)?;

    match argon2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(_) => Err(SecurityError::PasswordVerify),
    }
}

pub(crate) fn create_access_token(
    subject: &str,
    settings: &Settings,
    lifetime: Option<Duration>,
) -> Result<String, SecurityError> {
    let security = settings.security();
    let algorithm = resolve_algorithm(&security.algorithm)?;

    let lifetime = lifetime
        .unwrap_or_else(|| Duration::minutes(security.access_token_expire_minutes as i64));
    let claims = Claims {
        sub: subject.to_string(),
        exp: (OffsetDateTime::now_utc() + lifetime).unix_timestamp(),
    };

    encode(
        &jsonwebtoken::Header::new(algorithm),
        &claims,
        &EncodingKey::from_secret(security.secret_key.as_bytes()),
    )
    .map_err(|_| SecurityError::TokenIssue)
}

pub(crate) fn verify_token(token: &str, settings: &Settings) -> Result<Claims, SecurityError> {
    let security = settings.security();

    let mut validation = Validation::new(resolve_algorithm(&security.algorithm)?);
    validation.validate_exp = true;
    validation.required_spec_claims.insert("exp".to_string());
    validation.required_spec_claims.insert("sub".to_string());

    let key = DecodingKey::from_secret(security.secret_key.as_bytes());
    let data = decode::<Claims>(token, &key, &validation).map_err(|_| SecurityError::TokenInvalid)?;

    Ok(data.claims)
}

fn resolve_algorithm(name: &str) -> Result<Algorithm, SecurityError> {
    match name {
        "HS256" => Ok(Algorithm::HS256),
        other => Err(SecurityError::Algorithm(other.to_string())),
    }
}
