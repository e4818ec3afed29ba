use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use argon2::password_hash::{PasswordHash, PasswordVerifier};
use argon2::Argon2;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ServerConfig;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub role: String,
    pub iat: u64,
    pub exp: u64,
}

/// Who a verified token belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub role: String,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    InvalidToken,
    /// Admin username, password hash or signing secret is missing.
    NotConfigured,
    Signing(jsonwebtoken::errors::Error),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidCredentials => f.write_str("Invalid username or password"),
            AuthError::InvalidToken => f.write_str("Session invalid or expired"),
            AuthError::NotConfigured => f.write_str("Server configuration error"),
            AuthError::Signing(err) => write!(f, "token signing failed: {}", err),
        }
    }
}

impl std::error::Error for AuthError {}

struct AdminCredentials {
    username: String,
    password_hash: String,
    secret: Vec<u8>,
}

/// Single-admin authentication: one configured account, stateless HS256
/// tokens.
#[derive(Clone)]
pub struct AdminAuth {
    credentials: Arc<AdminCredentials>,
    token_ttl: Duration,
}

impl AdminAuth {
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        secret: impl Into<Vec<u8>>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            credentials: Arc::new(AdminCredentials {
                username: username.into(),
                password_hash: password_hash.into(),
                secret: secret.into(),
            }),
            token_ttl,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.admin_username.trim(),
            config.admin_password_hash.trim(),
            config.jwt_secret.as_bytes(),
            Duration::from_secs(config.token_ttl_secs),
        )
    }

    pub fn is_configured(&self) -> bool {
        !self.credentials.username.is_empty()
            && !self.credentials.password_hash.is_empty()
            && !self.credentials.secret.is_empty()
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Checks the pair against the configured admin and issues a token.
    /// Both the username and the password are always checked so a wrong
    /// username is indistinguishable from a wrong password.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        if !self.is_configured() {
            return Err(AuthError::NotConfigured);
        }
        let username_ok = username == self.credentials.username;
        let password_ok = verify_password(password, &self.credentials.password_hash);
        if !(username_ok && password_ok) {
            return Err(AuthError::InvalidCredentials);
        }

        let iat = now_secs();
        let expires_at = iat + self.token_ttl.as_secs();
        let claims = Claims {
            username: self.credentials.username.clone(),
            role: ADMIN_ROLE.to_string(),
            iat,
            exp: expires_at,
        };
        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_at,
        })
    }

    /// Validates signature and expiry. The role is returned as is; callers
    /// decide what a non-admin role means.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if self.credentials.secret.is_empty() {
            return Err(AuthError::NotConfigured);
        }
        let key = DecodingKey::from_secret(&self.credentials.secret);
        let data = decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))
            .map_err(|_| AuthError::InvalidToken)?;
        Ok(Identity {
            username: data.claims.username,
            role: data.claims.role,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        let key = EncodingKey::from_secret(&self.credentials.secret);
        encode(&Header::new(Algorithm::HS256), claims, &key).map_err(AuthError::Signing)
    }
}

fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("Configured admin password hash is not a valid PHC string: {}", err);
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    use argon2::password_hash::{PasswordHasher, SaltString};
    use argon2::Argon2;
    use rand_core::OsRng;

    use super::AdminAuth;

    pub const USERNAME: &str = "admin";
    pub const PASSWORD: &str = "correct horse";

    pub fn hash(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    pub fn admin_auth() -> AdminAuth {
        AdminAuth::new(USERNAME, hash(PASSWORD), "test-secret", Duration::from_secs(3600))
    }
}
