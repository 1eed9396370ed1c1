//! Development identity verifier backed by a fixed token table.
//!
//! Tokens are configured as `token=uid[:admin]` entries separated by commas.
//! Each entry also describes the user profile to seed, so a fresh server can
//! be driven end to end without an external identity service.

use crate::domain::ConfigError;
use crate::ports::{IdentityError, IdentityVerifier, VerifiedToken};
use async_trait::async_trait;
use nhd_store::User;
use tracing::debug;

/// One configured bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticToken {
    pub token: String,
    pub uid: String,
    pub is_admin: bool,
}

impl StaticToken {
    /// Profile to seed into the store for this token's subject.
    pub fn user(&self) -> User {
        User::new(self.uid.clone(), self.is_admin)
    }
}

/// Parse `token=uid[:admin],...`. Blank input yields an empty table.
pub fn parse_static_tokens(raw: &str) -> Result<Vec<StaticToken>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (token, subject) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::Invalid(format!("static token {entry:?}: missing '='")))?;
            let (uid, is_admin) = match subject.split_once(':') {
                Some((uid, "admin")) => (uid, true),
                Some((_, role)) => {
                    return Err(ConfigError::Invalid(format!(
                        "static token {entry:?}: unknown role {role:?}"
                    )))
                }
                None => (subject, false),
            };
            if token.is_empty() || token.contains(' ') || uid.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "static token {entry:?}: token and uid must be non-empty"
                )));
            }
            Ok(StaticToken {
                token: token.to_string(),
                uid: uid.to_string(),
                is_admin,
            })
        })
        .collect()
}

/// `IdentityVerifier` that accepts only the configured tokens.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: Vec<StaticToken>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: Vec<StaticToken>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[StaticToken] {
        &self.tokens
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify_token(&self, token: &str) -> Result<VerifiedToken, IdentityError> {
        // Compare against every entry so timing does not reveal the match position.
        let mut matched = None;
        for entry in &self.tokens {
            if constant_time_compare(token, &entry.token) && matched.is_none() {
                matched = Some(entry.uid.clone());
            }
        }

        match matched {
            Some(uid) => Ok(VerifiedToken { uid }),
            None => {
                debug!("static token rejected");
                Err(IdentityError::InvalidToken)
            }
        }
    }
}

/// Constant-time string comparison to prevent timing attacks
///
/// Lengths are compared in constant time as well; both inputs are padded to
/// the longer length with different fill bytes.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = std::cmp::max(a.len(), b.len());

    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];

    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}
