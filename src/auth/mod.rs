//! Credential verification.
//!
//! Tokens are issued elsewhere (login/register flows are not part of this
//! crate); here we only check that a presented bearer token is authentic and
//! extract the owner identity it carries.
//!
//! Wire format: `<owner-uuid>.<expiry-unix-secs>.<hex(hmac-sha256(key, payload))>`
//! where payload is the first two segments joined by `.`.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::OwnerId;

type HmacSha256 = Hmac<Sha256>;

/// The verified identity extracted from a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub owner_id: OwnerId,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no credential provided")]
    MissingToken,

    #[error("credential is malformed")]
    Malformed,

    #[error("credential has expired")]
    Expired,

    #[error("credential signature verification failed")]
    BadSignature,
}

/// Validates a credential and yields the owner identity it proves.
/// Implementations must be pure with respect to the ledger.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: Option<&str>) -> Result<Identity, AuthError>;
}

/// Verifier for HMAC-SHA256 signed bearer tokens.
pub struct HmacTokenVerifier {
    key: Vec<u8>,
}

impl HmacTokenVerifier {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }
}

impl IdentityVerifier for HmacTokenVerifier {
    fn verify(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;

        let mut segments = token.split('.');
        let (owner_str, expiry_str, tag_hex) =
            match (segments.next(), segments.next(), segments.next()) {
                (Some(owner), Some(expiry), Some(tag)) if segments.next().is_none() => {
                    (owner, expiry, tag)
                }
                _ => return Err(AuthError::Malformed),
            };

        let owner_id = Uuid::parse_str(owner_str).map_err(|_| AuthError::Malformed)?;
        let expiry_secs: i64 = expiry_str.parse().map_err(|_| AuthError::Malformed)?;
        let tag = hex::decode(tag_hex).map_err(|_| AuthError::Malformed)?;

        // Authenticate the payload before trusting anything in it
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC key size is always valid");
        mac.update(owner_str.as_bytes());
        mac.update(b".");
        mac.update(expiry_str.as_bytes());
        mac.verify_slice(&tag)
            .map_err(|_| AuthError::BadSignature)?;

        if expiry_secs < Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }

        Ok(Identity { owner_id })
    }
}

/// Sign a token for `owner_id` valid until `expires_at`.
/// This is the issuer's side of the contract; the service itself never calls
/// it outside of local token minting and tests.
pub fn sign_token(key: &[u8], owner_id: OwnerId, expires_at: DateTime<Utc>) -> String {
    let payload = format!("{}.{}", owner_id, expires_at.timestamp());

    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC key size is always valid");
    mac.update(payload.as_bytes());
    let tag = mac.finalize().into_bytes();

    format!("{}.{}", payload, hex::encode(tag))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    const KEY: &[u8] = b"test-signing-key";

    fn valid_token(owner: OwnerId) -> String {
        sign_token(KEY, owner, Utc::now() + Duration::hours(1))
    }

    #[test]
    fn test_verify_valid_token() {
        let owner = Uuid::new_v4();
        let verifier = HmacTokenVerifier::new(KEY);

        let identity = verifier.verify(Some(&valid_token(owner))).unwrap();
        assert_eq!(identity.owner_id, owner);
    }

    #[test]
    fn test_missing_token() {
        let verifier = HmacTokenVerifier::new(KEY);
        assert_eq!(verifier.verify(None), Err(AuthError::MissingToken));
    }

    #[test]
    fn test_malformed_token() {
        let verifier = HmacTokenVerifier::new(KEY);
        assert_eq!(verifier.verify(Some("garbage")), Err(AuthError::Malformed));
        assert_eq!(
            verifier.verify(Some("not-a-uuid.123.abcd")),
            Err(AuthError::Malformed)
        );
        assert_eq!(
            verifier.verify(Some("a.b.c.d")),
            Err(AuthError::Malformed)
        );
    }

    #[test]
    fn test_expired_token() {
        let owner = Uuid::new_v4();
        let verifier = HmacTokenVerifier::new(KEY);
        let token = sign_token(KEY, owner, Utc::now() - Duration::hours(1));

        assert_eq!(verifier.verify(Some(&token)), Err(AuthError::Expired));
    }

    #[test]
    fn test_tampered_token() {
        let owner = Uuid::new_v4();
        let verifier = HmacTokenVerifier::new(KEY);

        // Swap the owner segment for another user, keeping the original tag
        let token = valid_token(owner);
        let tampered = format!(
            "{}.{}",
            Uuid::new_v4(),
            token.split_once('.').unwrap().1
        );

        assert_eq!(
            verifier.verify(Some(&tampered)),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_wrong_key() {
        let owner = Uuid::new_v4();
        let token = valid_token(owner);
        let verifier = HmacTokenVerifier::new(b"another-key".to_vec());

        assert_eq!(
            verifier.verify(Some(&token)),
            Err(AuthError::BadSignature)
        );
    }
}
