//! JWT token issuance and validation.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use fleetwatch_core::db::unix_timestamp;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::AuthError;
use super::claims::{Claims, Identity, Role};

/// Signs and verifies bearer tokens with a single process-wide secret.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl JwtManager {
    /// Create a new `JwtManager` with the given secret and token lifetime.
    pub fn new(secret: &[u8], ttl_secs: i64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Signing("signing secret is empty".into()));
        }
        if ttl_secs <= 0 {
            return Err(AuthError::Signing(format!(
                "token TTL must be positive, got {ttl_secs}"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
        })
    }

    /// Generate a random 256-bit secret for deployments that configure none.
    pub fn generate_secret() -> [u8; 32] {
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        secret
    }

    pub const fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a token for the given subject, valid from now for the TTL.
    pub fn issue(&self, subject: &str, role: Role) -> Result<String, AuthError> {
        self.issue_at(subject, role, unix_timestamp())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, subject: &str, role: Role, now: i64) -> Result<String, AuthError> {
        let claims = Claims {
            jti: uuid::Uuid::new_v4().to_string(),
            sub: subject.to_string(),
            role,
            iat: now,
            exp: now + self.ttl_secs,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Validate a token and return the identity it carries.
    ///
    /// Rejects bad signatures, malformed encodings, unknown roles and
    /// tokens whose `exp` has passed.
    pub fn validate(&self, token: &str) -> Result<Identity, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(data.claims.into())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const TTL: i64 = 3600;

    fn test_jwt() -> JwtManager {
        JwtManager::new(b"test-secret-key-for-testing", TTL).unwrap()
    }

    #[test]
    fn issue_and_validate() {
        let jwt = test_jwt();
        let token = jwt.issue("alice", Role::Admin).unwrap();

        let identity = jwt.validate(&token).unwrap();
        assert_eq!(identity.subject, "alice");
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn each_issue_produces_a_distinct_token() {
        let jwt = test_jwt();
        let t1 = jwt.issue("alice", Role::User).unwrap();
        let t2 = jwt.issue("alice", Role::User).unwrap();
        assert_ne!(t1, t2);
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = test_jwt();
        let token = jwt
            .issue_at("alice", Role::User, unix_timestamp() - 2 * TTL)
            .unwrap();

        let err = jwt.validate(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn token_issued_shortly_before_ttl_is_still_valid() {
        let jwt = test_jwt();
        let token = jwt
            .issue_at("alice", Role::User, unix_timestamp() - TTL + 60)
            .unwrap();
        assert!(jwt.validate(&token).is_ok());
    }

    #[test]
    fn invalid_token_fails_validation() {
        let jwt = test_jwt();
        assert!(matches!(
            jwt.validate("not-a-valid-token"),
            Err(AuthError::InvalidToken(_))
        ));
        assert!(jwt.validate("").is_err());
    }

    #[test]
    fn wrong_secret_fails_validation() {
        let jwt1 = test_jwt();
        let jwt2 = JwtManager::new(b"different-secret", TTL).unwrap();

        let token = jwt1.issue("alice", Role::Admin).unwrap();
        assert!(matches!(
            jwt2.validate(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn tampering_any_byte_invalidates_the_token() {
        let jwt = test_jwt();
        let token = jwt.issue("alice", Role::User).unwrap();

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(
                jwt.validate(&tampered).is_err(),
                "tampered byte {i} was accepted"
            );
        }
    }

    #[test]
    fn forged_role_claim_is_rejected() {
        let jwt = test_jwt();
        let user_token = jwt.issue("mallory", Role::User).unwrap();
        let admin_token = jwt.issue("mallory", Role::Admin).unwrap();

        // Splice the admin payload onto the user token's signature.
        let user_parts: Vec<&str> = user_token.split('.').collect();
        let admin_parts: Vec<&str> = admin_token.split('.').collect();
        let forged = format!("{}.{}.{}", user_parts[0], admin_parts[1], user_parts[2]);

        assert!(jwt.validate(&forged).is_err());
    }

    #[test]
    fn empty_secret_is_a_signing_error() {
        assert!(matches!(
            JwtManager::new(b"", TTL),
            Err(AuthError::Signing(_))
        ));
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        assert!(JwtManager::new(b"secret", 0).is_err());
        assert!(JwtManager::new(b"secret", -5).is_err());
    }

    #[test]
    fn generated_secrets_differ() {
        assert_ne!(JwtManager::generate_secret(), JwtManager::generate_secret());
    }
}
