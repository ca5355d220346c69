//! Bearer token issue and verification.
//!
//! Tokens are HS256 JWTs signed with a single process-wide secret. They carry
//! the caller's id, email, role and (for tenant-bound roles) college id, and
//! stay valid until `exp`; there is no revocation list.
use crate::{AuthzError, AuthzResult, Identity, Role};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampusClaims {
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "collegeId", default, skip_serializing_if = "Option::is_none")]
    pub college_id: Option<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl CampusClaims {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
            college_id: self.college_id.clone(),
        }
    }
}

pub struct TokenIssuer {
    issuer: String,
    audience: String,
    ttl: Duration,
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl: Duration,
    ) -> AuthzResult<Self> {
        if secret.is_empty() {
            return Err(AuthzError::EmptySecret);
        }
        Ok(Self {
            issuer: issuer.into(),
            audience: audience.into(),
            ttl,
            encoding_key: EncodingKey::from_secret(secret),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn mint(&self, identity: &Identity) -> AuthzResult<String> {
        let now = now_epoch_seconds();
        let claims = CampusClaims {
            id: identity.id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            college_id: identity.college_id.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };
        let token =
            jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }
}

pub struct TokenVerifier {
    issuer: String,
    audience: String,
    leeway: u64,
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
        leeway: u64,
    ) -> AuthzResult<Self> {
        if secret.is_empty() {
            return Err(AuthzError::EmptySecret);
        }
        Ok(Self {
            issuer: issuer.into(),
            audience: audience.into(),
            leeway,
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    pub fn verify(&self, token: &str) -> AuthzResult<CampusClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.leeway = self.leeway;
        let token = jsonwebtoken::decode::<CampusClaims>(token, &self.decoding_key, &validation)?;
        Ok(token.claims)
    }
}

fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs() as i64
}
