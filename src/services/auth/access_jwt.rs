use jsonwebtoken::{Algorithm, Validation};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::services::auth::identity::{ClaimsError, Identity};
use crate::services::auth::key::{KeyError, KeyMaterial};

/// Errors returned by access-token verification.
///
/// `Configuration` is a service fault (500); the other two are caller faults (401).
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("verifier misconfigured: {0}")]
    Configuration(#[from] KeyError),
    #[error("jwt verification failed: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("invalid claims: {0}")]
    Claims(#[from] ClaimsError),
}

impl VerifyError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Settings injected at construction; the verifier never reads the environment.
#[derive(Debug, Clone, Default)]
pub struct AuthSettings {
    /// Base64-encoded SPKI PEM of the RS256 public key.
    pub public_key_base64: Option<String>,
    pub leeway_seconds: u64,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

/// RS256 access-token verifier.
#[derive(Debug)]
pub struct AuthService {
    key: KeyMaterial,
    validation: Validation,
}

impl AuthService {
    pub fn new(settings: AuthSettings) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = settings.leeway_seconds;
        validation.validate_nbf = true;
        // `exp` and `nbf` are checked when present, not required.
        validation.required_spec_claims.clear();

        if let Some(issuer) = settings.issuer.as_deref() {
            validation.set_issuer(&[issuer]);
        }
        match settings.audience.as_deref() {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: KeyMaterial::new(settings.public_key_base64),
            validation,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.key.is_configured()
    }

    /// Verify signature + time window, then parse the claim set into an [`Identity`].
    ///
    /// The key is resolved before the token is looked at, so a misconfigured
    /// service reports `Configuration` even for garbage tokens.
    pub fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let key = self.key.decoding_key()?;

        let data = jsonwebtoken::decode::<Map<String, Value>>(token, key, &self.validation)?;

        Ok(Identity::from_claims(data.claims)?)
    }
}
