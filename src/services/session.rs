use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

use crate::models::session::SessionClaims;
use crate::services::metrics::TOKEN_REJECTIONS_COUNTER;

/// Browsers and token libraries disagree on padding; accept both.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token has {0} segments, expected 3")]
    SegmentCount(usize),
    #[error("payload is not base64url: {0}")]
    Encoding(String),
    #[error("payload is not a claims object: {0}")]
    Payload(String),
    #[error("signature rejected: {0}")]
    Signature(jsonwebtoken::errors::Error),
    #[error("token expired at {0}")]
    Expired(i64),
}

impl From<base64::DecodeError> for TokenError {
    fn from(e: base64::DecodeError) -> Self {
        TokenError::Encoding(e.to_string())
    }
}

impl From<serde_json::Error> for TokenError {
    fn from(e: serde_json::Error) -> Self {
        TokenError::Payload(e.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::Base64(_) => TokenError::Encoding(e.to_string()),
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName => TokenError::Signature(e),
            _ => TokenError::Payload(e.to_string()),
        }
    }
}

impl TokenError {
    /// Label used for the `reason` metric dimension.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::SegmentCount(_) => "segments",
            TokenError::Encoding(_) => "encoding",
            TokenError::Payload(_) => "payload",
            TokenError::Signature(_) => "signature",
            TokenError::Expired(_) => "expired",
        }
    }
}

/// Turns the session cookie into claims, or nothing.
#[derive(Clone)]
pub struct SessionDecoder {
    key: Option<DecodingKey>,
}

impl SessionDecoder {
    /// Trusts the payload as-is, like a client-side token decoder.
    pub fn unverified() -> Self {
        Self { key: None }
    }

    pub fn hs256(secret: &str) -> Self {
        Self {
            key: Some(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn from_secret(secret: Option<&str>) -> Self {
        secret.map_or_else(Self::unverified, Self::hs256)
    }

    pub fn verifies_signature(&self) -> bool {
        self.key.is_some()
    }

    pub fn decode(&self, token: &str, now: i64) -> Result<SessionClaims, TokenError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(TokenError::SegmentCount(segments.len()));
        }

        let claims = match &self.key {
            Some(key) => {
                let mut validation = Validation::new(Algorithm::HS256);
                // Expiry is checked below against the caller's clock.
                validation.validate_exp = false;
                validation.validate_aud = false;
                validation.required_spec_claims.clear();

                decode::<SessionClaims>(token, key, &validation)?.claims
            }
            None => {
                let payload = PAYLOAD_ENGINE.decode(segments[1])?;
                serde_json::from_slice::<SessionClaims>(&payload)?
            }
        };

        if claims.is_expired(now) {
            return Err(TokenError::Expired(claims.expires_at));
        }

        Ok(claims)
    }

    /// Claims for an optional credential. Every failure reads as "no session".
    pub fn session(&self, token: Option<&str>, now: i64) -> Option<SessionClaims> {
        let token = token.filter(|t| !t.is_empty())?;

        match self.decode(token, now) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(error = %e, "Session token ignored");
                TOKEN_REJECTIONS_COUNTER
                    .with_label_values(&[e.reason()])
                    .inc();
                None
            }
        }
    }
}
