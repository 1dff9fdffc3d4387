//! JWT utilities for authentication
//!
//! Provides token encoding, decoding, and validation using the `jsonwebtoken` crate.
//! Decoding failures are classified as [`JoseError`] and mapped to [`AppError`]
//! through [`JoseErrorMapper`](super::JoseErrorMapper).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::jose::{JoseError, JoseErrorKind};
use crate::config::JwtConfig;
use crate::error::AppError;

/// Token type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal identifier)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
    /// Optional session ID for tracking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Check if this is an access token
    #[must_use]
    pub fn is_access_token(&self) -> bool {
        self.token_type == TokenType::Access
    }

    /// Check if this is a refresh token
    #[must_use]
    pub fn is_refresh_token(&self) -> bool {
        self.token_type == TokenType::Refresh
    }
}

/// Token pair containing access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// JWT service for encoding and decoding tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
    issuer: Option<String>,
    audience: Option<String>,
}

impl JwtService {
    /// Create a new JWT service with the given secret and expiry times
    #[must_use]
    pub fn new(secret: &str, access_token_expiry: i64, refresh_token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry,
            refresh_token_expiry,
            issuer: None,
            audience: None,
        }
    }

    /// Create a JWT service from configuration, including issuer/audience checks
    #[must_use]
    pub fn from_config(config: &JwtConfig) -> Self {
        let mut service = Self::new(
            &config.secret,
            config.access_token_expiry,
            config.refresh_token_expiry,
        );
        service.issuer.clone_from(&config.issuer);
        service.audience.clone_from(&config.audience);
        service
    }

    /// Stamp tokens with `iss` and require it when decoding
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Stamp tokens with `aud` and require it when decoding
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Generate a token pair for a subject
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn generate_token_pair(&self, subject: &str) -> Result<TokenPair, AppError> {
        self.generate_token_pair_with_session(subject, None)
    }

    /// Generate a token pair for a subject with a session ID
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn generate_token_pair_with_session(
        &self,
        subject: &str,
        session_id: Option<String>,
    ) -> Result<TokenPair, AppError> {
        let access_token = self.encode_token(subject, TokenType::Access, session_id.clone())?;
        let refresh_token = self.encode_token(subject, TokenType::Refresh, session_id)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Encode a JWT token
    fn encode_token(
        &self,
        subject: &str,
        token_type: TokenType,
        session_id: Option<String>,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expiry = match token_type {
            TokenType::Access => self.access_token_expiry,
            TokenType::Refresh => self.refresh_token_expiry,
        };

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry)).timestamp(),
            token_type,
            session_id,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to encode JWT: {e}")))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.leeway = 0;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation
    }

    /// Decode and validate a JWT token
    ///
    /// # Errors
    /// Returns `Unauthorized` for expired, forged, or misaddressed tokens and
    /// `InvalidInput` for tokens that cannot be parsed
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| AppError::from(JoseError::from(e)))?;

        if token_data.claims.sub.is_empty() {
            return Err(JoseError::new(JoseErrorKind::InvalidSubject, "Empty subject").into());
        }

        Ok(token_data.claims)
    }

    /// Validate an access token and return the claims
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or not an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;

        if !claims.is_access_token() {
            return Err(JoseError::new(JoseErrorKind::BadJwt, "Expected an access token").into());
        }

        Ok(claims)
    }

    /// Validate a refresh token and return the claims
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or not a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;

        if !claims.is_refresh_token() {
            return Err(JoseError::new(JoseErrorKind::BadJwt, "Expected a refresh token").into());
        }

        Ok(claims)
    }

    /// Refresh tokens using a valid refresh token
    ///
    /// # Errors
    /// Returns an error if the refresh token is invalid or expired
    pub fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.validate_refresh_token(refresh_token)?;

        self.generate_token_pair_with_session(&claims.sub, claims.session_id)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const SECRET: &str = "test-secret-key-that-is-long-enough";

    fn create_test_service() -> JwtService {
        JwtService::new(SECRET, 900, 604_800)
    }

    #[test]
    fn test_generate_token_pair() {
        let service = create_test_service();

        let pair = service.generate_token_pair("svc-12345").unwrap();

        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 900);
    }

    #[test]
    fn test_decode_access_token() {
        let service = create_test_service();

        let pair = service.generate_token_pair("svc-12345").unwrap();
        let claims = service.decode_token(&pair.access_token).unwrap();

        assert_eq!(claims.sub, "svc-12345");
        assert!(claims.is_access_token());
        assert!(!claims.is_expired());
        assert!(claims.iss.is_none());
    }

    #[test]
    fn test_validate_access_token() {
        let service = create_test_service();
        let pair = service.generate_token_pair("svc-12345").unwrap();

        // Should succeed with access token
        let claims = service.validate_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "svc-12345");

        // Should fail with refresh token
        let result = service.validate_access_token(&pair.refresh_token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_validate_refresh_token() {
        let service = create_test_service();
        let pair = service.generate_token_pair("svc-12345").unwrap();

        let claims = service.validate_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(claims.sub, "svc-12345");

        let result = service.validate_refresh_token(&pair.access_token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_refresh_tokens() {
        let service = create_test_service();

        let pair1 = service
            .generate_token_pair_with_session("svc-12345", Some("session-1".to_string()))
            .unwrap();
        let pair2 = service.refresh_tokens(&pair1.refresh_token).unwrap();

        let claims = service.validate_access_token(&pair2.access_token).unwrap();
        assert_eq!(claims.sub, "svc-12345");
        assert_eq!(claims.session_id.as_deref(), Some("session-1"));
    }

    #[test]
    fn test_malformed_token_is_invalid_input() {
        let service = create_test_service();

        let result = service.decode_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let service = JwtService::new(SECRET, -120, -120);
        let pair = service.generate_token_pair("svc-12345").unwrap();

        let result = service.decode_token(&pair.access_token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_rejected_token_logs_once() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let service = create_test_service();
        let result = tracing::subscriber::with_default(subscriber, || {
            service.decode_token("invalid.token.here")
        });
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.lines().count(), 1, "{output}");
        assert!(output.contains("MALFORMED_TOKEN"));
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let pair = create_test_service().generate_token_pair("svc-12345").unwrap();
        let other = JwtService::new("another-secret-key-that-is-long", 900, 604_800);

        let result = other.decode_token(&pair.access_token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_empty_subject_is_invalid_input() {
        let service = create_test_service();
        let pair = service.generate_token_pair("").unwrap();

        let result = service.decode_token(&pair.access_token);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_issuer_and_audience() {
        let service = create_test_service()
            .with_issuer("mesh")
            .with_audience("api");
        let pair = service.generate_token_pair("svc-12345").unwrap();

        let claims = service.decode_token(&pair.access_token).unwrap();
        assert_eq!(claims.iss.as_deref(), Some("mesh"));
        assert_eq!(claims.aud.as_deref(), Some("api"));

        let other_issuer = create_test_service()
            .with_issuer("elsewhere")
            .with_audience("api");
        let result = other_issuer.decode_token(&pair.access_token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));

        let other_audience = create_test_service()
            .with_issuer("mesh")
            .with_audience("admin");
        let result = other_audience.decode_token(&pair.access_token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_from_config() {
        let config = JwtConfig {
            secret: SECRET.to_string(),
            access_token_expiry: 60,
            refresh_token_expiry: 120,
            issuer: Some("mesh".to_string()),
            audience: None,
        };
        let service = JwtService::from_config(&config);
        let pair = service.generate_token_pair("svc-1").unwrap();

        assert_eq!(pair.expires_in, 60);
        let claims = service.decode_token(&pair.refresh_token).unwrap();
        assert_eq!(claims.iss.as_deref(), Some("mesh"));
        assert!(claims.aud.is_none());
    }
}
