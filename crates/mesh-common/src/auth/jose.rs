//! JOSE error taxonomy and its mapping onto [`AppError`]
//!
//! Token failures are classified into a fixed hierarchy so callers can
//! react to a family of failures (any `BadJwt`) or to a single cause
//! (`Expired`). [`JoseErrorMapper`] turns a classified failure into the
//! [`AppError`] returned to the client.

use std::fmt;
use std::sync::LazyLock;

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;

use crate::error::{AppError, Classify, ErrorKind, ExceptionConverter};

// =============================================================================
// Taxonomy
// =============================================================================

/// Kinds of JOSE failures
///
/// ```text
/// Jose
/// ├── Parse
/// │   └── MalformedToken
/// ├── KeySource
/// ├── Algorithm
/// │   └── UnsupportedAlgorithm
/// └── BadJose
///     ├── BadJwt
///     │   ├── Expired
///     │   ├── NotYetValid
///     │   ├── InvalidIssuer
///     │   ├── InvalidAudience
///     │   ├── MissingClaim
///     │   └── InvalidSubject
///     ├── BadSignature
///     └── BadEncryption
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoseErrorKind {
    Jose,
    Parse,
    MalformedToken,
    KeySource,
    Algorithm,
    UnsupportedAlgorithm,
    BadJose,
    BadJwt,
    Expired,
    NotYetValid,
    InvalidIssuer,
    InvalidAudience,
    MissingClaim,
    InvalidSubject,
    BadSignature,
    BadEncryption,
}

impl ErrorKind for JoseErrorKind {
    fn parent(self) -> Option<Self> {
        match self {
            Self::Jose => None,
            Self::Parse | Self::KeySource | Self::Algorithm | Self::BadJose => Some(Self::Jose),
            Self::MalformedToken => Some(Self::Parse),
            Self::UnsupportedAlgorithm => Some(Self::Algorithm),
            Self::BadJwt | Self::BadSignature | Self::BadEncryption => Some(Self::BadJose),
            Self::Expired
            | Self::NotYetValid
            | Self::InvalidIssuer
            | Self::InvalidAudience
            | Self::MissingClaim
            | Self::InvalidSubject => Some(Self::BadJwt),
        }
    }
}

impl JoseErrorKind {
    /// Stable code for logs and API responses
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Jose => "JOSE_ERROR",
            Self::Parse => "PARSE_ERROR",
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::KeySource => "KEY_SOURCE_ERROR",
            Self::Algorithm => "ALGORITHM_ERROR",
            Self::UnsupportedAlgorithm => "UNSUPPORTED_ALGORITHM",
            Self::BadJose => "BAD_JOSE",
            Self::BadJwt => "BAD_JWT",
            Self::Expired => "TOKEN_EXPIRED",
            Self::NotYetValid => "TOKEN_NOT_YET_VALID",
            Self::InvalidIssuer => "INVALID_ISSUER",
            Self::InvalidAudience => "INVALID_AUDIENCE",
            Self::MissingClaim => "MISSING_CLAIM",
            Self::InvalidSubject => "INVALID_SUBJECT",
            Self::BadSignature => "BAD_SIGNATURE",
            Self::BadEncryption => "BAD_ENCRYPTION",
        }
    }
}

impl fmt::Display for JoseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Error value
// =============================================================================

/// A classified JOSE failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct JoseError {
    kind: JoseErrorKind,
    message: String,
}

impl JoseError {
    pub fn new(kind: JoseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this failure belongs to `kind` or one of its descendants
    #[must_use]
    pub fn is_a(&self, kind: JoseErrorKind) -> bool {
        self.kind.is_a(kind)
    }
}

impl Classify for JoseError {
    type Kind = JoseErrorKind;

    fn kind(&self) -> JoseErrorKind {
        self.kind
    }
}

impl From<jsonwebtoken::errors::Error> for JoseError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        let kind = match err.kind() {
            JwtErrorKind::ExpiredSignature => JoseErrorKind::Expired,
            JwtErrorKind::ImmatureSignature => JoseErrorKind::NotYetValid,
            JwtErrorKind::InvalidSignature => JoseErrorKind::BadSignature,
            JwtErrorKind::InvalidIssuer => JoseErrorKind::InvalidIssuer,
            JwtErrorKind::InvalidAudience => JoseErrorKind::InvalidAudience,
            JwtErrorKind::InvalidSubject => JoseErrorKind::InvalidSubject,
            JwtErrorKind::MissingRequiredClaim(_) => JoseErrorKind::MissingClaim,
            JwtErrorKind::InvalidToken
            | JwtErrorKind::Base64(_)
            | JwtErrorKind::Json(_)
            | JwtErrorKind::Utf8(_) => JoseErrorKind::MalformedToken,
            JwtErrorKind::InvalidAlgorithm | JwtErrorKind::InvalidAlgorithmName => {
                JoseErrorKind::UnsupportedAlgorithm
            }
            JwtErrorKind::InvalidEcdsaKey
            | JwtErrorKind::InvalidRsaKey(_)
            | JwtErrorKind::InvalidKeyFormat => JoseErrorKind::KeySource,
            _ => JoseErrorKind::Jose,
        };

        Self::new(kind, err.to_string())
    }
}

// =============================================================================
// Mapping
// =============================================================================

/// Failures caused by a token that is well-formed but not acceptable
pub const TOKEN_VALIDATION_FAILURES: [JoseErrorKind; 5] = [
    JoseErrorKind::Expired,
    JoseErrorKind::NotYetValid,
    JoseErrorKind::BadSignature,
    JoseErrorKind::InvalidIssuer,
    JoseErrorKind::InvalidAudience,
];

/// Failures caused by a token whose content cannot be used at all
pub const FIELD_VALIDATION_FAILURES: [JoseErrorKind; 4] = [
    JoseErrorKind::MalformedToken,
    JoseErrorKind::MissingClaim,
    JoseErrorKind::InvalidSubject,
    JoseErrorKind::UnsupportedAlgorithm,
];

static SHARED_MAPPER: LazyLock<JoseErrorMapper> = LazyLock::new(JoseErrorMapper::new);

/// Maps [`JoseError`] onto [`AppError`]
///
/// Token validation failures become `Unauthorized`, field validation
/// failures become `InvalidInput`, and anything else in the taxonomy
/// falls back to `Unauthorized`.
pub struct JoseErrorMapper {
    converter: ExceptionConverter<JoseError, AppError>,
}

impl JoseErrorMapper {
    #[must_use]
    pub fn new() -> Self {
        let converter = ExceptionConverter::<JoseError, AppError>::builder()
            .when_any_of(TOKEN_VALIDATION_FAILURES)
            .then_apply(unauthorized)
            .when_any_of(FIELD_VALIDATION_FAILURES)
            .then_apply(invalid_input)
            .when_uncaught()
            .then_apply(unauthorized)
            .build();

        Self { converter }
    }

    /// Process-wide mapper
    #[must_use]
    pub fn shared() -> &'static Self {
        &SHARED_MAPPER
    }

    /// Map a failure to the error returned to the client
    #[must_use]
    pub fn map(&self, error: &JoseError) -> AppError {
        tracing::debug!(kind = %error.kind(), error = %error, "Mapping JOSE failure");

        // The default handler is always set, so this only guards a bad build
        self.converter
            .apply(error)
            .unwrap_or_else(|| unauthorized(error))
    }
}

impl Default for JoseErrorMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for JoseErrorMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoseErrorMapper")
            .field("converter", &self.converter)
            .finish()
    }
}

impl From<JoseError> for AppError {
    fn from(err: JoseError) -> Self {
        JoseErrorMapper::shared().map(&err)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::from(JoseError::from(err))
    }
}

fn unauthorized(error: &JoseError) -> AppError {
    AppError::Unauthorized(error.message().to_string())
}

fn invalid_input(error: &JoseError) -> AppError {
    AppError::InvalidInput(error.message().to_string())
}
