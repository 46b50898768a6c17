//! Error types for courier API calls.
//!
//! Every failure of [`CourierClient`](crate::CourierClient) is one of a small set of
//! kinds, each with an HTTP status category a front-end can answer with. Remote
//! errors keep the courier's own message, the transport status and the raw
//! response body for debugging.

use crate::validation::ValidationErrors;
use http::StatusCode;
use serde_json::json;
use std::fmt;

/// A rejection class reported by the courier through its `ErrorLevel` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionLevel {
    /// `ErrorLevel` 1: the shipment was understood but cannot be processed.
    Level1,
    /// `ErrorLevel` 10: the request itself was malformed.
    Level10,
}

impl RejectionLevel {
    /// Maps a raw `ErrorLevel` to a rejection class, if it is one.
    pub fn from_error_level(level: i64) -> Option<Self> {
        match level {
            1 => Some(RejectionLevel::Level1),
            10 => Some(RejectionLevel::Level10),
            _ => None,
        }
    }

    /// The raw `ErrorLevel` value.
    pub fn code(&self) -> i64 {
        match self {
            RejectionLevel::Level1 => 1,
            RejectionLevel::Level10 => 10,
        }
    }
}

impl fmt::Display for RejectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The order failed local field checks; nothing was sent.
    Validation,
    /// The courier could not be reached.
    Connectivity,
    /// The courier rejected the request with a known error level.
    Rejection,
    /// Any other remote failure, including unexpected response shapes.
    Unhandled,
    /// The client was misconfigured or the request could not be built.
    Configuration,
}

/// The main error type for courier API calls.
///
/// # Examples
///
/// ```no_run
/// use spring_courier::{CourierClient, Error, Order, ShipmentParams};
///
/// # async fn example(order: Order) -> Result<(), Error> {
/// let client = CourierClient::builder()
///     .api_key("f16753b55cac6c6e")
///     .test_environment()
///     .build()?;
///
/// match client.create_shipment(&order, &ShipmentParams::new("PDF", "PPTT")).await {
///     Ok(shipment) => println!("Tracking number: {}", shipment.tracking_number),
///     Err(Error::Validation(errors)) => {
///         for (side, field, message) in errors.iter() {
///             eprintln!("{} {}: {}", side, field, message);
///         }
///     }
///     Err(e) => eprintln!("{} ({})", e, e.status()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The order failed local validation.
    ///
    /// Carries every violated field, not only the first one.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The courier API could not be reached (connection refused, DNS failure,
    /// timeout, or the response body could not be read).
    #[error("Spring api connection error: {0}")]
    Connectivity(#[source] reqwest::Error),

    /// The courier answered with `ErrorLevel` 1 or 10.
    ///
    /// # Fields
    ///
    /// * `level` - The rejection class
    /// * `message` - The courier's `Error` message
    /// * `status` - The transport status of the response
    /// * `raw_response` - The raw response body
    #[error("Error {level}: {message}")]
    Rejected {
        /// The rejection class
        level: RejectionLevel,
        /// The courier's error message
        message: String,
        /// The HTTP status of the response
        status: StatusCode,
        /// The raw response body
        raw_response: String,
    },

    /// Any other remote failure: an unknown nonzero error level, a non-200
    /// transport status, an undecodable body, or a missing response field.
    #[error("Unhandled error: {message}")]
    Unhandled {
        /// What went wrong
        message: String,
        /// The raw `ErrorLevel`, if the response carried one
        error_level: Option<i64>,
        /// The HTTP status of the response
        status: StatusCode,
        /// The raw response body
        raw_response: String,
    },

    /// Invalid configuration was provided.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// An invalid endpoint URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors)
    }
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Connectivity(_) => ErrorKind::Connectivity,
            Error::Rejected { .. } => ErrorKind::Rejection,
            Error::Unhandled { .. } => ErrorKind::Unhandled,
            Error::ConfigurationError(_)
            | Error::SerializationFailed(_)
            | Error::InvalidUrl(_) => ErrorKind::Configuration,
        }
    }

    /// Returns the HTTP status a front-end should answer with for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use spring_courier::{Error, RejectionLevel, ValidationErrors};
    /// use http::StatusCode;
    ///
    /// let err = Error::Rejected {
    ///     level: RejectionLevel::Level1,
    ///     message: "Service not available".to_string(),
    ///     status: StatusCode::OK,
    ///     raw_response: String::new(),
    /// };
    /// assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    ///
    /// let err = Error::Validation(ValidationErrors::new());
    /// assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    /// ```
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Connectivity(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Rejected {
                level: RejectionLevel::Level1,
                ..
            } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Rejected {
                level: RejectionLevel::Level10,
                ..
            } => StatusCode::BAD_REQUEST,
            Error::Unhandled { .. }
            | Error::ConfigurationError(_)
            | Error::SerializationFailed(_)
            | Error::InvalidUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the HTTP status of the courier's response, if one was received.
    pub fn remote_status(&self) -> Option<StatusCode> {
        match self {
            Error::Rejected { status, .. } | Error::Unhandled { status, .. } => Some(*status),
            Error::Connectivity(e) => e.status(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Rejected { raw_response, .. } | Error::Unhandled { raw_response, .. } => {
                Some(raw_response)
            }
            _ => None,
        }
    }

    /// Returns the per-field violations of a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Error::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Returns a JSON body describing this error for an HTTP response.
    ///
    /// Validation failures yield the per-field map; everything else yields
    /// `{"error": "<message>"}`.
    pub fn body(&self) -> serde_json::Value {
        match self {
            Error::Validation(errors) => json!(errors),
            Error::Connectivity(_) => json!({ "error": "Spring api connection error" }),
            other => json!({ "error": other.to_string() }),
        }
    }
}

/// A specialized `Result` type for courier API calls.
///
/// This is a convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
