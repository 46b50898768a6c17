//! Courier client: validated shipment creation and label retrieval.
//!
//! The [`CourierClient`] type is the main entry point. Use
//! [`CourierClientBuilder`] to configure the API key, endpoint and timeout.

use crate::{
    error::RejectionLevel,
    order::{label_content_type, label_extension, Order, ShipmentParams, LABEL_FORMAT_PDF},
    validation::validate_order,
    wire::{ApiEnvelope, ApiRequest, Command},
    Error, Response, Result,
};
use base64::Engine;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Endpoint of the courier's test environment.
pub const TEST_ENDPOINT: &str = "https://mtapi.net/?testMode=1";
/// Endpoint of the courier's production environment.
pub const PRODUCTION_ENDPOINT: &str = "https://mtapi.net/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A shipment registered with the courier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentResult {
    /// Tracking number assigned by the courier.
    pub tracking_number: String,
}

/// A decoded shipping label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDocument {
    /// Raw label content, e.g. a PDF file.
    pub bytes: Vec<u8>,
    /// Label format the document was requested in.
    pub format: String,
}

impl LabelDocument {
    /// MIME type of the document, derived from its format.
    pub fn content_type(&self) -> &'static str {
        label_content_type(&self.format)
    }

    /// A download file name such as `label.pdf`.
    pub fn file_name(&self) -> String {
        format!("label.{}", label_extension(&self.format))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A client for the Spring courier API.
///
/// Each call performs a single request with no retries and keeps no
/// connection open afterwards. Cloning is cheap.
///
/// # Examples
///
/// ```no_run
/// use spring_courier::{CourierClient, Order, ShipmentParams};
/// use std::time::Duration;
///
/// # async fn example(order: Order) -> Result<(), spring_courier::Error> {
/// let client = CourierClient::builder()
///     .api_key("f16753b55cac6c6e")
///     .test_environment()
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// let shipment = client
///     .create_shipment(&order, &ShipmentParams::new("PDF", "PPTT"))
///     .await?;
/// let label = client.fetch_label(&shipment.tracking_number).await?;
///
/// std::fs::write(label.file_name(), label.as_bytes()).ok();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CourierClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    default_headers: HeaderMap,
    timeout: Duration,
}

impl fmt::Debug for CourierClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CourierClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

impl CourierClient {
    /// Creates a new `CourierClientBuilder` for configuring a client.
    pub fn builder() -> CourierClientBuilder {
        CourierClientBuilder::new()
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Registers a shipment for `order` and returns its tracking number.
    ///
    /// The order is validated first; if any field violates the courier's
    /// limits, [`Error::Validation`] is returned with every violation and no
    /// request is sent.
    ///
    /// # Errors
    ///
    /// * [`Error::Validation`] - the order failed local checks
    /// * [`Error::Connectivity`] - the courier could not be reached
    /// * [`Error::Rejected`] - the courier answered with error level 1 or 10
    /// * [`Error::Unhandled`] - any other failure, including a missing tracking number
    pub async fn create_shipment(
        &self,
        order: &Order,
        params: &ShipmentParams,
    ) -> Result<Response<ShipmentResult>> {
        if let Err(errors) = validate_order(order) {
            tracing::warn!(
                violations = errors.len(),
                errors = %errors,
                "Order failed validation"
            );
            return Err(Error::Validation(errors));
        }

        let request = ApiRequest::order_shipment(&self.inner.api_key, order, params);
        let response = self.call(Command::OrderShipment, &request).await?;

        let tracking_number = response
            .data
            .shipment_str("TrackingNumber")
            .map(str::to_owned);

        match tracking_number {
            Some(tracking_number) => {
                tracing::info!(tracking_number = %tracking_number, "Shipment created");
                Ok(response.map(|_| ShipmentResult { tracking_number }))
            }
            None => {
                tracing::error!(
                    raw_response = %response.raw_body,
                    "Shipment response has no tracking number"
                );
                Err(Error::Unhandled {
                    message: "Response has no Shipment.TrackingNumber".to_string(),
                    error_level: response.data.error_level,
                    status: response.status,
                    raw_response: response.raw_body,
                })
            }
        }
    }

    /// Fetches the PDF label of a shipment.
    ///
    /// Equivalent to `fetch_label_as(tracking_number, "PDF")`.
    pub async fn fetch_label(&self, tracking_number: &str) -> Result<Response<LabelDocument>> {
        self.fetch_label_as(tracking_number, LABEL_FORMAT_PDF).await
    }

    /// Fetches the label of a shipment in the given format and decodes it to raw bytes.
    ///
    /// # Errors
    ///
    /// Besides the transport and rejection errors of every call, returns
    /// [`Error::Unhandled`] if the courier sends no label or a label that is
    /// not valid base64.
    pub async fn fetch_label_as(
        &self,
        tracking_number: &str,
        label_format: &str,
    ) -> Result<Response<LabelDocument>> {
        let request = ApiRequest::shipment_label(&self.inner.api_key, tracking_number, label_format);
        let response = self.call(Command::GetShipmentLabel, &request).await?;

        let decoded = response
            .data
            .shipment_str("LabelImage")
            .map(decode_label);

        match decoded {
            Some(Ok(bytes)) => {
                tracing::info!(
                    tracking_number = %tracking_number,
                    format = %label_format,
                    bytes = bytes.len(),
                    "Label retrieved"
                );
                let format = label_format.to_string();
                Ok(response.map(|_| LabelDocument { bytes, format }))
            }
            Some(Err(e)) => {
                tracing::error!(error = %e, "Label payload is not valid base64");
                Err(Error::Unhandled {
                    message: format!("Label payload is not valid base64: {}", e),
                    error_level: response.data.error_level,
                    status: response.status,
                    raw_response: response.raw_body,
                })
            }
            None => {
                tracing::error!(
                    tracking_number = %tracking_number,
                    "Label response has no label image"
                );
                Err(Error::Unhandled {
                    message: "Failed to generate shipping label".to_string(),
                    error_level: response.data.error_level,
                    status: response.status,
                    raw_response: response.raw_body,
                })
            }
        }
    }

    /// Creates a shipment and fetches its label in the shipment's label format.
    pub async fn ship(
        &self,
        order: &Order,
        params: &ShipmentParams,
    ) -> Result<(ShipmentResult, LabelDocument)> {
        let shipment = self.create_shipment(order, params).await?.into_inner();
        let label = self
            .fetch_label_as(&shipment.tracking_number, &params.label_format)
            .await?
            .into_inner();
        Ok((shipment, label))
    }

    /// Sends one command and checks the response envelope.
    ///
    /// Returns the envelope only if the courier reported success.
    async fn call<S>(&self, command: Command, request: &ApiRequest<'_, S>) -> Result<Response<ApiEnvelope>>
    where
        S: Serialize,
    {
        let json =
            serde_json::to_value(request).map_err(|e| Error::SerializationFailed(e.to_string()))?;

        tracing::debug!(
            command = command.as_str(),
            url = %self.inner.endpoint,
            "Sending courier request"
        );

        let mut builder = self
            .inner
            .http_client
            .post(self.inner.endpoint.clone())
            .timeout(self.inner.timeout);

        for (name, value) in &self.inner.default_headers {
            builder = builder.header(name, value);
        }

        let start_time = Instant::now();

        let response = builder.json(&json).send().await.map_err(|e| {
            tracing::warn!(error = %e, command = command.as_str(), "Courier unreachable");
            Error::Connectivity(e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();

        let raw_body = response.text().await.map_err(|e| {
            tracing::warn!(error = %e, command = command.as_str(), "Failed to read courier response");
            Error::Connectivity(e)
        })?;
        let latency = start_time.elapsed();

        tracing::info!(
            command = command.as_str(),
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            "Received courier response"
        );

        let envelope = match serde_json::from_str::<ApiEnvelope>(&raw_body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    status = status.as_u16(),
                    raw_response = %raw_body,
                    "Failed to decode courier response"
                );
                return Err(Error::Unhandled {
                    message: format!("Undecodable response (status {}): {}", status, e),
                    error_level: None,
                    status,
                    raw_response: raw_body,
                });
            }
        };

        check_envelope(&envelope, status, &raw_body)?;

        Ok(Response::new(envelope, raw_body, status, headers, latency))
    }
}

/// Classifies a decoded response.
///
/// Known rejection levels win over the transport status; anything else that
/// is not error level 0 with status 200 is unhandled.
fn check_envelope(envelope: &ApiEnvelope, status: StatusCode, raw_body: &str) -> Result<()> {
    if let Some(level) = envelope.error_level.and_then(RejectionLevel::from_error_level) {
        tracing::warn!(
            level = level.code(),
            api_error = envelope.message(),
            status = status.as_u16(),
            "Courier rejected request"
        );
        return Err(Error::Rejected {
            level,
            message: envelope.message().to_string(),
            status,
            raw_response: raw_body.to_string(),
        });
    }

    if envelope.error_level != Some(0) || status != StatusCode::OK {
        let message = if envelope.message().is_empty() {
            match envelope.error_level {
                Some(level) => format!("ErrorLevel {} with status {}", level, status),
                None => format!("Missing ErrorLevel with status {}", status),
            }
        } else {
            envelope.message().to_string()
        };

        tracing::error!(
            error_level = ?envelope.error_level,
            status = status.as_u16(),
            raw_response = %raw_body,
            "Unhandled courier error"
        );
        return Err(Error::Unhandled {
            message,
            error_level: envelope.error_level,
            status,
            raw_response: raw_body.to_string(),
        });
    }

    Ok(())
}

/// Decodes a base64 label, ignoring line breaks and other whitespace.
fn decode_label(image: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let compact: String = image.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD.decode(compact)
}

enum Endpoint {
    Test,
    Production,
    Custom(Url),
}

/// Builder for configuring and creating a [`CourierClient`].
///
/// Defaults to the test environment and a 30 second request timeout.
///
/// # Examples
///
/// ```no_run
/// use spring_courier::CourierClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), spring_courier::Error> {
/// let client = CourierClientBuilder::new()
///     .api_key("f16753b55cac6c6e")
///     .production()
///     .timeout(Duration::from_secs(15))
///     .default_header("User-Agent", "shop-backend/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct CourierClientBuilder {
    api_key: Option<String>,
    endpoint: Endpoint,
    default_headers: HeaderMap,
    timeout: Duration,
}

impl CourierClientBuilder {
    /// Creates a new `CourierClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            api_key: None,
            endpoint: Endpoint::Test,
            default_headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the API key sent with every request.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sends requests to the courier's test environment ([`TEST_ENDPOINT`]).
    pub fn test_environment(mut self) -> Self {
        self.endpoint = Endpoint::Test;
        self
    }

    /// Sends requests to the courier's production environment ([`PRODUCTION_ENDPOINT`]).
    pub fn production(mut self) -> Self {
        self.endpoint = Endpoint::Production;
        self
    }

    /// Sends requests to a custom endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.endpoint = Endpoint::Custom(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the request timeout. A request that does not complete in time
    /// fails with [`Error::Connectivity`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the configured `CourierClient`.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key was provided or if the HTTP client
    /// cannot be created.
    pub fn build(self) -> Result<CourierClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::ConfigurationError("API key is required".to_string()))?;

        let endpoint = match self.endpoint {
            Endpoint::Test => Url::parse(TEST_ENDPOINT)?,
            Endpoint::Production => Url::parse(PRODUCTION_ENDPOINT)?,
            Endpoint::Custom(url) => url,
        };

        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(CourierClient {
            inner: Arc::new(ClientInner {
                http_client,
                endpoint,
                api_key,
                default_headers: self.default_headers,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for CourierClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> ApiEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_check_envelope_success() {
        let env = envelope(r#"{"ErrorLevel": 0, "Error": "", "Shipment": {"TrackingNumber": "T"}}"#);
        assert!(check_envelope(&env, StatusCode::OK, "").is_ok());
    }

    #[test]
    fn test_check_envelope_level1_wins_over_status() {
        let env = envelope(r#"{"ErrorLevel": 1, "Error": "Service PPTT not allowed"}"#);
        let err = check_envelope(&env, StatusCode::INTERNAL_SERVER_ERROR, "raw").unwrap_err();
        match err {
            Error::Rejected {
                level,
                message,
                status,
                raw_response,
            } => {
                assert_eq!(level, RejectionLevel::Level1);
                assert_eq!(message, "Service PPTT not allowed");
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(raw_response, "raw");
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_check_envelope_unhandled_cases() {
        let env = envelope(r#"{"ErrorLevel": 5, "Error": "Weird"}"#);
        let err = check_envelope(&env, StatusCode::OK, "").unwrap_err();
        assert!(matches!(err, Error::Unhandled { error_level: Some(5), .. }));
        assert_eq!(err.to_string(), "Unhandled error: Weird");

        let env = envelope(r#"{"ErrorLevel": 0, "Error": ""}"#);
        let err = check_envelope(&env, StatusCode::BAD_GATEWAY, "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unhandled error: ErrorLevel 0 with status 502 Bad Gateway"
        );

        let env = envelope("{}");
        let err = check_envelope(&env, StatusCode::OK, "").unwrap_err();
        assert!(matches!(err, Error::Unhandled { error_level: None, .. }));
    }

    #[test]
    fn test_decode_label_ignores_line_breaks() {
        assert_eq!(decode_label("JVBE\nRi0x\r\nLjQ=").unwrap(), b"%PDF-1.4");
        assert!(decode_label("not base64!").is_err());
    }

    #[test]
    fn test_label_document_metadata() {
        let label = LabelDocument {
            bytes: b"%PDF".to_vec(),
            format: "PDF".to_string(),
        };
        assert_eq!(label.content_type(), "application/pdf");
        assert_eq!(label.file_name(), "label.pdf");
        assert_eq!(label.len(), 4);
        assert!(!label.is_empty());
    }

    #[test]
    fn test_builder_requires_api_key() {
        let err = CourierClient::builder().build().unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));

        let err = CourierClient::builder().api_key("  ").build().unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));
    }

    #[test]
    fn test_builder_endpoints() {
        let client = CourierClient::builder().api_key("key").build().unwrap();
        assert_eq!(client.endpoint().as_str(), TEST_ENDPOINT);

        let client = CourierClient::builder()
            .api_key("key")
            .production()
            .build()
            .unwrap();
        assert_eq!(client.endpoint().as_str(), PRODUCTION_ENDPOINT);

        assert!(CourierClient::builder().base_url("not a url").is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = CourierClient::builder().api_key("secret-key").build().unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_invalid_default_header() {
        let result = CourierClient::builder().default_header("bad header", "x");
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }
}
