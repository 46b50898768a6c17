//! Response wrapper that preserves both the extracted result and the raw exchange.
//!
//! The [`Response`] type wraps the value extracted from a courier answer
//! (a tracking number, a label) along with the details of the HTTP exchange,
//! so callers can log latency or keep the raw body of a shipment for audits.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful courier API response.
///
/// Dereferences to the extracted data.
///
/// # Examples
///
/// ```no_run
/// use spring_courier::{CourierClient, Order, ShipmentParams};
///
/// # async fn example(order: Order) -> Result<(), spring_courier::Error> {
/// let client = CourierClient::builder()
///     .api_key("f16753b55cac6c6e")
///     .build()?;
///
/// let shipment = client
///     .create_shipment(&order, &ShipmentParams::new("PDF", "PPTT"))
///     .await?;
///
/// println!("Tracking number: {}", shipment.tracking_number);
/// println!("Request took {:?}", shipment.latency);
/// println!("Courier answered: {}", shipment.raw_body);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The value extracted from the response.
    pub data: T,

    /// The raw response body as a string.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from sending the request until the body was read.
    pub latency: Duration,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
        }
    }

    /// Maps the response data to a different type using the provided function,
    /// preserving the exchange details.
    ///
    /// # Examples
    ///
    /// ```
    /// # use spring_courier::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     "LX123456789PL",
    ///     String::new(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    /// );
    ///
    /// let length = response.map(|tracking| tracking.len());
    /// assert_eq!(length.data, 13);
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
        }
    }

    /// Consumes the response, returning only the extracted data.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Returns a reference to a header value by name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use spring_courier::Response;
    /// # use http::{HeaderMap, StatusCode, HeaderValue};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("application/json"));
    ///
    /// let response = Response::new(
    ///     (),
    ///     String::new(),
    ///     StatusCode::OK,
    ///     headers,
    ///     Duration::from_millis(100),
    /// );
    ///
    /// assert_eq!(
    ///     response.header("content-type").unwrap(),
    ///     "application/json"
    /// );
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
