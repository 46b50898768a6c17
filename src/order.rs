//! Caller-facing input types: the order being shipped and the shipment parameters.
//!
//! Field names of [`Order`] follow the flat key layout used by shop front-ends
//! (`sender_company`, `delivery_postalcode`, ...), so an order can be
//! deserialized straight from such a payload. Missing fields default to empty
//! strings and are then caught by [`crate::validation`] where it matters.

use serde::{Deserialize, Serialize};

/// Label format code for PDF labels.
pub const LABEL_FORMAT_PDF: &str = "PDF";

/// An order as received from the shop: who sends the parcel and who receives it.
///
/// All fields are plain text and are passed to the courier without normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub sender_company: String,
    pub sender_fullname: String,
    pub sender_address: String,
    pub sender_city: String,
    pub sender_postalcode: String,
    pub sender_email: String,
    pub sender_phone: String,

    pub delivery_company: String,
    pub delivery_fullname: String,
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_postalcode: String,
    /// Two-letter country code. Not validated.
    pub delivery_country: String,
    pub delivery_email: String,
    pub delivery_phone: String,
}

/// Physical and customs attributes of the single parcel in a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    /// Weight in kilograms.
    pub weight: f64,
    /// Declared value, in `currency`.
    pub value: f64,
    /// ISO 4217 currency code of `value`.
    pub currency: String,
    pub dangerous_goods: bool,
}

impl Default for Parcel {
    fn default() -> Self {
        Self {
            weight: 1.0,
            value: 20.0,
            currency: "PLN".to_string(),
            dangerous_goods: false,
        }
    }
}

/// A customs line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub description: String,
    /// Harmonized System tariff code.
    pub hs_code: String,
    pub quantity: u32,
    pub value: f64,
    pub weight: f64,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            description: "foo".to_string(),
            hs_code: "1234567".to_string(),
            quantity: 1,
            value: 10.0,
            weight: 1.0,
        }
    }
}

/// Parameters of a shipment that are not part of the order itself.
///
/// # Examples
///
/// ```
/// use spring_courier::{Parcel, Product, ShipmentParams};
///
/// let params = ShipmentParams::new("PDF", "PPTT")
///     .with_parcel(Parcel {
///         weight: 2.5,
///         value: 120.0,
///         currency: "EUR".to_string(),
///         dangerous_goods: false,
///     })
///     .with_products(vec![Product {
///         description: "Wool scarf".to_string(),
///         hs_code: "6117100000".to_string(),
///         quantity: 2,
///         value: 60.0,
///         weight: 0.4,
///     }]);
///
/// assert_eq!(params.sender_country, "PL");
/// assert_eq!(params.products.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentParams {
    /// Label format code, e.g. `"PDF"`.
    pub label_format: String,
    /// Courier service identifier, e.g. `"PPTT"`.
    pub service: String,
    #[serde(default)]
    pub parcel: Parcel,
    #[serde(default = "default_products")]
    pub products: Vec<Product>,
    #[serde(default = "default_sender_country")]
    pub sender_country: String,
}

fn default_products() -> Vec<Product> {
    vec![Product::default()]
}

fn default_sender_country() -> String {
    "PL".to_string()
}

impl ShipmentParams {
    /// Creates parameters for the given label format and service, with the
    /// default single parcel and single product.
    pub fn new(label_format: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            label_format: label_format.into(),
            service: service.into(),
            parcel: Parcel::default(),
            products: default_products(),
            sender_country: default_sender_country(),
        }
    }

    pub fn with_parcel(mut self, parcel: Parcel) -> Self {
        self.parcel = parcel;
        self
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn with_sender_country(mut self, country: impl Into<String>) -> Self {
        self.sender_country = country.into();
        self
    }
}

/// Returns the MIME type of a label in the given format.
///
/// Unknown formats map to `application/octet-stream`.
///
/// ```
/// use spring_courier::order::label_content_type;
///
/// assert_eq!(label_content_type("PDF"), "application/pdf");
/// assert_eq!(label_content_type("zpl300"), "application/x-zpl");
/// assert_eq!(label_content_type("TIFF"), "application/octet-stream");
/// ```
pub fn label_content_type(format: &str) -> &'static str {
    match label_family(format) {
        Some(LabelFamily::Pdf) => "application/pdf",
        Some(LabelFamily::Png) => "image/png",
        Some(LabelFamily::Zpl) => "application/x-zpl",
        Some(LabelFamily::Epl) => "application/x-epl",
        None => "application/octet-stream",
    }
}

/// Returns the file extension for a label in the given format.
pub fn label_extension(format: &str) -> &'static str {
    match label_family(format) {
        Some(LabelFamily::Pdf) => "pdf",
        Some(LabelFamily::Png) => "png",
        Some(LabelFamily::Zpl) => "zpl",
        Some(LabelFamily::Epl) => "epl",
        None => "bin",
    }
}

enum LabelFamily {
    Pdf,
    Png,
    Zpl,
    Epl,
}

fn label_family(format: &str) -> Option<LabelFamily> {
    let format = format.trim().to_ascii_uppercase();
    match format.as_str() {
        "PDF" => Some(LabelFamily::Pdf),
        "PNG" => Some(LabelFamily::Png),
        "EPL" => Some(LabelFamily::Epl),
        // ZPL, ZPL200, ZPL300
        f if f.starts_with("ZPL") => Some(LabelFamily::Zpl),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_match_single_parcel_shipment() {
        let params = ShipmentParams::new("PDF", "PPTT");
        assert_eq!(params.parcel.weight, 1.0);
        assert_eq!(params.parcel.value, 20.0);
        assert_eq!(params.parcel.currency, "PLN");
        assert!(!params.parcel.dangerous_goods);
        assert_eq!(params.products, vec![Product::default()]);
        assert_eq!(params.sender_country, "PL");
    }

    #[test]
    fn test_order_missing_fields_deserialize_as_empty() {
        let order: Order = serde_json::from_str(r#"{"sender_fullname": "Jan Kowalski"}"#).unwrap();
        assert_eq!(order.sender_fullname, "Jan Kowalski");
        assert_eq!(order.sender_address, "");
        assert_eq!(order.delivery_country, "");
    }

    #[test]
    fn test_params_deserialize_with_defaults() {
        let params: ShipmentParams =
            serde_json::from_str(r#"{"label_format": "PDF", "service": "PPTT"}"#).unwrap();
        assert_eq!(params, ShipmentParams::new("PDF", "PPTT"));
    }

    #[test]
    fn test_label_extension() {
        assert_eq!(label_extension("pdf"), "pdf");
        assert_eq!(label_extension("PNG"), "png");
        assert_eq!(label_extension("ZPL200"), "zpl");
        assert_eq!(label_extension("EPL"), "epl");
        assert_eq!(label_extension(""), "bin");
    }
}
