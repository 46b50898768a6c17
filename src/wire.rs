//! JSON envelopes exchanged with the courier API.
//!
//! Every call is a POST of `{"Apikey", "Command", "Shipment": {...}}` and every
//! answer is `{"ErrorLevel", "Error", "Shipment": {...}}`. The API expects
//! numeric attributes as JSON strings.

use crate::order::{Order, Product, ShipmentParams};
use crate::validation::split_address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) enum Command {
    OrderShipment,
    GetShipmentLabel,
}

impl Command {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Command::OrderShipment => "OrderShipment",
            Command::GetShipmentLabel => "GetShipmentLabel",
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiRequest<'a, S> {
    #[serde(rename = "Apikey")]
    pub api_key: &'a str,
    #[serde(rename = "Command")]
    pub command: Command,
    #[serde(rename = "Shipment")]
    pub shipment: S,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct OrderShipment<'a> {
    pub label_format: &'a str,
    pub service: &'a str,
    #[serde(serialize_with = "as_string")]
    pub weight: f64,
    #[serde(serialize_with = "as_string")]
    pub value: f64,
    pub currency: &'a str,
    #[serde(serialize_with = "yes_no")]
    pub dangerous_goods: bool,
    pub consignor_address: Address<'a>,
    pub consignee_address: Address<'a>,
    pub products: Vec<WireProduct<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Address<'a> {
    pub name: &'a str,
    pub company: &'a str,
    pub address_line1: &'a str,
    pub address_line2: &'a str,
    pub address_line3: &'a str,
    pub city: &'a str,
    pub zip: &'a str,
    pub country: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireProduct<'a> {
    pub description: &'a str,
    pub hs_code: &'a str,
    #[serde(serialize_with = "as_string")]
    pub quantity: u32,
    #[serde(serialize_with = "as_string")]
    pub value: f64,
    #[serde(serialize_with = "as_string")]
    pub weight: f64,
}

impl<'a> From<&'a Product> for WireProduct<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            description: &product.description,
            hs_code: &product.hs_code,
            quantity: product.quantity,
            value: product.value,
            weight: product.weight,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LabelRequest<'a> {
    pub label_format: &'a str,
    pub tracking_number: &'a str,
}

impl<'a> ApiRequest<'a, OrderShipment<'a>> {
    /// Builds an `OrderShipment` request. The order is expected to have passed validation.
    pub(crate) fn order_shipment(
        api_key: &'a str,
        order: &'a Order,
        params: &'a ShipmentParams,
    ) -> Self {
        let sender_lines = split_address(&order.sender_address);
        let delivery_lines = split_address(&order.delivery_address);

        Self {
            api_key,
            command: Command::OrderShipment,
            shipment: OrderShipment {
                label_format: &params.label_format,
                service: &params.service,
                weight: params.parcel.weight,
                value: params.parcel.value,
                currency: &params.parcel.currency,
                dangerous_goods: params.parcel.dangerous_goods,
                consignor_address: Address {
                    name: &order.sender_fullname,
                    company: &order.sender_company,
                    address_line1: line(&sender_lines, 0),
                    address_line2: line(&sender_lines, 1),
                    address_line3: line(&sender_lines, 2),
                    city: &order.sender_city,
                    zip: &order.sender_postalcode,
                    country: &params.sender_country,
                    phone: None,
                    email: None,
                },
                consignee_address: Address {
                    name: &order.delivery_fullname,
                    company: &order.delivery_company,
                    address_line1: line(&delivery_lines, 0),
                    address_line2: line(&delivery_lines, 1),
                    address_line3: line(&delivery_lines, 2),
                    city: &order.delivery_city,
                    zip: &order.delivery_postalcode,
                    country: &order.delivery_country,
                    phone: Some(order.delivery_phone.as_str()),
                    email: Some(order.delivery_email.as_str()),
                },
                products: params.products.iter().map(WireProduct::from).collect(),
            },
        }
    }
}

impl<'a> ApiRequest<'a, LabelRequest<'a>> {
    pub(crate) fn shipment_label(
        api_key: &'a str,
        tracking_number: &'a str,
        label_format: &'a str,
    ) -> Self {
        Self {
            api_key,
            command: Command::GetShipmentLabel,
            shipment: LabelRequest {
                label_format,
                tracking_number,
            },
        }
    }
}

fn line<'a>(lines: &[&'a str], idx: usize) -> &'a str {
    lines.get(idx).copied().unwrap_or("")
}

fn as_string<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn yes_no<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "Y" } else { "N" })
}

/// The response envelope shared by every command.
///
/// `Shipment` is kept as raw JSON: error responses may carry it in a shape
/// that does not match the success payload, and it is only read once the
/// error level says the call succeeded.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope {
    #[serde(rename = "ErrorLevel", default, deserialize_with = "error_level")]
    pub error_level: Option<i64>,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
    #[serde(rename = "Shipment", default)]
    pub shipment: Option<serde_json::Value>,
}

impl ApiEnvelope {
    /// The API's error message, or an empty string.
    pub(crate) fn message(&self) -> &str {
        self.error.as_deref().unwrap_or("")
    }

    /// Reads a non-empty string field of the `Shipment` object.
    pub(crate) fn shipment_str(&self, field: &str) -> Option<&str> {
        self.shipment
            .as_ref()?
            .get(field)?
            .as_str()
            .filter(|value| !value.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelRepr {
    Number(i64),
    Text(String),
}

fn error_level<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LevelRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LevelRepr::Number(level)) => Ok(Some(level)),
        Some(LevelRepr::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid ErrorLevel {:?}", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order() -> Order {
        Order {
            sender_company: "BaseLinker".to_string(),
            sender_fullname: "Jan Kowalski".to_string(),
            sender_address: "Kopernika 10".to_string(),
            sender_city: "Gdansk".to_string(),
            sender_postalcode: "80208".to_string(),
            sender_phone: "666666666".to_string(),
            delivery_company: "Spring GDS".to_string(),
            delivery_fullname: "Maud Driant".to_string(),
            delivery_address: "Strada Foisorului, Nr. 16, Bl. F11C, Sc. 1, Ap. 10".to_string(),
            delivery_city: "Bucuresti, Sector 3".to_string(),
            delivery_postalcode: "031179".to_string(),
            delivery_country: "RO".to_string(),
            delivery_email: "john@doe.com".to_string(),
            delivery_phone: "555555555".to_string(),
            ..Order::default()
        }
    }

    #[test]
    fn test_order_shipment_serialization() {
        let order = order();
        let params = ShipmentParams::new("PDF", "PPTT");
        let request = ApiRequest::order_shipment("key", &order, &params);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "Apikey": "key",
                "Command": "OrderShipment",
                "Shipment": {
                    "LabelFormat": "PDF",
                    "Service": "PPTT",
                    "Weight": "1",
                    "Value": "20",
                    "Currency": "PLN",
                    "DangerousGoods": "N",
                    "ConsignorAddress": {
                        "Name": "Jan Kowalski",
                        "Company": "BaseLinker",
                        "AddressLine1": "Kopernika 10",
                        "AddressLine2": "",
                        "AddressLine3": "",
                        "City": "Gdansk",
                        "Zip": "80208",
                        "Country": "PL"
                    },
                    "ConsigneeAddress": {
                        "Name": "Maud Driant",
                        "Company": "Spring GDS",
                        "AddressLine1": "Strada Foisorului, Nr. 16, Bl.",
                        "AddressLine2": " F11C, Sc. 1, Ap. 10",
                        "AddressLine3": "",
                        "City": "Bucuresti, Sector 3",
                        "Zip": "031179",
                        "Country": "RO",
                        "Phone": "555555555",
                        "Email": "john@doe.com"
                    },
                    "Products": [{
                        "Description": "foo",
                        "HsCode": "1234567",
                        "Quantity": "1",
                        "Value": "10",
                        "Weight": "1"
                    }]
                }
            })
        );
    }

    #[test]
    fn test_fractional_weight_and_dangerous_goods() {
        let order = order();
        let mut params = ShipmentParams::new("PDF", "PPTT");
        params.parcel.weight = 2.5;
        params.parcel.dangerous_goods = true;

        let json = serde_json::to_value(ApiRequest::order_shipment("key", &order, &params)).unwrap();
        assert_eq!(json["Shipment"]["Weight"], "2.5");
        assert_eq!(json["Shipment"]["DangerousGoods"], "Y");
    }

    #[test]
    fn test_label_request_serialization() {
        let request = ApiRequest::shipment_label("key", "XYZ123", "PDF");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "Apikey": "key",
                "Command": "GetShipmentLabel",
                "Shipment": {"LabelFormat": "PDF", "TrackingNumber": "XYZ123"}
            })
        );
    }

    #[test]
    fn test_envelope_accepts_numeric_and_text_levels() {
        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"ErrorLevel": 0, "Error": "", "Shipment": {"TrackingNumber": "T1"}}"#)
                .unwrap();
        assert_eq!(envelope.error_level, Some(0));
        assert_eq!(envelope.shipment_str("TrackingNumber"), Some("T1"));

        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"ErrorLevel": "10", "Error": "Bad zip", "Shipment": []}"#).unwrap();
        assert_eq!(envelope.error_level, Some(10));
        assert_eq!(envelope.message(), "Bad zip");
        assert_eq!(envelope.shipment_str("TrackingNumber"), None);
    }

    #[test]
    fn test_envelope_missing_fields() {
        let envelope: ApiEnvelope = serde_json::from_str("{}").unwrap();
        assert_eq!(envelope.error_level, None);
        assert_eq!(envelope.message(), "");
        assert!(envelope.shipment.is_none());

        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"ErrorLevel": 0, "Shipment": {"LabelImage": ""}}"#).unwrap();
        assert_eq!(envelope.shipment_str("LabelImage"), None);
    }
}
