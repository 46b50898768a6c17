//! Pre-flight checks on an [`Order`] before it is sent to the courier.
//!
//! The courier API rejects over-long fields with terse messages, so the
//! limits it enforces are checked locally and reported per field. Every rule
//! runs; violations accumulate in a [`ValidationErrors`] set instead of
//! stopping at the first one.
//!
//! Lengths are counted in characters (Unicode scalar values).

use crate::order::Order;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Width of a single address line accepted by the courier.
pub const ADDRESS_CHUNK_LEN: usize = 30;
/// Number of address lines accepted by the courier.
pub const MAX_ADDRESS_CHUNKS: usize = 3;

const MAX_FULLNAME_LEN: usize = 30;
const MAX_COMPANY_LEN: usize = 30;
const MAX_CITY_LEN: usize = 30;
const MAX_POSTALCODE_LEN: usize = 20;
const MAX_PHONE_LEN: usize = 15;

/// Which party of the order a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Sender,
    Delivery,
}

impl Side {
    /// The field-name prefix of this side, e.g. `sender`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Sender => "sender",
            Side::Delivery => "delivery",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Side::Sender => "Sender",
            Side::Delivery => "Delivery",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation failures, grouped by side.
///
/// Serializes as `{"sender": {"sender_city": "..."}, "delivery": {...}}`.
///
/// # Examples
///
/// ```
/// use spring_courier::{Order, Side};
/// use spring_courier::validation::validate_order;
///
/// let order = Order {
///     sender_address: "Kopernika 10".to_string(),
///     delivery_address: String::new(),
///     delivery_phone: "+48 555 555 555 555".to_string(),
///     ..Order::default()
/// };
///
/// let errors = validate_order(&order).unwrap_err();
/// assert_eq!(errors.len(), 2);
/// assert_eq!(
///     errors.get(Side::Delivery, "delivery_address"),
///     Some("Delivery address is empty")
/// );
/// assert!(errors.contains(Side::Delivery, "delivery_phone"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<Side, BTreeMap<String, String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation. A later message for the same field replaces the earlier one.
    pub fn insert(&mut self, side: Side, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(side)
            .or_default()
            .insert(field.into(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.values().all(BTreeMap::is_empty)
    }

    /// Total number of violated fields across both sides.
    pub fn len(&self) -> usize {
        self.errors.values().map(BTreeMap::len).sum()
    }

    pub fn get(&self, side: Side, field: &str) -> Option<&str> {
        self.errors.get(&side)?.get(field).map(String::as_str)
    }

    pub fn contains(&self, side: Side, field: &str) -> bool {
        self.get(side, field).is_some()
    }

    /// Returns the violations recorded for one side.
    pub fn side(&self, side: Side) -> Option<&BTreeMap<String, String>> {
        self.errors.get(&side)
    }

    /// Iterates over `(side, field, message)` triples, sender side first.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &str, &str)> {
        self.errors.iter().flat_map(|(side, fields)| {
            fields
                .iter()
                .map(move |(field, message)| (*side, field.as_str(), message.as_str()))
        })
    }

    /// Returns `Err(self)` if any violation was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (_, field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
        }
        Ok(())
    }
}

/// Splits an address into lines of at most [`ADDRESS_CHUNK_LEN`] characters.
///
/// An empty address yields a single empty line.
///
/// ```
/// use spring_courier::validation::split_address;
///
/// let address = "a".repeat(60);
/// let lines = split_address(&address);
/// assert_eq!(lines.len(), 2);
/// assert!(lines.iter().all(|line| line.len() == 30));
///
/// assert_eq!(split_address(""), vec![""]);
/// ```
pub fn split_address(address: &str) -> Vec<&str> {
    if address.is_empty() {
        return vec![""];
    }

    let mut chunks = Vec::new();
    let mut rest = address;
    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(ADDRESS_CHUNK_LEN)
            .map_or(rest.len(), |(idx, _)| idx);
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

/// Checks every field limit of `order` and returns all violations.
pub fn validate_order(order: &Order) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_address(&mut errors, Side::Sender, &order.sender_address);
    check_address(&mut errors, Side::Delivery, &order.delivery_address);

    let limits: [(Side, &str, &str, &str, usize); 10] = [
        (Side::Sender, "fullname", "full name", order.sender_fullname.as_str(), MAX_FULLNAME_LEN),
        (Side::Delivery, "fullname", "full name", order.delivery_fullname.as_str(), MAX_FULLNAME_LEN),
        (Side::Sender, "company", "company", order.sender_company.as_str(), MAX_COMPANY_LEN),
        (Side::Delivery, "company", "company", order.delivery_company.as_str(), MAX_COMPANY_LEN),
        (Side::Sender, "city", "city", order.sender_city.as_str(), MAX_CITY_LEN),
        (Side::Delivery, "city", "city", order.delivery_city.as_str(), MAX_CITY_LEN),
        (Side::Sender, "postalcode", "postal code", order.sender_postalcode.as_str(), MAX_POSTALCODE_LEN),
        (Side::Delivery, "postalcode", "postal code", order.delivery_postalcode.as_str(), MAX_POSTALCODE_LEN),
        (Side::Sender, "phone", "phone", order.sender_phone.as_str(), MAX_PHONE_LEN),
        (Side::Delivery, "phone", "phone", order.delivery_phone.as_str(), MAX_PHONE_LEN),
    ];

    for (side, field, label, value, max) in limits {
        if value.chars().count() > max {
            errors.insert(
                side,
                format!("{}_{}", side, field),
                format!("{} {} maximum {} characters", side.title(), label, max),
            );
        }
    }

    errors.into_result()
}

fn check_address(errors: &mut ValidationErrors, side: Side, address: &str) {
    let field = format!("{}_address", side);
    if address.is_empty() {
        errors.insert(side, field, format!("{} address is empty", side.title()));
    } else if split_address(address).len() > MAX_ADDRESS_CHUNKS {
        errors.insert(
            side,
            field,
            format!(
                "{} address maximum {} characters",
                side.title(),
                ADDRESS_CHUNK_LEN * MAX_ADDRESS_CHUNKS
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_order() -> Order {
        Order {
            sender_company: "BaseLinker".to_string(),
            sender_fullname: "Jan Kowalski".to_string(),
            sender_address: "Kopernika 10".to_string(),
            sender_city: "Gdansk".to_string(),
            sender_postalcode: "80208".to_string(),
            sender_email: String::new(),
            sender_phone: "666666666".to_string(),
            delivery_company: "Spring GDS".to_string(),
            delivery_fullname: "Maud Driant".to_string(),
            delivery_address: "Strada Foisorului, Nr. 16, Bl. F11C, Sc. 1, Ap. 10".to_string(),
            delivery_city: "Bucuresti, Sector 3".to_string(),
            delivery_postalcode: "031179".to_string(),
            delivery_country: "RO".to_string(),
            delivery_email: "john@doe.com".to_string(),
            delivery_phone: "555555555".to_string(),
        }
    }

    #[test]
    fn test_valid_order_passes() {
        assert_eq!(validate_order(&valid_order()), Ok(()));
    }

    #[test]
    fn test_split_address_boundaries() {
        assert_eq!(split_address(&"x".repeat(30)).len(), 1);
        assert_eq!(split_address(&"x".repeat(31)).len(), 2);
        assert_eq!(split_address(&"x".repeat(90)).len(), 3);
        assert_eq!(split_address(&"x".repeat(91)).len(), 4);
    }

    #[test]
    fn test_split_address_keeps_multibyte_characters_whole() {
        let address = "ż".repeat(45);
        let chunks = split_address(&address);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 30);
        assert_eq!(chunks[1].chars().count(), 15);
        assert_eq!(chunks.concat(), address);
    }

    #[test]
    fn test_address_of_90_characters_is_accepted() {
        let mut order = valid_order();
        order.sender_address = "a".repeat(90);
        assert!(validate_order(&order).is_ok());
    }

    #[test]
    fn test_address_over_90_characters_is_rejected() {
        let mut order = valid_order();
        order.delivery_address = "a".repeat(91);
        let errors = validate_order(&order).unwrap_err();
        assert_eq!(
            errors.get(Side::Delivery, "delivery_address"),
            Some("Delivery address maximum 90 characters")
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_empty_addresses_are_rejected() {
        let mut order = valid_order();
        order.sender_address.clear();
        order.delivery_address.clear();
        let errors = validate_order(&order).unwrap_err();
        assert_eq!(
            errors.get(Side::Sender, "sender_address"),
            Some("Sender address is empty")
        );
        assert_eq!(
            errors.get(Side::Delivery, "delivery_address"),
            Some("Delivery address is empty")
        );
    }

    #[test]
    fn test_all_violations_accumulate() {
        let order = Order {
            sender_company: "c".repeat(31),
            sender_fullname: "n".repeat(31),
            sender_address: String::new(),
            sender_city: "x".repeat(31),
            sender_postalcode: "1".repeat(21),
            sender_phone: "5".repeat(16),
            delivery_company: "c".repeat(31),
            delivery_fullname: "n".repeat(31),
            delivery_address: "a".repeat(91),
            delivery_city: "x".repeat(31),
            delivery_postalcode: "1".repeat(21),
            delivery_phone: "5".repeat(16),
            ..Order::default()
        };

        let errors = validate_order(&order).unwrap_err();
        assert_eq!(errors.len(), 12);
        for side in [Side::Sender, Side::Delivery] {
            for field in ["address", "fullname", "company", "city", "postalcode", "phone"] {
                let key = format!("{}_{}", side, field);
                assert!(errors.contains(side, &key), "missing {}", key);
            }
        }
    }

    #[test]
    fn test_delivery_phone_is_reported_under_its_own_field() {
        let mut order = valid_order();
        order.delivery_phone = "5".repeat(16);
        let errors = validate_order(&order).unwrap_err();
        assert_eq!(
            errors.get(Side::Delivery, "delivery_phone"),
            Some("Delivery phone maximum 15 characters")
        );
        assert!(!errors.contains(Side::Delivery, "sender_phone"));
        assert!(errors.side(Side::Sender).is_none());
    }

    #[test]
    fn test_limits_are_inclusive() {
        let mut order = valid_order();
        order.sender_fullname = "n".repeat(30);
        order.sender_postalcode = "1".repeat(20);
        order.delivery_phone = "5".repeat(15);
        assert!(validate_order(&order).is_ok());
    }

    #[test]
    fn test_errors_serialize_grouped_by_side() {
        let mut errors = ValidationErrors::new();
        errors.insert(Side::Delivery, "delivery_city", "Delivery city maximum 30 characters");
        errors.insert(Side::Sender, "sender_address", "Sender address is empty");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sender": {"sender_address": "Sender address is empty"},
                "delivery": {"delivery_city": "Delivery city maximum 30 characters"}
            })
        );
        assert_eq!(
            errors.to_string(),
            "sender_address: Sender address is empty; delivery_city: Delivery city maximum 30 characters"
        );
    }
}
