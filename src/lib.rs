//! # spring-courier - a typed client for the Spring GDS courier API
//!
//! Registers shipments with the courier and downloads their labels. Orders
//! are checked against the courier's field limits before anything is sent,
//! every failure is classified into a small [`ErrorKind`] taxonomy with an
//! HTTP status category, and the raw courier response is preserved for
//! debugging.
//!
//! ## Quick Start
//!
//! ```no_run
//! use spring_courier::{CourierClient, Order, ShipmentParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), spring_courier::Error> {
//!     let client = CourierClient::builder()
//!         .api_key("f16753b55cac6c6e")
//!         .test_environment()
//!         .build()?;
//!
//!     let order = Order {
//!         sender_company: "BaseLinker".to_string(),
//!         sender_fullname: "Jan Kowalski".to_string(),
//!         sender_address: "Kopernika 10".to_string(),
//!         sender_city: "Gdansk".to_string(),
//!         sender_postalcode: "80208".to_string(),
//!         sender_phone: "666666666".to_string(),
//!         delivery_fullname: "Maud Driant".to_string(),
//!         delivery_address: "Strada Foisorului, Nr. 16".to_string(),
//!         delivery_city: "Bucuresti".to_string(),
//!         delivery_postalcode: "031179".to_string(),
//!         delivery_country: "RO".to_string(),
//!         delivery_phone: "555555555".to_string(),
//!         ..Order::default()
//!     };
//!
//!     let shipment = client
//!         .create_shipment(&order, &ShipmentParams::new("PDF", "PPTT"))
//!         .await?;
//!     println!("Tracking number: {}", shipment.tracking_number);
//!
//!     let label = client.fetch_label(&shipment.tracking_number).await?;
//!     std::fs::write(label.file_name(), label.as_bytes()).ok();
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```no_run
//! use spring_courier::{CourierClient, Error, ErrorKind, Order, ShipmentParams};
//!
//! # async fn example(client: CourierClient, order: Order) {
//! match client.create_shipment(&order, &ShipmentParams::new("PDF", "PPTT")).await {
//!     Ok(shipment) => println!("Shipped: {}", shipment.tracking_number),
//!     Err(e) if e.kind() == ErrorKind::Validation => {
//!         // 400 with the per-field map as body
//!         eprintln!("{} {}", e.status(), e.body());
//!     }
//!     Err(Error::Rejected { level, message, .. }) => {
//!         eprintln!("Courier rejected the shipment (level {}): {}", level, message);
//!     }
//!     Err(e) => eprintln!("{} {}", e.status(), e),
//! }
//! # }
//! ```

mod client;
mod error;
pub mod order;
mod response;
pub mod validation;
mod wire;

pub use client::{
    CourierClient, CourierClientBuilder, LabelDocument, ShipmentResult, PRODUCTION_ENDPOINT,
    TEST_ENDPOINT,
};
pub use error::{Error, ErrorKind, RejectionLevel, Result};
pub use order::{Order, Parcel, Product, ShipmentParams};
pub use response::Response;
pub use validation::{Side, ValidationErrors};
