//! Ships a sample order through the courier's test environment and saves the label.
//!
//! On failure, prints the HTTP status and JSON body a web front-end would answer with.
//!
//! Run with: `SPRING_API_KEY=... cargo run --example ship_order`

use spring_courier::{CourierClient, Order, ShipmentParams};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("spring_courier=info")
        .init();

    let api_key = std::env::var("SPRING_API_KEY").unwrap_or_else(|_| "f16753b55cac6c6e".to_string());

    let client = CourierClient::builder()
        .api_key(api_key)
        .test_environment()
        .timeout(Duration::from_secs(20))
        .build()?;

    let order = Order {
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
    };

    let params = ShipmentParams::new("PDF", "PPTT");

    match client.ship(&order, &params).await {
        Ok((shipment, label)) => {
            let file_name = label.file_name();
            std::fs::write(&file_name, label.as_bytes())?;
            println!("Tracking number: {}", shipment.tracking_number);
            println!(
                "Saved {} ({}, {} bytes)",
                file_name,
                label.content_type(),
                label.len()
            );
        }
        Err(e) => {
            println!("HTTP/1.1 {}", e.status());
            println!("Content-Type: application/json");
            println!();
            println!("{}", e.body());
        }
    }

    Ok(())
}
