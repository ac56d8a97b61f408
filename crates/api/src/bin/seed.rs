//! Seed the database with ST-themed demo data.
//!
//! Idempotent: a database that already has customers is left alone.

use std::sync::Arc;

use storders_api::config::Config;
use storders_catalog::NewProduct;
use storders_directory::NewCustomer;
use storders_infra::{
    CustomerFilter, CustomerStore, OrderStore, Page, PostgresStore, ProductStore,
};
use storders_orders::{NewOrder, NewOrderItem};

fn customers() -> Vec<NewCustomer> {
    let entry = |company: &str, contact: &str, email: &str, city: &str, country: &str| {
        NewCustomer {
            company_name: company.to_string(),
            contact_name: contact.to_string(),
            contact_email: email.to_string(),
            phone: None,
            address: None,
            city: Some(city.to_string()),
            country: Some(country.to_string()),
        }
    };
    vec![
        entry("TechFusion GmbH", "Klaus Weber", "k.weber@techfusion.de", "Munich", "Germany"),
        entry("Sakura Electronics Co.", "Yuki Tanaka", "y.tanaka@sakuraelec.jp", "Tokyo", "Japan"),
        entry("Sierra Circuits Inc.", "Emily Chen", "e.chen@sierracircuits.com", "San Jose", "USA"),
        entry("Cambridge Embedded Systems", "James O'Brien", "j.obrien@cambridgeembedded.co.uk", "Cambridge", "UK"),
        entry("Nordic Sensor AB", "Erik Lindqvist", "e.lindqvist@nordicsensor.se", "Stockholm", "Sweden"),
    ]
}

fn products() -> Vec<NewProduct> {
    let entry = |part: &str, name: &str, category: &str, family: &str, price: &str, stock: i32, lead: i32| {
        NewProduct {
            part_number: part.to_string(),
            name: name.to_string(),
            description: None,
            category: category.to_string(),
            family: Some(family.to_string()),
            unit_price: price.parse().expect("seed price"),
            currency: "USD".to_string(),
            stock_quantity: stock,
            lead_time_days: Some(lead),
        }
    };
    vec![
        entry("STM32F407VGT6", "STM32F407 MCU 168MHz 1MB Flash", "Microcontrollers", "STM32F4", "8.5200", 15000, 12),
        entry("STM32F411CEU6", "STM32F411 MCU 100MHz 512KB Flash", "Microcontrollers", "STM32F4", "3.9800", 35000, 8),
        entry("STM32G030F6P6", "STM32G030 Baseline MCU", "Microcontrollers", "STM32G0", "0.7800", 100000, 6),
        entry("STM32H743ZIT6", "STM32H743 High-Performance MCU", "Microcontrollers", "STM32H7", "14.3500", 8000, 18),
        entry("LIS3DHTR", "LIS3DH 3-axis Accelerometer", "MEMS Sensors", "LIS", "1.1500", 50000, 8),
        entry("LSM6DSOTR", "LSM6DSO IMU 6-axis", "MEMS Sensors", "LSM", "2.8500", 30000, 10),
        entry("L7805CV", "L7805 5V Voltage Regulator", "Power Management", "L78", "0.4200", 150000, 6),
        entry("BLUENRG-M2SP", "BlueNRG-M2 BLE Module", "Wireless", "BlueNRG", "4.7500", 10000, 16),
    ]
}

#[tokio::main]
async fn main() {
    storders_observability::init();

    let config = Config::from_env();
    let store = PostgresStore::connect(&config.database_url)
        .await
        .expect("failed to connect to database");
    store.migrate().await.expect("failed to run migrations");
    let store = Arc::new(store);

    let existing = store
        .list_customers(CustomerFilter::default(), Page::new(0, 1))
        .await
        .expect("failed to inspect customers");
    if !existing.is_empty() {
        tracing::info!("database already seeded, nothing to do");
        return;
    }

    let mut customer_ids = Vec::new();
    for new in customers() {
        let customer = store
            .create_customer(new)
            .await
            .expect("failed to seed customer");
        customer_ids.push(customer.id);
    }

    let mut product_ids = Vec::new();
    for new in products() {
        let product = store
            .create_product(new)
            .await
            .expect("failed to seed product");
        product_ids.push(product.id);
    }

    // A few orders so list views have something to show.
    let orders = [
        (customer_ids[0], vec![(product_ids[0], 100), (product_ids[6], 500)]),
        (customer_ids[1], vec![(product_ids[4], 2000)]),
        (customer_ids[2], vec![(product_ids[3], 50), (product_ids[7], 25)]),
    ];
    for (customer_id, lines) in orders {
        let new = NewOrder {
            customer_id,
            shipping_address: None,
            notes: Some("seed order".to_string()),
            items: lines
                .into_iter()
                .map(|(product_id, quantity)| NewOrderItem {
                    product_id,
                    quantity,
                })
                .collect(),
        };
        store.create_order(new).await.expect("failed to seed order");
    }

    tracing::info!(
        customers = customer_ids.len(),
        products = product_ids.len(),
        "seed complete"
    );
}
