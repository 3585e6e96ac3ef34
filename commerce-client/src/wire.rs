//! Wire documents for the commerce order-management API
//!
//! The service speaks PascalCase JSON; these types mirror its shapes
//! exactly and stay private to the crate. Conversions into the crate's
//! domain types live here next to the documents they read.

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::types::{Order, Product, Service, Store};

// ==================== Outbound: order document ====================

#[derive(Debug, Serialize)]
pub(crate) struct OrderMessage {
    #[serde(rename = "Order")]
    pub order: WireOrder,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireOrder {
    #[serde(rename = "Address")]
    pub address: StreetAddr,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "LanguageCode")]
    pub language_code: String,
    #[serde(rename = "ServiceMethod")]
    pub service_method: String,
    #[serde(rename = "StoreID")]
    pub store_id: String,
    #[serde(rename = "Payments")]
    pub payments: Vec<WirePayment>,
    #[serde(rename = "Products")]
    pub products: Vec<WireProduct>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StreetAddr {
    #[serde(rename = "Street")]
    pub street: String,
    #[serde(rename = "StreetNumber")]
    pub street_number: String,
    #[serde(rename = "StreetName")]
    pub street_name: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "PostalCode")]
    pub postal_code: String,
    #[serde(rename = "Type")]
    pub addr_type: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct WirePayment {
    #[serde(rename = "Type")]
    pub payment_type: String,
    #[serde(rename = "CardType")]
    pub card_type: String,
    #[serde(rename = "Number")]
    pub number: String,
    #[serde(rename = "Expiration")]
    pub expiration: String,
    #[serde(rename = "SecurityCode")]
    pub security_code: String,
    #[serde(rename = "PostalCode")]
    pub postal_code: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireProduct {
    #[serde(rename = "Code")]
    pub code: String,
    /// Sequence index of the line within the order
    #[serde(rename = "ID")]
    pub id: usize,
    #[serde(rename = "Qty")]
    pub qty: u32,
}

/// Build the order document the price and place endpoints share
///
/// The payment block is emitted only when a non-empty card number is
/// present; pricing callers pass an order with the card already cleared
/// and therefore always produce a payment-free document.
pub(crate) fn order_message(order: &Order) -> OrderMessage {
    let mut payments = Vec::new();
    if let Some(card) = order
        .credit_card
        .as_ref()
        .filter(|card| !card.number.is_empty())
    {
        payments.push(WirePayment {
            payment_type: "DoorCredit".to_string(),
            card_type: card.card_type.as_str().to_string(),
            number: card.number.clone(),
            expiration: card.expiration.clone(),
            security_code: card.security_code.clone(),
            postal_code: card.postal_code.clone(),
            amount: order
                .amount
                .and_then(|amount| amount.to_f64())
                .unwrap_or(0.0),
        });
    }

    let products = order
        .lines
        .iter()
        .enumerate()
        .map(|(idx, line)| WireProduct {
            code: line.code.clone(),
            id: idx,
            qty: line.quantity,
        })
        .collect();

    OrderMessage {
        order: WireOrder {
            address: StreetAddr {
                street: order.address.street(),
                street_number: order.address.street_number.clone(),
                street_name: order.address.street_name.clone(),
                city: order.address.city.clone(),
                region: order.address.region.clone(),
                postal_code: order.address.postal_code.clone(),
                addr_type: "House".to_string(),
            },
            first_name: order.first_name.clone(),
            last_name: order.last_name.clone(),
            email: order.email.clone(),
            phone: order.phone.clone(),
            language_code: "en".to_string(),
            service_method: order.service.as_str().to_string(),
            store_id: order.store_id.clone(),
            payments,
            products,
        },
    }
}

// ==================== Inbound: locator ====================

#[derive(Debug, Deserialize)]
pub(crate) struct StoreLocatorResponse {
    #[serde(rename = "Stores", default)]
    pub stores: Vec<LocatorStore>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocatorStore {
    #[serde(rename = "StoreID")]
    pub store_id: String,
    #[serde(rename = "Phone", default)]
    pub phone: String,
    #[serde(rename = "AddressDescription", default)]
    pub address_description: String,
    #[serde(rename = "IsOpen", default)]
    pub is_open: bool,
    #[serde(rename = "ServiceIsOpen", default)]
    pub service_is_open: ServiceIsOpen,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServiceIsOpen {
    #[serde(rename = "Carryout", default)]
    pub carryout: bool,
    #[serde(rename = "Delivery", default)]
    pub delivery: bool,
}

impl LocatorStore {
    /// Open at all, and open for the requested service method
    pub fn serves(&self, service: Service) -> bool {
        if !self.is_open {
            return false;
        }
        match service {
            Service::Carryout => self.service_is_open.carryout,
            Service::Delivery => self.service_is_open.delivery,
        }
    }

    pub fn into_store(self) -> Store {
        Store {
            id: self.store_id,
            phone: self.phone,
            address: self.address_description,
        }
    }
}

// ==================== Inbound: menu ====================

#[derive(Debug, Deserialize)]
pub(crate) struct MenuResponse {
    #[serde(rename = "PreconfiguredProducts", default)]
    pub preconfigured: HashMap<String, PreconfiguredProduct>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreconfiguredProduct {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Size", default)]
    pub size: String,
}

impl MenuResponse {
    /// Map the preconfigured entries into catalog products
    pub fn into_products(self) -> Vec<Product> {
        self.preconfigured
            .into_values()
            .map(|entry| Product {
                id: entry.code,
                name: entry.name,
                description: entry.description,
                size: entry.size,
            })
            .collect()
    }
}

// ==================== Inbound: price ====================

#[derive(Debug, Deserialize)]
pub(crate) struct PriceResponse {
    #[serde(rename = "Status", default)]
    pub status: i64,
    #[serde(rename = "Order", default)]
    pub order: PriceResponseOrder,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PriceResponseOrder {
    #[serde(rename = "Amounts", default)]
    pub amounts: Amounts,
    #[serde(rename = "CorrectiveAction", default)]
    pub corrective_action: CorrectiveAction,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Amounts {
    #[serde(rename = "Customer", default)]
    pub customer: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CorrectiveAction {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Detail", default)]
    pub detail: String,
}

// ==================== Inbound: place ====================

#[derive(Debug, Deserialize)]
pub(crate) struct PlaceOrderResponse {
    #[serde(rename = "Status", default)]
    pub status: i64,
    #[serde(rename = "Order", default)]
    pub order: PlaceResponseOrder,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlaceResponseOrder {
    #[serde(rename = "OrderID", default)]
    pub order_id: String,
    #[serde(rename = "StatusItems", default)]
    pub status_items: Vec<StatusItem>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusItem {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "PulseText", default)]
    pub pulse_text: String,
}

/// Join status items into one human-readable rejection detail
pub(crate) fn status_items_text(items: &[StatusItem]) -> String {
    items
        .iter()
        .map(|item| {
            if item.pulse_text.is_empty() {
                item.code.clone()
            } else {
                format!("{} {}", item.code, item.pulse_text)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
