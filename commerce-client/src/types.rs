//! Domain values exchanged with the commerce service

use rust_decimal::Decimal;

/// Service method for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Delivery,
    Carryout,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivery => "Delivery",
            Self::Carryout => "Carryout",
        }
    }
}

/// Accepted card brands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditCardType {
    Mastercard,
    Visa,
    Amex,
}

impl CreditCardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mastercard => "MASTERCARD",
            Self::Visa => "VISA",
            Self::Amex => "AMEX",
        }
    }

    /// Parse a card brand, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mastercard" => Some(Self::Mastercard),
            "visa" => Some(Self::Visa),
            "amex" => Some(Self::Amex),
            _ => None,
        }
    }
}

/// Payment card, materialized only at placement time and never persisted
#[derive(Clone, PartialEq, Eq)]
pub struct CreditCard {
    pub card_type: CreditCardType,
    pub number: String,
    pub expiration: String,
    pub security_code: String,
    pub postal_code: String,
}

// Card number and security code stay out of logs.
impl std::fmt::Debug for CreditCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditCard")
            .field("card_type", &self.card_type)
            .field("number", &"<redacted>")
            .field("expiration", &self.expiration)
            .field("security_code", &"<redacted>")
            .field("postal_code", &self.postal_code)
            .finish()
    }
}

/// Postal address used for store lookup and order delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub street_number: String,
    pub street_name: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
}

impl Address {
    /// "streetNumber streetName" composite the service expects
    pub fn street(&self) -> String {
        format!("{} {}", self.street_number, self.street_name)
    }
}

/// A store as returned by the locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    pub id: String,
    pub phone: String,
    pub address: String,
}

/// A preconfigured catalog entry from a store menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub size: String,
}

/// One order line: a catalog code and how many of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub code: String,
    pub quantity: u32,
}

/// Protocol-ready order payload
///
/// Built by the assembler from resource state. `credit_card` is `None`
/// for pricing; even when set, the pricing call strips it again before
/// anything goes on the wire.
#[derive(Debug, Clone)]
pub struct Order {
    pub store_id: String,
    pub service: Service,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,

    pub address: Address,
    pub lines: Vec<OrderLine>,

    pub credit_card: Option<CreditCard>,
    /// Quoted amount, required by the payment block when placing
    pub amount: Option<Decimal>,
}
