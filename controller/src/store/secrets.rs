//! Secret store collaborator
//!
//! Payment credentials live outside the resource store and are read
//! fresh on every placement attempt; the controller never caches or
//! persists card material.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use commerce_client::{CreditCard, CreditCardType};
use shared::{Error, ResourceKey, Result};

/// Opaque keyed secret material
pub type SecretData = HashMap<String, Vec<u8>>;

/// Read access to secrets
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData>;
}

/// In-memory secret store
#[derive(Default)]
pub struct MemorySecrets {
    items: DashMap<ResourceKey, SecretData>,
}

impl MemorySecrets {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, namespace: &str, name: &str, data: SecretData) {
        self.items.insert(ResourceKey::new(namespace, name), data);
    }
}

#[async_trait]
impl SecretStore for MemorySecrets {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData> {
        self.items
            .get(&ResourceKey::new(namespace, name))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::not_found("Secret", format!("{namespace}/{name}")))
    }
}

/// Materialize a credit card from secret data
///
/// Requires `number`, `expiration`, `securityCode`, `cardType` (one of
/// the accepted brands, case-insensitive) and `zip`; anything missing or
/// unrecognized fails the pass with a configuration error.
pub fn credit_card_from_secret(data: &SecretData) -> Result<CreditCard> {
    let number = secret_field(data, "number")?;
    let expiration = secret_field(data, "expiration")?;
    let security_code = secret_field(data, "securityCode")?;
    let postal_code = secret_field(data, "zip")?;

    let card_type_raw = secret_field(data, "cardType")?;
    let card_type = CreditCardType::parse(&card_type_raw)
        .ok_or_else(|| Error::configuration(format!("unknown card type '{card_type_raw}'")))?;

    Ok(CreditCard {
        card_type,
        number,
        expiration,
        security_code,
        postal_code,
    })
}

fn secret_field(data: &SecretData, key: &str) -> Result<String> {
    let bytes = data
        .get(key)
        .ok_or_else(|| Error::configuration(format!("'{key}' not found in card secret")))?;

    String::from_utf8(bytes.clone())
        .map_err(|_| Error::configuration(format!("'{key}' in card secret is not valid utf-8")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_secret() -> SecretData {
        [
            ("number", "4100123412341234"),
            ("expiration", "0127"),
            ("securityCode", "123"),
            ("cardType", "Visa"),
            ("zip", "M5V0J4"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
        .collect()
    }

    #[test]
    fn full_secret_materializes() {
        let card = credit_card_from_secret(&card_secret()).unwrap();
        assert_eq!(card.card_type, CreditCardType::Visa);
        assert_eq!(card.number, "4100123412341234");
        assert_eq!(card.postal_code, "M5V0J4");
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let mut data = card_secret();
        data.remove("securityCode");

        let err = credit_card_from_secret(&data).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("securityCode"));
    }

    #[test]
    fn unknown_brand_is_a_configuration_error() {
        let mut data = card_secret();
        data.insert("cardType".to_string(), b"diners".to_vec());

        let err = credit_card_from_secret(&data).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let secrets = MemorySecrets::new();
        secrets.insert("default", "alice-card", card_secret());

        let data = secrets.get("default", "alice-card").await.unwrap();
        assert!(data.contains_key("number"));

        let err = secrets.get("default", "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
