//! The commerce HTTP client

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::dump::DumpHooks;
use crate::error::{ClientError, ClientResult};
use crate::types::{Address, Order, Product, Service, Store};
use crate::wire;

const PATH_PLACE_ORDER: &str = "/power/place-order";
const PATH_PRICE_ORDER: &str = "/power/price-order";
const PATH_STORE_LOCATOR: &str = "/power/store-locator";

/// Stateless client for the four order-management calls
///
/// Holds one pooled `reqwest` client with a per-request timeout; build
/// it once and share it. All calls return [`ClientError::Transport`] on
/// network faults and [`ClientError::Protocol`] on unexpected response
/// shapes.
#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
    dump: Option<Arc<dyn DumpHooks>>,
}

impl Client {
    /// Build a client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dump: config.dump.clone(),
        })
    }

    /// Locate stores near `address` that are open for `service`
    ///
    /// Result order is the service's own order, which it treats as
    /// proximity order; callers wanting "the closest few" truncate.
    pub async fn find_stores(
        &self,
        address: &Address,
        service: Service,
    ) -> ClientResult<Vec<Store>> {
        let url = self.url_with_params(
            PATH_STORE_LOCATOR,
            &[
                ("s", address.street()),
                (
                    "c",
                    format!(
                        "{}, {} {}",
                        address.city, address.region, address.postal_code
                    ),
                ),
                ("type", service.as_str().to_string()),
            ],
        )?;

        let body: wire::StoreLocatorResponse = self.get_json(url).await?;

        Ok(body
            .stores
            .into_iter()
            .filter(|store| store.serves(service))
            .map(wire::LocatorStore::into_store)
            .collect())
    }

    /// Fetch the preconfigured (ready-to-order) catalog of one store
    pub async fn fetch_menu(&self, store_id: &str) -> ClientResult<Vec<Product>> {
        let url = self.url_with_params(
            &format!("/power/store/{store_id}/menu"),
            &[
                ("lang", "en".to_string()),
                ("structured", "true".to_string()),
            ],
        )?;

        let body: wire::MenuResponse = self.get_json(url).await?;

        Ok(body.into_products())
    }

    /// Quote an order
    ///
    /// Payment fields are cleared before anything goes on the wire, no
    /// matter what the caller put in the order.
    pub async fn price_order(&self, order: &Order) -> ClientResult<Decimal> {
        let mut order = order.clone();
        order.credit_card = None;

        let msg = wire::order_message(&order);
        let body: wire::PriceResponse = self.post_json(PATH_PRICE_ORDER, &msg).await?;

        if body.status < 0 {
            return Err(ClientError::PricingRejected {
                code: body.order.corrective_action.code,
            });
        }

        Decimal::try_from(body.order.amounts.customer)
            .map_err(|e| ClientError::protocol(format!("amount {}: {e}", body.order.amounts.customer)))
    }

    /// Place an order, payment block included
    ///
    /// The one call with an external, non-idempotent effect; callers own
    /// the at-most-once guard, the client just executes.
    pub async fn place_order(&self, order: &Order) -> ClientResult<String> {
        let msg = wire::order_message(order);
        let body: wire::PlaceOrderResponse = self.post_json(PATH_PLACE_ORDER, &msg).await?;

        if body.status < 0 {
            return Err(ClientError::PlacementRejected {
                detail: wire::status_items_text(&body.order.status_items),
            });
        }

        if body.order.order_id.is_empty() {
            return Err(ClientError::protocol("place response carried no order id"));
        }

        Ok(body.order.order_id)
    }

    fn url_with_params(&self, path: &str, params: &[(&str, String)]) -> ClientResult<reqwest::Url> {
        reqwest::Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .map_err(|e| ClientError::protocol(format!("build url for '{path}': {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: reqwest::Url) -> ClientResult<T> {
        if let Some(dump) = &self.dump {
            dump.on_request("GET", url.as_str(), None);
        }

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if let Some(dump) = &self.dump {
            dump.on_response(status.as_u16(), &body);
        }

        if !status.is_success() {
            return Err(ClientError::protocol(format!(
                "GET {url}: unexpected status {status}"
            )));
        }

        serde_json::from_str(&body).map_err(|e| ClientError::protocol(format!("decode: {e}")))
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        payload: &B,
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);

        if let Some(dump) = &self.dump {
            let body = serde_json::to_string(payload)
                .map_err(|e| ClientError::protocol(format!("encode: {e}")))?;
            dump.on_request("POST", &url, Some(&body));
        }

        let response = self.client.post(&url).json(payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if let Some(dump) = &self.dump {
            dump.on_response(status.as_u16(), &body);
        }

        if !status.is_success() {
            return Err(ClientError::protocol(format!(
                "POST {url}: unexpected status {status}"
            )));
        }

        serde_json::from_str(&body).map_err(|e| ClientError::protocol(format!("decode: {e}")))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("dump", &self.dump.is_some())
            .finish()
    }
}
