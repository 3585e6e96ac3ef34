//! Commerce API seam
//!
//! Reconcilers depend on this trait instead of the concrete client, so
//! tests can script responses without a network.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::ClientResult;
use crate::types::{Address, Order, Product, Service, Store};
use crate::Client;

/// The four-call commerce protocol
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// Locate stores near an address, filtered to those open for `service`
    async fn find_stores(&self, address: &Address, service: Service) -> ClientResult<Vec<Store>>;

    /// Fetch one store's preconfigured catalog
    async fn fetch_menu(&self, store_id: &str) -> ClientResult<Vec<Product>>;

    /// Quote an order; never transmits payment data
    async fn price_order(&self, order: &Order) -> ClientResult<Decimal>;

    /// Place an order; the only call with a real-world effect
    async fn place_order(&self, order: &Order) -> ClientResult<String>;
}

#[async_trait]
impl CommerceApi for Client {
    async fn find_stores(&self, address: &Address, service: Service) -> ClientResult<Vec<Store>> {
        Client::find_stores(self, address, service).await
    }

    async fn fetch_menu(&self, store_id: &str) -> ClientResult<Vec<Product>> {
        Client::fetch_menu(self, store_id).await
    }

    async fn price_order(&self, order: &Order) -> ClientResult<Decimal> {
        Client::price_order(self, order).await
    }

    async fn place_order(&self, order: &Order) -> ClientResult<String> {
        Client::place_order(self, order).await
    }
}
