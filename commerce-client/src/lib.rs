//! HTTP/JSON client for the commerce service's order endpoints
//!
//! Four stateless calls against the service's order-management API:
//!
//! - [`Client::find_stores`] — locate open stores near an address
//! - [`Client::fetch_menu`] — preconfigured catalog of one store
//! - [`Client::price_order`] — quote an order, never sends payment data
//! - [`Client::place_order`] — the one call with a real-world effect
//!
//! The client is built once at process start and shared by reference;
//! it keeps a pooled `reqwest` connection and a per-request timeout.
//! Reconcilers talk to it through the [`CommerceApi`] trait so tests can
//! substitute scripted fakes.

mod api;
mod client;
mod config;
mod dump;
mod error;
pub mod types;
mod wire;

pub use api::CommerceApi;
pub use client::Client;
pub use config::ClientConfig;
pub use dump::{DumpHooks, TracingDump};
pub use error::{ClientError, ClientResult};
pub use types::{Address, CreditCard, CreditCardType, Order, OrderLine, Product, Service, Store};
