//! Order reconciler
//!
//! Drives an order through Unpriced -> Priced -> Placed, one step per
//! pass, with every milestone durably recorded before the next step is
//! attempted. Placement is the only step with a real-world effect, so
//! it is bracketed by a durable guard condition: if the process dies
//! between the place call and the placed milestone, the next pass sees
//! the guard without the milestone and parks the order instead of
//! charging the card twice.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{info, warn};

use commerce_client::{ClientError, CommerceApi, CreditCard};
use shared::{
    condition, upsert_condition, Condition, Customer, Error, Order, Resource, ResourceKey, Result,
    Store,
};

use crate::engine::{Outcome, Reconcile};
use crate::orders::{assemble_order, next_step, Step};
use crate::store::{credit_card_from_secret, Collection, SecretStore};

pub struct OrderReconciler {
    orders: Arc<Collection<Order>>,
    customers: Arc<Collection<Customer>>,
    stores: Arc<Collection<Store>>,
    secrets: Arc<dyn SecretStore>,
    commerce: Arc<dyn CommerceApi>,
}

impl OrderReconciler {
    pub fn new(
        orders: Arc<Collection<Order>>,
        customers: Arc<Collection<Customer>>,
        stores: Arc<Collection<Store>>,
        secrets: Arc<dyn SecretStore>,
        commerce: Arc<dyn CommerceApi>,
    ) -> Self {
        Self {
            orders,
            customers,
            stores,
            secrets,
            commerce,
        }
    }

    /// Resolve the order's customer and store references
    ///
    /// A dangling reference is a wait state, not a failure: the
    /// referenced resource may simply not have been created yet.
    fn resolve_refs(&self, order: &Order) -> Result<Option<(Customer, Store)>> {
        let ns = &order.meta.namespace;
        let customer = match self
            .customers
            .get(&ResourceKey::new(ns, &order.spec.customer_ref.name))
        {
            Ok(c) => c,
            Err(e) if e.is_not_found() => {
                info!(order = %order.key(), customer = %order.spec.customer_ref.name,
                      "customer not found yet, waiting");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let store = match self
            .stores
            .get(&ResourceKey::new(ns, &order.spec.store_ref.name))
        {
            Ok(s) => s,
            Err(e) if e.is_not_found() => {
                info!(order = %order.key(), store = %order.spec.store_ref.name,
                      "store not found yet, waiting");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        Ok(Some((customer, store)))
    }

    async fn price(&self, mut order: Order) -> Result<Outcome> {
        let Some((customer, store)) = self.resolve_refs(&order)? else {
            return Ok(Outcome::Requeue);
        };

        let payload = assemble_order(&customer.spec, &store.spec, &order.spec.items, None, None)?;

        let price = match self.commerce.price_order(&payload).await {
            Ok(price) => price,
            Err(ClientError::PricingRejected { code }) => {
                // Refreshed in place: a rejection repeated across
                // passes must not grow the condition list.
                upsert_condition(
                    &mut order.status.conditions,
                    Condition::with_message(condition::PRICE_FAILED, &code),
                );
                self.orders.update_status(order)?;
                return Err(Error::PricingRejected { code });
            }
            Err(e) => return Err(e.into()),
        };

        order.status.price = Some(price.to_string());
        order
            .status
            .conditions
            .push(Condition::with_message(condition::ORDER_PRICED, price.to_string()));
        self.orders.update_status(order)?;

        info!(price = %price, "order priced");
        Ok(Outcome::Requeue)
    }

    async fn place(&self, mut order: Order) -> Result<Outcome> {
        let Some((customer, store)) = self.resolve_refs(&order)? else {
            return Ok(Outcome::Requeue);
        };

        // Payment material is read fresh on every attempt, never cached.
        let secret = self
            .secrets
            .get(
                &order.meta.namespace,
                &customer.spec.credit_card_secret_ref.name,
            )
            .await?;
        let card: CreditCard = credit_card_from_secret(&secret)?;

        let amount = quoted_amount(&order)?;
        let payload = assemble_order(
            &customer.spec,
            &store.spec,
            &order.spec.items,
            Some(card),
            Some(amount),
        )?;

        // The guard must be durable before the request leaves the
        // process; a pass that dies after this point is parked by the
        // state machine rather than retried.
        order
            .status
            .conditions
            .push(Condition::new(condition::PLACEMENT_ATTEMPTED));
        let mut order = self.orders.update_status(order)?;

        let order_id = match self.commerce.place_order(&payload).await {
            Ok(id) => id,
            Err(ClientError::PlacementRejected { detail }) => {
                upsert_condition(
                    &mut order.status.conditions,
                    Condition::with_message(condition::PLACE_FAILED, &detail),
                );
                self.orders.update_status(order)?;
                return Err(Error::PlacementRejected { detail });
            }
            Err(e) => return Err(e.into()),
        };

        order.status.commerce_order_id = Some(order_id.clone());
        order
            .status
            .conditions
            .push(Condition::new(condition::ORDER_PLACED));
        self.orders.update_status(order)?;

        info!(order_id, "order placed");
        Ok(Outcome::Forget)
    }
}

/// The amount recorded when the order was priced
fn quoted_amount(order: &Order) -> Result<Decimal> {
    let raw = order
        .status
        .price
        .as_deref()
        .ok_or_else(|| Error::configuration("order is priced but status has no price"))?;
    raw.parse::<Decimal>()
        .map_err(|_| Error::configuration(format!("recorded price '{raw}' is not a decimal")))
}

#[async_trait]
impl Reconcile for OrderReconciler {
    fn kind(&self) -> &'static str {
        Order::KIND
    }

    fn list_keys(&self) -> Vec<ResourceKey> {
        self.orders.list_keys()
    }

    async fn reconcile(&self, key: &ResourceKey) -> Result<Outcome> {
        let order = self.orders.get(key)?;

        match next_step(&order.status, order.spec.confirm_placement) {
            Step::Hold => {
                if order.status.is_placed() {
                    Ok(Outcome::Forget)
                } else {
                    // Priced and waiting for the caller to confirm
                    Ok(Outcome::Requeue)
                }
            }
            Step::Price => self.price(order).await,
            Step::Place => self.place(order).await,
            Step::PlacementBlocked => {
                warn!(order = %key,
                      "placement attempted but never confirmed placed, refusing to place again");
                Ok(Outcome::Forget)
            }
        }
    }
}
