//! Order resource

use serde::{Deserialize, Serialize};

use crate::resource::{condition, has_condition, Condition, ObjectRef, Resource, ResourceMeta};

/// A desired food order
///
/// The spec says what to buy and from where; `confirm_placement` is the
/// gate between "just price it" and "actually spend money". Status is
/// the durable record of how far the lifecycle has advanced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub meta: ResourceMeta,
    pub spec: OrderSpec,
    #[serde(default)]
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSpec {
    pub store_ref: ObjectRef,
    pub customer_ref: ObjectRef,
    pub items: Vec<OrderItem>,
    /// Callers must explicitly opt in before the order is placed
    #[serde(default)]
    pub confirm_placement: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Commerce catalog code of the product
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderStatus {
    /// Quoted price, decimal-as-string, set when `OrderPriced` is recorded
    pub price: Option<String>,
    /// Identifier assigned by the commerce service once placed
    pub commerce_order_id: Option<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Order {
    pub fn new(meta: ResourceMeta, spec: OrderSpec) -> Self {
        Self {
            meta,
            spec,
            status: OrderStatus::default(),
        }
    }
}

impl OrderStatus {
    pub fn is_priced(&self) -> bool {
        has_condition(&self.conditions, condition::ORDER_PRICED)
    }

    pub fn is_placed(&self) -> bool {
        has_condition(&self.conditions, condition::ORDER_PLACED)
    }

    pub fn placement_attempted(&self) -> bool {
        has_condition(&self.conditions, condition::PLACEMENT_ATTEMPTED)
    }
}

impl Resource for Order {
    const KIND: &'static str = "Order";

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ResourceMeta {
        &mut self.meta
    }
}
