//! Resource identity, versions, references and conditions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity and concurrency metadata carried by every resource
///
/// `resource_version` increments on every status write; callers pass the
/// version they observed so conflicting concurrent writes fail instead of
/// silently losing condition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMeta {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub resource_version: u64,
}

impl ResourceMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            resource_version: 0,
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }
}

/// `(namespace, name)` pair identifying one resource of a kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Reference to another resource in the same namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub name: String,
}

impl ObjectRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A named, timestamped fact recorded in a resource's status
///
/// Milestone conditions only accumulate; a reconciler never removes
/// one. Repeatable facts (failure records) are refreshed in place via
/// [`upsert_condition`] so a flapping service cannot grow the list
/// without bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: String,
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            recorded_at: Utc::now(),
            message: None,
        }
    }

    pub fn with_message(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            recorded_at: Utc::now(),
            message: Some(message.into()),
        }
    }
}

/// Condition kinds used by the order lifecycle and store discovery
pub mod condition {
    /// Order priced, `status.price` holds the quoted amount
    pub const ORDER_PRICED: &str = "OrderPriced";
    /// Order placed, `status.commerceOrderId` holds the service's id
    pub const ORDER_PLACED: &str = "OrderPlaced";
    /// Guard written durably before the place call goes out
    pub const PLACEMENT_ATTEMPTED: &str = "PlacementAttempted";
    /// The service explicitly refused to price the order
    pub const PRICE_FAILED: &str = "PriceFailed";
    /// The service explicitly refused to place the order
    pub const PLACE_FAILED: &str = "PlaceFailed";
    /// Customer store discovery completed
    pub const READY: &str = "Ready";
}

/// Returns whether `conditions` contains an entry of the given kind
pub fn has_condition(conditions: &[Condition], kind: &str) -> bool {
    conditions.iter().any(|c| c.kind == kind)
}

/// Record `condition`, replacing any existing entry of the same kind
///
/// For facts that may recur, like a repeated service rejection: the
/// entry keeps its position but carries the latest timestamp and
/// message, so the list stays bounded by the number of distinct kinds.
pub fn upsert_condition(conditions: &mut Vec<Condition>, condition: Condition) {
    match conditions.iter_mut().find(|c| c.kind == condition.kind) {
        Some(existing) => *existing = condition,
        None => conditions.push(condition),
    }
}

/// Implemented by every declarative resource type
pub trait Resource: Clone + Send + Sync + 'static {
    /// Kind name used in errors and log fields, e.g. `"Order"`
    const KIND: &'static str;

    fn meta(&self) -> &ResourceMeta;
    fn meta_mut(&mut self) -> &mut ResourceMeta;

    fn key(&self) -> ResourceKey {
        self.meta().key()
    }
}
