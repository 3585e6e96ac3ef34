//! Customer resource

use serde::{Deserialize, Serialize};

use crate::resource::{Condition, ObjectRef, Resource, ResourceMeta};

/// A customer who wants pizza delivered near their address
///
/// Created and owned by the caller; the customer reconciler only writes
/// the status (closest-store reference and the `Ready` condition).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub meta: ResourceMeta,
    pub spec: CustomerSpec,
    #[serde(default)]
    pub status: CustomerStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSpec {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,

    pub street_number: String,
    pub street_name: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,

    /// Secret holding the card used when an order is actually placed
    pub credit_card_secret_ref: ObjectRef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerStatus {
    /// First store returned by discovery, in the service's proximity order
    pub closest_store_ref: Option<ObjectRef>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Customer {
    pub fn new(meta: ResourceMeta, spec: CustomerSpec) -> Self {
        Self {
            meta,
            spec,
            status: CustomerStatus::default(),
        }
    }
}

impl Resource for Customer {
    const KIND: &'static str = "Customer";

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ResourceMeta {
        &mut self.meta
    }
}
