//! Store resource

use serde::{Deserialize, Serialize};

use crate::resource::{Resource, ResourceMeta};

/// A commerce-service store discovered near a customer
///
/// Derived, cached entity: created by the customer reconciler with a
/// name computed from the commerce store id, never updated afterwards.
/// The catalog is a snapshot taken at discovery time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub meta: ResourceMeta,
    pub spec: StoreSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSpec {
    /// Store identifier assigned by the commerce service
    pub id: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub products: Vec<CatalogProduct>,
}

/// One preconfigured (ready-to-order) catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub size: String,
}

impl Store {
    pub fn new(meta: ResourceMeta, spec: StoreSpec) -> Self {
        Self { meta, spec }
    }

    /// Deterministic resource name for a commerce store id
    ///
    /// Repeated discovery passes derive the same name, which is what
    /// makes find-or-create idempotent.
    pub fn derived_name(commerce_id: &str) -> String {
        format!("store-{}", commerce_id.to_lowercase())
    }
}

impl Resource for Store {
    const KIND: &'static str = "Store";

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ResourceMeta {
        &mut self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_name_is_stable_and_lowercased() {
        assert_eq!(Store::derived_name("10368"), "store-10368");
        assert_eq!(Store::derived_name("AB12"), "store-ab12");
        assert_eq!(Store::derived_name("AB12"), Store::derived_name("AB12"));
    }
}
