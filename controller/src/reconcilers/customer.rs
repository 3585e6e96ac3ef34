//! Customer reconciler
//!
//! Store discovery: find open stores near the customer's address, cache
//! each one (with its catalog snapshot) as a store resource, and record
//! the closest store in the customer's status. The whole pass is
//! idempotent; store names are derived from commerce ids, so repeated
//! passes converge on the same resources.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use commerce_client::{Address, CommerceApi, Service};
use shared::{
    condition, has_condition, CatalogProduct, Condition, Customer, CustomerSpec, ObjectRef,
    Resource, ResourceKey, ResourceMeta, Result, Store, StoreSpec,
};

use crate::engine::{Outcome, Reconcile};
use crate::store::Collection;

/// Discovery caches the nearest few stores, not the whole result
const MAX_TRACKED_STORES: usize = 3;

pub struct CustomerReconciler {
    customers: Arc<Collection<Customer>>,
    stores: Arc<Collection<Store>>,
    commerce: Arc<dyn CommerceApi>,
}

impl CustomerReconciler {
    pub fn new(
        customers: Arc<Collection<Customer>>,
        stores: Arc<Collection<Store>>,
        commerce: Arc<dyn CommerceApi>,
    ) -> Self {
        Self {
            customers,
            stores,
            commerce,
        }
    }

    /// Cache one discovered store, fetching its catalog first
    async fn track_store(
        &self,
        namespace: &str,
        found: &commerce_client::Store,
    ) -> Result<ObjectRef> {
        let products = self.commerce.fetch_menu(&found.id).await?;

        let name = Store::derived_name(&found.id);
        let store = Store::new(
            ResourceMeta::new(namespace, &name),
            StoreSpec {
                id: found.id.clone(),
                phone: found.phone.clone(),
                address: found.address.clone(),
                products: products
                    .into_iter()
                    .map(|p| CatalogProduct {
                        id: p.id,
                        name: p.name,
                        description: p.description,
                        size: p.size,
                    })
                    .collect(),
            },
        );

        self.stores.find_or_create(store)?;
        Ok(ObjectRef::new(name))
    }
}

fn customer_address(spec: &CustomerSpec) -> Address {
    Address {
        street_number: spec.street_number.clone(),
        street_name: spec.street_name.clone(),
        city: spec.city.clone(),
        region: spec.region.clone(),
        postal_code: spec.postal_code.clone(),
    }
}

#[async_trait]
impl Reconcile for CustomerReconciler {
    fn kind(&self) -> &'static str {
        Customer::KIND
    }

    fn list_keys(&self) -> Vec<ResourceKey> {
        self.customers.list_keys()
    }

    async fn reconcile(&self, key: &ResourceKey) -> Result<Outcome> {
        let mut customer = self.customers.get(key)?;

        let address = customer_address(&customer.spec);
        let found = self
            .commerce
            .find_stores(&address, Service::Delivery)
            .await?;
        if found.is_empty() {
            warn!(customer = %key, "no open stores near address");
            return Ok(Outcome::Requeue);
        }

        let mut refs = Vec::new();
        for store in found.iter().take(MAX_TRACKED_STORES) {
            refs.push(self.track_store(&customer.meta.namespace, store).await?);
        }

        // The locator orders by proximity; the first entry is the
        // closest.
        let closest = refs.remove(0);
        let ready = has_condition(&customer.status.conditions, condition::READY);
        if ready && customer.status.closest_store_ref.as_ref() == Some(&closest) {
            debug!(customer = %key, "discovery already current");
            return Ok(Outcome::Requeue);
        }

        customer.status.closest_store_ref = Some(closest.clone());
        customer
            .status
            .conditions
            .push(Condition::with_message(condition::READY, &closest.name));
        self.customers.update_status(customer)?;

        info!(customer = %key, closest = %closest.name, "store discovery complete");
        Ok(Outcome::Requeue)
    }
}
