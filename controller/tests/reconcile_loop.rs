//! End-to-end reconciler behavior against a scripted commerce service

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use commerce_client::types::{Address, Order as Payload, Product, Service, Store as FoundStore};
use commerce_client::{ClientError, ClientResult, CommerceApi};
use controller::{
    Collection, CustomerReconciler, MemorySecrets, OrderReconciler, Outcome, Reconcile,
};
use shared::{
    condition, has_condition, Customer, CustomerSpec, ObjectRef, Order, OrderItem, OrderSpec,
    ResourceKey, ResourceMeta, Store, StoreSpec,
};

/// Scripted commerce service with call counters
#[derive(Default)]
struct FakeCommerce {
    found_stores: Vec<FoundStore>,
    menu: Vec<Product>,
    quote: Option<Decimal>,
    /// Corrective-action code to reject pricing with; clearable so a
    /// test can let the service start accepting mid-way
    price_rejection: Mutex<Option<String>>,
    /// Status-item text to reject placement with
    place_rejection: Option<String>,
    /// Fail the place call with a retriable fault instead of answering
    place_fault: bool,

    locator_calls: AtomicU32,
    menu_calls: AtomicU32,
    price_calls: AtomicU32,
    place_calls: AtomicU32,
}

#[async_trait]
impl CommerceApi for FakeCommerce {
    async fn find_stores(
        &self,
        _address: &Address,
        _service: Service,
    ) -> ClientResult<Vec<FoundStore>> {
        self.locator_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.found_stores.clone())
    }

    async fn fetch_menu(&self, _store_id: &str) -> ClientResult<Vec<Product>> {
        self.menu_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.menu.clone())
    }

    async fn price_order(&self, order: &Payload) -> ClientResult<Decimal> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        assert!(
            order.credit_card.is_none(),
            "pricing must not carry payment data"
        );
        if let Some(code) = self.price_rejection.lock().unwrap().clone() {
            return Err(ClientError::PricingRejected { code });
        }
        Ok(self.quote.unwrap_or_else(|| quote()))
    }

    async fn place_order(&self, order: &Payload) -> ClientResult<String> {
        self.place_calls.fetch_add(1, Ordering::SeqCst);
        if self.place_fault {
            return Err(ClientError::protocol("connection reset mid-response"));
        }
        if let Some(detail) = &self.place_rejection {
            return Err(ClientError::PlacementRejected {
                detail: detail.clone(),
            });
        }
        assert!(order.credit_card.is_some(), "placement requires a card");
        assert_eq!(order.amount, Some(quote()));
        Ok("I10368-22".to_string())
    }
}

fn quote() -> Decimal {
    "25.99".parse().unwrap()
}

fn sample_customer(name: &str) -> Customer {
    Customer::new(
        ResourceMeta::new("default", name),
        CustomerSpec {
            first_name: "Alice".to_string(),
            last_name: "Ng".to_string(),
            email: "alice@example.com".to_string(),
            phone: "4165550100".to_string(),
            street_number: "90".to_string(),
            street_name: "Queens Wharf Rd".to_string(),
            city: "Toronto".to_string(),
            region: "ON".to_string(),
            postal_code: "M5V0J4".to_string(),
            credit_card_secret_ref: ObjectRef::new("alice-card"),
        },
    )
}

fn sample_store(name: &str) -> Store {
    Store::new(
        ResourceMeta::new("default", name),
        StoreSpec {
            id: "10368".to_string(),
            phone: "4165550199".to_string(),
            address: "90 Queens Wharf Rd".to_string(),
            products: vec![catalog_pizza()],
        },
    )
}

fn catalog_pizza() -> shared::CatalogProduct {
    shared::CatalogProduct {
        id: "14SCREEN".to_string(),
        name: "Large Hand Tossed Pizza".to_string(),
        description: "Cheese".to_string(),
        size: "14\"".to_string(),
    }
}

fn sample_order(name: &str, confirm: bool) -> Order {
    Order::new(
        ResourceMeta::new("default", name),
        OrderSpec {
            store_ref: ObjectRef::new("store-10368"),
            customer_ref: ObjectRef::new("alice"),
            items: vec![OrderItem {
                product_id: "14SCREEN".to_string(),
                quantity: 1,
            }],
            confirm_placement: confirm,
        },
    )
}

fn card_secret() -> std::collections::HashMap<String, Vec<u8>> {
    [
        ("number", "4100123412341234"),
        ("expiration", "0127"),
        ("securityCode", "123"),
        ("cardType", "visa"),
        ("zip", "M5V0J4"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
    .collect()
}

struct OrderHarness {
    orders: Arc<Collection<Order>>,
    commerce: Arc<FakeCommerce>,
    reconciler: OrderReconciler,
}

fn order_harness(commerce: FakeCommerce, order: Order) -> OrderHarness {
    let customers = Collection::<Customer>::new();
    let stores = Collection::<Store>::new();
    let orders = Collection::<Order>::new();
    let secrets = MemorySecrets::new();

    customers.create(sample_customer("alice")).unwrap();
    stores.create(sample_store("store-10368")).unwrap();
    orders.create(order).unwrap();
    secrets.insert("default", "alice-card", card_secret());

    let commerce = Arc::new(commerce);
    let reconciler = OrderReconciler::new(
        orders.clone(),
        customers,
        stores,
        secrets,
        commerce.clone(),
    );
    OrderHarness {
        orders,
        commerce,
        reconciler,
    }
}

fn order_key() -> ResourceKey {
    ResourceKey::new("default", "dinner")
}

#[tokio::test]
async fn pricing_and_placement_take_separate_passes() {
    let h = order_harness(FakeCommerce::default(), sample_order("dinner", true));

    // Pass 1: price only, even though placement is already confirmed.
    let outcome = h.reconciler.reconcile(&order_key()).await.unwrap();
    assert_eq!(outcome, Outcome::Requeue);
    assert_eq!(h.commerce.price_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.commerce.place_calls.load(Ordering::SeqCst), 0);

    let order = h.orders.get(&order_key()).unwrap();
    assert!(order.status.is_priced());
    assert!(!order.status.is_placed());
    assert_eq!(order.status.price.as_deref(), Some("25.99"));

    // Pass 2: place.
    let outcome = h.reconciler.reconcile(&order_key()).await.unwrap();
    assert_eq!(outcome, Outcome::Forget);
    assert_eq!(h.commerce.place_calls.load(Ordering::SeqCst), 1);

    let order = h.orders.get(&order_key()).unwrap();
    assert!(order.status.is_placed());
    assert!(order.status.placement_attempted());
    assert_eq!(order.status.commerce_order_id.as_deref(), Some("I10368-22"));

    // Pass 3: terminal no-op.
    let outcome = h.reconciler.reconcile(&order_key()).await.unwrap();
    assert_eq!(outcome, Outcome::Forget);
    assert_eq!(h.commerce.price_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.commerce.place_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn priced_order_waits_for_confirmation() {
    let h = order_harness(FakeCommerce::default(), sample_order("dinner", false));

    h.reconciler.reconcile(&order_key()).await.unwrap();
    let priced_version = h.orders.get(&order_key()).unwrap().meta.resource_version;

    // Repeated passes hold: no placement, no status churn.
    for _ in 0..3 {
        let outcome = h.reconciler.reconcile(&order_key()).await.unwrap();
        assert_eq!(outcome, Outcome::Requeue);
    }
    assert_eq!(h.commerce.place_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.commerce.price_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.orders.get(&order_key()).unwrap().meta.resource_version,
        priced_version
    );
}

#[tokio::test]
async fn pricing_rejection_records_failure_without_milestone() {
    let commerce = FakeCommerce {
        price_rejection: Mutex::new(Some("PriceBelowMinimum".to_string())),
        ..FakeCommerce::default()
    };
    let h = order_harness(commerce, sample_order("dinner", false));

    let err = h.reconciler.reconcile(&order_key()).await.unwrap_err();
    assert!(!err.is_retriable());

    let order = h.orders.get(&order_key()).unwrap();
    assert!(!order.status.is_priced());
    assert!(order.status.price.is_none());
    let failed = order
        .status
        .conditions
        .iter()
        .find(|c| c.kind == condition::PRICE_FAILED)
        .unwrap();
    assert_eq!(failed.message.as_deref(), Some("PriceBelowMinimum"));
}

#[tokio::test]
async fn repeated_rejection_keeps_one_failure_condition() {
    let commerce = FakeCommerce {
        price_rejection: Mutex::new(Some("PriceBelowMinimum".to_string())),
        ..FakeCommerce::default()
    };
    let h = order_harness(commerce, sample_order("dinner", false));

    for _ in 0..3 {
        h.reconciler.reconcile(&order_key()).await.unwrap_err();
    }

    let order = h.orders.get(&order_key()).unwrap();
    let failures = order
        .status
        .conditions
        .iter()
        .filter(|c| c.kind == condition::PRICE_FAILED)
        .count();
    assert_eq!(failures, 1);
}

#[tokio::test]
async fn pricing_recovers_once_the_service_accepts() {
    let commerce = FakeCommerce {
        price_rejection: Mutex::new(Some("PriceBelowMinimum".to_string())),
        ..FakeCommerce::default()
    };
    let h = order_harness(commerce, sample_order("dinner", false));

    h.reconciler.reconcile(&order_key()).await.unwrap_err();

    // The service starts accepting; the next pass prices normally.
    *h.commerce.price_rejection.lock().unwrap() = None;
    let outcome = h.reconciler.reconcile(&order_key()).await.unwrap();
    assert_eq!(outcome, Outcome::Requeue);

    let order = h.orders.get(&order_key()).unwrap();
    assert!(order.status.is_priced());
    assert_eq!(order.status.price.as_deref(), Some("25.99"));
    // The earlier rejection stays on record.
    assert!(has_condition(&order.status.conditions, condition::PRICE_FAILED));
}

#[tokio::test]
async fn interrupted_placement_parks_the_order() {
    let commerce = FakeCommerce {
        place_fault: true,
        ..FakeCommerce::default()
    };
    let h = order_harness(commerce, sample_order("dinner", true));

    h.reconciler.reconcile(&order_key()).await.unwrap();

    // The place call fails after the guard was durably recorded.
    let err = h.reconciler.reconcile(&order_key()).await.unwrap_err();
    assert!(err.is_retriable());
    let order = h.orders.get(&order_key()).unwrap();
    assert!(order.status.placement_attempted());
    assert!(!order.status.is_placed());

    // Later passes refuse to place again; the ambiguous attempt may
    // have gone through on the service side.
    let outcome = h.reconciler.reconcile(&order_key()).await.unwrap();
    assert_eq!(outcome, Outcome::Forget);
    assert_eq!(h.commerce.place_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn placement_rejection_records_failure_and_blocks() {
    let commerce = FakeCommerce {
        place_rejection: Some("PaymentsNotAccepted Payment type not accepted".to_string()),
        ..FakeCommerce::default()
    };
    let h = order_harness(commerce, sample_order("dinner", true));

    h.reconciler.reconcile(&order_key()).await.unwrap();
    let err = h.reconciler.reconcile(&order_key()).await.unwrap_err();
    assert!(!err.is_retriable());

    let order = h.orders.get(&order_key()).unwrap();
    assert!(has_condition(&order.status.conditions, condition::PLACE_FAILED));
    assert!(order.status.placement_attempted());
    assert!(!order.status.is_placed());

    let outcome = h.reconciler.reconcile(&order_key()).await.unwrap();
    assert_eq!(outcome, Outcome::Forget);
    assert_eq!(h.commerce.place_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dangling_references_wait_instead_of_failing() {
    let customers = Collection::<Customer>::new();
    let stores = Collection::<Store>::new();
    let orders = Collection::<Order>::new();
    orders.create(sample_order("dinner", false)).unwrap();

    let commerce = Arc::new(FakeCommerce::default());
    let reconciler = OrderReconciler::new(
        orders,
        customers,
        stores,
        MemorySecrets::new(),
        commerce.clone(),
    );

    let outcome = reconciler.reconcile(&order_key()).await.unwrap();
    assert_eq!(outcome, Outcome::Requeue);
    assert_eq!(commerce.price_calls.load(Ordering::SeqCst), 0);
}

fn found_store(id: &str) -> FoundStore {
    FoundStore {
        id: id.to_string(),
        phone: "4165550199".to_string(),
        address: "90 Queens Wharf Rd".to_string(),
    }
}

#[tokio::test]
async fn discovery_caches_stores_and_records_closest() {
    let commerce = Arc::new(FakeCommerce {
        found_stores: vec![
            found_store("10368"),
            found_store("10501"),
            found_store("10502"),
            found_store("10999"),
        ],
        menu: vec![Product {
            id: "14SCREEN".to_string(),
            name: "Large Hand Tossed Pizza".to_string(),
            description: "Cheese".to_string(),
            size: "14\"".to_string(),
        }],
        ..FakeCommerce::default()
    });
    let customers = Collection::<Customer>::new();
    let stores = Collection::<Store>::new();
    customers.create(sample_customer("alice")).unwrap();

    let reconciler = CustomerReconciler::new(customers.clone(), stores.clone(), commerce.clone());
    let key = ResourceKey::new("default", "alice");

    let outcome = reconciler.reconcile(&key).await.unwrap();
    assert_eq!(outcome, Outcome::Requeue);

    // Only the nearest three of four results are cached.
    assert_eq!(stores.len(), 3);
    let cached = stores
        .get(&ResourceKey::new("default", "store-10368"))
        .unwrap();
    assert_eq!(cached.spec.products.len(), 1);

    let customer = customers.get(&key).unwrap();
    assert_eq!(
        customer.status.closest_store_ref,
        Some(ObjectRef::new("store-10368"))
    );
    assert!(has_condition(&customer.status.conditions, condition::READY));
}

#[tokio::test]
async fn repeated_discovery_is_idempotent() {
    let commerce = Arc::new(FakeCommerce {
        found_stores: vec![found_store("10368")],
        ..FakeCommerce::default()
    });
    let customers = Collection::<Customer>::new();
    let stores = Collection::<Store>::new();
    customers.create(sample_customer("alice")).unwrap();

    let reconciler = CustomerReconciler::new(customers.clone(), stores.clone(), commerce.clone());
    let key = ResourceKey::new("default", "alice");

    reconciler.reconcile(&key).await.unwrap();
    let version = customers.get(&key).unwrap().meta.resource_version;

    reconciler.reconcile(&key).await.unwrap();
    reconciler.reconcile(&key).await.unwrap();

    // Same single store, and no status churn once discovery is current.
    assert_eq!(stores.len(), 1);
    assert_eq!(customers.get(&key).unwrap().meta.resource_version, version);
    assert_eq!(commerce.locator_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn empty_discovery_result_requeues() {
    let commerce = Arc::new(FakeCommerce::default());
    let customers = Collection::<Customer>::new();
    let stores = Collection::<Store>::new();
    customers.create(sample_customer("alice")).unwrap();

    let reconciler = CustomerReconciler::new(customers.clone(), stores.clone(), commerce);
    let key = ResourceKey::new("default", "alice");

    let outcome = reconciler.reconcile(&key).await.unwrap();
    assert_eq!(outcome, Outcome::Requeue);
    assert_eq!(stores.len(), 0);
    assert!(customers.get(&key).unwrap().status.closest_store_ref.is_none());
}
