use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use commerce_client::CommerceApi;
use controller::{
    Collection, Config, CustomerReconciler, Engine, MemorySecrets, OrderReconciler,
};
use shared::{Customer, Order, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenv::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "controller=info,commerce_client=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!(commerce_url = %config.commerce_url, "starting pizza controller");

    // One shared client; reconcilers see it through the trait.
    let commerce: Arc<dyn CommerceApi> = Arc::new(config.client_config().build()?);

    let customers = Collection::<Customer>::new();
    let stores = Collection::<Store>::new();
    let orders = Collection::<Order>::new();
    let secrets = MemorySecrets::new();

    let customer_reconciler = Arc::new(CustomerReconciler::new(
        customers.clone(),
        stores.clone(),
        commerce.clone(),
    ));
    let order_reconciler = Arc::new(OrderReconciler::new(
        orders.clone(),
        customers.clone(),
        stores.clone(),
        secrets.clone(),
        commerce.clone(),
    ));

    let shutdown = CancellationToken::new();
    let engine_config = config.engine_config();

    let customer_engine = tokio::spawn(
        Engine::new(customer_reconciler, engine_config.clone())
            .run(customers.subscribe(), shutdown.clone()),
    );
    let order_engine = tokio::spawn(
        Engine::new(order_reconciler, engine_config)
            .run(orders.subscribe(), shutdown.clone()),
    );

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    shutdown.cancel();

    customer_engine.await?;
    order_engine.await?;
    info!("controller stopped");
    Ok(())
}
