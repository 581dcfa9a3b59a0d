use crate::clients::OrderStoreClient;
use crate::events::{ConsumerStats, InMemoryEventBus, OrderCreatedConsumer};
use crate::lifecycle::Config;
use crate::list_cache::TtlListCache;
use crate::pipeline::OrderPipeline;
use crate::pricing::{HttpPriceFetcher, PriceCache, PriceFetcher};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The runtime orchestrator of the order service.
///
/// `OrderSystem` is responsible for:
/// - **Lifecycle Management**: Starting and stopping the store actor and the event consumer
/// - **Dependency Wiring**: Handing the store, bus, list cache and price cache to the pipeline
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::new(&Config::from_env()?);
///
/// let request = CreateOrderRequest::new(7, 3);
/// let event = system.pipeline.create_order(request, system.pipeline.deadline()).await?;
///
/// // Gracefully shut down when done
/// let stats = system.shutdown().await?;
/// ```
pub struct OrderSystem {
    /// Entry point for creating and listing orders
    pub pipeline: OrderPipeline,

    /// Direct access to the order store actor
    pub store_client: OrderStoreClient,

    /// Bus carrying `order.created` events; subscribe here to observe them
    pub event_bus: InMemoryEventBus,

    store_handle: JoinHandle<()>,
    consumer_handle: JoinHandle<ConsumerStats>,
}

impl OrderSystem {
    /// Wires the system against the product service at `config.product_base_url`.
    pub fn new(config: &Config) -> Self {
        let fetcher = Arc::new(HttpPriceFetcher::new(config.product_base_url.clone()));
        Self::with_fetcher(config, fetcher)
    }

    /// Wires the system against any price source.
    ///
    /// This method:
    /// 1. Spawns the order store actor
    /// 2. Subscribes the `order.created` consumer to the bus and spawns it
    /// 3. Builds the price cache over `fetcher`
    /// 4. Assembles the pipeline
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn PriceFetcher>) -> Self {
        let (store_actor, store_client) = crate::order_store::new(config.store_buffer);
        let store_handle = tokio::spawn(store_actor.run());

        let event_bus = InMemoryEventBus::new(config.event_bus_capacity);
        let consumer = OrderCreatedConsumer::new(
            event_bus.subscribe(),
            config.order_created_topic.clone(),
        );
        let consumer_handle = tokio::spawn(consumer.run());

        let prices = PriceCache::new(fetcher, config.price_cache_config());
        let pipeline = OrderPipeline::new(
            prices,
            Arc::new(store_client.clone()),
            Arc::new(event_bus.clone()),
            Arc::new(TtlListCache::new()),
            config.pipeline_settings(),
        );

        Self {
            pipeline,
            store_client,
            event_bus,
            store_handle,
            consumer_handle,
        }
    }

    /// Gracefully shuts down the system and returns what the consumer saw.
    ///
    /// Dropping the pipeline, the store client and the bus closes the store
    /// actor's mailbox and the consumer's subscription; both tasks then finish.
    /// Clones of the pipeline held elsewhere keep those channels open, so drop
    /// them first.
    ///
    /// # Returns
    ///
    /// - `Ok(stats)` if both tasks ended cleanly
    /// - `Err(String)` if either task panicked
    pub async fn shutdown(self) -> Result<ConsumerStats, String> {
        info!("Shutting down system...");

        drop(self.pipeline);
        drop(self.store_client);
        drop(self.event_bus);

        if let Err(e) = self.store_handle.await {
            error!("Order store task failed: {:?}", e);
            return Err(format!("Order store task failed: {:?}", e));
        }

        let stats = match self.consumer_handle.await {
            Ok(stats) => stats,
            Err(e) => {
                error!("Event consumer task failed: {:?}", e);
                return Err(format!("Event consumer task failed: {:?}", e));
            }
        };

        info!(
            acknowledged = stats.acknowledged,
            rejected = stats.rejected,
            "System shutdown complete."
        );
        Ok(stats)
    }
}
