//! `order-service <productId> <qty>`
//!
//! Creates one order against the configured product service, prints the
//! `order.created` event (or the error envelope) as JSON and shuts down.

use order_service::lifecycle::{setup_tracing, Config, OrderSystem};
use order_service::model::CreateOrderRequest;
use tracing::{error, info, Instrument};

fn parse_args() -> Result<CreateOrderRequest, String> {
    let mut args = std::env::args().skip(1);
    let usage = "usage: order-service <productId> <qty>";

    let product_id = args.next().ok_or(usage)?;
    let qty = args.next().ok_or(usage)?;

    let product_id = product_id
        .parse()
        .map_err(|_| format!("productId must be an integer, got {product_id:?}"))?;
    let qty = qty
        .parse()
        .map_err(|_| format!("qty must be an integer, got {qty:?}"))?;

    Ok(CreateOrderRequest::new(product_id, qty))
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let request = parse_args()?;
    let config = Config::from_env().map_err(|e| e.to_string())?;

    info!(product_base_url = %config.product_base_url, "Starting order service");
    let system = OrderSystem::new(&config);

    let span = tracing::info_span!("order_processing");
    let result = async {
        let deadline = system.pipeline.deadline();
        system.pipeline.create_order(request, deadline).await
    }
    .instrument(span)
    .await;

    let output = match &result {
        Ok(event) => serde_json::to_string_pretty(event),
        Err(e) => {
            error!(error = %e, code = e.code(), "Order processing failed");
            serde_json::to_string_pretty(&e.envelope())
        }
    }
    .map_err(|e| e.to_string())?;
    println!("{output}");

    system.shutdown().await?;

    info!("Application completed");
    result.map(|_| ()).map_err(|e| e.code().to_string())
}
