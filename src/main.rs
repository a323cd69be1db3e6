mod actor_framework;
mod app_system;
mod clients;
mod config;
mod domain;
mod http;
mod menu_actor;
mod order_actor;
mod projection;
mod sync;

#[cfg(test)]
mod mock_framework;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tracing::{info, warn, Instrument};

use crate::app_system::{setup_tracing, CoffeeShopSystem};
use crate::config::{Cli, Command, OrderArgs, ServeArgs, SetStatusArgs, WatchArgs};
use crate::domain::OrderStatus;
use crate::http::AppState;
use crate::projection::{MemoryStore, ProjectionCache};
use crate::sync::{
    checkout, render_receipt, HttpOrderSource, OrderSource, StdoutSink, SyncConfig, SyncError, ViewSynchronizer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    match Cli::parse().command {
        Command::Serve(args) => serve(args).await,
        Command::Watch(args) => watch(args).await,
        Command::SetStatus(args) => set_status(args).await,
        Command::Order(args) => place_order(args).await,
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let system = CoffeeShopSystem::start(&args.shop_config()).context("failed to start actors")?;
    let state = AppState {
        orders: system.order_client.clone(),
        menu: system.menu_client.clone(),
    };

    let listener = TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("failed to bind port {}", args.port))?;
    let served = http::serve(listener, state, http::shutdown_signal()).await;

    // Stop the actors even when the server itself failed.
    system.shutdown().await?;
    served.context("server error")?;
    Ok(())
}

/// Renders one view until interrupted. An empty line (or `r`) on stdin
/// refreshes immediately, `q` quits.
async fn watch(args: WatchArgs) -> anyhow::Result<()> {
    let source = HttpOrderSource::new(&args.server_url, args.fetch_timeout())?;
    let cache = ProjectionCache::new(MemoryStore::new());
    let config = SyncConfig {
        poll_interval: args.poll_interval(),
        fetch_timeout: args.fetch_timeout(),
    };
    let (synchronizer, handle) = ViewSynchronizer::new(args.view, source, cache, StdoutSink, config);
    let task = tokio::spawn(synchronizer.run());

    let shutdown = http::shutdown_signal();
    tokio::pin!(shutdown);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interactive = true;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line(), if interactive => match line {
                Ok(Some(line)) => match line.trim() {
                    "" | "r" => handle.refresh().await?,
                    "q" => break,
                    other => warn!(input = other, "Unknown command; use r to refresh or q to quit"),
                },
                Ok(None) | Err(_) => interactive = false,
            },
        }
    }

    handle.shutdown().await;
    task.await.context("synchronizer task failed")?;
    Ok(())
}

async fn set_status(args: SetStatusArgs) -> anyhow::Result<()> {
    let status: OrderStatus = args.status.parse()?;
    let source = HttpOrderSource::new(&args.server_url, std::time::Duration::from_secs(5))?;

    let order = source.update_status(&args.key, status).await?;
    println!(
        "{} (priority #{}) is now {}",
        order.order_number, order.priority_number, order.status
    );
    Ok(())
}

/// Prices the named drinks from the live menu, checks the cart out and
/// prints the receipt.
async fn place_order(args: OrderArgs) -> anyhow::Result<()> {
    let source = HttpOrderSource::new(&args.server_url, std::time::Duration::from_secs(args.timeout_secs.max(1)))?;
    let cache = ProjectionCache::new(MemoryStore::new());

    let menu = source.menu().await?;
    cache.clear_receipt();
    let mut cart = cache.cart();
    for name in &args.items {
        let item = menu
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| SyncError::UnknownItem(name.clone()))?;
        cart.add(&item.name, item.price);
    }
    cache.save_cart(&cart)?;

    let order = checkout(&source, &cache, args.order_type, args.payment_method)
        .instrument(tracing::info_span!("checkout", items = args.items.len()))
        .await?;
    info!(order_number = %order.order_number, "Order placed");

    match cache.receipt() {
        Some(receipt) => println!("{}", render_receipt(&receipt)),
        None => println!("{} (priority #{})", order.order_number, order.priority_number),
    }
    Ok(())
}
