use std::fs;
use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::actor_framework::{JsonFileSnapshot, ResourceActor};
use crate::clients::{MenuClient, OrderClient};
use crate::domain::{MenuItem, Order, TransitionPolicy};
use crate::menu_actor::default_menu;
use crate::order_actor::NumberingScheme;

use super::SystemError;

/// How the shop's actors are built.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    pub buffer_size: usize,
    /// Where `orders.json` and `menu.json` live; in-memory only when unset.
    pub data_dir: Option<PathBuf>,
    pub transition_policy: TransitionPolicy,
    pub numbering: NumberingScheme,
    /// Seed the default menu when the menu store starts out empty.
    pub seed_menu: bool,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            data_dir: None,
            transition_policy: TransitionPolicy::default(),
            numbering: NumberingScheme::default(),
            seed_menu: true,
        }
    }
}

fn next_id(last: Option<&u64>) -> u64 {
    last.map_or(1, |id| id + 1)
}

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct CoffeeShopSystem {
    pub order_client: OrderClient,
    pub menu_client: MenuClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl CoffeeShopSystem {
    pub fn start(config: &ShopConfig) -> Result<Self, SystemError> {
        if let Some(dir) = &config.data_dir {
            fs::create_dir_all(dir).map_err(|source| SystemError::DataDir {
                path: dir.display().to_string(),
                source,
            })?;
        }

        // 1. Menu
        let (mut menu_actor, menu_resource_client) =
            ResourceActor::<MenuItem>::new("menu", config.buffer_size, next_id);
        if let Some(dir) = &config.data_dir {
            menu_actor = menu_actor.with_snapshot(JsonFileSnapshot::new(dir.join("menu.json")))?;
        }
        if config.seed_menu && menu_actor.len() == 0 {
            let seeded = menu_actor.seed(default_menu())?;
            info!(seeded, "Default menu loaded");
        }
        let menu_client = MenuClient::new(menu_resource_client);
        let menu_handle = tokio::spawn(menu_actor.run());

        // 2. Orders
        let (mut order_actor, order_resource_client) =
            ResourceActor::<Order>::new("orders", config.buffer_size, next_id);
        if let Some(dir) = &config.data_dir {
            order_actor = order_actor.with_snapshot(JsonFileSnapshot::new(dir.join("orders.json")))?;
        }
        let order_client = OrderClient::new(order_resource_client, config.transition_policy, config.numbering);
        let order_handle = tokio::spawn(order_actor.run());

        info!(
            policy = ?config.transition_policy,
            numbering = ?config.numbering,
            persistent = config.data_dir.is_some(),
            "Coffee shop system started"
        );

        Ok(Self {
            order_client,
            menu_client,
            handles: vec![menu_handle, order_handle],
        })
    }

    /// Asks every actor to stop and waits for their tasks. Clones of the
    /// clients held elsewhere get `ActorCommunicationError` afterwards.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        if let Err(e) = self.order_client.shutdown().await {
            warn!(error = %e, "Order actor already gone");
        }
        if let Err(e) = self.menu_client.shutdown().await {
            warn!(error = %e, "Menu actor already gone");
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::TaskFailed(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineItem, OrderDraft, OrderType};
    use crate::order_actor::OrderError;
    use rust_decimal::Decimal;

    fn persistent(dir: &std::path::Path) -> ShopConfig {
        ShopConfig {
            data_dir: Some(dir.to_path_buf()),
            ..ShopConfig::default()
        }
    }

    #[tokio::test]
    async fn test_orders_survive_restart() {
        let dir = tempfile::tempdir().unwrap();

        let system = CoffeeShopSystem::start(&persistent(dir.path())).unwrap();
        let draft = OrderDraft::new(OrderType::DineIn, vec![LineItem::new("Latte", Decimal::from(120), 1)]);
        let first = system.order_client.create_order(draft.clone()).await.unwrap();
        system.order_client.set_status(first.id.to_string(), "preparing").await.unwrap();
        system.shutdown().await.unwrap();

        let system = CoffeeShopSystem::start(&persistent(dir.path())).unwrap();
        let restored = system.order_client.find_order(first.order_number.clone()).await.unwrap();
        assert_eq!(restored.priority_number, 1);
        assert_eq!(restored.status.as_str(), "Preparing");

        let second = system.order_client.create_order(draft).await.unwrap();
        assert_eq!(second.id, first.id + 1);
        assert_eq!(second.priority_number, 2);

        // The menu was seeded once and not again on restart.
        let menu = system.menu_client.list_menu(None).await.unwrap();
        assert_eq!(menu.len(), default_menu().len());
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_clients_fail_after_shutdown() {
        let system = CoffeeShopSystem::start(&ShopConfig::default()).unwrap();
        let orders = system.order_client.clone();
        system.shutdown().await.unwrap();

        let err = orders.list_orders().await.unwrap_err();
        assert!(matches!(err, OrderError::ActorCommunicationError(_)));
    }
}
