//! Command line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::app_system::ShopConfig;
use crate::domain::{OrderType, TransitionPolicy};
use crate::order_actor::NumberingScheme;
use crate::sync::ViewKind;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3001";

#[derive(Parser, Debug)]
#[command(name = "coffee_queue", version, about = "Coffee shop order queue: server and terminal views")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP order service.
    Serve(ServeArgs),
    /// Follow the order list or the preparing/serving board in the terminal.
    Watch(WatchArgs),
    /// Change one order's status and print the confirmed order.
    SetStatus(SetStatusArgs),
    /// Place an order by drink name and print its receipt.
    Order(OrderArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "COFFEE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory for JSON snapshots; orders and menu are kept in memory only when omitted.
    #[arg(long, env = "COFFEE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, value_enum, env = "COFFEE_TRANSITION_POLICY", default_value_t = TransitionPolicy::Permissive)]
    pub transition_policy: TransitionPolicy,

    #[arg(long, value_enum, env = "COFFEE_NUMBERING", default_value_t = NumberingScheme::Timestamp)]
    pub numbering: NumberingScheme,

    /// Start with an empty menu instead of the default drinks.
    #[arg(long)]
    pub no_seed_menu: bool,

    /// Mailbox size of each resource actor.
    #[arg(long, default_value_t = 32)]
    pub buffer_size: usize,
}

impl ServeArgs {
    pub fn shop_config(&self) -> ShopConfig {
        ShopConfig {
            buffer_size: self.buffer_size.max(1),
            data_dir: self.data_dir.clone(),
            transition_policy: self.transition_policy,
            numbering: self.numbering,
            seed_menu: !self.no_seed_menu,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[arg(long, env = "COFFEE_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    #[arg(long, value_enum, default_value_t = ViewKind::Board)]
    pub view: ViewKind,

    /// Seconds between polls; defaults to 3 for the board and 10 for the order list.
    #[arg(long)]
    pub poll_secs: Option<u64>,

    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,
}

impl WatchArgs {
    pub fn poll_interval(&self) -> Duration {
        self.poll_secs
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or_else(|| self.view.default_poll_interval())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Args, Debug, Clone)]
pub struct SetStatusArgs {
    #[arg(long, env = "COFFEE_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Order id or order number.
    pub key: String,

    /// pending, preparing, serving (or ready), completed.
    pub status: String,
}

#[derive(Args, Debug, Clone)]
pub struct OrderArgs {
    #[arg(long, env = "COFFEE_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// dine-in or takeout.
    #[arg(long = "type", default_value = "dine-in")]
    pub order_type: OrderType,

    #[arg(long)]
    pub payment_method: Option<String>,

    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,

    /// Menu item names; repeat a name to order more than one.
    #[arg(required = true)]
    pub items: Vec<String>,
}
