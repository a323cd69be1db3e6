//! Plain-text renderings of the three screens.

use std::collections::HashSet;
use std::fmt::Write;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::mpsc;

use crate::domain::{board_columns, OrderType};
use crate::projection::{shorten_order_id, CachedOrder, ReceiptData};

const CURRENCY: &str = "₱";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewKind {
    /// Full order history, newest first.
    Orders,
    /// Preparing and Serving columns by priority number.
    Board,
}

impl ViewKind {
    pub fn default_poll_interval(self) -> Duration {
        match self {
            ViewKind::Orders => Duration::from_secs(10),
            ViewKind::Board => Duration::from_secs(3),
        }
    }

    fn title(self) -> &'static str {
        match self {
            ViewKind::Orders => "orders",
            ViewKind::Board => "board",
        }
    }

    pub fn render(self, orders: &[CachedOrder]) -> String {
        match self {
            ViewKind::Orders => render_order_list(orders),
            ViewKind::Board => render_board(orders),
        }
    }
}

/// What one render was based on.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Ready(Vec<CachedOrder>),
    /// The fetch failed; the last cached orders are shown under an error panel.
    Failed { cached: Vec<CachedOrder>, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub view: ViewKind,
    pub state: ViewState,
    pub text: String,
}

impl Frame {
    pub fn new(view: ViewKind, state: ViewState, retry_in: Duration) -> Self {
        let text = match &state {
            ViewState::Ready(orders) => view.render(orders),
            ViewState::Failed { cached, error } => format!(
                "[!] Could not refresh {}: {}\n[!] Retrying in {}s; send a refresh to retry now.\n{}",
                view.title(),
                error,
                retry_in.as_secs(),
                view.render(cached)
            ),
        };
        Self { view, state, text }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.state, ViewState::Failed { .. })
    }
}

/// Where rendered frames go.
pub trait FrameSink: Send + 'static {
    fn show(&mut self, frame: Frame);
}

pub struct StdoutSink;

impl FrameSink for StdoutSink {
    fn show(&mut self, frame: Frame) {
        println!("{}\n{}", "-".repeat(48), frame.text);
    }
}

impl FrameSink for mpsc::UnboundedSender<Frame> {
    fn show(&mut self, frame: Frame) {
        let _ = self.send(frame);
    }
}

fn money(amount: Decimal) -> String {
    format!("{CURRENCY}{:.2}", amount.round_dp(2))
}

fn priority_label(priority: Option<u32>) -> String {
    priority.map_or_else(|| "N/A".to_string(), |p| p.to_string())
}

/// `Name (qty)` per distinct name, in first-seen order.
pub fn summarize_items(order: &CachedOrder) -> String {
    let mut counts: Vec<(&str, u32)> = Vec::new();
    for item in &order.items {
        match counts.iter_mut().find(|(name, _)| *name == item.name) {
            Some((_, qty)) => *qty += item.quantity,
            None => counts.push((item.name.as_str(), item.quantity)),
        }
    }
    if counts.is_empty() {
        return "No items".to_string();
    }
    counts
        .iter()
        .map(|(name, qty)| format!("{name} ({qty})"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_order_list(orders: &[CachedOrder]) -> String {
    let mut sorted: Vec<&CachedOrder> = orders.iter().collect();
    // Undated entries sort after dated ones.
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut seen = HashSet::new();
    sorted.retain(|order| seen.insert(order.merge_key()));

    if sorted.is_empty() {
        return "No orders found".to_string();
    }

    let mut out = format!("ORDERS ({})\n", sorted.len());
    for order in sorted {
        let kind = match order.order_type {
            OrderType::Takeout => "[Takeout]",
            OrderType::DineIn => "[Dine-in]",
        };
        let placed = order
            .timestamp
            .map_or_else(|| "N/A".to_string(), |t| t.format("%b %-d, %Y %I:%M %p").to_string());
        let _ = writeln!(
            out,
            "#{:<4} {:<18} {:<10} {:<10} {:>10}  {}  {}",
            priority_label(order.priority_number),
            order.label(),
            kind,
            order.status,
            money(order.total),
            placed,
            summarize_items(order),
        );
    }
    out
}

pub fn render_board(orders: &[CachedOrder]) -> String {
    let (preparing, serving) = board_columns(orders);
    let column = |orders: &[CachedOrder], empty: &str| {
        if orders.is_empty() {
            empty.to_string()
        } else {
            orders
                .iter()
                .map(|o| priority_label(o.priority_number))
                .collect::<Vec<_>>()
                .join("  ")
        }
    };

    format!(
        "PREPARING\n  {}\nNOW SERVING\n  {}",
        column(preparing.as_slice(), "No orders in preparation"),
        column(serving.as_slice(), "No orders ready to serve"),
    )
}

pub fn render_receipt(receipt: &ReceiptData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Order ID: {}", shorten_order_id(&receipt.order_number));
    let _ = writeln!(
        out,
        "Date: {}  Time: {}",
        receipt.timestamp.format("%b %-d, %Y"),
        receipt.timestamp.format("%I:%M %p")
    );
    let _ = writeln!(out, "Type: {}  Payment: {}", receipt.order_type, receipt.payment_method);
    let _ = writeln!(out, "Priority # {}", priority_label(receipt.priority_number));
    for item in &receipt.items {
        let _ = writeln!(
            out,
            "  {}x {:<24} {:>10}",
            item.quantity,
            item.name,
            money(item.subtotal())
        );
    }
    let _ = writeln!(out, "Subtotal: {}", money(receipt.subtotal()));
    let _ = writeln!(out, "Service charge: {}", money(Decimal::ZERO));
    let _ = write!(out, "Total: {}", money(receipt.total));
    out
}
