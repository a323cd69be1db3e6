use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::domain::{board, Order, OrderStatus};
use crate::projection::{keys, merge, CachedOrder, KeyValueStore, ProjectionCache, StorageChange};

use super::views::{Frame, FrameSink, ViewKind, ViewState};
use super::{OrderSource, SyncError};

#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    pub poll_interval: Duration,
    /// Upper bound on each fetch or status update.
    pub fetch_timeout: Duration,
}

#[derive(Debug)]
pub enum SyncCommand {
    /// Fetch and render now; the next poll is pushed back a full interval.
    Refresh,
    SetStatus {
        key: String,
        status: OrderStatus,
        respond_to: oneshot::Sender<Result<Order, SyncError>>,
    },
    Shutdown,
}

/// Handle for steering a running [`ViewSynchronizer`].
#[derive(Clone)]
pub struct SyncHandle {
    sender: mpsc::Sender<SyncCommand>,
}

impl SyncHandle {
    pub async fn refresh(&self) -> Result<(), SyncError> {
        self.sender
            .send(SyncCommand::Refresh)
            .await
            .map_err(|_| SyncError::Stopped)
    }

    /// Resolves once the store has confirmed the change and the cache holds it.
    pub async fn set_status(&self, key: impl Into<String>, status: OrderStatus) -> Result<Order, SyncError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SyncCommand::SetStatus {
                key: key.into(),
                status,
                respond_to,
            })
            .await
            .map_err(|_| SyncError::Stopped)?;
        response.await.map_err(|_| SyncError::Stopped)?
    }

    pub async fn shutdown(&self) {
        let _ = self.sender.send(SyncCommand::Shutdown).await;
    }
}

/// Keeps one view current: polls the source, listens for cache writes made
/// by other contexts, and renders a full frame on every change.
pub struct ViewSynchronizer<Src, S, K> {
    view: ViewKind,
    source: Src,
    cache: ProjectionCache<S>,
    sink: K,
    config: SyncConfig,
    commands: mpsc::Receiver<SyncCommand>,
}

impl<Src, S, K> ViewSynchronizer<Src, S, K>
where
    Src: OrderSource,
    S: KeyValueStore,
    K: FrameSink,
{
    pub fn new(
        view: ViewKind,
        source: Src,
        cache: ProjectionCache<S>,
        sink: K,
        config: SyncConfig,
    ) -> (Self, SyncHandle) {
        let (sender, commands) = mpsc::channel(16);
        let synchronizer = Self {
            view,
            source,
            cache,
            sink,
            config,
            commands,
        };
        (synchronizer, SyncHandle { sender })
    }

    #[instrument(name = "view_sync", skip(self), fields(view = ?self.view))]
    pub async fn run(mut self) {
        info!(interval = ?self.config.poll_interval, "Synchronizer starting");

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut changes = self.cache.subscribe();
        let mut watching = true;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.poll().await,
                command = self.commands.recv() => match command {
                    Some(SyncCommand::Refresh) => {
                        self.poll().await;
                        ticker.reset();
                    }
                    Some(SyncCommand::SetStatus { key, status, respond_to }) => {
                        let result = self.set_status(&key, status).await;
                        let _ = respond_to.send(result);
                    }
                    Some(SyncCommand::Shutdown) | None => break,
                },
                change = changes.changed(), if watching => match change {
                    Some(StorageChange::Key(key)) if self.watches(&key) => {
                        debug!(key, "Cache changed in another context");
                        self.render_cached();
                    }
                    Some(StorageChange::Key(_)) => {}
                    Some(StorageChange::Missed(_)) => self.render_cached(),
                    None => watching = false,
                },
            }
        }

        info!("Synchronizer stopped");
    }

    fn watches(&self, key: &str) -> bool {
        key == keys::ORDERS || key == keys::BOARD
    }

    fn cached_orders(&self) -> Vec<CachedOrder> {
        match self.view {
            ViewKind::Orders => self.cache.orders(),
            ViewKind::Board => self.cache.board(),
        }
    }

    fn show(&mut self, state: ViewState) {
        let frame = Frame::new(self.view, state, self.config.poll_interval);
        self.sink.show(frame);
    }

    fn render_cached(&mut self) {
        let cached = self.cached_orders();
        self.show(ViewState::Ready(cached));
    }

    /// One fetch. Success folds the fetched set into the cache and renders
    /// the merged projection in full; failure renders the cache under an
    /// error panel.
    async fn poll(&mut self) {
        let fetched = match timeout(self.config.fetch_timeout, self.source.fetch_latest()).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout(self.config.fetch_timeout)),
        };

        match fetched {
            Ok(orders) => {
                let merged = self.cache.merge_remote(&orders).unwrap_or_else(|e| {
                    warn!(error = %e, "Could not update projection cache");
                    merge(self.cache.orders(), orders.iter().map(CachedOrder::from).collect())
                });
                let shown = match self.view {
                    ViewKind::Orders => merged,
                    ViewKind::Board => board(&merged),
                };
                self.show(ViewState::Ready(shown));
            }
            Err(e) => {
                warn!(error = %e, "Fetch failed, showing cached orders");
                let cached = self.cached_orders();
                self.show(ViewState::Failed {
                    cached,
                    error: e.to_string(),
                });
            }
        }
    }

    async fn set_status(&mut self, key: &str, status: OrderStatus) -> Result<Order, SyncError> {
        let order = match timeout(self.config.fetch_timeout, self.source.update_status(key, status)).await {
            Ok(result) => result?,
            Err(_) => return Err(SyncError::Timeout(self.config.fetch_timeout)),
        };
        self.cache.apply_confirmed(&order)?;
        info!(order_number = %order.order_number, status = %order.status, "Status confirmed");
        self.render_cached();
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::{LineItem, OrderDraft, OrderType};
    use crate::projection::MemoryStore;

    /// Scripted source: serves `orders`, or fails while `down` is set.
    #[derive(Clone, Default)]
    struct FakeSource {
        orders: Arc<Mutex<Vec<Order>>>,
        down: Arc<AtomicBool>,
        fetches: Arc<AtomicUsize>,
    }

    fn order(id: u64, priority: u32, status: OrderStatus) -> Order {
        Order {
            id,
            order_number: format!("D{:07}", id),
            priority_number: priority,
            order_type: OrderType::DineIn,
            items: vec![LineItem::new("Latte", Decimal::from(55), 1)],
            total_amount: Decimal::from(55),
            payment_method: "Cash".to_string(),
            status,
            created_at: Utc::now(),
        }
    }

    #[async_trait]
    impl OrderSource for FakeSource {
        async fn fetch_latest(&self) -> Result<Vec<Order>, SyncError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.down.load(Ordering::SeqCst) {
                return Err(SyncError::Network("connection refused".to_string()));
            }
            Ok(self.orders.lock().unwrap().clone())
        }

        async fn create_order(&self, _draft: &OrderDraft) -> Result<Order, SyncError> {
            Err(SyncError::Network("read-only".to_string()))
        }

        async fn update_status(&self, key: &str, status: OrderStatus) -> Result<Order, SyncError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(SyncError::Network("connection refused".to_string()));
            }
            let mut orders = self.orders.lock().unwrap();
            let found = orders
                .iter_mut()
                .find(|o| o.order_number == key || o.id.to_string() == key)
                .ok_or_else(|| SyncError::Rejected {
                    status: 404,
                    message: format!("Order not found: {key}"),
                })?;
            found.status = status;
            Ok(found.clone())
        }
    }

    fn slow_config() -> SyncConfig {
        SyncConfig {
            poll_interval: Duration::from_secs(3600),
            fetch_timeout: Duration::from_secs(1),
        }
    }

    fn start(
        view: ViewKind,
        source: FakeSource,
        store: MemoryStore,
    ) -> (SyncHandle, mpsc::UnboundedReceiver<Frame>, tokio::task::JoinHandle<()>) {
        let (sink, frames) = mpsc::unbounded_channel();
        let (sync, handle) = ViewSynchronizer::new(view, source, ProjectionCache::new(store), sink, slow_config());
        let task = tokio::spawn(sync.run());
        (handle, frames, task)
    }

    #[tokio::test]
    async fn test_first_tick_renders_fetched_board() {
        let source = FakeSource::default();
        *source.orders.lock().unwrap() = vec![
            order(1, 1, OrderStatus::Serving),
            order(2, 2, OrderStatus::Preparing),
            order(3, 3, OrderStatus::Pending),
        ];
        let (handle, mut frames, task) = start(ViewKind::Board, source, MemoryStore::new());

        let frame = frames.recv().await.unwrap();
        assert!(!frame.is_failure());
        assert_eq!(frame.text, "PREPARING\n  2\nNOW SERVING\n  1");

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_poll_renders_merged_projection() {
        let store = MemoryStore::new();
        let local = ProjectionCache::new(store.open_context());
        local.apply_confirmed(&order(1, 1, OrderStatus::Preparing)).unwrap();

        let source = FakeSource::default();
        *source.orders.lock().unwrap() = vec![order(1, 1, OrderStatus::Completed), order(2, 2, OrderStatus::Serving)];
        let (handle, mut frames, task) = start(ViewKind::Board, source, store.clone());

        // The cached entry wins over the remote copy; the new order is added.
        let polled = frames.recv().await.unwrap();
        assert_eq!(polled.text, "PREPARING\n  1\nNOW SERVING\n  2");
        let ViewState::Ready(shown) = &polled.state else {
            panic!("expected a ready frame");
        };
        assert_eq!(shown, &local.board());

        // Polling again changes nothing: local entries keep winning.
        handle.refresh().await.unwrap();
        assert_eq!(frames.recv().await.unwrap().text, polled.text);

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_failure_shows_cache_and_recovers_on_refresh() {
        let source = FakeSource::default();
        *source.orders.lock().unwrap() = vec![order(1, 1, OrderStatus::Preparing)];
        let (handle, mut frames, task) = start(ViewKind::Board, source.clone(), MemoryStore::new());

        let first = frames.recv().await.unwrap();
        assert!(!first.is_failure());

        source.down.store(true, Ordering::SeqCst);
        handle.refresh().await.unwrap();
        let failed = frames.recv().await.unwrap();
        let ViewState::Failed { cached, error } = &failed.state else {
            panic!("expected a failed frame");
        };
        assert_eq!(cached.len(), 1);
        assert!(error.contains("connection refused"));
        assert!(failed.text.contains("PREPARING\n  1"));

        source.down.store(false, Ordering::SeqCst);
        handle.refresh().await.unwrap();
        assert!(!frames.recv().await.unwrap().is_failure());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 3);

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_status_change_reaches_other_context() {
        let source = FakeSource::default();
        *source.orders.lock().unwrap() = vec![order(1, 1, OrderStatus::Pending)];
        let store = MemoryStore::new();

        let (list, mut list_frames, list_task) = start(ViewKind::Orders, source.clone(), store.clone());
        let (board, mut board_frames, board_task) = start(ViewKind::Board, source, store.open_context());
        list_frames.recv().await.unwrap();
        let empty = board_frames.recv().await.unwrap();
        assert!(empty.text.contains("No orders in preparation"));

        let updated = list.set_status("D0000001", OrderStatus::Preparing).await.unwrap();
        assert_eq!(updated.status, OrderStatus::Preparing);

        // The board re-renders from the shared cache without polling.
        let mut frame = board_frames.recv().await.unwrap();
        while !frame.text.contains("PREPARING\n  1") {
            frame = board_frames.recv().await.unwrap();
        }

        list.shutdown().await;
        board.shutdown().await;
        list_task.await.unwrap();
        board_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_status_leaves_cache_alone() {
        let source = FakeSource::default();
        *source.orders.lock().unwrap() = vec![order(1, 1, OrderStatus::Pending)];
        let store = MemoryStore::new();
        let (handle, mut frames, task) = start(ViewKind::Orders, source, store.clone());
        frames.recv().await.unwrap();

        let err = handle.set_status("D0000099", OrderStatus::Serving).await.unwrap_err();
        assert!(matches!(err, SyncError::Rejected { status: 404, .. }));

        let cache = ProjectionCache::new(store);
        assert_eq!(cache.orders()[0].status, OrderStatus::Pending);

        handle.shutdown().await;
        task.await.unwrap();
    }
}
