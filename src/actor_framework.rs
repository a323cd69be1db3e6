use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Params, and Actions)
// =============================================================================

/// Errors raised by the actor plumbing itself rather than by an entity.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

/// Records owned by a [`ResourceActor`], ordered by id.
pub type Records<T> = BTreeMap<<T as Entity>::Id, T>;

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Ord + Clone + Send + Sync + Display + Debug + FromStr;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Error: From<FrameworkError> + Send + Sync + Debug;
    /// State the actor keeps next to the records for the current session.
    /// It outlives deletes and is reset to `Default` by `Clear`.
    type Session: Default + Send + Debug;

    fn id(&self) -> &Self::Id;

    /// Secondary lookup key accepted wherever an id is (e.g. a public code).
    fn alt_key(&self) -> Option<&str> {
        None
    }

    /// Construct the full entity. `existing` is the store as it stands
    /// before the insert; the actor runs this with exclusive access, so
    /// anything derived from it cannot race with another create.
    fn from_create_params(
        id: Self::Id,
        params: Self::CreateParams,
        existing: &Records<Self>,
        session: &Self::Session,
    ) -> Result<Self, Self::Error>;

    /// Fold a committed (or loaded) record into the session state.
    fn observe(&self, _session: &mut Self::Session) {}

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler ---

    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Durable copy of an actor's records. Saved after every mutation; a failed
/// save makes the actor undo the mutation before replying.
pub trait Snapshot<T: Entity>: Send + 'static {
    fn load(&mut self) -> Result<Vec<T>, FrameworkError>;
    fn save(&mut self, records: &Records<T>) -> Result<(), FrameworkError>;
}

/// Keeps nothing. The default for in-memory stores.
pub struct NullSnapshot;

impl<T: Entity> Snapshot<T> for NullSnapshot {
    fn load(&mut self) -> Result<Vec<T>, FrameworkError> {
        Ok(Vec::new())
    }

    fn save(&mut self, _records: &Records<T>) -> Result<(), FrameworkError> {
        Ok(())
    }
}

/// Whole-store JSON file, replaced atomically via a temp file and rename.
pub struct JsonFileSnapshot<T> {
    path: PathBuf,
    _entity: PhantomData<fn() -> T>,
}

impl<T> JsonFileSnapshot<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _entity: PhantomData,
        }
    }
}

impl<T> Snapshot<T> for JsonFileSnapshot<T>
where
    T: Entity + Serialize + DeserializeOwned,
{
    fn load(&mut self) -> Result<Vec<T>, FrameworkError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| FrameworkError::Storage(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| FrameworkError::Storage(format!("{}: {}", self.path.display(), e)))
    }

    fn save(&mut self, records: &Records<T>) -> Result<(), FrameworkError> {
        let items: Vec<&T> = records.values().collect();
        let json = serde_json::to_string_pretty(&items)
            .map_err(|e| FrameworkError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| FrameworkError::Storage(format!("{}: {}", self.path.display(), e)))
    }
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, E>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T, T::Error>,
    },
    Get {
        key: String,
        respond_to: Response<Option<T>, T::Error>,
    },
    List {
        respond_to: Response<Vec<T>, T::Error>,
    },
    Update {
        key: String,
        patch: T::Patch,
        respond_to: Response<T, T::Error>,
    },
    Delete {
        key: String,
        respond_to: Response<T, T::Error>,
    },
    Action {
        key: String,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
    Clear {
        respond_to: Response<usize, T::Error>,
    },
    Shutdown,
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

type NextIdFn<T> = Box<dyn Fn(Option<&<T as Entity>::Id>) -> <T as Entity>::Id + Send + Sync>;

pub struct ResourceActor<T: Entity> {
    name: &'static str,
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: Records<T>,
    last_id: Option<T::Id>,
    session: T::Session,
    next_id_fn: NextIdFn<T>,
    snapshot: Box<dyn Snapshot<T>>,
}

impl<T: Entity> ResourceActor<T> {
    /// `next_id_fn` receives the highest id ever handed out (not just the
    /// highest one still stored), so deleted ids are never reissued.
    pub fn new(
        name: &'static str,
        buffer_size: usize,
        next_id_fn: impl Fn(Option<&T::Id>) -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            name,
            receiver,
            store: BTreeMap::new(),
            last_id: None,
            session: T::Session::default(),
            next_id_fn: Box::new(next_id_fn),
            snapshot: Box::new(NullSnapshot),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Attach durable storage and load whatever it already holds.
    pub fn with_snapshot(mut self, mut snapshot: impl Snapshot<T>) -> Result<Self, FrameworkError> {
        for item in snapshot.load()? {
            self.store.insert(item.id().clone(), item);
        }
        self.last_id = self.store.keys().next_back().cloned();
        for item in self.store.values() {
            item.observe(&mut self.session);
        }
        info!(resource = self.name, loaded = self.store.len(), "Snapshot loaded");
        self.snapshot = Box::new(snapshot);
        Ok(self)
    }

    /// Seed records through the normal create path. Only meaningful before `run`.
    pub fn seed(&mut self, params: impl IntoIterator<Item = T::CreateParams>) -> Result<usize, T::Error> {
        let mut count = 0;
        for p in params {
            self.create(p)?;
            count += 1;
        }
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub async fn run(mut self) {
        info!(resource = self.name, "ResourceActor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.create(params));
                }
                ResourceRequest::Get { key, respond_to } => {
                    let item = self.resolve(&key).and_then(|id| self.store.get(&id)).cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Update { key, patch, respond_to } => {
                    let result = self.mutate(&key, |item| item.on_update(patch));
                    let _ = respond_to.send(result.map(|(item, _)| item));
                }
                ResourceRequest::Delete { key, respond_to } => {
                    let _ = respond_to.send(self.delete(&key));
                }
                ResourceRequest::Action { key, action, respond_to } => {
                    let result = self.mutate(&key, |item| item.handle_action(action));
                    let _ = respond_to.send(result.map(|(_, outcome)| outcome));
                }
                ResourceRequest::Clear { respond_to } => {
                    let _ = respond_to.send(self.clear());
                }
                ResourceRequest::Shutdown => {
                    info!(resource = self.name, "ResourceActor shutting down");
                    break;
                }
            }
        }

        info!(resource = self.name, "ResourceActor stopped");
    }

    /// Internal id first, then the entity's alternate key.
    fn resolve(&self, key: &str) -> Option<T::Id> {
        if let Ok(id) = key.parse::<T::Id>() {
            if self.store.contains_key(&id) {
                return Some(id);
            }
        }
        self.store
            .values()
            .find(|item| item.alt_key() == Some(key))
            .map(|item| item.id().clone())
    }

    fn persist(&mut self) -> Result<(), FrameworkError> {
        self.snapshot.save(&self.store).map_err(|e| {
            error!(resource = self.name, error = %e, "Snapshot save failed, rolling back");
            e
        })
    }

    fn create(&mut self, params: T::CreateParams) -> Result<T, T::Error> {
        let id = (self.next_id_fn)(self.last_id.as_ref());
        let mut item = T::from_create_params(id.clone(), params, &self.store, &self.session)?;
        item.on_create()?;

        self.store.insert(id.clone(), item.clone());
        if let Err(e) = self.persist() {
            self.store.remove(&id);
            return Err(e.into());
        }
        self.last_id = Some(id.clone());
        item.observe(&mut self.session);
        debug!(resource = self.name, id = %id, "Created");
        Ok(item)
    }

    /// Apply `f` to a working copy and commit it only if both the hook and
    /// the snapshot succeed.
    fn mutate<R>(
        &mut self,
        key: &str,
        f: impl FnOnce(&mut T) -> Result<R, T::Error>,
    ) -> Result<(T, R), T::Error> {
        let id = self
            .resolve(key)
            .ok_or_else(|| FrameworkError::NotFound(key.to_string()))?;
        let Some(current) = self.store.get(&id) else {
            return Err(FrameworkError::NotFound(key.to_string()).into());
        };

        let mut working = current.clone();
        let outcome = f(&mut working)?;

        let previous = self.store.insert(id.clone(), working.clone());
        if let Err(e) = self.persist() {
            if let Some(previous) = previous {
                self.store.insert(id, previous);
            }
            return Err(e.into());
        }
        Ok((working, outcome))
    }

    fn delete(&mut self, key: &str) -> Result<T, T::Error> {
        let id = self
            .resolve(key)
            .ok_or_else(|| FrameworkError::NotFound(key.to_string()))?;
        let Some(item) = self.store.remove(&id) else {
            return Err(FrameworkError::NotFound(key.to_string()).into());
        };
        if let Err(e) = item.on_delete() {
            self.store.insert(id, item);
            return Err(e);
        }
        if let Err(e) = self.persist() {
            self.store.insert(id, item);
            return Err(e.into());
        }
        Ok(item)
    }

    fn clear(&mut self) -> Result<usize, T::Error> {
        let previous = std::mem::take(&mut self.store);
        if let Err(e) = self.persist() {
            self.store = previous;
            return Err(e.into());
        }
        self.session = T::Session::default();
        warn!(resource = self.name, removed = previous.len(), "Store cleared");
        Ok(previous.len())
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

// Derive would demand `T: Clone` on the request type as well.
impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T, T::Error> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    pub async fn get(&self, key: impl Into<String>) -> Result<Option<T>, T::Error> {
        let key = key.into();
        self.request(|respond_to| ResourceRequest::Get { key, respond_to })
            .await
    }

    pub async fn list(&self) -> Result<Vec<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::List { respond_to })
            .await
    }

    pub async fn update(&self, key: impl Into<String>, patch: T::Patch) -> Result<T, T::Error> {
        let key = key.into();
        self.request(|respond_to| ResourceRequest::Update { key, patch, respond_to })
            .await
    }

    pub async fn delete(&self, key: impl Into<String>) -> Result<T, T::Error> {
        let key = key.into();
        self.request(|respond_to| ResourceRequest::Delete { key, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        key: impl Into<String>,
        action: T::Action,
    ) -> Result<T::ActionResult, T::Error> {
        let key = key.into();
        self.request(|respond_to| ResourceRequest::Action { key, action, respond_to })
            .await
    }

    pub async fn clear(&self) -> Result<usize, T::Error> {
        self.request(|respond_to| ResourceRequest::Clear { respond_to })
            .await
    }

    pub async fn shutdown(&self) -> Result<(), T::Error> {
        self.sender
            .send(ResourceRequest::Shutdown)
            .await
            .map_err(|_| FrameworkError::ActorClosed.into())
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
