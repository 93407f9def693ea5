//! Persistence: the gateway collaborator, the commit queue, and its worker.
//!
//! DESIGN
//! ======
//! The engine never awaits persistence. Committed changes are pushed onto a
//! bounded queue with `try_send`; a background task drains it in order and
//! calls the `PersistenceGateway`. In-memory state is the source of truth and
//! is never rolled back.
//!
//! ERROR HANDLING
//! ==============
//! A full or closed queue drops the op with a warning. Gateway failures are
//! retried with linear back-off. Dropped ops and ops that ran out of attempts
//! are both reported on the failure channel so the UI can surface a
//! transient warning. Nothing here is fatal.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::items::{CanvasItem, ItemGeometry, ItemId};
use crate::seating::{Guest, GuestId};

const DEFAULT_PERSIST_QUEUE_CAPACITY: usize = 1024;
const DEFAULT_PERSIST_ATTEMPTS: u32 = 3;
const DEFAULT_PERSIST_RETRY_BASE_MS: u64 = 200;

/// Identifier of a seating plan or moodboard.
pub type CollectionId = Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PersistError {
    #[error("layout not found: {0}")]
    LayoutNotFound(CollectionId),
    #[error("gateway error: {0}")]
    Gateway(String),
    #[error("persist queue full")]
    QueueFull,
    #[error("persist queue closed")]
    QueueClosed,
}

impl ErrorCode for PersistError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::LayoutNotFound(_) => "E_LAYOUT_NOT_FOUND",
            Self::Gateway(_) => "E_GATEWAY",
            Self::QueueFull => "E_QUEUE_FULL",
            Self::QueueClosed => "E_QUEUE_CLOSED",
        }
    }
}

/// Everything stored for one collection. Tables are items of kind table;
/// each guest's `table_id` is its assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub items: Vec<CanvasItem>,
    pub guests: Vec<Guest>,
}

/// Durable storage for layouts. Implemented outside this crate.
#[async_trait::async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Fetch the stored layout of a collection.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the layout is missing or the backend fails.
    async fn load_layout(&self, collection_id: CollectionId) -> Result<LayoutSnapshot, PersistError>;

    /// Upsert a full item record (new items, capacity changes).
    async fn save_item(&self, item: &CanvasItem) -> Result<(), PersistError>;

    /// Store the geometry of one item after an operation commits.
    async fn save_item_geometry(&self, item_id: ItemId, geometry: ItemGeometry) -> Result<(), PersistError>;

    /// Store a guest's seat; `None` clears it.
    async fn save_assignment(&self, guest_id: GuestId, table_id: Option<ItemId>) -> Result<(), PersistError>;

    async fn delete_item(&self, item_id: ItemId) -> Result<(), PersistError>;
}

/// One committed change waiting to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOp {
    SaveItem(CanvasItem),
    SaveGeometry { item_id: ItemId, geometry: ItemGeometry },
    SaveAssignment { guest_id: GuestId, table_id: Option<ItemId> },
    DeleteItem { item_id: ItemId },
}

impl PersistOp {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SaveItem(_) => "save_item",
            Self::SaveGeometry { .. } => "save_item_geometry",
            Self::SaveAssignment { .. } => "save_assignment",
            Self::DeleteItem { .. } => "delete_item",
        }
    }

    async fn apply(&self, gateway: &dyn PersistenceGateway) -> Result<(), PersistError> {
        match self {
            Self::SaveItem(item) => gateway.save_item(item).await,
            Self::SaveGeometry { item_id, geometry } => gateway.save_item_geometry(*item_id, *geometry).await,
            Self::SaveAssignment { guest_id, table_id } => gateway.save_assignment(*guest_id, *table_id).await,
            Self::DeleteItem { item_id } => gateway.delete_item(*item_id).await,
        }
    }
}

/// An op the worker gave up on.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistFailure {
    pub op: PersistOp,
    pub error: PersistError,
}

// =============================================================================
// CONFIG
// =============================================================================

/// Tuning knobs for the persistence worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistConfig {
    /// Bounded queue capacity; ops beyond it are dropped with a warning.
    pub queue_capacity: usize,
    /// Total gateway calls per op before it is reported as failed.
    pub attempts: u32,
    /// Delay before retry `n` is `n * retry_base_ms`.
    pub retry_base_ms: u64,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_PERSIST_QUEUE_CAPACITY,
            attempts: DEFAULT_PERSIST_ATTEMPTS,
            retry_base_ms: DEFAULT_PERSIST_RETRY_BASE_MS,
        }
    }
}

impl PersistConfig {
    /// Build from environment variables, falling back to defaults:
    /// - `PLANBOARD_PERSIST_QUEUE_CAPACITY` (default 1024)
    /// - `PLANBOARD_PERSIST_ATTEMPTS` (default 3)
    /// - `PLANBOARD_PERSIST_RETRY_BASE_MS` (default 200)
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            queue_capacity: env_parse("PLANBOARD_PERSIST_QUEUE_CAPACITY", DEFAULT_PERSIST_QUEUE_CAPACITY),
            attempts: env_parse("PLANBOARD_PERSIST_ATTEMPTS", DEFAULT_PERSIST_ATTEMPTS),
            retry_base_ms: env_parse("PLANBOARD_PERSIST_RETRY_BASE_MS", DEFAULT_PERSIST_RETRY_BASE_MS),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, raw = %raw, "unparseable config value; using default");
                default
            }
        },
        Err(_) => default,
    }
}

// =============================================================================
// QUEUE
// =============================================================================

/// Sending side of the persistence queue, held by the engine.
#[derive(Debug, Clone)]
pub struct PersistHandle {
    tx: mpsc::Sender<PersistOp>,
    failures: Option<mpsc::UnboundedSender<PersistFailure>>,
}

impl PersistHandle {
    /// Create a queue of the given capacity (at least 1). Dropped ops are
    /// only logged; use [`spawn_persistence_worker`] to have them reported.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PersistOp>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx, failures: None }, rx)
    }

    /// Best-effort, non-blocking enqueue. Returns whether the op was queued.
    pub fn enqueue(&self, op: PersistOp) -> bool {
        match self.tx.try_send(op) {
            Ok(()) => true,
            Err(TrySendError::Full(op)) => {
                warn!(op = op.name(), "persist queue full; dropping op");
                self.report_drop(op, PersistError::QueueFull);
                false
            }
            Err(TrySendError::Closed(op)) => {
                warn!(op = op.name(), "persist queue closed; dropping op");
                self.report_drop(op, PersistError::QueueClosed);
                false
            }
        }
    }

    fn report_drop(&self, op: PersistOp, error: PersistError) {
        if let Some(failures) = &self.failures {
            if failures.send(PersistFailure { op, error }).is_err() {
                debug!("failure receiver dropped");
            }
        }
    }
}

// =============================================================================
// WORKER
// =============================================================================

/// A running persistence worker.
pub struct PersistWorker {
    /// Give this to `LayoutEngine::set_persistence`.
    pub handle: PersistHandle,
    /// Ops dropped at enqueue or abandoned after all attempts, for UI warnings.
    pub failures: mpsc::UnboundedReceiver<PersistFailure>,
    /// Finishes once every `PersistHandle` clone has been dropped and the
    /// queue is drained.
    pub task: JoinHandle<()>,
}

/// Spawn the background worker that writes queued ops through `gateway`.
#[must_use]
pub fn spawn_persistence_worker(gateway: Arc<dyn PersistenceGateway>, config: PersistConfig) -> PersistWorker {
    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
    let (failures_tx, failures) = mpsc::unbounded_channel();
    let handle = PersistHandle { tx, failures: Some(failures_tx.clone()) };

    info!(
        queue_capacity = config.queue_capacity,
        attempts = config.attempts,
        retry_base_ms = config.retry_base_ms,
        "persistence worker configured"
    );

    let task = tokio::spawn(run_worker(gateway, rx, failures_tx, config));
    PersistWorker { handle, failures, task }
}

async fn run_worker(
    gateway: Arc<dyn PersistenceGateway>,
    mut rx: mpsc::Receiver<PersistOp>,
    failures: mpsc::UnboundedSender<PersistFailure>,
    config: PersistConfig,
) {
    while let Some(op) = rx.recv().await {
        if let Err(error) = apply_with_retry(gateway.as_ref(), &op, config).await {
            error!(error = %error, op = op.name(), "persistence op abandoned");
            if failures.send(PersistFailure { op, error }).is_err() {
                debug!("failure receiver dropped");
            }
        }
    }
    debug!("persist queue closed; worker exiting");
}

async fn apply_with_retry(
    gateway: &dyn PersistenceGateway,
    op: &PersistOp,
    config: PersistConfig,
) -> Result<(), PersistError> {
    let attempts = config.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op.apply(gateway).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt < attempts => {
                warn!(error = %e, attempt, total = attempts, op = op.name(), "persistence op failed; retrying");
                tokio::time::sleep(Duration::from_millis(u64::from(attempt) * config.retry_base_ms)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Load a collection's layout through the gateway.
///
/// # Errors
///
/// Propagates the gateway's [`PersistError`].
pub async fn fetch_layout(
    gateway: &dyn PersistenceGateway,
    collection_id: CollectionId,
) -> Result<LayoutSnapshot, PersistError> {
    let snapshot = gateway.load_layout(collection_id).await?;
    info!(
        %collection_id,
        items = snapshot.items.len(),
        guests = snapshot.guests.len(),
        "layout loaded"
    );
    Ok(snapshot)
}
