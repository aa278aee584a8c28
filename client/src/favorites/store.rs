//! The favorites store.
//!
//! Holds the persisted favorites collection and the transient pending set.
//! Every mutation runs in three phases:
//!
//! 1. **apply** ([`FavoritesStore::begin_add`], [`FavoritesStore::begin_remove`]):
//!    synchronously mark the id pending, change the collection, persist it.
//!    Callers see the change before any network round trip.
//! 2. **confirm**: ask the [`FavoriteConfirmer`], bounded by the
//!    confirmation timeout.
//! 3. **compensate**: on failure restore the snapshot taken in phase 1,
//!    persist, and publish a [`Notice`].
//!
//! Phases 2 and 3 run on their own Tokio task, started by phase 1. They run
//! to completion even if the caller stops waiting: dropping the
//! [`PendingMutation`] or the `add_favorite`/`remove_favorite` future
//! does not cancel a confirmation or its rollback. The pending mark is
//! released when that task finishes.
//!
//! The store does not serialize operations on one id. Callers are expected to
//! check [`FavoritesStore::is_pending`] before issuing another mutation; two
//! overlapping mutations on the same id resolve last-write-wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bills_model::FavoriteBill;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::confirm::FavoriteConfirmer;
use super::migrate;
use super::storage::FavoritesStorage;
use crate::error::NetworkError;

const EVENT_CAPACITY: usize = 64;

/// A user-visible, non-fatal message about a favorite change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Bill number the notice is about, or the raw id when the bill is unknown.
    pub subject: String,
    pub message: String,
}

/// Published to every [`FavoritesStore::subscribe`] receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The favorites collection changed; `count` entries now.
    Changed { count: usize },
    /// An id entered or left the pending set.
    Pending { id: String, pending: bool },
    /// A change was rolled back.
    Warning(Notice),
}

/// How a settled mutation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Committed,
    RolledBack(Notice),
    /// The confirmation task stopped before finishing, e.g. during runtime
    /// shutdown. The applied change stands unconfirmed.
    Interrupted,
}

impl MutationOutcome {
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

struct StoreState {
    favorites: Vec<FavoriteBill>,
    /// In-flight mutation count per id.
    pending: HashMap<String, usize>,
}

/// Process-wide favorites state. Construct once at startup with [`Self::load`]
/// and share the returned `Arc`.
pub struct FavoritesStore {
    state: Mutex<StoreState>,
    storage: Box<dyn FavoritesStorage>,
    confirmer: Arc<dyn FavoriteConfirmer>,
    confirm_timeout: Duration,
    events: broadcast::Sender<StoreEvent>,
}

impl FavoritesStore {
    /// Load persisted favorites, or start empty.
    ///
    /// Never fails: unreadable, corrupt or unsupported storage is logged and
    /// treated as an empty collection. A blob in an older format is rewritten
    /// in the current one.
    pub fn load(
        storage: Box<dyn FavoritesStorage>,
        confirmer: Arc<dyn FavoriteConfirmer>,
        confirm_timeout: Duration,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let favorites = match storage.read() {
            Ok(Some(contents)) => match migrate::decode(&contents) {
                Ok(decoded) => {
                    if decoded.is_outdated() {
                        info!(
                            from_version = decoded.version,
                            to_version = migrate::STORAGE_VERSION,
                            "migrating stored favorites"
                        );
                        persist(storage.as_ref(), &decoded.favorites);
                    }
                    decoded.favorites
                }
                Err(err) => {
                    warn!(error = %err, "stored favorites unusable; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "favorites storage unavailable; starting empty");
                Vec::new()
            }
        };

        info!(count = favorites.len(), "favorites store initialized");

        Arc::new(Self {
            state: Mutex::new(StoreState {
                favorites,
                pending: HashMap::new(),
            }),
            storage,
            confirmer,
            confirm_timeout,
            events,
        })
    }

    /// Favorites in insertion order.
    pub fn favorites(&self) -> Vec<FavoriteBill> {
        self.state().favorites.clone()
    }

    pub fn len(&self) -> usize {
        self.state().favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().favorites.is_empty()
    }

    /// Whether a favorite with `id` is in the current collection.
    pub fn is_favorite(&self, id: &str) -> bool {
        self.state().favorites.iter().any(|f| f.id == id)
    }

    /// Whether a mutation on `id` is in flight.
    pub fn is_pending(&self, id: &str) -> bool {
        self.state().pending.contains_key(id)
    }

    /// Receive store events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Add `bill`, replacing any favorite with the same id, and confirm it.
    pub async fn add_favorite(self: &Arc<Self>, bill: FavoriteBill) -> MutationOutcome {
        self.begin_add(bill).settle().await
    }

    /// Remove the favorite with `id` and confirm it.
    pub async fn remove_favorite(self: &Arc<Self>, id: &str) -> MutationOutcome {
        self.begin_remove(id).settle().await
    }

    /// Apply phase of an add. The favorite is visible when this returns and
    /// its confirmation is already under way.
    ///
    /// An existing entry with the same id is replaced in place, keeping its
    /// position.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn begin_add(self: &Arc<Self>, bill: FavoriteBill) -> PendingMutation {
        let guard = self.mark_pending(&bill.id);

        let replaced = {
            let mut state = self.state();
            let replaced = match state.favorites.iter().position(|f| f.id == bill.id) {
                Some(index) => Some(std::mem::replace(&mut state.favorites[index], bill.clone())),
                None => {
                    state.favorites.push(bill.clone());
                    None
                }
            };
            self.commit(&state);
            replaced
        };

        debug!(id = %bill.id, bill_no = %bill.bill_no, "favorite added optimistically");

        self.dispatch(Change::Add { bill, replaced }, guard)
    }

    /// Apply phase of a remove. The favorite is gone when this returns and
    /// its confirmation is already under way.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn begin_remove(self: &Arc<Self>, id: &str) -> PendingMutation {
        let guard = self.mark_pending(id);

        let (snapshot, subject) = {
            let mut state = self.state();
            let snapshot = state.favorites.clone();
            let subject = snapshot
                .iter()
                .find(|f| f.id == id)
                .map_or_else(|| id.to_string(), |f| f.bill_no.clone());
            state.favorites.retain(|f| f.id != id);
            self.commit(&state);
            (snapshot, subject)
        };

        debug!(id, "favorite removed optimistically");

        self.dispatch(
            Change::Remove {
                id: id.to_string(),
                subject,
                snapshot,
            },
            guard,
        )
    }

    /// Start confirm and compensate on a detached task holding `pending`.
    fn dispatch(self: &Arc<Self>, change: Change, pending: PendingGuard) -> PendingMutation {
        let id = change.id().to_string();
        let store = Arc::clone(self);

        let task = tokio::spawn(async move {
            let outcome = store.resolve(change).await;
            drop(pending);
            outcome
        });

        PendingMutation { id, task }
    }

    async fn resolve(&self, change: Change) -> MutationOutcome {
        match self.confirm(&change).await {
            Ok(()) => MutationOutcome::Committed,
            Err(err) => {
                warn!(id = change.id(), error = %err, "favorite change not confirmed; rolling back");
                MutationOutcome::RolledBack(self.compensate(change))
            }
        }
    }

    fn mark_pending(self: &Arc<Self>, id: &str) -> PendingGuard {
        let first = {
            let mut state = self.state();
            let count = state.pending.entry(id.to_string()).or_insert(0);
            *count += 1;
            *count == 1
        };
        if first {
            self.publish(StoreEvent::Pending {
                id: id.to_string(),
                pending: true,
            });
        }
        PendingGuard {
            store: Arc::clone(self),
            id: id.to_string(),
        }
    }

    fn release_pending(&self, id: &str) {
        let cleared = {
            let mut state = self.state();
            match state.pending.get_mut(id) {
                Some(count) if *count > 1 => {
                    *count -= 1;
                    false
                }
                Some(_) => {
                    state.pending.remove(id);
                    true
                }
                None => false,
            }
        };
        if cleared {
            self.publish(StoreEvent::Pending {
                id: id.to_string(),
                pending: false,
            });
        }
    }

    /// Persist the collection held by `state` and announce the change.
    fn commit(&self, state: &StoreState) {
        persist(self.storage.as_ref(), &state.favorites);
        self.publish(StoreEvent::Changed {
            count: state.favorites.len(),
        });
    }

    async fn confirm(&self, change: &Change) -> Result<(), NetworkError> {
        let call = async {
            match change {
                Change::Add { bill, .. } => self.confirmer.favorite(&bill.bill_no).await,
                Change::Remove { subject, .. } => self.confirmer.unfavorite(subject).await,
            }
        };

        tokio::time::timeout(self.confirm_timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(NetworkError::Timeout(
                    u64::try_from(self.confirm_timeout.as_millis()).unwrap_or(u64::MAX),
                ))
            })
    }

    fn compensate(&self, change: Change) -> Notice {
        let mut state = self.state();

        let notice = match change {
            Change::Add { bill, replaced } => {
                let position = state.favorites.iter().position(|f| f.id == bill.id);
                match (position, replaced) {
                    (Some(index), Some(previous)) => state.favorites[index] = previous,
                    (None, Some(previous)) => state.favorites.push(previous),
                    (Some(index), None) => {
                        state.favorites.remove(index);
                    }
                    (None, None) => {}
                }
                Notice {
                    message: format!(
                        "Failed to add {} to favorites. Please try again.",
                        bill.bill_no
                    ),
                    subject: bill.bill_no,
                }
            }
            Change::Remove {
                subject, snapshot, ..
            } => {
                state.favorites = snapshot;
                Notice {
                    message: format!("Failed to remove {subject} from favorites. Please try again."),
                    subject,
                }
            }
        };

        self.commit(&state);
        drop(state);

        self.publish(StoreEvent::Warning(notice.clone()));
        notice
    }

    fn publish(&self, event: StoreEvent) {
        // No receivers is fine.
        self.events.send(event).ok();
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn persist(storage: &dyn FavoritesStorage, favorites: &[FavoriteBill]) {
    let result = migrate::encode(favorites).and_then(|contents| storage.write(&contents));
    if let Err(err) = result {
        warn!(error = %err, "failed to persist favorites; keeping in-memory state");
    }
}

enum Change {
    Add {
        bill: FavoriteBill,
        replaced: Option<FavoriteBill>,
    },
    Remove {
        id: String,
        subject: String,
        snapshot: Vec<FavoriteBill>,
    },
}

impl Change {
    fn id(&self) -> &str {
        match self {
            Self::Add { bill, .. } => &bill.id,
            Self::Remove { id, .. } => id,
        }
    }
}

struct PendingGuard {
    store: Arc<FavoritesStore>,
    id: String,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.store.release_pending(&self.id);
    }
}

/// An applied favorite change whose confirmation is running.
///
/// Dropping it only gives up the outcome: confirmation and any rollback
/// still complete in the background.
#[must_use = "the outcome is only observable through settle"]
pub struct PendingMutation {
    id: String,
    task: JoinHandle<MutationOutcome>,
}

impl PendingMutation {
    /// Id this mutation applies to.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for confirmation, and for the rollback if confirmation failed.
    ///
    /// Confirmation errors are absorbed: they yield
    /// [`MutationOutcome::RolledBack`] and a [`StoreEvent::Warning`].
    pub async fn settle(self) -> MutationOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(id = %self.id, error = %err, "favorite confirmation task did not finish");
                MutationOutcome::Interrupted
            }
        }
    }
}
