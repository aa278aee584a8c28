//! Favorites: a locally persisted, optimistically updated set of bill snapshots.
//!
//! - [`FavoritesStore`] - the process-wide store (apply, confirm, compensate)
//! - [`FavoritesStorage`] - where the serialized collection lives
//! - [`FavoriteConfirmer`] - remote acknowledgement deciding commit or rollback
//! - [`migrate`] - persisted format and forward migration

mod confirm;
pub mod migrate;
mod storage;
mod store;

pub use confirm::{FavoriteConfirmer, SimulatedConfirmer};
pub use storage::{FavoritesStorage, JsonFileStorage, MemoryStorage, DEFAULT_NAMESPACE};
pub use store::{FavoritesStore, MutationOutcome, Notice, PendingMutation, StoreEvent};

#[cfg(any(test, feature = "test-utils"))]
pub use confirm::mock;
