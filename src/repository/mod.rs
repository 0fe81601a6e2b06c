//! Repository layer for boat records

pub mod boats;
pub mod memory;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::boat::{Boat, BoatChanges, NewBoat},
};

/// Counter name used for boat identifiers
pub const BOATS_COUNTER: &str = "boats";

/// Record store contract.
///
/// Implementations own timestamps: `created_at` is set on insert and
/// `updated_at` on every write. Identifiers handed out by [`BoatStore::create`]
/// come from an atomic counter and are never reused.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoatStore: Send + Sync {
    /// Check connectivity
    async fn ping(&self) -> AppResult<()>;

    /// Get a record by id
    async fn get(&self, id: &str) -> AppResult<Option<Boat>>;

    /// List every record, oldest first
    async fn list(&self) -> AppResult<Vec<Boat>>;

    /// Insert a record under the next sequential id
    async fn create(&self, boat: &NewBoat) -> AppResult<Boat>;

    /// Insert a record under a fixed id, `None` if the id is already taken.
    ///
    /// An existing record is left untouched. A numeric id raises the counter
    /// either way so later creations never collide.
    async fn insert_with_id(&self, id: &str, boat: &NewBoat) -> AppResult<Option<Boat>>;

    /// Replace the mutable fields of a record, `None` if it does not exist
    async fn update(&self, id: &str, changes: &BoatChanges) -> AppResult<Option<Boat>>;

    /// Delete a record, `false` if it did not exist
    async fn delete(&self, id: &str) -> AppResult<bool>;
}
