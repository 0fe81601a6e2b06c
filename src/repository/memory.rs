//! In-process boat store for development and tests

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;

use super::BoatStore;
use crate::{
    error::{AppError, AppResult},
    models::boat::{Boat, BoatChanges, NewBoat},
};

#[derive(Default)]
struct MemoryState {
    boats: IndexMap<String, Boat>,
    /// Last identifier handed out
    last_id: i64,
}

/// Boat store kept in a map behind one lock; the counter bump and the
/// insert happen under the same guard.
#[derive(Default)]
pub struct MemoryBoatStore {
    state: Mutex<MemoryState>,
}

impl MemoryBoatStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("Boat store lock poisoned".to_string()))
    }
}

fn materialize(id: String, boat: &NewBoat) -> Boat {
    let now = Utc::now();
    Boat {
        id,
        name: boat.name.clone(),
        purchase_price: boat.purchase_price,
        description: boat.description.clone(),
        images: boat.images.clone(),
        equipment: boat.equipment.clone(),
        owner_id: boat.owner_id.clone(),
        created_at: now,
        updated_at: now,
        equipment_total: 0.0,
        projected_total: 0.0,
    }
}

// Derived amounts are computed on the way out, never under the lock.
fn computed(mut boat: Boat) -> Boat {
    boat.recompute();
    boat
}

#[async_trait]
impl BoatStore for MemoryBoatStore {
    async fn ping(&self) -> AppResult<()> {
        self.lock().map(|_| ())
    }

    async fn get(&self, id: &str) -> AppResult<Option<Boat>> {
        let boat = self.lock()?.boats.get(id).cloned();
        Ok(boat.map(computed))
    }

    async fn list(&self) -> AppResult<Vec<Boat>> {
        let boats: Vec<Boat> = self.lock()?.boats.values().cloned().collect();
        Ok(boats.into_iter().map(computed).collect())
    }

    async fn create(&self, boat: &NewBoat) -> AppResult<Boat> {
        let stored = {
            let mut state = self.lock()?;
            state.last_id += 1;
            let stored = materialize(state.last_id.to_string(), boat);
            state.boats.insert(stored.id.clone(), stored.clone());
            stored
        };
        Ok(computed(stored))
    }

    async fn insert_with_id(&self, id: &str, boat: &NewBoat) -> AppResult<Option<Boat>> {
        let stored = {
            let mut state = self.lock()?;
            if let Ok(numeric) = id.parse::<i64>() {
                state.last_id = state.last_id.max(numeric);
            }
            if state.boats.contains_key(id) {
                return Ok(None);
            }
            let stored = materialize(id.to_string(), boat);
            state.boats.insert(stored.id.clone(), stored.clone());
            stored
        };
        Ok(Some(computed(stored)))
    }

    async fn update(&self, id: &str, changes: &BoatChanges) -> AppResult<Option<Boat>> {
        let updated = {
            let mut state = self.lock()?;
            let Some(stored) = state.boats.get_mut(id) else {
                return Ok(None);
            };
            stored.name = changes.name.clone();
            stored.purchase_price = changes.purchase_price;
            stored.description = changes.description.clone();
            stored.images = changes.images.clone();
            stored.equipment = changes.equipment.clone();
            stored.updated_at = Utc::now();
            stored.clone()
        };
        Ok(Some(computed(updated)))
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.lock()?.boats.shift_remove(id).is_some())
    }
}
