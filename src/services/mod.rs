//! Business logic services

pub mod boats;
pub mod objects;
pub mod seed;
pub mod uploads;

use std::sync::Arc;

use crate::repository::BoatStore;
use objects::ObjectStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub boats: boats::BoatsService,
    pub uploads: uploads::UploadsService,
}

impl Services {
    /// Create all services over the given stores
    pub fn new(store: Arc<dyn BoatStore>, objects: Arc<dyn ObjectStore>, max_upload_bytes: usize) -> Self {
        Self {
            boats: boats::BoatsService::new(store, objects.clone()),
            uploads: uploads::UploadsService::new(objects, max_upload_bytes),
        }
    }
}
