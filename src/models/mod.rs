//! Data models for boat budgets

pub mod boat;
pub mod caller;
pub mod equipment;

// Re-export commonly used types
pub use boat::{Boat, BoatBudget, CreateBoat, UpdateBoat};
pub use caller::{Caller, CallerClaims, Role};
pub use equipment::{Condition, EquipmentItem};
