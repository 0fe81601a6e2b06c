//! Access rules for boat records
//!
//! Predicates take the caller explicitly; `None` is an anonymous request.

use crate::{
    error::{AppError, AppResult},
    models::{boat::Boat, caller::Caller},
};

/// Public records are readable by anyone, others by their owner and admins
pub fn can_read(caller: Option<&Caller>, boat: &Boat) -> bool {
    if boat.is_public() {
        return true;
    }
    match caller {
        Some(caller) => caller.id == boat.owner_id || caller.is_admin(),
        None => false,
    }
}

/// Owners and admins may modify a record; the example record is admin only
pub fn can_write(caller: Option<&Caller>, boat: &Boat) -> bool {
    match caller {
        Some(caller) if caller.is_admin() => true,
        Some(caller) => caller.id == boat.owner_id && !boat.is_example(),
        None => false,
    }
}

/// Same as [`can_write`]: the example record is never deleted by a non-admin
pub fn can_delete(caller: Option<&Caller>, boat: &Boat) -> bool {
    can_write(caller, boat)
}

pub fn require_read(caller: Option<&Caller>, boat: &Boat) -> AppResult<()> {
    if can_read(caller, boat) {
        Ok(())
    } else {
        Err(AppError::Authorization(format!("Not allowed to read boat {}", boat.id)))
    }
}

pub fn require_write(caller: &Caller, boat: &Boat) -> AppResult<()> {
    if can_write(Some(caller), boat) {
        Ok(())
    } else {
        Err(AppError::Authorization(format!("Not allowed to modify boat {}", boat.id)))
    }
}

pub fn require_delete(caller: &Caller, boat: &Boat) -> AppResult<()> {
    if can_delete(Some(caller), boat) {
        Ok(())
    } else {
        Err(AppError::Authorization(format!("Not allowed to delete boat {}", boat.id)))
    }
}
