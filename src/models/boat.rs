//! Boat record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError, DisplayFromStr, PickFirst};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::equipment::{Condition, EquipmentItem};
use crate::ledger;

/// Owner marker of the record everybody may read
pub const PUBLIC_OWNER_ID: &str = "public-boat-owner";

/// Well-known identifier of the example record
pub const EXAMPLE_BOAT_ID: &str = "1";

/// Owner given to imported records other than the example
pub const MIGRATED_OWNER_ID: &str = "migrated-user";

/// Internal row structure for database queries
#[derive(Debug, Clone, FromRow)]
pub struct BoatRow {
    id: String,
    name: String,
    purchase_price: f64,
    description: String,
    images: Vec<String>,
    equipment: Json<Vec<EquipmentItem>>,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BoatRow> for Boat {
    fn from(row: BoatRow) -> Self {
        let mut boat = Boat {
            id: row.id,
            name: row.name,
            purchase_price: row.purchase_price,
            description: row.description,
            images: row.images,
            equipment: row.equipment.0,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            equipment_total: 0.0,
            projected_total: 0.0,
        };
        boat.recompute();
        boat
    }
}

/// Boat record as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Boat {
    /// Sequential identifier
    pub id: String,
    pub name: String,
    pub purchase_price: f64,
    pub description: String,
    /// Image URLs, the first one is the default display image
    pub images: Vec<String>,
    pub equipment: Vec<EquipmentItem>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Sum of equipment expenses, rounded to cents
    pub equipment_total: f64,
    /// Purchase price plus equipment expenses, rounded to cents
    pub projected_total: f64,
}

impl Boat {
    pub fn is_public(&self) -> bool {
        self.owner_id == PUBLIC_OWNER_ID
    }

    pub fn is_example(&self) -> bool {
        self.id == EXAMPLE_BOAT_ID
    }

    /// Recompute every derived amount from the checklist
    pub fn recompute(&mut self) {
        for item in &mut self.equipment {
            item.refresh_expense();
        }
        self.equipment_total = ledger::round_currency(ledger::total_expense(&self.equipment));
        self.projected_total = ledger::round_currency(ledger::projected_cost(self));
    }

    /// Budget breakdown with per-line amounts
    pub fn budget(&self) -> BoatBudget {
        let lines = self
            .equipment
            .iter()
            .map(|item| BudgetLine {
                key: item.key,
                label: item.label.clone(),
                exists: item.exists,
                condition: item.condition,
                coefficient: if item.exists {
                    ledger::condition_coefficient(item.condition)
                } else {
                    1.0
                },
                quantity: ledger::sanitize_amount(item.quantity),
                unit_price: ledger::sanitize_amount(item.unit_price),
                expense: ledger::round_currency(ledger::item_expense(item)),
            })
            .collect();

        BoatBudget {
            boat_id: self.id.clone(),
            purchase_price: ledger::round_currency(self.purchase_price),
            equipment_total: ledger::round_currency(ledger::total_expense(&self.equipment)),
            projected_total: ledger::round_currency(ledger::projected_cost(self)),
            lines,
        }
    }

    #[cfg(test)]
    pub fn sample(id: &str, owner_id: &str) -> Self {
        let now = Utc::now();
        Boat {
            id: id.to_string(),
            name: format!("Boat {}", id),
            purchase_price: 0.0,
            description: String::new(),
            images: Vec::new(),
            equipment: Vec::new(),
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
            equipment_total: 0.0,
            projected_total: 0.0,
        }
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Boat name must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Create boat request
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateBoat {
    #[validate(
        required(message = "Boat name is required"),
        length(max = 200, message = "Boat name is too long"),
        custom(function = "validate_not_blank")
    )]
    #[serde(default, alias = "nom_bateau")]
    pub name: Option<String>,
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, alias = "prix_achat", alias = "purchasePrice")]
    #[schema(value_type = f64)]
    pub purchase_price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Checklist; the default checklist is used when omitted
    #[serde(default, alias = "equipements")]
    pub equipment: Option<Vec<EquipmentItem>>,
}

/// Update boat request
///
/// Only the fields below can change. Anything else in the payload is ignored.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBoat {
    #[validate(
        length(max = 200, message = "Boat name is too long"),
        custom(function = "validate_not_blank")
    )]
    #[serde(default, alias = "nom_bateau")]
    pub name: Option<String>,
    #[serde_as(as = "Option<DefaultOnError<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default, alias = "prix_achat", alias = "purchasePrice")]
    #[schema(value_type = Option<f64>)]
    pub purchase_price: Option<f64>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    #[serde(default, alias = "equipements")]
    pub equipment: Option<Vec<EquipmentItem>>,
}

/// Record handed to the store for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewBoat {
    pub name: String,
    pub purchase_price: f64,
    pub description: String,
    pub images: Vec<String>,
    pub equipment: Vec<EquipmentItem>,
    pub owner_id: String,
}

/// Mutable fields of a stored record, fully resolved
#[derive(Debug, Clone, PartialEq)]
pub struct BoatChanges {
    pub name: String,
    pub purchase_price: f64,
    pub description: String,
    pub images: Vec<String>,
    pub equipment: Vec<EquipmentItem>,
}

impl BoatChanges {
    /// Current values of a stored record
    pub fn from_boat(boat: &Boat) -> Self {
        Self {
            name: boat.name.clone(),
            purchase_price: boat.purchase_price,
            description: boat.description.clone(),
            images: boat.images.clone(),
            equipment: boat.equipment.clone(),
        }
    }
}

/// One line of a budget breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BudgetLine {
    pub key: Option<uuid::Uuid>,
    pub label: String,
    pub exists: bool,
    pub condition: Condition,
    /// Share of the price counted (1 for missing items)
    pub coefficient: f64,
    pub quantity: f64,
    pub unit_price: f64,
    pub expense: f64,
}

/// Budget breakdown of a boat, amounts rounded to cents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoatBudget {
    pub boat_id: String,
    pub purchase_price: f64,
    pub equipment_total: f64,
    pub projected_total: f64,
    pub lines: Vec<BudgetLine>,
}
