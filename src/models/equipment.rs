//! Equipment checklist model

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError, DisplayFromStr, PickFirst};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::ledger;

/// Labels of the lines every new boat starts with
pub const DEFAULT_CHECKLIST: &[&str] = &["Windlass", "Engine battery"];

/// Declared state of an item already aboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    #[serde(alias = "GOOD", alias = "bon")]
    Good,
    #[serde(alias = "NEEDS_SERVICE", alias = "a_reviser")]
    NeedsService,
    #[serde(alias = "NEEDS_REPLACEMENT", alias = "a_changer")]
    NeedsReplacement,
    /// Any value not listed above; priced like `good`
    #[serde(other)]
    Unknown,
}

/// One line of a boat's equipment checklist
///
/// Numeric fields accept numbers or numeric strings; anything else reads as 0.
/// `expense` is derived and is overwritten on every read and write.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EquipmentItem {
    /// Stable line identifier, assigned by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Uuid>,
    /// Display name, fixed once the line is saved
    #[serde(default, alias = "nom")]
    pub label: String,
    /// Whether the boat already has this equipment
    #[serde(default, alias = "existe")]
    pub exists: bool,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default, alias = "etat")]
    pub condition: Condition,
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, alias = "quantite")]
    #[schema(value_type = f64)]
    pub quantity: f64,
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, alias = "prix", alias = "unitPrice")]
    #[schema(value_type = f64)]
    pub unit_price: f64,
    #[serde(default, alias = "remarque")]
    pub remark: String,
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, alias = "depense")]
    #[schema(value_type = f64)]
    pub expense: f64,
}

impl EquipmentItem {
    /// A missing item, in good condition, quantity 1, no price yet
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            key: None,
            label: label.into(),
            exists: false,
            condition: Condition::Good,
            quantity: 1.0,
            unit_price: 0.0,
            remark: String::new(),
            expense: 0.0,
        }
    }

    /// The pre-seeded checklist for a new boat
    pub fn default_checklist() -> Vec<Self> {
        DEFAULT_CHECKLIST
            .iter()
            .map(|label| Self::new(*label).with_key())
            .collect()
    }

    /// Assign a key if the line has none yet
    pub fn with_key(mut self) -> Self {
        if self.key.is_none() {
            self.key = Some(Uuid::new_v4());
        }
        self
    }

    /// Recompute `expense` from the other fields
    pub fn refresh_expense(&mut self) {
        self.expense = ledger::item_expense(self);
    }

    /// Clamp quantity and price to valid amounts, then recompute `expense`
    pub fn sanitize(&mut self) {
        self.quantity = ledger::sanitize_amount(self.quantity);
        self.unit_price = ledger::sanitize_amount(self.unit_price);
        self.refresh_expense();
    }

    /// Toggle presence of the item.
    ///
    /// Unchecking resets the condition to `good` and clears the expense.
    pub fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
        if exists {
            self.refresh_expense();
        } else {
            self.condition = Condition::Good;
            self.expense = 0.0;
        }
    }

    pub fn set_condition(&mut self, condition: Condition) {
        self.condition = condition;
        self.refresh_expense();
    }

    pub fn set_quantity(&mut self, quantity: f64) {
        self.quantity = ledger::sanitize_amount(quantity);
        self.refresh_expense();
    }

    pub fn set_unit_price(&mut self, unit_price: f64) {
        self.unit_price = ledger::sanitize_amount(unit_price);
        self.refresh_expense();
    }
}
