//! Start-up import of boat records from a JSON file
//!
//! Accepts the legacy French field names so exports of the previous
//! application load unchanged.

use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_with::{serde_as, DefaultOnError, DisplayFromStr, PickFirst};

use crate::{
    error::{AppError, AppResult},
    models::{
        boat::{NewBoat, EXAMPLE_BOAT_ID, MIGRATED_OWNER_ID, PUBLIC_OWNER_ID},
        equipment::EquipmentItem,
    },
    ledger,
};

/// One record of a seed file
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct SeedBoat {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default, alias = "nom_bateau")]
    pub name: String,
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, alias = "prix_achat")]
    pub purchase_price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(default, alias = "equipements")]
    pub equipment: Vec<EquipmentItem>,
}

// Legacy exports carry ids as strings or as bare integers
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    }))
}

impl SeedBoat {
    /// Owner given to the imported record
    pub fn owner_id(&self) -> &'static str {
        if self.id.as_deref() == Some(EXAMPLE_BOAT_ID) {
            PUBLIC_OWNER_ID
        } else {
            MIGRATED_OWNER_ID
        }
    }

    pub fn into_new_boat(self) -> NewBoat {
        let owner_id = self.owner_id().to_string();
        let images = match (self.images, self.image_url) {
            (Some(images), _) => images,
            (None, Some(url)) => vec![url],
            (None, None) => Vec::new(),
        };
        let equipment = self
            .equipment
            .into_iter()
            .map(|item| {
                let mut item = item.with_key();
                item.sanitize();
                item
            })
            .collect();

        NewBoat {
            name: self.name,
            purchase_price: ledger::sanitize_amount(self.purchase_price),
            description: self.description,
            images,
            equipment,
            owner_id,
        }
    }
}

/// Read a seed file holding a JSON array of boats
pub async fn load_seed_file(path: &Path) -> AppResult<Vec<SeedBoat>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Internal(format!("Cannot read seed file {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::Internal(format!("Seed file {} is not an array of boats: {}", path.display(), e)))
}
