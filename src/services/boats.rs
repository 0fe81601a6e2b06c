//! Boat records service

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::{objects::ObjectStore, seed::SeedBoat};
use crate::{
    access,
    error::{AppError, AppResult},
    ledger,
    models::{
        boat::{Boat, BoatBudget, BoatChanges, CreateBoat, NewBoat, UpdateBoat},
        caller::Caller,
        equipment::EquipmentItem,
    },
    repository::BoatStore,
};

#[derive(Clone)]
pub struct BoatsService {
    store: Arc<dyn BoatStore>,
    objects: Arc<dyn ObjectStore>,
}

impl BoatsService {
    pub fn new(store: Arc<dyn BoatStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }

    /// Boats visible to the caller, oldest first
    pub async fn list(&self, caller: Option<&Caller>) -> AppResult<Vec<Boat>> {
        let boats = self.store.list().await?;
        Ok(boats
            .into_iter()
            .filter(|boat| access::can_read(caller, boat))
            .map(|mut boat| {
                boat.recompute();
                boat
            })
            .collect())
    }

    pub async fn get(&self, caller: Option<&Caller>, id: &str) -> AppResult<Boat> {
        let mut boat = self.fetch(id).await?;
        access::require_read(caller, &boat)?;
        boat.recompute();
        Ok(boat)
    }

    pub async fn budget(&self, caller: Option<&Caller>, id: &str) -> AppResult<BoatBudget> {
        Ok(self.get(caller, id).await?.budget())
    }

    /// Create a boat owned by the caller
    pub async fn create(&self, caller: &Caller, data: CreateBoat) -> AppResult<Boat> {
        data.validate()?;

        let equipment = match data.equipment {
            Some(items) => items.into_iter().map(fresh_line).collect(),
            None => EquipmentItem::default_checklist(),
        };
        let boat = NewBoat {
            name: data.name.unwrap_or_default().trim().to_string(),
            purchase_price: ledger::sanitize_amount(data.purchase_price),
            description: data.description,
            images: clean_images(data.images),
            equipment,
            owner_id: caller.id.clone(),
        };

        let mut created = self.store.create(&boat).await?;
        created.recompute();
        tracing::info!("Caller {} created boat {}", caller.id, created.id);
        Ok(created)
    }

    /// Apply a partial update; identity and ownership never change
    pub async fn update(&self, caller: &Caller, id: &str, data: UpdateBoat) -> AppResult<Boat> {
        let current = self.fetch(id).await?;
        access::require_write(caller, &current)?;
        data.validate()?;

        let mut changes = BoatChanges::from_boat(&current);
        if let Some(name) = data.name {
            changes.name = name.trim().to_string();
        }
        if let Some(price) = data.purchase_price {
            changes.purchase_price = ledger::sanitize_amount(price);
        }
        if let Some(description) = data.description {
            changes.description = description;
        }
        if let Some(images) = data.images {
            changes.images = clean_images(images);
        }
        if let Some(items) = data.equipment {
            changes.equipment = merge_equipment(&current.equipment, items);
        }

        let removed: Vec<String> = current
            .images
            .iter()
            .filter(|url| !changes.images.contains(url))
            .cloned()
            .collect();

        let mut updated = self
            .store
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Boat {} not found", id)))?;
        updated.recompute();
        tracing::info!("Caller {} updated boat {}", caller.id, id);

        self.release_images(removed).await;
        Ok(updated)
    }

    pub async fn delete(&self, caller: &Caller, id: &str) -> AppResult<()> {
        let current = self.fetch(id).await?;
        access::require_delete(caller, &current)?;

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("Boat {} not found", id)));
        }
        tracing::info!("Caller {} deleted boat {}", caller.id, id);

        self.release_images(current.images).await;
        Ok(())
    }

    /// Copy a readable boat into a new record owned by the caller
    pub async fn duplicate(&self, caller: &Caller, id: &str) -> AppResult<Boat> {
        let source = self.fetch(id).await?;
        access::require_read(Some(caller), &source)?;

        let copy = NewBoat {
            name: format!("{} (copy for {})", source.name, caller.display_name()),
            purchase_price: source.purchase_price,
            description: source.description,
            images: source.images,
            equipment: source
                .equipment
                .into_iter()
                .map(|item| fresh_line(EquipmentItem { key: None, ..item }))
                .collect(),
            owner_id: caller.id.clone(),
        };

        let mut created = self.store.create(&copy).await?;
        created.recompute();
        tracing::info!("Caller {} duplicated boat {} as {}", caller.id, id, created.id);
        Ok(created)
    }

    /// Load seed records that are not stored yet and return how many were added.
    ///
    /// A seed with an id is skipped when that id exists; one without an id is
    /// skipped when a record with the same owner and name exists. Stored
    /// records are never modified, so importing again is harmless.
    pub async fn import(&self, seeds: Vec<SeedBoat>) -> AppResult<usize> {
        let mut known: HashSet<(String, String)> = self
            .store
            .list()
            .await?
            .into_iter()
            .map(|boat| (boat.owner_id, boat.name))
            .collect();

        let mut count = 0;
        for seed in seeds {
            let id = seed.id.clone();
            let boat = seed.into_new_boat();
            let inserted = match id {
                Some(id) => self.store.insert_with_id(&id, &boat).await?.is_some(),
                None if known.contains(&(boat.owner_id.clone(), boat.name.clone())) => false,
                None => {
                    self.store.create(&boat).await?;
                    known.insert((boat.owner_id.clone(), boat.name.clone()));
                    true
                }
            };
            if inserted {
                count += 1;
            } else {
                tracing::debug!("Seed boat {} already stored, skipping", boat.name);
            }
        }
        tracing::info!("Imported {} boats", count);
        Ok(count)
    }

    async fn fetch(&self, id: &str) -> AppResult<Boat> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Boat {} not found", id)))
    }

    /// Delete stored photos no boat refers to any more. Failures are logged.
    async fn release_images(&self, candidates: Vec<String>) {
        if candidates.is_empty() {
            return;
        }
        let referenced: HashSet<String> = match self.store.list().await {
            Ok(boats) => boats.into_iter().flat_map(|boat| boat.images).collect(),
            Err(e) => {
                tracing::warn!("Skipping image cleanup, cannot list boats: {}", e);
                return;
            }
        };

        for url in candidates.iter().filter(|url| !referenced.contains(*url)) {
            match self.objects.delete(url).await {
                Ok(true) => tracing::debug!("Released image {}", url),
                Ok(false) => {}
                Err(e) => tracing::warn!("Cannot release image {}: {}", url, e),
            }
        }
    }
}

fn fresh_line(item: EquipmentItem) -> EquipmentItem {
    let mut item = item.with_key();
    item.sanitize();
    item
}

fn clean_images(images: Vec<String>) -> Vec<String> {
    images
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect()
}

/// Match submitted lines to stored ones by key.
///
/// A matched line keeps its stored label. A line that was present and is now
/// submitted as missing goes back to `good`. Unknown, missing and repeated
/// keys get a fresh one.
fn merge_equipment(stored: &[EquipmentItem], submitted: Vec<EquipmentItem>) -> Vec<EquipmentItem> {
    let mut seen = HashSet::new();
    submitted
        .into_iter()
        .map(|mut item| {
            let previous = item
                .key
                .filter(|key| seen.insert(*key))
                .and_then(|key| stored.iter().find(|line| line.key == Some(key)));

            match previous {
                Some(previous) => {
                    item.label = previous.label.clone();
                    if previous.exists && !item.exists {
                        item.set_exists(false);
                    }
                }
                None => item.key = Some(Uuid::new_v4()),
            }
            item.sanitize();
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            boat::{EXAMPLE_BOAT_ID, PUBLIC_OWNER_ID},
            caller::Role,
            equipment::Condition,
        },
        repository::MockBoatStore,
        services::objects::MockObjectStore,
    };
    use chrono::Utc;

    fn owner() -> Caller {
        Caller::new("user-42", Role::User)
    }

    fn stored(id: &str, boat: &NewBoat) -> Boat {
        let now = Utc::now();
        let mut stored = Boat {
            id: id.to_string(),
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
        };
        stored.recompute();
        stored
    }

    fn apply(boat: &Boat, changes: &BoatChanges) -> Boat {
        let mut updated = Boat {
            name: changes.name.clone(),
            purchase_price: changes.purchase_price,
            description: changes.description.clone(),
            images: changes.images.clone(),
            equipment: changes.equipment.clone(),
            ..boat.clone()
        };
        updated.recompute();
        updated
    }

    fn service(store: MockBoatStore, objects: MockObjectStore) -> BoatsService {
        BoatsService::new(Arc::new(store), Arc::new(objects))
    }

    fn keyed(label: &str) -> EquipmentItem {
        EquipmentItem::new(label).with_key()
    }

    #[tokio::test]
    async fn test_create_uses_default_checklist_and_caller_as_owner() {
        let mut store = MockBoatStore::new();
        store
            .expect_create()
            .withf(|boat| boat.owner_id == "user-42" && boat.name == "Sea Breeze")
            .times(1)
            .returning(|boat| Ok(stored("7", boat)));

        let data = CreateBoat {
            name: Some("  Sea Breeze ".to_string()),
            purchase_price: -50.0,
            images: vec!["".to_string(), "https://cdn.example.org/a.jpg".to_string()],
            ..Default::default()
        };
        let boat = service(store, MockObjectStore::new())
            .create(&owner(), data)
            .await
            .unwrap();

        assert_eq!(boat.id, "7");
        assert_eq!(boat.purchase_price, 0.0);
        assert_eq!(boat.images, vec!["https://cdn.example.org/a.jpg".to_string()]);
        let labels: Vec<_> = boat.equipment.iter().map(|item| item.label.as_str()).collect();
        assert_eq!(labels, vec!["Windlass", "Engine battery"]);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_name() {
        let mut store = MockBoatStore::new();
        store.expect_create().never();

        let result = service(store, MockObjectStore::new())
            .create(&owner(), CreateBoat::default())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_hides_private_boats() {
        let mut store = MockBoatStore::new();
        store
            .expect_get()
            .returning(|id| Ok(Some(Boat::sample(id, "user-42"))));
        let service = service(store, MockObjectStore::new());

        assert!(service.get(Some(&owner()), "5").await.is_ok());
        assert!(matches!(
            service.get(None, "5").await,
            Err(AppError::Authorization(_))
        ));
        assert!(matches!(
            service.get(Some(&Caller::new("user-99", Role::User)), "5").await,
            Err(AppError::Authorization(_))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mut store = MockBoatStore::new();
        store.expect_get().returning(|_| Ok(None));

        let result = service(store, MockObjectStore::new()).get(None, "404").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_filters_by_access() {
        let mut store = MockBoatStore::new();
        store.expect_list().returning(|| {
            Ok(vec![
                Boat::sample("1", PUBLIC_OWNER_ID),
                Boat::sample("2", "user-42"),
                Boat::sample("3", "user-99"),
            ])
        });
        let service = service(store, MockObjectStore::new());

        let ids = |boats: Vec<Boat>| boats.into_iter().map(|boat| boat.id).collect::<Vec<_>>();
        assert_eq!(ids(service.list(None).await.unwrap()), vec!["1"]);
        assert_eq!(ids(service.list(Some(&owner())).await.unwrap()), vec!["1", "2"]);
        let admin = Caller::new("root", Role::Admin);
        assert_eq!(ids(service.list(Some(&admin)).await.unwrap()).len(), 3);
    }

    #[tokio::test]
    async fn test_update_freezes_labels_and_resets_condition() {
        let mut current = Boat::sample("5", "user-42");
        let mut aboard = keyed("Windlass");
        aboard.exists = true;
        aboard.condition = Condition::NeedsReplacement;
        aboard.unit_price = 900.0;
        current.equipment = vec![aboard.clone(), keyed("Engine battery")];

        let snapshot = current.clone();
        let mut store = MockBoatStore::new();
        store
            .expect_get()
            .returning(move |_| Ok(Some(snapshot.clone())));
        let base = current.clone();
        store
            .expect_update()
            .times(1)
            .returning(move |_, changes| Ok(Some(apply(&base, changes))));

        let submitted = vec![
            EquipmentItem {
                label: "Renamed windlass".to_string(),
                exists: false,
                condition: Condition::NeedsReplacement,
                ..aboard.clone()
            },
            EquipmentItem {
                key: current.equipment[0].key,
                unit_price: 10.0,
                ..EquipmentItem::new("Copy with duplicate key")
            },
        ];
        let data = UpdateBoat {
            equipment: Some(submitted),
            ..Default::default()
        };

        let updated = service(store, MockObjectStore::new())
            .update(&owner(), "5", data)
            .await
            .unwrap();

        let first = &updated.equipment[0];
        assert_eq!(first.label, "Windlass");
        assert_eq!(first.key, aboard.key);
        assert!(!first.exists);
        assert_eq!(first.condition, Condition::Good);
        assert_eq!(first.expense, 900.0);

        let second = &updated.equipment[1];
        assert_ne!(second.key, aboard.key);
        assert_eq!(second.label, "Copy with duplicate key");
        assert_eq!(updated.equipment_total, 910.0);
    }

    #[tokio::test]
    async fn test_update_by_stranger_is_forbidden() {
        let mut store = MockBoatStore::new();
        store
            .expect_get()
            .returning(|id| Ok(Some(Boat::sample(id, "user-42"))));
        store.expect_update().never();

        let result = service(store, MockObjectStore::new())
            .update(&Caller::new("user-99", Role::User), "5", UpdateBoat::default())
            .await;
        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[tokio::test]
    async fn test_update_releases_unreferenced_images() {
        let mut current = Boat::sample("5", "user-42");
        current.images = vec![
            "https://cdn.example.org/keep.jpg".to_string(),
            "https://cdn.example.org/drop.jpg".to_string(),
            "https://cdn.example.org/shared.jpg".to_string(),
        ];
        let snapshot = current.clone();
        let base = current.clone();

        let mut store = MockBoatStore::new();
        store
            .expect_get()
            .returning(move |_| Ok(Some(snapshot.clone())));
        store
            .expect_update()
            .returning(move |_, changes| Ok(Some(apply(&base, changes))));
        store.expect_list().returning(|| {
            let mut copy = Boat::sample("6", "user-99");
            copy.images = vec!["https://cdn.example.org/shared.jpg".to_string()];
            Ok(vec![copy])
        });

        let mut objects = MockObjectStore::new();
        objects
            .expect_delete()
            .withf(|url| url == "https://cdn.example.org/drop.jpg")
            .times(1)
            .returning(|_| Ok(true));

        let data = UpdateBoat {
            images: Some(vec!["https://cdn.example.org/keep.jpg".to_string()]),
            ..Default::default()
        };
        let updated = service(store, objects)
            .update(&owner(), "5", data)
            .await
            .unwrap();
        assert_eq!(updated.images.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_example_requires_admin() {
        let mut store = MockBoatStore::new();
        store
            .expect_get()
            .returning(|_| Ok(Some(Boat::sample(EXAMPLE_BOAT_ID, "user-42"))));
        store.expect_delete().times(1).returning(|_| Ok(true));
        let mut objects = MockObjectStore::new();
        objects.expect_delete().never();
        let service = service(store, objects);

        assert!(matches!(
            service.delete(&owner(), EXAMPLE_BOAT_ID).await,
            Err(AppError::Authorization(_))
        ));
        service
            .delete(&Caller::new("root", Role::Admin), EXAMPLE_BOAT_ID)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_ignores_storage_failures() {
        let mut current = Boat::sample("5", "user-42");
        current.images = vec!["https://cdn.example.org/hull.jpg".to_string()];

        let mut store = MockBoatStore::new();
        store
            .expect_get()
            .returning(move |_| Ok(Some(current.clone())));
        store.expect_delete().returning(|_| Ok(true));
        store.expect_list().returning(|| Ok(Vec::new()));
        let mut objects = MockObjectStore::new();
        objects
            .expect_delete()
            .times(1)
            .returning(|_| Err(AppError::Storage("bucket unavailable".to_string())));

        assert!(service(store, objects).delete(&owner(), "5").await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_public_boat() {
        let mut source = Boat::sample(EXAMPLE_BOAT_ID, PUBLIC_OWNER_ID);
        source.name = "Voilier Aventure".to_string();
        source.equipment = vec![keyed("Windlass")];
        let source_key = source.equipment[0].key;

        let mut store = MockBoatStore::new();
        store
            .expect_get()
            .returning(move |_| Ok(Some(source.clone())));
        store
            .expect_create()
            .withf(move |boat| boat.owner_id == "user-42" && boat.equipment[0].key != source_key)
            .returning(|boat| Ok(stored("12", boat)));

        let mut caller = owner();
        caller.email = Some("skipper@example.org".to_string());
        let copy = service(store, MockObjectStore::new())
            .duplicate(&caller, EXAMPLE_BOAT_ID)
            .await
            .unwrap();

        assert_eq!(copy.id, "12");
        assert_eq!(copy.name, "Voilier Aventure (copy for skipper@example.org)");
        assert_eq!(copy.owner_id, "user-42");
    }

    fn seeds() -> Vec<SeedBoat> {
        serde_json::from_value(serde_json::json!([
            {"id": "1", "nom_bateau": "Voilier Aventure", "prix_achat": 85000},
            {"id": 4, "nom_bateau": "Catamaran Liberté", "prix_achat": 180000},
            {"nom_bateau": "Dériveur", "prix_achat": 3000}
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_second_import_leaves_stored_records_alone() {
        let service = BoatsService::new(
            Arc::new(crate::repository::memory::MemoryBoatStore::new()),
            Arc::new(MockObjectStore::new()),
        );
        assert_eq!(service.import(seeds()).await.unwrap(), 3);

        let admin = Caller::new("root", Role::Admin);
        let edit = UpdateBoat {
            description: Some("Refit done".to_string()),
            ..Default::default()
        };
        service.update(&admin, EXAMPLE_BOAT_ID, edit).await.unwrap();

        assert_eq!(service.import(seeds()).await.unwrap(), 0);

        let example = service.get(None, EXAMPLE_BOAT_ID).await.unwrap();
        assert_eq!(example.description, "Refit done");
        assert_eq!(example.owner_id, PUBLIC_OWNER_ID);
        assert_eq!(service.list(Some(&admin)).await.unwrap().len(), 3);

        let created = service
            .create(&owner(), CreateBoat {
                name: Some("Next".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.id, "6");
    }

    #[tokio::test]
    async fn test_import_never_takes_over_a_user_record() {
        let mut store = MockBoatStore::new();
        store.expect_list().returning(|| Ok(Vec::new()));
        store
            .expect_insert_with_id()
            .times(1)
            .returning(|_, _| Ok(None));
        store.expect_create().never();

        let seeds: Vec<SeedBoat> =
            serde_json::from_value(serde_json::json!([{"id": "5", "nom_bateau": "Sloop"}])).unwrap();
        let count = service(store, MockObjectStore::new()).import(seeds).await.unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_merge_assigns_keys_to_new_lines() {
        let merged = merge_equipment(&[], vec![EquipmentItem::new("Dinghy")]);
        assert!(merged[0].key.is_some());
        assert_eq!(merged[0].label, "Dinghy");
    }
}
