//! In-memory reference store
//!
//! Backs the test suite and embedders that do not bring their own
//! persistence. The row map lives behind one `tokio::sync::RwLock`, so a
//! single row write is atomic and the conditional version check happens
//! under the same write lock as the write itself.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entity::{Entity, EntityExt};
use crate::domain::specification::Specification;
use crate::domain::version::VersionToken;
use crate::storage::repository::{FetchMode, Page, Repository, SaveError, StoreError};

/// Map-backed repository over cloneable records
pub struct MemoryStore<T> {
    rows: RwLock<HashMap<Uuid, T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Repository<T> for MemoryStore<T>
where
    T: Entity + Clone + 'static,
{
    async fn find_by_id(
        &self,
        id: Uuid,
        _mode: FetchMode,
        include_deleted: bool,
    ) -> Result<Option<T>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .get(&id)
            .filter(|row| include_deleted || !row.is_deleted())
            .cloned())
    }

    async fn find_all(&self, include_deleted: bool) -> Result<Vec<T>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|row| include_deleted || !row.is_deleted())
            .cloned()
            .collect())
    }

    async fn find_where(
        &self,
        spec: &dyn Specification<T>,
        page: Page,
        include_deleted: bool,
    ) -> Result<Vec<T>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|row| include_deleted || !row.is_deleted())
            .filter(|row| spec.is_satisfied_by(row))
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect())
    }

    async fn add(&self, entity: &mut T) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&entity.id()) {
            return Err(StoreError::Backend(format!(
                "duplicate id {} on insert",
                entity.id()
            )));
        }
        if entity.version().is_some() {
            entity.set_version(VersionToken::fresh());
        }
        rows.insert(entity.id(), entity.clone());
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        Ok(rows.remove(&id).is_some())
    }

    async fn save(&self, entity: &mut T) -> Result<u64, SaveError<T>> {
        let mut rows = self.rows.write().await;

        match rows.get(&entity.id()) {
            None => {
                if entity.version().is_some() {
                    // The row vanished between read and write
                    return Err(SaveError::Stale { current: None });
                }
            }
            Some(stored) => {
                if let (Some(client), Some(current)) = (entity.version(), stored.version()) {
                    if client != current {
                        return Err(SaveError::Stale {
                            current: Some(stored.clone()),
                        });
                    }
                }
            }
        }

        if entity.version().is_some() {
            entity.set_version(VersionToken::fresh());
        }
        rows.insert(entity.id(), entity.clone());
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::UserId;
    use crate::domain::specification::predicate;
    use crate::test_support::Order;

    fn stored_order(customer: &str) -> Order {
        let mut order = Order::new(customer, &UserId::new("alice"));
        order.assign_id(Uuid::new_v4());
        order
    }

    #[tokio::test]
    async fn add_then_find_round_trips() {
        let store = MemoryStore::new();
        let mut order = stored_order("acme");
        store.add(&mut order).await.unwrap();

        let fetched = store
            .find_by_id(order.id(), FetchMode::ReadOnly, false)
            .await
            .unwrap()
            .expect("order should be stored");
        assert_eq!(fetched.customer, "acme");
    }

    #[tokio::test]
    async fn add_rejects_duplicate_ids() {
        let store = MemoryStore::new();
        let mut order = stored_order("acme");
        store.add(&mut order).await.unwrap();

        let mut dup = order.clone();
        assert!(matches!(
            store.add(&mut dup).await,
            Err(StoreError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn save_regenerates_the_version_token() {
        let store = MemoryStore::new();
        let mut order = stored_order("acme");
        store.add(&mut order).await.unwrap();
        let before = order.version().unwrap();

        let changed = store.save(&mut order).await.unwrap();

        assert_eq!(changed, 1);
        assert_ne!(order.version().unwrap(), before);
    }

    #[tokio::test]
    async fn concurrent_writers_second_gets_stale() {
        let store = MemoryStore::new();
        let mut order = stored_order("acme");
        store.add(&mut order).await.unwrap();

        let mut first = store
            .find_by_id(order.id(), FetchMode::ForUpdate, false)
            .await
            .unwrap()
            .unwrap();
        let mut second = first.clone();

        first.customer = "first wins".into();
        store.save(&mut first).await.unwrap();

        second.customer = "second loses".into();
        match store.save(&mut second).await {
            Err(SaveError::Stale { current: Some(row) }) => {
                assert_eq!(row.customer, "first wins");
            }
            other => panic!("expected stale with current image, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn save_of_vanished_row_reports_stale_without_image() {
        let store = MemoryStore::new();
        let mut order = stored_order("acme");
        store.add(&mut order).await.unwrap();
        store.remove(order.id()).await.unwrap();

        match store.save(&mut order).await {
            Err(SaveError::Stale { current: None }) => {}
            other => panic!("expected stale without image, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn soft_deleted_rows_are_filtered_from_normal_reads() {
        let store = MemoryStore::new();
        let mut order = stored_order("acme");
        order.tombstone.mark(&UserId::new("alice"));
        store.add(&mut order).await.unwrap();

        assert!(store
            .find_by_id(order.id(), FetchMode::ReadOnly, false)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_id(order.id(), FetchMode::ReadOnly, true)
            .await
            .unwrap()
            .is_some());
        assert!(store.find_all(false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_where_filters_and_pages() {
        let store = MemoryStore::new();
        for customer in ["acme", "apex", "zenith"] {
            let mut order = stored_order(customer);
            store.add(&mut order).await.unwrap();
        }

        let starts_with_a = predicate(|o: &Order| o.customer.starts_with('a'));
        let hits = store
            .find_where(&starts_with_a, Page::all(), false)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);

        let first_page = store
            .find_where(&starts_with_a, Page::new(0, 1), false)
            .await
            .unwrap();
        assert_eq!(first_page.len(), 1);
    }
}
