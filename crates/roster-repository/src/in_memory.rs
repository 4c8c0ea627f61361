//! Process-local user collection.

use crate::{seed::seed_users, traits::UserRepository};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use roster_core::{DeletedUser, NewUser, RosterError, RosterResult, User, UserId, UserPatch};
use tracing::debug;

#[derive(Debug)]
struct Collection {
    users: Vec<User>,
    next_id: UserId,
    revision: u64,
}

impl Collection {
    fn position(&self, id: UserId) -> RosterResult<usize> {
        self.users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| RosterError::not_found("User", id))
    }
}

/// In-memory record store.
///
/// Users are kept in a `Vec` in insertion order and looked up by linear
/// scan. Ids start above the highest seeded id and are never reused.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    inner: RwLock<Collection>,
}

impl InMemoryUserRepository {
    /// Creates an empty store whose first id is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::with_users(Vec::new())
    }

    /// Creates a store holding the fixed seed data set.
    #[must_use]
    pub fn seeded() -> Self {
        Self::with_users(seed_users())
    }

    /// Creates a store holding `users`.
    #[must_use]
    pub fn with_users(users: Vec<User>) -> Self {
        let next_id = users
            .iter()
            .map(|u| u.id)
            .max()
            .map_or(UserId(1), UserId::next);

        Self {
            inner: RwLock::new(Collection {
                users,
                next_id,
                revision: 0,
            }),
        }
    }

    /// Number of live users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().users.len()
    }

    /// Returns true when the store holds no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, input: NewUser) -> RosterResult<User> {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        let user = input.into_user(id, Utc::now());

        inner.next_id = id.next();
        inner.users.push(user.clone());
        inner.revision += 1;

        debug!("Store: created user {}", id);
        Ok(user)
    }

    async fn list(&self) -> RosterResult<Vec<User>> {
        Ok(self.inner.read().users.clone())
    }

    async fn get(&self, id: UserId) -> RosterResult<User> {
        let inner = self.inner.read();
        let index = inner.position(id)?;
        Ok(inner.users[index].clone())
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> RosterResult<User> {
        let mut inner = self.inner.write();
        let index = inner.position(id)?;

        let user = &mut inner.users[index];
        user.apply_patch(patch, Utc::now());
        let updated = user.clone();
        inner.revision += 1;

        debug!("Store: updated user {}", id);
        Ok(updated)
    }

    async fn delete(&self, id: UserId) -> RosterResult<DeletedUser> {
        let mut inner = self.inner.write();
        let index = inner.position(id)?;

        let removed = inner.users.remove(index);
        inner.revision += 1;

        debug!("Store: deleted user {}", id);
        Ok(DeletedUser::new(removed))
    }

    async fn revision(&self) -> RosterResult<u64> {
        Ok(self.inner.read().revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            age: 30,
            role: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids_from_one() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.is_empty());

        let first = repo.create(new_user("A")).await.unwrap();
        let second = repo.create(new_user("B")).await.unwrap();

        assert_eq!(first.id, UserId(1));
        assert_eq!(second.id, UserId(2));
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_seeded_store_continues_after_seed() {
        let repo = InMemoryUserRepository::seeded();
        assert_eq!(repo.len(), 8);

        let user = repo.create(new_user("X")).await.unwrap();
        assert_eq!(user.id, UserId(9));
        assert_eq!(user.role, "user");
        assert_eq!(user.created_at, user.updated_at);
    }

    #[tokio::test]
    async fn test_get_returns_created_user() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(new_user("A")).await.unwrap();
        assert_eq!(repo.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let repo = InMemoryUserRepository::seeded();
        let err = repo.get(UserId(99)).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "User with ID 99 not found");
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order_after_delete() {
        let repo = InMemoryUserRepository::seeded();
        repo.delete(UserId(3)).await.unwrap();
        repo.create(new_user("X")).await.unwrap();

        let ids: Vec<u64> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id.into_inner())
            .collect();
        assert_eq!(ids, vec![1, 2, 4, 5, 6, 7, 8, 9]);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(new_user("A")).await.unwrap();
        repo.delete(first.id).await.unwrap();

        let second = repo.create(new_user("B")).await.unwrap();
        assert_eq!(second.id, UserId(2));
    }

    #[tokio::test]
    async fn test_update_merges_and_refreshes_timestamp() {
        let repo = InMemoryUserRepository::seeded();
        let before = repo.get(UserId(2)).await.unwrap();

        let updated = repo
            .update(
                UserId(2),
                UserPatch {
                    role: Some("moderator".to_string()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, before.id);
        assert_eq!(updated.name, before.name);
        assert_eq!(updated.role, "moderator");
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at > before.updated_at);
        assert_eq!(repo.get(UserId(2)).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let err = repo.update(UserId(1), UserPatch::default()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found_both_times() {
        let repo = InMemoryUserRepository::seeded();
        let deleted = repo.delete(UserId(5)).await.unwrap();
        assert_eq!(deleted.message, "User with ID 5 has been deleted");
        assert_eq!(deleted.deleted_user.name, "Charlie Brown");

        assert!(repo.delete(UserId(5)).await.unwrap_err().is_not_found());
        assert!(repo.delete(UserId(5)).await.unwrap_err().is_not_found());
        assert!(repo.get(UserId(5)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_revision_moves_only_on_successful_mutation() {
        let repo = InMemoryUserRepository::seeded();
        assert_eq!(repo.revision().await.unwrap(), 0);

        repo.list().await.unwrap();
        repo.get(UserId(1)).await.unwrap();
        assert_eq!(repo.revision().await.unwrap(), 0);

        repo.create(new_user("X")).await.unwrap();
        repo.update(UserId(1), UserPatch::default()).await.unwrap();
        repo.delete(UserId(2)).await.unwrap();
        assert_eq!(repo.revision().await.unwrap(), 3);

        let _ = repo.delete(UserId(2)).await;
        let _ = repo.update(UserId(42), UserPatch::default()).await;
        assert_eq!(repo.revision().await.unwrap(), 3);
    }
}
