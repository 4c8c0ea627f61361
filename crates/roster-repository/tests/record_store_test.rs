//! Record store behaviour through the `UserRepository` interface.

use roster_core::{NewUser, UserId, UserPatch};
use roster_repository::{InMemoryUserRepository, UserRepository};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn new_user(name: &str, age: u32) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: format!("{}@x.com", name.to_lowercase()),
        age,
        role: None,
    }
}

#[tokio::test]
async fn test_seeded_create_update_delete_scenario() {
    let repo: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::seeded());

    let created = repo.create(new_user("X", 20)).await.unwrap();
    assert_eq!(created.id, UserId(9));
    assert_eq!(created.role, "user");

    tokio::time::sleep(Duration::from_millis(5)).await;

    let updated = repo
        .update(
            created.id,
            UserPatch {
                age: Some(21),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, UserId(9));
    assert_eq!(updated.age, 21);
    assert_eq!(updated.name, "X");
    assert!(updated.updated_at > created.updated_at);

    let deleted = repo.delete(UserId(9)).await.unwrap();
    assert_eq!(deleted.message, "User with ID 9 has been deleted");
    assert_eq!(deleted.deleted_user, updated);

    assert!(repo.get(UserId(9)).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_concurrent_creates_get_unique_ids() {
    let repo = Arc::new(InMemoryUserRepository::new());

    let tasks = (0..32).map(|i| {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move { repo.create(new_user(&format!("u{i}"), i)).await })
    });

    let ids: HashSet<UserId> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().id)
        .collect();

    assert_eq!(ids.len(), 32);
    assert_eq!(repo.len(), 32);
    assert_eq!(repo.revision().await.unwrap(), 32);
}
