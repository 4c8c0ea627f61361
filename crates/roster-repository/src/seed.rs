//! Fixed data set the store starts from.

use chrono::{TimeZone, Utc};
use roster_core::{User, UserId};

const SEED: [(u64, &str, &str, u32, &str, u32); 8] = [
    (1, "John Doe", "john.doe@example.com", 28, "admin", 15),
    (2, "Jane Smith", "jane.smith@example.com", 32, "user", 16),
    (3, "Bob Johnson", "bob.johnson@example.com", 45, "user", 17),
    (4, "Alice Williams", "alice.williams@example.com", 29, "moderator", 18),
    (5, "Charlie Brown", "charlie.brown@example.com", 35, "user", 19),
    (6, "Diana Prince", "diana.prince@example.com", 27, "admin", 20),
    (7, "Edward Norton", "edward.norton@example.com", 38, "user", 21),
    (8, "Fiona Apple", "fiona.apple@example.com", 31, "user", 22),
];

/// Returns the eight seeded users (ids 1 to 8, created January 2024).
#[must_use]
pub fn seed_users() -> Vec<User> {
    SEED.iter()
        .map(|&(id, name, email, age, role, day)| {
            let stamp = Utc
                .with_ymd_and_hms(2024, 1, day, 0, 0, 0)
                .single()
                .unwrap_or_default();
            User {
                id: UserId(id),
                name: name.to_string(),
                email: email.to_string(),
                age,
                role: role.to_string(),
                created_at: stamp,
                updated_at: stamp,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_has_eight_sequential_users() {
        let users = seed_users();
        assert_eq!(users.len(), 8);
        for (index, user) in users.iter().enumerate() {
            assert_eq!(user.id, UserId(index as u64 + 1));
            assert_eq!(user.created_at, user.updated_at);
        }
        assert_eq!(users[0].name, "John Doe");
        assert_eq!(users[3].role, "moderator");
        assert_eq!(users[7].email, "fiona.apple@example.com");
    }
}
