use log::debug;

use crate::auth::PasswordHasher;
use crate::error::AppError;
use crate::models::User;
use crate::store::Store;

/// Checks a username/password pair.
///
/// Returns `Ok(None)` for an unknown username and for a wrong password alike.
/// An unknown username still pays for one hash, so both failures take about
/// as long.
pub async fn authenticate(
    store: &dyn Store,
    hasher: &PasswordHasher,
    username: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    match store.find_user_by_username(username).await? {
        Some(user) => {
            if hasher.verify(password, &user.password_hash)? {
                Ok(Some(user))
            } else {
                debug!("Password mismatch for user {}", user.id);
                Ok(None)
            }
        }
        None => {
            hasher.hash(password)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::store::MemoryStore;

    async fn store_with(username: &str, password: &str, hasher: &PasswordHasher) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_user(NewUser {
                username: username.into(),
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                password_hash: hasher.hash(password).unwrap(),
            })
            .await
            .unwrap();
        store
    }

    #[actix_rt::test]
    async fn test_authenticate_outcomes() {
        let hasher = PasswordHasher::new(4);
        let store = store_with("dana", "correct-horse", &hasher).await;

        let user = authenticate(&store, &hasher, "dana", "correct-horse")
            .await
            .unwrap();
        assert_eq!(user.map(|u| u.username), Some("dana".to_string()));

        let wrong_password = authenticate(&store, &hasher, "dana", "battery-staple")
            .await
            .unwrap();
        assert!(wrong_password.is_none());

        let unknown_user = authenticate(&store, &hasher, "erin", "correct-horse")
            .await
            .unwrap();
        assert!(unknown_user.is_none());
    }
}
