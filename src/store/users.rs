use crate::types::user::{NewUser, User};

use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("email '{0}' is already registered")]
pub struct DuplicateEmail(pub String);

#[derive(Debug, Default)]
pub struct UserStore {
    inner: Mutex<Vec<User>>,
}

impl UserStore {
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let users = self.inner.lock().expect("users lock");
        users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    pub fn get(&self, id: &str) -> Option<User> {
        let users = self.inner.lock().expect("users lock");
        users.iter().find(|user| user.id == id).cloned()
    }

    pub fn insert(&self, new_user: NewUser) -> Result<User, DuplicateEmail> {
        let mut users = self.inner.lock().expect("users lock");
        if users
            .iter()
            .any(|user| user.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(DuplicateEmail(new_user.email));
        }
        let next = users
            .iter()
            .filter_map(|user| user.id.strip_prefix("user"))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1);
        let user = User {
            id: format!("user{next}"),
            email: new_user.email,
            password_hash: new_user.password_hash,
            name: new_user.name,
            website: new_user.website,
            plan: new_user.plan,
            created_at: new_user.created_at,
        };
        users.push(user.clone());
        Ok(user)
    }

    /// Stores a user with a caller-chosen id, as the seed does.
    pub(crate) fn restore(&self, user: User) -> Result<(), DuplicateEmail> {
        let mut users = self.inner.lock().expect("users lock");
        if users
            .iter()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(DuplicateEmail(user.email));
        }
        users.push(user);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("users lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::types::user::Plan;
    use time::OffsetDateTime;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Demo".to_string(),
            website: None,
            plan: Plan::Free,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn insert__should_assign_sequential_ids() {
        // Given
        let store = UserStore::default();

        // When
        let first = store.insert(new_user("a@example.com")).expect("insert a");
        let second = store.insert(new_user("b@example.com")).expect("insert b");

        // Then
        assert_eq!(first.id, "user1");
        assert_eq!(second.id, "user2");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn insert__should_reject_duplicate_email_ignoring_case() {
        // Given
        let store = UserStore::default();
        store.insert(new_user("a@example.com")).expect("insert a");

        // When
        let result = store.insert(new_user("A@Example.com"));

        // Then
        assert!(result.is_err());
        assert_eq!(store.len(), 1);
    }
}
