use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::users::{
    repo::{RepoError, UserStore},
    repo_types::{NewUser, User, UserChanges},
};

/// `UserStore` kept in process memory, for router tests.
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: Vec<User>,
}

impl InMemoryUserStore {
    /// Flips `is_active`; the HTTP surface has no operation for it.
    pub fn set_active(&self, id: i64, active: bool) {
        let mut inner = self.inner.lock().expect("store lock");
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == id) {
            user.is_active = active;
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<User>, i64), RepoError> {
        let inner = self.inner.lock().expect("store lock");
        let page = inner
            .users
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((page, inner.users.len() as i64))
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut inner = self.inner.lock().expect("store lock");
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::EmailTaken);
        }
        inner.next_id += 1;
        let created = User {
            id: inner.next_id,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            other_name: user.other_name,
            phone: user.phone,
            birthday: user.birthday,
            city: user.city,
            additional_info: user.additional_info,
            date_joined: OffsetDateTime::now_utc(),
            is_active: true,
            is_admin: user.is_admin,
            is_superuser: user.is_superuser,
        };
        inner.users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, RepoError> {
        let mut inner = self.inner.lock().expect("store lock");
        if let Some(email) = &changes.email {
            if inner.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(RepoError::EmailTaken);
            }
        }
        let Some(user) = inner.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(v) = changes.email {
            user.email = v;
        }
        if let Some(v) = changes.first_name {
            user.first_name = v;
        }
        if let Some(v) = changes.last_name {
            user.last_name = v;
        }
        if let Some(v) = changes.other_name {
            user.other_name = v;
        }
        if let Some(v) = changes.phone {
            user.phone = v;
        }
        if let Some(v) = changes.birthday {
            user.birthday = Some(v);
        }
        if let Some(v) = changes.city {
            user.city = v;
        }
        if let Some(v) = changes.additional_info {
            user.additional_info = v;
        }
        if let Some(v) = changes.is_admin {
            user.is_admin = v;
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let mut inner = self.inner.lock().expect("store lock");
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        Ok(inner.users.len() != before)
    }
}
