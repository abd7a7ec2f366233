//! Fakes and fixtures shared by unit and integration tests.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::RoleCatalog;
use crate::models::{ProfileImage, User, UserDraft};
use crate::notify::Notifier;
use crate::schemas::CreateUserForm;
use crate::services::{ServiceError, UserService};
use crate::store::UserStore;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripted [`UserService`]: replies are queued up front, calls are recorded.
///
/// An empty create queue answers `Ok(None)`; an empty list queue answers `Ok(vec![])`.
/// A list reply can carry a delay, applied after the reply is taken off the queue.
#[derive(Default)]
pub struct FakeUserService {
    create_replies: Mutex<VecDeque<Result<Option<User>, ServiceError>>>,
    list_replies: Mutex<VecDeque<(Duration, Result<Vec<User>, ServiceError>)>>,
    created: Mutex<Vec<CreateUserForm>>,
    list_calls: Mutex<usize>,
}

impl FakeUserService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_create(&self, reply: Result<Option<User>, ServiceError>) {
        lock(&self.create_replies).push_back(reply);
    }

    pub fn push_list(&self, reply: Result<Vec<User>, ServiceError>) {
        self.push_list_delayed(Duration::ZERO, reply);
    }

    pub fn push_list_delayed(&self, delay: Duration, reply: Result<Vec<User>, ServiceError>) {
        lock(&self.list_replies).push_back((delay, reply));
    }

    /// Bodies passed to `create`, oldest first.
    pub fn created(&self) -> Vec<CreateUserForm> {
        lock(&self.created).clone()
    }

    pub fn list_calls(&self) -> usize {
        *lock(&self.list_calls)
    }
}

#[async_trait]
impl UserService for FakeUserService {
    async fn create(&self, form: CreateUserForm) -> Result<Option<User>, ServiceError> {
        lock(&self.created).push(form);
        lock(&self.create_replies).pop_front().unwrap_or(Ok(None))
    }

    async fn list(&self) -> Result<Vec<User>, ServiceError> {
        *lock(&self.list_calls) += 1;
        let next = lock(&self.list_replies).pop_front();
        let Some((delay, reply)) = next else {
            return Ok(Vec::new());
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

/// [`Notifier`] that remembers every notice.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    failures: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<String> {
        lock(&self.successes).clone()
    }

    pub fn failures(&self) -> Vec<String> {
        lock(&self.failures).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        lock(&self.successes).push(message.to_string());
    }

    fn failure(&self, message: &str) {
        lock(&self.failures).push(message.to_string());
    }
}

pub fn sample_image() -> ProfileImage {
    ProfileImage::new("avatar.png", "image/png", vec![0x89, b'P', b'N', b'G'])
}

/// A draft that passes every client-side rule.
pub fn valid_draft() -> UserDraft {
    UserDraft {
        name: "Grace Hopper".into(),
        email: "grace@example.com".into(),
        phone: "5550100123".into(),
        description: "Rear admiral and compiler pioneer".into(),
        profile_image: Some(sample_image()),
        role_id: 1,
    }
}

pub fn sample_user(id: i64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        phone: "5550100123".into(),
        description: "Listed in a test".into(),
        profile_image: format!("http://127.0.0.1:8000/api/users/{id}/profile_image"),
        role_name: "Admin".into(),
        created_at: None,
    }
}

/// Serve the users API on an ephemeral local port and return its address and store.
pub async fn spawn_stub_server(
    roles: RoleCatalog,
) -> std::io::Result<(SocketAddr, Arc<UserStore>)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let store = Arc::new(UserStore::new(roles, format!("http://{addr}")));
    let app = crate::create_app(store.clone());

    // Serve the app in background
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app.into_make_service()).await {
            tracing::error!(error = %e, "Stub users API stopped");
        }
    });
    Ok((addr, store))
}
