//! Server-side session state keyed by the `x-session-id` header.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{extract::FromRequestParts, http::HeaderName, http::request::Parts};
use parking_lot::Mutex;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::{cart::Cart, error::AppError};

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(SessionId::new)
            .ok_or_else(|| AppError::BadRequest("Missing session header".into()))
    }
}

/// Assigns a fresh session id to requests that arrive without one.
pub fn set_session_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(SESSION_HEADER), MakeRequestUuid)
}

/// Echoes the session id back so the client can keep it.
pub fn propagate_session_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(SESSION_HEADER))
}

#[derive(Debug)]
struct Session {
    cart: Cart,
    touched_at: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            cart: Cart::new(),
            touched_at: Instant::now(),
        }
    }
}

/// In-process session map. Sessions idle for longer than the ttl are dropped.
#[derive(Clone, Debug)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<SessionId, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn cart(&self, id: &SessionId) -> Cart {
        let mut sessions = self.inner.lock();
        match sessions.get_mut(id) {
            Some(session) if session.touched_at.elapsed() < self.ttl => {
                session.touched_at = Instant::now();
                session.cart.clone()
            }
            Some(_) => {
                sessions.remove(id);
                Cart::new()
            }
            None => Cart::new(),
        }
    }

    pub fn update_cart<F>(&self, id: &SessionId, f: F)
    where
        F: FnOnce(&mut Cart),
    {
        let mut sessions = self.inner.lock();
        let ttl = self.ttl;
        sessions.retain(|_, session| session.touched_at.elapsed() < ttl);
        let session = sessions.entry(id.clone()).or_insert_with(Session::new);
        session.touched_at = Instant::now();
        f(&mut session.cart);
    }

    pub fn clear_cart(&self, id: &SessionId) {
        self.update_cart(id, Cart::clear);
    }

    /// Forgets everything held for the session.
    pub fn remove(&self, id: &SessionId) {
        self.inner.lock().remove(id);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
