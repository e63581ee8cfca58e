//! Session identity as an observable value.
//!
//! The planner refreshes itself on every sign-in/sign-out transition, so
//! the current user is published through a watch channel: consumers take a
//! receiver once at construction and the subscription ends when the
//! receiver is dropped.

use rand::Rng;
use std::sync::Mutex;
use tokio::sync::watch;
use uuid::Uuid;

/// An authenticated user identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Holds the current identity and notifies subscribers on every transition.
#[derive(Debug)]
pub struct Session {
    identity: watch::Sender<Option<User>>,
    token: Mutex<Option<String>>,
}

impl Session {
    /// Creates a session with no signed-in user.
    pub fn anonymous() -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            identity,
            token: Mutex::new(None),
        }
    }

    /// Creates a session already signed in as `user`.
    pub fn with_user(user: User) -> Self {
        let session = Self::anonymous();
        session.sign_in(user);
        session
    }

    pub fn current_user(&self) -> Option<User> {
        self.identity.borrow().clone()
    }

    /// Subscribes to sign-in/sign-out transitions.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.identity.subscribe()
    }

    /// Signs in as `user` and returns the new session token.
    pub fn sign_in(&self, user: User) -> String {
        let token = generate_token();
        *self.token.lock().unwrap() = Some(token.clone());
        self.identity.send_replace(Some(user));
        token
    }

    /// Signs out, discarding the session token.
    pub fn sign_out(&self) {
        *self.token.lock().unwrap() = None;
        self.identity.send_replace(None);
    }

    /// Returns the current session token, if signed in.
    #[cfg(test)]
    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

/// Generates a session token: 32 random bytes, base64url encoded.
fn generate_token() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
