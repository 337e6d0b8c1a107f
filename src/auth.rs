//! The authentication collaborator.
//!
//! The core only needs an opaque owner id to tag and filter tasks. Sign-in is
//! delegated to an [`AuthProvider`]; [`ConfigAuth`] is the local provider that
//! remembers the owner in the config file.

use crate::config::{ConfigError, ConfigManager};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub owner_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Identity),
    SignedOut,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not signed in. Run `rusty_tasks auth login <owner>` first")]
    NotSignedIn,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type AuthListener = Box<dyn Fn(&AuthEvent)>;

pub trait AuthProvider {
    fn current_identity(&self) -> Option<Identity>;
    fn sign_in(&mut self, owner_id: &str) -> Result<Identity, AuthError>;
    fn sign_out(&mut self) -> Result<(), AuthError>;

    /// Registers a listener for sign-in/sign-out transitions. The listener is
    /// called once right away with the current state.
    fn subscribe(&mut self, listener: AuthListener);

    fn require_identity(&self) -> Result<Identity, AuthError> {
        self.current_identity().ok_or(AuthError::NotSignedIn)
    }
}

pub struct ConfigAuth<'a> {
    config: &'a mut ConfigManager,
    listeners: Vec<AuthListener>,
}

impl<'a> ConfigAuth<'a> {
    pub fn new(config: &'a mut ConfigManager) -> Self {
        Self {
            config,
            listeners: Vec::new(),
        }
    }

    fn current_event(&self) -> AuthEvent {
        match self.current_identity() {
            Some(identity) => AuthEvent::SignedIn(identity),
            None => AuthEvent::SignedOut,
        }
    }

    fn notify(&self, event: &AuthEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl AuthProvider for ConfigAuth<'_> {
    fn current_identity(&self) -> Option<Identity> {
        self.config.owner().map(|owner| Identity {
            owner_id: owner.to_string(),
        })
    }

    fn sign_in(&mut self, owner_id: &str) -> Result<Identity, AuthError> {
        self.config.set("owner", owner_id)?;
        let identity = self.require_identity()?;
        tracing::info!(owner = %identity.owner_id, "signed in");
        self.notify(&AuthEvent::SignedIn(identity.clone()));
        Ok(identity)
    }

    fn sign_out(&mut self) -> Result<(), AuthError> {
        if self.current_identity().is_none() {
            return Ok(());
        }
        self.config.unset("owner")?;
        tracing::info!("signed out");
        self.notify(&AuthEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&mut self, listener: AuthListener) {
        listener(&self.current_event());
        self.listeners.push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::create_test_config_manager;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_sign_in_and_out() {
        let (mut manager, _temp_dir) = create_test_config_manager();
        let mut auth = ConfigAuth::new(&mut manager);

        assert!(matches!(auth.require_identity(), Err(AuthError::NotSignedIn)));
        let identity = auth.sign_in("me@example.com").unwrap();
        assert_eq!(identity.owner_id, "me@example.com");
        assert_eq!(auth.current_identity(), Some(identity));

        auth.sign_out().unwrap();
        assert_eq!(auth.current_identity(), None);
        assert!(matches!(auth.sign_in(" "), Err(AuthError::Config(_))));
    }

    #[test]
    fn test_identity_survives_reopening_config() {
        let (mut manager, _temp_dir) = create_test_config_manager();
        ConfigAuth::new(&mut manager).sign_in("me").unwrap();

        let mut reopened = ConfigManager::new(Some(manager.path())).unwrap();
        let auth = ConfigAuth::new(&mut reopened);
        assert_eq!(auth.require_identity().unwrap().owner_id, "me");
    }

    #[test]
    fn test_subscribers_see_transitions() {
        let (mut manager, _temp_dir) = create_test_config_manager();
        let mut auth = ConfigAuth::new(&mut manager);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        auth.subscribe(Box::new(move |event| sink.borrow_mut().push(event.clone())));
        auth.sign_in("me").unwrap();
        auth.sign_out().unwrap();
        // Signing out twice is not a transition
        auth.sign_out().unwrap();

        let me = Identity {
            owner_id: "me".to_string(),
        };
        assert_eq!(
            *seen.borrow(),
            vec![AuthEvent::SignedOut, AuthEvent::SignedIn(me), AuthEvent::SignedOut]
        );
    }
}
