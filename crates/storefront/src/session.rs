//! Session bootstrap.
//!
//! Restoring a session takes two steps:
//!
//! 1. [`Bootstrap::restore`] reads the cached user synchronously so the UI
//!    can show a name immediately (`Tentative`).
//! 2. [`Bootstrap::confirm`] asks the server who the cached token belongs
//!    to. Success gives `Confirmed`; any failure clears the token and user
//!    and gives `SignedOut`.

use std::future::Future;

use paperclip_core::account::User;
use secrecy::SecretString;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::persist::Persistence;

/// Who the client believes is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    SignedOut,
    /// Restored from storage, not yet checked with the server.
    Tentative(User),
    /// Checked with the server (or just signed in).
    Confirmed(User),
}

impl SessionState {
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::SignedOut => None,
            Self::Tentative(user) | Self::Confirmed(user) => Some(user),
        }
    }

    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        !matches!(self, Self::SignedOut)
    }

    /// Admin screens require a confirmed admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Confirmed(user) if user.is_admin)
    }
}

/// Resolves a bearer token to its user.
pub trait SessionAuthority {
    fn current_user(&self, token: &SecretString) -> impl Future<Output = Result<User, ApiError>> + Send;
}

impl SessionAuthority for ApiClient {
    async fn current_user(&self, token: &SecretString) -> Result<User, ApiError> {
        self.set_token(Some(token.clone()));
        let result = self.me().await;
        if result.is_err() {
            self.set_token(None);
        }
        result
    }
}

/// A session restored from storage, awaiting confirmation.
#[derive(Debug)]
pub struct Bootstrap {
    state: SessionState,
    token: Option<SecretString>,
}

impl Bootstrap {
    /// Read the cached token and user.
    #[must_use]
    pub fn restore(persistence: &Persistence) -> Self {
        let state = persistence
            .load_user()
            .map_or(SessionState::SignedOut, SessionState::Tentative);
        Self {
            state,
            token: persistence.load_token(),
        }
    }

    /// State to show before confirmation completes.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Cached bearer token, used for requests made before confirmation.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Check the cached token with the server.
    ///
    /// A cached user without a token cannot be confirmed and is dropped.
    #[instrument(skip_all, fields(has_token = self.token.is_some()))]
    pub async fn confirm<A>(self, authority: &A, persistence: &Persistence) -> SessionState
    where
        A: SessionAuthority + Sync,
    {
        let Some(token) = self.token else {
            if self.state.is_signed_in() {
                warn!("Cached user has no token, discarding");
                persistence.clear_session();
            }
            return SessionState::SignedOut;
        };

        match authority.current_user(&token).await {
            Ok(user) => {
                info!(user_id = %user.id, "Session confirmed");
                persistence.save_user(&user);
                SessionState::Confirmed(user)
            }
            Err(e) => {
                warn!(error = %e, "Session could not be confirmed, signing out");
                persistence.clear_session();
                SessionState::SignedOut
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use paperclip_core::UserId;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::storage::{MemoryStorage, Storage, StorageKey};

    fn user(name: &str) -> User {
        User {
            id: UserId::new(format!("id-{name}")),
            email: format!("{name}@example.com"),
            name: name.to_string(),
            is_admin: false,
            phone: None,
            avatar: None,
        }
    }

    struct FixedAuthority(Result<User, u16>);

    impl SessionAuthority for FixedAuthority {
        async fn current_user(&self, token: &SecretString) -> Result<User, ApiError> {
            assert_eq!(token.expose_secret(), "tok");
            self.0.clone().map_err(|status| ApiError::Api {
                status,
                message: "Invalid token".to_string(),
            })
        }
    }

    fn setup(token: Option<&str>, cached: Option<&User>) -> (Arc<MemoryStorage>, Persistence) {
        let storage = Arc::new(MemoryStorage::new());
        let persistence = Persistence::new(storage.clone());
        if let Some(token) = token {
            storage.set(StorageKey::Token, token).unwrap();
        }
        if let Some(user) = cached {
            persistence.save_user(user);
        }
        (storage, persistence)
    }

    #[test]
    fn test_restore_is_tentative() {
        let (_, persistence) = setup(Some("tok"), Some(&user("ada")));
        let bootstrap = Bootstrap::restore(&persistence);
        assert_eq!(bootstrap.state(), &SessionState::Tentative(user("ada")));
        assert!(bootstrap.has_token());
    }

    #[test]
    fn test_restore_without_user_is_signed_out() {
        let (_, persistence) = setup(None, None);
        assert_eq!(Bootstrap::restore(&persistence).state(), &SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_confirm_refreshes_user() {
        let (_, persistence) = setup(Some("tok"), Some(&user("ada")));
        let fresh = User {
            name: "Ada L.".to_string(),
            ..user("ada")
        };
        let state = Bootstrap::restore(&persistence)
            .confirm(&FixedAuthority(Ok(fresh.clone())), &persistence)
            .await;
        assert_eq!(state, SessionState::Confirmed(fresh.clone()));
        assert_eq!(persistence.load_user(), Some(fresh));
    }

    #[tokio::test]
    async fn test_token_without_user_is_confirmed() {
        let (_, persistence) = setup(Some("tok"), None);
        let state = Bootstrap::restore(&persistence)
            .confirm(&FixedAuthority(Ok(user("bob"))), &persistence)
            .await;
        assert!(state.is_confirmed());
    }

    #[tokio::test]
    async fn test_rejected_token_clears_both_keys() {
        let (storage, persistence) = setup(Some("tok"), Some(&user("ada")));
        let state = Bootstrap::restore(&persistence)
            .confirm(&FixedAuthority(Err(401)), &persistence)
            .await;
        assert_eq!(state, SessionState::SignedOut);
        assert_eq!(storage.get(StorageKey::Token).unwrap(), None);
        assert_eq!(storage.get(StorageKey::User).unwrap(), None);
    }

    #[tokio::test]
    async fn test_user_without_token_is_rejected() {
        let (storage, persistence) = setup(None, Some(&user("ada")));
        let state = Bootstrap::restore(&persistence)
            .confirm(&FixedAuthority(Ok(user("ada"))), &persistence)
            .await;
        assert_eq!(state, SessionState::SignedOut);
        assert_eq!(storage.get(StorageKey::User).unwrap(), None);
    }

    #[test]
    fn test_admin_requires_confirmation() {
        let admin = User {
            is_admin: true,
            ..user("root")
        };
        assert!(!SessionState::Tentative(admin.clone()).is_admin());
        assert!(SessionState::Confirmed(admin).is_admin());
    }
}
