//! Authentication context for the active-session core.
//!
//! The core never acquires or refreshes tokens itself; it only reads an
//! [`AuthContext`] handed to it by a [`TokenProvider`].

use keyring::Entry;
use tracing::{info, warn};

use crate::error::TrainlogError;

const KEYCHAIN_USER: &str = "trainlog";
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "trainlog-api-token";

/// Bearer token and identifier of the current actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub token: String,
    pub user_id: i64,
}

pub trait TokenProvider: Send + Sync {
    /// The current auth context, or `None` when nobody is signed in.
    fn auth(&self) -> Option<AuthContext>;
}

/// Provider backed by a fixed context.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider(Option<AuthContext>);

impl StaticTokenProvider {
    pub fn new(auth: Option<AuthContext>) -> Self {
        Self(auth)
    }
}

impl TokenProvider for StaticTokenProvider {
    fn auth(&self) -> Option<AuthContext> {
        self.0.clone()
    }
}

/// Bearer token stored in the OS keychain.
pub struct KeychainTokenStore {
    service: String,
}

impl KeychainTokenStore {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry, TrainlogError> {
        Entry::new(&self.service, KEYCHAIN_USER).map_err(|e| {
            warn!("Failed to create keyring entry for {}: {}", self.service, e);
            TrainlogError::Keychain(e.to_string())
        })
    }

    pub fn get(&self) -> Result<Option<String>, TrainlogError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => {
                info!("No token stored for service: {}", self.service);
                Ok(None)
            }
            Err(e) => {
                warn!("Failed to read token for {}: {}", self.service, e);
                Err(TrainlogError::Keychain(e.to_string()))
            }
        }
    }

    pub fn set(&self, token: &str) -> Result<(), TrainlogError> {
        info!("Storing token for service: {}", self.service);
        self.entry()?.set_password(token).map_err(|e| {
            warn!("Failed to store token for {}: {}", self.service, e);
            TrainlogError::Keychain(e.to_string())
        })
    }

    pub fn delete(&self) -> Result<(), TrainlogError> {
        info!("Deleting token for service: {}", self.service);
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                warn!("Failed to delete token for {}: {}", self.service, e);
                Err(TrainlogError::Keychain(e.to_string()))
            }
        }
    }
}

/// Combine an explicit token, a stored token and the configured user id.
///
/// The explicit token wins over the stored one. Both a token and a user id are
/// required; a missing piece is reported as [`TrainlogError::Auth`].
pub fn resolve_auth(
    explicit_token: Option<String>,
    stored_token: Option<String>,
    user_id: Option<i64>,
) -> Result<AuthContext, TrainlogError> {
    let token = explicit_token
        .filter(|t| !t.trim().is_empty())
        .or(stored_token.filter(|t| !t.trim().is_empty()))
        .ok_or_else(|| TrainlogError::Auth("no API token; run `trainlog login`".to_string()))?;
    let user_id = user_id
        .ok_or_else(|| TrainlogError::Auth("no user id configured".to_string()))?;

    Ok(AuthContext {
        token: token.trim().to_string(),
        user_id,
    })
}
