//! Token ownership and the refresh state machine.

use crate::claims::TokenClaims;
use crate::client::AuthClient;
use crate::error::{AuthError, AuthResult};
use questgate_storage::{ClientStorage, StorageKeys};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::{broadcast, Mutex};

/// The current access/refresh token pair.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Short-lived bearer token attached to outgoing calls
    pub access_token: String,
    /// Long-lived token used only against `/auth/refresh`
    pub refresh_token: String,
}

/// Authentication lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    /// No session held
    Unauthenticated,
    /// Session held; access token may still be expired server-side
    Authenticated,
    /// A refresh network call is in flight
    Refreshing,
}

/// Events emitted as the session changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Login succeeded
    LoggedIn,
    /// Access token was refreshed
    Refreshed,
    /// Session ended (explicit logout or unrecoverable refresh failure)
    LoggedOut,
}

/// Owner of the token pair.
///
/// Holds the current credentials, mirrors them into durable storage for
/// session resumption, and exposes a single-flight [`refresh`] so concurrent
/// 401 handlers converge on one network refresh instead of racing the
/// refresh token.
///
/// [`refresh`]: CredentialManager::refresh
pub struct CredentialManager {
    client: AuthClient,
    storage: Arc<dyn ClientStorage>,
    tokens: RwLock<Option<Credentials>>,
    phase: RwLock<AuthPhase>,
    // Serializes refresh network calls; generation detects a refresh that
    // completed while a caller waited for the lock.
    refresh_serial: Mutex<()>,
    generation: AtomicU64,
    events: broadcast::Sender<AuthEvent>,
}

impl CredentialManager {
    /// Create a manager, resuming any session found in durable storage.
    pub fn new(client: AuthClient, storage: Arc<dyn ClientStorage>) -> AuthResult<Self> {
        let restored = match (
            storage.get(StorageKeys::ACCESS_TOKEN)?,
            storage.get(StorageKeys::REFRESH_TOKEN)?,
        ) {
            (Some(access_token), Some(refresh_token)) => {
                tracing::info!("Resumed session from durable storage");
                Some(Credentials {
                    access_token,
                    refresh_token,
                })
            }
            _ => None,
        };

        let phase = if restored.is_some() {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Unauthenticated
        };

        let (events, _) = broadcast::channel(16);

        Ok(Self {
            client,
            storage,
            tokens: RwLock::new(restored),
            phase: RwLock::new(phase),
            refresh_serial: Mutex::new(()),
            generation: AtomicU64::new(0),
            events,
        })
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> AuthPhase {
        match self.phase.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Last known access token. Never blocks; mid-refresh this returns the
    /// stale token, and the retry layer re-reads after refresh completes.
    pub fn access_token(&self) -> Option<String> {
        let guard = match self.tokens.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.as_ref().map(|c| c.access_token.clone())
    }

    /// Exchange user credentials for a session.
    ///
    /// Persists both tokens and returns the decoded claims of the new access
    /// token.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<TokenClaims> {
        let pair = self.client.login(email, password).await?;
        let claims = TokenClaims::decode(&pair.access_token)?;

        self.store_tokens(Credentials {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        })?;
        self.set_phase(AuthPhase::Authenticated);
        self.generation.fetch_add(1, Ordering::AcqRel);
        let _ = self.events.send(AuthEvent::LoggedIn);

        tracing::info!(role = ?claims.role, "Login succeeded");
        Ok(claims)
    }

    /// Refresh the access token, single-flight.
    ///
    /// Concurrent callers await the same in-flight refresh: the first caller
    /// through the lock performs the network call and bumps the generation;
    /// callers that were waiting observe the bump and return the fresh token
    /// without a second network refresh. On refresh failure the session is
    /// destroyed (tokens cleared, storage purged, `LoggedOut` emitted).
    pub async fn refresh(&self) -> AuthResult<String> {
        let observed = self.generation.load(Ordering::Acquire);
        let _guard = self.refresh_serial.lock().await;

        if self.generation.load(Ordering::Acquire) != observed {
            if let Some(token) = self.access_token() {
                tracing::debug!("Refresh already performed by a concurrent caller");
                return Ok(token);
            }
            // The concurrent attempt failed and logged us out.
            return Err(AuthError::NotAuthenticated);
        }

        let refresh_token = {
            let guard = match self.tokens.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard
                .as_ref()
                .map(|c| c.refresh_token.clone())
                .ok_or(AuthError::NotAuthenticated)?
        };

        self.set_phase(AuthPhase::Refreshing);

        match self.client.refresh(&refresh_token).await {
            Ok(response) => {
                let credentials = Credentials {
                    access_token: response.access_token.clone(),
                    refresh_token: response.refresh_token.unwrap_or(refresh_token),
                };
                self.store_tokens(credentials)?;
                self.set_phase(AuthPhase::Authenticated);
                self.generation.fetch_add(1, Ordering::AcqRel);
                let _ = self.events.send(AuthEvent::Refreshed);

                tracing::debug!("Access token refreshed");
                Ok(response.access_token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh failed; destroying session");
                self.clear_session();
                self.generation.fetch_add(1, Ordering::AcqRel);
                Err(e)
            }
        }
    }

    /// End the session. Local-only: always succeeds, no network dependency.
    pub fn logout(&self) {
        tracing::info!("Logging out");
        self.clear_session();
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn store_tokens(&self, credentials: Credentials) -> AuthResult<()> {
        self.storage
            .set(StorageKeys::ACCESS_TOKEN, &credentials.access_token)?;
        self.storage
            .set(StorageKeys::REFRESH_TOKEN, &credentials.refresh_token)?;
        let mut guard = match self.tokens.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(credentials);
        Ok(())
    }

    fn clear_session(&self) {
        {
            let mut guard = match self.tokens.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *guard = None;
        }
        let _ = self.storage.delete(StorageKeys::ACCESS_TOKEN);
        let _ = self.storage.delete(StorageKeys::REFRESH_TOKEN);
        self.set_phase(AuthPhase::Unauthenticated);
        let _ = self.events.send(AuthEvent::LoggedOut);
    }

    fn set_phase(&self, phase: AuthPhase) {
        let mut guard = match self.phase.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = phase;
    }
}
