//! Push notification token registration.
//!
//! The last successfully registered `(user, token)` pair is kept under
//! [`StoreKey::PushRegistration`] so an unchanged pair is not sent again on
//! every launch.

use std::future::Future;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use souk_core::UserId;
use tracing::{debug, info, instrument, warn};

use crate::api::{MarketplaceApi, PushRegistration};
use crate::clock::Clock;
use crate::error::Result;
use crate::store::{KeyValueStore, Repository, StoreKey};

/// Platform messaging capability.
pub trait PushTokenSource: Send + Sync {
    /// The device's messaging token, if one is available.
    fn token(&self) -> impl Future<Output = Option<SecretString>> + Send;
}

/// A token known up front, e.g. from configuration.
#[derive(Clone, Default)]
pub struct StaticToken(pub Option<SecretString>);

impl PushTokenSource for StaticToken {
    async fn token(&self) -> Option<SecretString> {
        self.0.clone()
    }
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStatus {
    /// The backend accepted the token.
    Registered,
    /// This user and token were already registered.
    Unchanged,
    /// No messaging token is available on this device.
    NoToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PushRecord {
    user_id: Option<UserId>,
    token: String,
    registered_at: i64,
}

/// Registers the device's messaging token with the backend.
pub struct PushRegistrar<A, T, S> {
    api: A,
    source: T,
    repo: Repository<S>,
    clock: Arc<dyn Clock>,
}

impl<A, T, S> PushRegistrar<A, T, S>
where
    A: MarketplaceApi,
    T: PushTokenSource,
    S: KeyValueStore,
{
    #[must_use]
    pub fn new(api: A, source: T, repo: Repository<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            source,
            repo,
            clock,
        }
    }

    /// Register the current token for `user_id`.
    ///
    /// Skips the request when the same pair was registered before, unless
    /// `force` is set.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if the backend rejects the token. A failure
    /// to remember the registration is logged, not returned.
    #[instrument(skip(self))]
    pub async fn register(&self, user_id: Option<UserId>, force: bool) -> Result<PushStatus> {
        let Some(token) = self.source.token().await else {
            debug!("No messaging token available");
            return Ok(PushStatus::NoToken);
        };
        let raw = token.expose_secret().trim();
        if raw.is_empty() {
            debug!("Messaging token is blank");
            return Ok(PushStatus::NoToken);
        }

        if !force && self.already_registered(user_id, raw).await {
            debug!("Push token unchanged, skipping registration");
            return Ok(PushStatus::Unchanged);
        }

        let registration = PushRegistration {
            user_id,
            token: SecretString::from(raw.to_string()),
        };
        self.api.register_push_token(&registration).await?;
        info!("Push token registered");

        let record = PushRecord {
            user_id,
            token: raw.to_string(),
            registered_at: self.clock.now().timestamp_millis(),
        };
        if let Err(e) = self.repo.set(StoreKey::PushRegistration, &record).await {
            warn!(error = %e, "Failed to remember push registration");
        }
        Ok(PushStatus::Registered)
    }

    /// Forget the remembered registration so the next call sends again.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the delete fails.
    pub async fn forget(&self) -> Result<()> {
        self.repo.remove(StoreKey::PushRegistration).await?;
        Ok(())
    }

    async fn already_registered(&self, user_id: Option<UserId>, token: &str) -> bool {
        match self.repo.get::<PushRecord>(StoreKey::PushRegistration).await {
            Ok(Some(record)) => record.user_id == user_id && record.token == token,
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Failed to read push registration");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use crate::testing::FakeApi;

    fn registrar(
        api: &FakeApi,
        token: Option<&str>,
    ) -> PushRegistrar<FakeApi, StaticToken, MemoryStore> {
        PushRegistrar::new(
            api.clone(),
            StaticToken(token.map(|t| SecretString::from(t.to_string()))),
            Repository::new(MemoryStore::new()),
            Arc::new(ManualClock::new(Utc::now())),
        )
    }

    #[tokio::test]
    async fn test_unchanged_pair_not_resent() {
        let api = FakeApi::new();
        let push = registrar(&api, Some("token-a"));
        let user = Some(UserId::new(7));

        assert_eq!(push.register(user, false).await.unwrap(), PushStatus::Registered);
        assert_eq!(push.register(user, false).await.unwrap(), PushStatus::Unchanged);
        assert_eq!(push.register(user, true).await.unwrap(), PushStatus::Registered);
        assert_eq!(api.calls("register_push_token"), 2);
    }

    #[tokio::test]
    async fn test_new_user_triggers_registration() {
        let api = FakeApi::new();
        let push = registrar(&api, Some("token-a"));

        push.register(None, false).await.unwrap();
        assert_eq!(
            push.register(Some(UserId::new(3)), false).await.unwrap(),
            PushStatus::Registered
        );

        let sent = api.registrations();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].user_id, Some(UserId::new(3)));
        assert_eq!(sent[1].token.expose_secret(), "token-a");
    }

    #[tokio::test]
    async fn test_missing_token_sends_nothing() {
        let api = FakeApi::new();
        let push = registrar(&api, None);
        assert_eq!(push.register(None, true).await.unwrap(), PushStatus::NoToken);
        assert_eq!(api.calls("register_push_token"), 0);
    }

    #[tokio::test]
    async fn test_failed_registration_is_retried_next_time() {
        let api = FakeApi::new();
        let push = registrar(&api, Some("token-a"));

        api.set_offline(true);
        assert!(push.register(None, false).await.is_err());

        api.set_offline(false);
        assert_eq!(push.register(None, false).await.unwrap(), PushStatus::Registered);
    }
}
