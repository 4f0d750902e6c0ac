//! Credential lifecycle management
//!
//! Holds one cached bearer credential per backend and refreshes it with
//! single-flight semantics: when many requests find the credential missing
//! or about to expire at the same time, only one of them talks to the
//! identity endpoint and the others reuse its result.

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Credentials closer than this to their expiry are treated as expired
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(30 * 60);

/// Bearer token plus its absolute expiry
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the credential expires within `margin` from now
    pub fn expires_within(&self, margin: TimeDelta) -> bool {
        match Utc::now().checked_add_signed(margin) {
            Some(deadline) => deadline >= self.expires_at,
            None => true,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Backend-specific authentication exchange
#[async_trait]
pub trait Authenticate: Send + Sync {
    /// Short name used in log messages (e.g., "keystone")
    fn realm(&self) -> &str;

    /// Perform one authentication request and return the new credential
    async fn authenticate(&self) -> Result<Credential>;
}

/// Outcome of the last refresh attempt made through the gate
#[derive(Default)]
struct Attempt {
    failure: Option<(Option<u16>, String)>,
}

/// Cached credential guarded by a single-flight refresh gate
pub struct CredentialManager<A> {
    authenticator: A,
    principal: RwLock<Option<Credential>>,
    refresh: Mutex<Attempt>,
    /// Bumped once per completed refresh attempt
    attempts: AtomicU64,
    safety_margin: TimeDelta,
}

impl<A: Authenticate> CredentialManager<A> {
    pub fn new(authenticator: A) -> Self {
        Self {
            authenticator,
            principal: RwLock::new(None),
            refresh: Mutex::new(Attempt::default()),
            attempts: AtomicU64::new(0),
            safety_margin: margin(DEFAULT_SAFETY_MARGIN),
        }
    }

    /// Override the expiry safety margin
    pub fn with_safety_margin(mut self, safety_margin: Duration) -> Self {
        self.safety_margin = margin(safety_margin);
        self
    }

    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// Whether a usable credential is cached
    ///
    /// A credential within the safety margin of its expiry is cleared as a
    /// side effect.
    pub async fn is_authenticated(&self) -> bool {
        self.current().await.is_some()
    }

    /// Send an authentication request and cache the resulting credential
    ///
    /// On failure the cached credential is cleared so the next call retries.
    pub async fn authenticate(&self) -> Result<()> {
        match self.authenticator.authenticate().await {
            Ok(credential) => {
                let lifetime = credential.expires_at() - Utc::now();
                tracing::info!(
                    "Fetched new auth token from {}. The token will expire in {} minutes",
                    self.authenticator.realm(),
                    lifetime.num_minutes()
                );
                *self.principal.write().await = Some(credential);
                Ok(())
            }
            Err(e) => {
                self.invalidate().await;
                Err(e)
            }
        }
    }

    /// The cached credential, if any
    ///
    /// Callers should confirm [`is_authenticated`](Self::is_authenticated) first.
    pub async fn principal(&self) -> Option<Credential> {
        self.principal.read().await.clone()
    }

    /// Drop the cached credential
    pub async fn invalidate(&self) {
        *self.principal.write().await = None;
    }

    /// Return a valid credential, authenticating first if needed
    ///
    /// At most one authentication request is in flight at a time. Callers
    /// that queue behind it share its outcome: the credential it produced,
    /// or the error it failed with.
    pub async fn bearer(&self) -> Result<Credential> {
        if let Some(credential) = self.current().await {
            return Ok(credential);
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let mut gate = self.refresh.lock().await;

        // Another caller may have refreshed while we waited for the gate
        if let Some(credential) = self.current().await {
            return Ok(credential);
        }
        if self.attempts.load(Ordering::Acquire) != seen
            && let Some((status, message)) = &gate.failure
        {
            return Err(CloudError::auth(*status, message.clone()));
        }

        let outcome = self.authenticate().await;
        gate.failure = outcome.as_ref().err().map(|e| match e {
            CloudError::Auth { status, message } => (*status, message.clone()),
            other => (other.backend_status(), other.to_string()),
        });
        self.attempts.fetch_add(1, Ordering::Release);
        outcome?;

        self.principal().await.ok_or_else(|| {
            CloudError::auth(
                None,
                format!(
                    "{} authentication returned no credential",
                    self.authenticator.realm()
                ),
            )
        })
    }

    async fn current(&self) -> Option<Credential> {
        {
            let principal = self.principal.read().await;
            match principal.as_ref() {
                None => return None,
                Some(credential) if !credential.expires_within(self.safety_margin) => {
                    return Some(credential.clone());
                }
                Some(_) => {}
            }
        }

        let mut principal = self.principal.write().await;
        if principal
            .as_ref()
            .is_some_and(|c| c.expires_within(self.safety_margin))
        {
            tracing::info!("{} token has expired", self.authenticator.realm());
            *principal = None;
        }
        principal.clone()
    }
}

fn margin(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    struct CountingAuthenticator {
        calls: AtomicUsize,
        lifetime: TimeDelta,
        delay: Duration,
        fail: bool,
    }

    impl CountingAuthenticator {
        fn new(lifetime: TimeDelta) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                lifetime,
                delay: Duration::ZERO,
                fail: false,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Authenticate for CountingAuthenticator {
        fn realm(&self) -> &str {
            "test"
        }

        async fn authenticate(&self) -> Result<Credential> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(CloudError::auth(Some(401), "invalid application credential"));
            }
            Ok(Credential::new(format!("token-{n}"), Utc::now() + self.lifetime))
        }
    }

    #[tokio::test]
    async fn test_credential_is_reused_within_margin() {
        let manager = CredentialManager::new(CountingAuthenticator::new(TimeDelta::hours(2)));

        assert!(!manager.is_authenticated().await);

        let first = manager.bearer().await.unwrap();
        assert!(manager.is_authenticated().await);
        let second = manager.bearer().await.unwrap();

        assert_eq!(first.token(), "token-1");
        assert_eq!(first, second);
        assert_eq!(manager.authenticator().calls(), 1);
    }

    #[tokio::test]
    async fn test_credential_inside_safety_margin_is_cleared() {
        let manager = CredentialManager::new(CountingAuthenticator::new(TimeDelta::minutes(10)));

        manager.authenticate().await.unwrap();
        assert!(manager.principal().await.is_some());

        assert!(!manager.is_authenticated().await);
        assert!(manager.principal().await.is_none());

        let credential = manager.bearer().await.unwrap();
        assert_eq!(credential.token(), "token-2");
    }

    #[tokio::test]
    async fn test_custom_safety_margin() {
        let manager = CredentialManager::new(CountingAuthenticator::new(TimeDelta::minutes(10)))
            .with_safety_margin(Duration::from_secs(5 * 60));

        manager.bearer().await.unwrap();
        manager.bearer().await.unwrap();

        assert_eq!(manager.authenticator().calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_is_single_flight() {
        let mut authenticator = CountingAuthenticator::new(TimeDelta::hours(1));
        authenticator.delay = Duration::from_millis(50);
        let manager = Arc::new(CredentialManager::new(authenticator));

        let tasks = (0..16).map(|_| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.bearer().await })
        });
        let results = futures_util::future::join_all(tasks).await;

        for result in results {
            let credential = result.unwrap().unwrap();
            assert_eq!(credential.token(), "token-1");
        }
        assert_eq!(manager.authenticator().calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_authentication_clears_and_retries_next_time() {
        let mut authenticator = CountingAuthenticator::new(TimeDelta::hours(1));
        authenticator.fail = true;
        let manager = CredentialManager::new(authenticator);

        let err = manager.bearer().await.unwrap_err();
        assert!(matches!(err, CloudError::Auth { status: Some(401), .. }));
        assert!(manager.principal().await.is_none());

        assert!(manager.bearer().await.is_err());
        assert_eq!(manager.authenticator().calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_failed_refresh_is_shared() {
        let mut authenticator = CountingAuthenticator::new(TimeDelta::hours(1));
        authenticator.delay = Duration::from_millis(50);
        authenticator.fail = true;
        let manager = Arc::new(CredentialManager::new(authenticator));

        let tasks = (0..16).map(|_| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.bearer().await })
        });
        let results = futures_util::future::join_all(tasks).await;

        for result in results {
            let err = result.unwrap().unwrap_err();
            assert!(matches!(err, CloudError::Auth { status: Some(401), .. }));
        }
        assert_eq!(manager.authenticator().calls(), 1);

        // A later call is a fresh attempt, not a replay of the shared failure
        assert!(manager.bearer().await.is_err());
        assert_eq!(manager.authenticator().calls(), 2);
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("secret-token", Utc::now());
        let debug = format!("{credential:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }
}
