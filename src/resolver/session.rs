// Player session freshness tracking
//
// The catalogue provider's player handle is only valid for a bounded window;
// URL deciphering against a stale player fails. The tracker owns the expiry
// clock and serializes refreshes so concurrent requests share one refresh
// instead of stampeding the provider.

use std::future::Future;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Default validity window for a provider player handle
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(15 * 60);

pub struct PlayerSession {
    refresh_period: Duration,
    last_refreshed: RwLock<Option<Instant>>,
    refreshing: Mutex<()>,
}

impl PlayerSession {
    pub fn new(refresh_period: Duration) -> Self {
        Self {
            refresh_period,
            last_refreshed: RwLock::new(None),
            refreshing: Mutex::new(()),
        }
    }

    /// Never refreshed, or refreshed longer than the validity window ago
    pub fn is_stale(&self) -> bool {
        let last = self
            .last_refreshed
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match *last {
            Some(at) => at.elapsed() >= self.refresh_period,
            None => true,
        }
    }

    /// Run `refresh` only if the handle is stale, double-checked under the
    /// refresh lock so concurrent callers coalesce into a single refresh.
    /// Returns whether a refresh actually ran.
    pub async fn ensure_fresh<F, Fut, E>(&self, refresh: F) -> Result<bool, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        if !self.is_stale() {
            return Ok(false);
        }

        let _guard = self.refreshing.lock().await;

        // Another caller may have refreshed while we waited for the lock
        if !self.is_stale() {
            return Ok(false);
        }

        refresh().await?;

        let mut last = self
            .last_refreshed
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *last = Some(Instant::now());

        Ok(true)
    }
}

impl Default for PlayerSession {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fresh_session_skips_refresh() {
        let session = PlayerSession::default();
        let count = AtomicUsize::new(0);

        let ran = session
            .ensure_fresh(|| async {
                count.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            })
            .await
            .unwrap();
        assert!(ran);

        let ran = session
            .ensure_fresh(|| async {
                count.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            })
            .await
            .unwrap();
        assert!(!ran);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_session_refreshes_again() {
        let session = PlayerSession::new(Duration::from_millis(10));

        let ran = session.ensure_fresh(|| async { Ok::<(), String>(()) }).await.unwrap();
        assert!(ran);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(session.is_stale());

        let ran = session.ensure_fresh(|| async { Ok::<(), String>(()) }).await.unwrap();
        assert!(ran);
    }

    #[tokio::test]
    async fn test_concurrent_callers_coalesce() {
        let session = Arc::new(PlayerSession::default());
        let count = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let session = session.clone();
            let count = count.clone();
            handles.push(tokio::spawn(async move {
                session
                    .ensure_fresh(|| async {
                        count.fetch_add(1, Ordering::SeqCst);
                        // Hold the refresh long enough for the others to queue
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<(), String>(())
                    })
                    .await
                    .unwrap();
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_session_stale() {
        let session = PlayerSession::default();

        let result = session
            .ensure_fresh(|| async { Err::<(), String>("boom".to_string()) })
            .await;
        assert!(result.is_err());
        assert!(session.is_stale());
    }
}
