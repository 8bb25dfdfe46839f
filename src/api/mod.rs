pub mod skinport;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::state::Listing;

pub use skinport::SkinportClient;

/// Anything that can produce the full remote catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every listing. Nameless rows are already dropped.
    async fn fetch_catalog(&self) -> Result<Vec<Listing>, FetchError>;
}

#[async_trait]
impl<T: CatalogSource + ?Sized> CatalogSource for std::sync::Arc<T> {
    async fn fetch_catalog(&self) -> Result<Vec<Listing>, FetchError> {
        (**self).fetch_catalog().await
    }
}

/// Scripted source for tests: pops one response per call, counts calls.
/// `None` in the script means "fail with 503". An exhausted script keeps
/// failing.
#[cfg(test)]
pub struct MockSource {
    script: std::sync::Mutex<std::collections::VecDeque<Option<Vec<Listing>>>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockSource {
    pub fn new(script: Vec<Option<Vec<Listing>>>) -> Self {
        Self {
            script: std::sync::Mutex::new(script.into()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Always serves the same catalog.
    pub fn repeating(listings: Vec<Listing>, times: usize) -> Self {
        Self::new(vec![Some(listings); times])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl CatalogSource for MockSource {
    async fn fetch_catalog(&self) -> Result<Vec<Listing>, FetchError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front().flatten();
        next.ok_or(FetchError::Status {
            status: 503,
            reason: "Service Unavailable".to_string(),
        })
    }
}
