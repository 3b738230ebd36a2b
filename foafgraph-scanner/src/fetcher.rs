use crate::error::{Result, ScanError};
use crate::result::FetchedPage;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

/// Source of raw pages. Implementations report transport failures and
/// timeouts as errors; a response with any status code is a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage>;
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for Arc<F> {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        (**self).fetch(url).await
    }
}

pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                "foafgraph/",
                env!("CARGO_PKG_VERSION"),
                " (FOAF graph crawler)"
            ))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    fn classify(&self, url: &Url, error: reqwest::Error) -> ScanError {
        if error.is_timeout() {
            ScanError::Timeout(format!("{} (after {}s)", url, self.timeout_secs))
        } else {
            ScanError::HttpError(error)
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;
        let response_time = start.elapsed();

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await.map_err(|e| self.classify(url, e))?;

        debug!("{} -> {} in {:?}", url, status_code, response_time);

        Ok(FetchedPage {
            url: url.to_string(),
            status_code,
            content_type,
            body,
            response_time,
        })
    }
}

/// Whether [`CachingFetcher`] keeps pages for the lifetime of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    Disabled,
    #[default]
    InMemory,
}

/// Wraps a fetcher with a per-run page cache.
///
/// The cache lock is held across the inner fetch, so at most one request per
/// URL is ever in flight and a cached URL is never fetched twice. Errors are
/// not cached.
pub struct CachingFetcher<F> {
    inner: F,
    policy: CachePolicy,
    pages: Mutex<HashMap<String, FetchedPage>>,
}

impl<F: PageFetcher> CachingFetcher<F> {
    pub fn new(inner: F, policy: CachePolicy) -> Self {
        Self {
            inner,
            policy,
            pages: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub async fn cached_count(&self) -> usize {
        self.pages.lock().await.len()
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for CachingFetcher<F> {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        if self.policy == CachePolicy::Disabled {
            return self.inner.fetch(url).await;
        }

        let mut pages = self.pages.lock().await;
        if let Some(page) = pages.get(url.as_str()) {
            debug!("Cache hit for {}", url);
            return Ok(page.clone());
        }

        let page = self.inner.fetch(url).await?;
        pages.insert(url.to_string(), page.clone());
        Ok(page)
    }
}
