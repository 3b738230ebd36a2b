use crate::error::{CrawlError, Result};
use crate::graph::FoafGraph;
use crate::identity::{Identity, ProfileSource};
use crate::pacing::RequestPacer;
use crate::site::SiteClient;
use foafgraph_scanner::{CachePolicy, CachingFetcher, HttpFetcher, ScanError};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// What to do when a page fetch fails mid-crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure, skip the affected vertex and keep crawling.
    #[default]
    SkipVertex,
    /// Stop the whole run at the first failed fetch.
    Abort,
}

/// Where in the walk a fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Resolve,
    SeedFriends,
    FriendFriends,
}

/// A vertex that could not be expanded because its fetch failed.
#[derive(Debug, Clone, Serialize)]
pub struct VertexFailure {
    /// Login for resolve failures, display name otherwise.
    pub vertex: String,
    pub stage: FailureStage,
    pub timed_out: bool,
    pub error: String,
}

/// The graph plus the markers of everything the crawl had to leave out.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraversalOutcome {
    pub graph: FoafGraph,
    pub unresolved: Vec<String>,
    pub failures: Vec<VertexFailure>,
}

impl TraversalOutcome {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Callback for reporting traversal progress
pub type TraversalProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Two-level friend-of-a-friend walk over a [`ProfileSource`].
///
/// Each seed is resolved, its friends recorded, and every friend's own friend
/// list scanned once more. Fetches run one at a time with a pause after each
/// friend and after each seed.
pub struct FoafTraversal<'a, S: ?Sized> {
    source: &'a S,
    pacer: RequestPacer,
    mutual_only: bool,
    failure_policy: FailurePolicy,
    progress_callback: Option<TraversalProgressCallback>,
}

impl<'a, S: ProfileSource + ?Sized> FoafTraversal<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            pacer: RequestPacer::default(),
            mutual_only: false,
            failure_policy: FailurePolicy::default(),
            progress_callback: None,
        }
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.pacer = RequestPacer::new(delay);
        self
    }

    /// Keep a friend-of-a-friend only if the seed also lists them as a friend.
    pub fn with_mutual_only(mut self, mutual_only: bool) -> Self {
        self.mutual_only = mutual_only;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_progress_callback(mut self, callback: TraversalProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub async fn traverse(&self, logins: &[String]) -> Result<TraversalOutcome> {
        info!(
            "Starting FOAF traversal of {} login(s), mutual_only={}, delay={:?}",
            logins.len(),
            self.mutual_only,
            self.pacer.delay()
        );

        let mut outcome = TraversalOutcome::default();

        for login in logins {
            self.report(format!("Resolving {}", login));

            let identity = match self.source.resolve(login).await {
                Ok(Some(identity)) => identity,
                Ok(None) => {
                    warn!("Can't get user info for {}", login);
                    outcome.unresolved.push(login.clone());
                    continue;
                }
                Err(e) => {
                    self.fetch_failed(&mut outcome, login, FailureStage::Resolve, e)?;
                    continue;
                }
            };

            if outcome.graph.contains_vertex(&identity.display_name) {
                debug!("{} already visited, skipping", identity.display_name);
                continue;
            }

            info!("\"{}\" ({})", identity.display_name, identity.profile_url);
            self.expand_seed(&identity, &mut outcome).await?;
            self.pacer.pause().await;
        }

        info!(
            "Traversal complete. {} vertices, {} edges, {} failure(s)",
            outcome.graph.len(),
            outcome.graph.edge_count(),
            outcome.failures.len()
        );
        Ok(outcome)
    }

    async fn expand_seed(&self, seed: &Identity, outcome: &mut TraversalOutcome) -> Result<()> {
        let friends = match self.source.friends_of(seed).await {
            Ok(friends) => friends,
            Err(e) => {
                return self.fetch_failed(
                    outcome,
                    &seed.display_name,
                    FailureStage::SeedFriends,
                    e,
                );
            }
        };

        let direct: Vec<String> = friends.iter().map(|f| f.display_name.clone()).collect();
        let direct_set: HashSet<&str> = direct.iter().map(String::as_str).collect();
        outcome
            .graph
            .insert_vertex(seed.display_name.clone(), direct.clone());

        for (idx, friend) in friends.iter().enumerate() {
            debug!("\t\"{}\" ({})", friend.display_name, friend.profile_url);
            self.report(format!(
                "{}: friend {}/{} {}",
                seed.display_name,
                idx + 1,
                friends.len(),
                friend.display_name
            ));

            outcome.graph.ensure_vertex(&friend.display_name);

            match self.source.friends_of(friend).await {
                Ok(friends_of_friend) => {
                    for ff in friends_of_friend {
                        if self.mutual_only && !direct_set.contains(ff.display_name.as_str()) {
                            continue;
                        }
                        debug!("\t\t\"{}\" ({})", ff.display_name, ff.profile_url);
                        outcome.graph.ensure_vertex(&ff.display_name);
                        outcome.graph.push_edge(&friend.display_name, ff.display_name);
                    }
                }
                Err(e) => {
                    self.fetch_failed(
                        outcome,
                        &friend.display_name,
                        FailureStage::FriendFriends,
                        e,
                    )?;
                }
            }

            self.pacer.pause().await;
        }

        Ok(())
    }

    fn fetch_failed(
        &self,
        outcome: &mut TraversalOutcome,
        vertex: &str,
        stage: FailureStage,
        error: ScanError,
    ) -> Result<()> {
        match self.failure_policy {
            FailurePolicy::Abort => Err(CrawlError::Aborted {
                vertex: vertex.to_string(),
                source: error,
            }),
            FailurePolicy::SkipVertex => {
                warn!("Skipping {} ({:?}): {}", vertex, stage, error);
                outcome.failures.push(VertexFailure {
                    vertex: vertex.to_string(),
                    stage,
                    timed_out: error.is_timeout(),
                    error: error.to_string(),
                });
                Ok(())
            }
        }
    }

    fn report(&self, message: String) {
        if let Some(ref callback) = self.progress_callback {
            callback(message);
        }
    }
}

/// Convenience form of [`FoafTraversal`] for one-off calls.
pub async fn traverse<S: ProfileSource + ?Sized>(
    source: &S,
    logins: &[String],
    request_delay: Duration,
    mutual_only: bool,
) -> Result<TraversalOutcome> {
    FoafTraversal::new(source)
        .with_request_delay(request_delay)
        .with_mutual_only(mutual_only)
        .traverse(logins)
        .await
}

/// Options for configuring a FOAF crawl against a live site
pub struct FoafOptions {
    pub logins: Vec<String>,
    pub site: Url,
    pub request_delay: Duration,
    pub mutual_only: bool,
    pub failure_policy: FailurePolicy,
    pub timeout_secs: u64,
    pub cache_policy: CachePolicy,
    pub show_progress_bars: bool,
}

/// Execute a FOAF crawl with the given options over HTTP
pub async fn execute_foaf_crawl(options: FoafOptions) -> Result<TraversalOutcome> {
    let FoafOptions {
        logins,
        site,
        request_delay,
        mutual_only,
        failure_policy,
        timeout_secs,
        cache_policy,
        show_progress_bars,
    } = options;

    let fetcher = CachingFetcher::new(HttpFetcher::with_timeout(timeout_secs)?, cache_policy);
    let client = SiteClient::new(fetcher, site);

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut traversal = FoafTraversal::new(&client)
        .with_request_delay(request_delay)
        .with_mutual_only(mutual_only)
        .with_failure_policy(failure_policy);

    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        traversal = traversal.with_progress_callback(Arc::new(move |msg: String| {
            pb_clone.set_message(msg);
        }));
    }

    let result = traversal.traverse(&logins).await;

    if client.fetcher().policy() == CachePolicy::InMemory {
        debug!("{} distinct pages fetched", client.fetcher().cached_count().await);
    }

    if let Some(ref pb) = progress_bar {
        match &result {
            Ok(outcome) => pb.finish_with_message(format!(
                "Crawl complete! {} vertices, {} edges",
                outcome.graph.len(),
                outcome.graph.edge_count()
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result
}
