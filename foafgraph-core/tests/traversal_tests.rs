// Tests for the FOAF traversal engine

use async_trait::async_trait;
use foafgraph_core::crawl::{FailurePolicy, FailureStage, FoafTraversal, traverse};
use foafgraph_core::{CrawlError, FoafGraph, Identity, ProfileSource};
use foafgraph_scanner::ScanError;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory site: logins resolve to identities, profile URLs map to friend
/// lists, and selected profile URLs fail to load.
#[derive(Default)]
struct FakeSite {
    identities: HashMap<String, Identity>,
    friends: HashMap<String, Vec<Identity>>,
    broken: HashSet<String>,
    timeouts: HashSet<String>,
    friend_fetches: Mutex<Vec<String>>,
}

fn url_of(login: &str) -> String {
    format!("http://site.test/{}/", login)
}

impl FakeSite {
    fn user(mut self, login: &str, name: &str) -> Self {
        self.identities
            .insert(login.to_string(), Identity::new(name, url_of(login)));
        self
    }

    fn friends(mut self, login: &str, friends: &[&str]) -> Self {
        let list = friends
            .iter()
            .map(|f| self.identities[*f].clone())
            .collect();
        self.friends.insert(url_of(login), list);
        self
    }

    fn broken(mut self, login: &str) -> Self {
        self.broken.insert(url_of(login));
        self
    }

    fn timing_out(mut self, login: &str) -> Self {
        self.timeouts.insert(url_of(login));
        self
    }

    fn fetches(&self) -> Vec<String> {
        self.friend_fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileSource for FakeSite {
    async fn resolve(&self, login: &str) -> Result<Option<Identity>, ScanError> {
        if self.broken.contains(&url_of(login)) && !self.identities.contains_key(login) {
            return Err(ScanError::Status {
                url: format!("{}blog/", url_of(login)),
                status: 500,
            });
        }
        Ok(self.identities.get(login).cloned())
    }

    async fn friends_of(&self, identity: &Identity) -> Result<Vec<Identity>, ScanError> {
        let url = &identity.profile_url;
        self.friend_fetches.lock().unwrap().push(url.clone());
        if self.timeouts.contains(url) {
            return Err(ScanError::Timeout(format!("{}friends/", url)));
        }
        if self.broken.contains(url) {
            return Err(ScanError::Status {
                url: format!("{}friends/", url),
                status: 503,
            });
        }
        Ok(self.friends.get(url).cloned().unwrap_or_default())
    }
}

fn logins(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn graph_of(pairs: &[(&str, &[&str])]) -> FoafGraph {
    pairs
        .iter()
        .map(|(name, friends)| (*name, friends.to_vec()))
        .collect()
}

fn assert_no_dangling_targets(graph: &FoafGraph) {
    for (source, target) in graph.edges() {
        assert!(
            graph.contains_vertex(target),
            "edge {} -> {} points at a name that is not a key",
            source,
            target
        );
    }
}

fn alice_bob_carol() -> FakeSite {
    FakeSite::default()
        .user("alice", "Alice")
        .user("bob", "Bob")
        .user("carol", "Carol")
        .friends("alice", &["bob"])
        .friends("bob", &["carol"])
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_end_to_end_all_friends() {
    let site = alice_bob_carol();

    let outcome = traverse(&site, &logins(&["alice"]), Duration::ZERO, false)
        .await
        .unwrap();

    let expected = graph_of(&[("Alice", &["Bob"]), ("Bob", &["Carol"]), ("Carol", &[])]);
    assert_eq!(outcome.graph, expected);
    assert!(outcome.unresolved.is_empty());
    assert!(!outcome.is_partial());
}

#[tokio::test]
async fn test_end_to_end_mutual_only() {
    let site = alice_bob_carol();

    let outcome = traverse(&site, &logins(&["alice"]), Duration::ZERO, true)
        .await
        .unwrap();

    let expected = graph_of(&[("Alice", &["Bob"]), ("Bob", &[])]);
    assert_eq!(outcome.graph, expected);
    assert!(!outcome.graph.contains_vertex("Carol"));
}

#[tokio::test]
async fn test_mutual_filter_checks_seed_friend_list() {
    // S -> {A, B}; A -> {B, C}
    let site = FakeSite::default()
        .user("s", "S")
        .user("a", "A")
        .user("b", "B")
        .user("c", "C")
        .friends("s", &["a", "b"])
        .friends("a", &["b", "c"]);

    let outcome = traverse(&site, &logins(&["s"]), Duration::ZERO, true)
        .await
        .unwrap();

    let from_a = outcome.graph.friends_of("A").unwrap();
    assert_eq!(from_a, ["B"]);
    assert!(!outcome.graph.contains_vertex("C"));
}

#[tokio::test]
async fn test_mutual_filter_off_keeps_everyone() {
    let site = FakeSite::default()
        .user("s", "S")
        .user("a", "A")
        .user("b", "B")
        .user("c", "C")
        .friends("s", &["a", "b"])
        .friends("a", &["b", "c"]);

    let outcome = traverse(&site, &logins(&["s"]), Duration::ZERO, false)
        .await
        .unwrap();

    assert_eq!(outcome.graph.friends_of("A").unwrap(), ["B", "C"]);
    assert_eq!(
        outcome.graph.keys().collect::<Vec<_>>(),
        vec!["S", "A", "B", "C"]
    );
}

#[tokio::test]
async fn test_same_display_name_is_not_expanded_twice() {
    let site = FakeSite::default()
        .user("alice", "Alice Smith")
        .user("bob", "Alice Smith")
        .user("dave", "Dave")
        .user("erin", "Erin")
        .user("carol", "Carol")
        .friends("alice", &["dave"])
        .friends("bob", &["erin"])
        .friends("dave", &["erin"])
        .friends("carol", &["alice"]);

    let outcome = traverse(
        &site,
        &logins(&["alice", "bob", "carol"]),
        Duration::ZERO,
        false,
    )
    .await
    .unwrap();

    // bob's own friend list is never read
    assert!(!site.fetches().contains(&url_of("bob")));

    // reached again through carol, Alice Smith keeps her vertex and gains edges
    assert_eq!(outcome.graph.friends_of("Alice Smith").unwrap(), ["Dave", "Dave"]);
    assert_eq!(outcome.graph.friends_of("Carol").unwrap(), ["Alice Smith"]);
    assert_eq!(
        outcome
            .graph
            .keys()
            .filter(|k| *k == "Alice Smith")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_unresolved_login_is_skipped() {
    let site = alice_bob_carol();

    let outcome = traverse(&site, &logins(&["ghost", "alice"]), Duration::ZERO, false)
        .await
        .unwrap();

    assert_eq!(outcome.unresolved, vec!["ghost".to_string()]);
    assert!(outcome.graph.contains_vertex("Alice"));
}

#[tokio::test]
async fn test_seed_without_friends_is_a_leaf() {
    let site = FakeSite::default().user("loner", "Loner");

    let outcome = traverse(&site, &logins(&["loner"]), Duration::ZERO, false)
        .await
        .unwrap();

    assert_eq!(outcome.graph, graph_of(&[("Loner", &[])]));
}

#[tokio::test]
async fn test_duplicate_friends_of_friend_are_kept() {
    let site = FakeSite::default()
        .user("s", "S")
        .user("a", "A")
        .user("b", "B")
        .friends("s", &["a"])
        .friends("a", &["b", "b"]);

    let outcome = traverse(&site, &logins(&["s"]), Duration::ZERO, false)
        .await
        .unwrap();

    assert_eq!(outcome.graph.friends_of("A").unwrap(), ["B", "B"]);
}

#[tokio::test]
async fn test_no_dangling_targets() {
    let site = FakeSite::default()
        .user("a", "A")
        .user("b", "B")
        .user("c", "C")
        .user("d", "D")
        .user("e", "E")
        .friends("a", &["b", "c", "d"])
        .friends("b", &["a", "c", "e"])
        .friends("c", &["d", "e", "e"])
        .friends("d", &["a"])
        .friends("e", &["b"]);

    for mutual_only in [false, true] {
        let outcome = traverse(&site, &logins(&["a", "e", "c"]), Duration::ZERO, mutual_only)
            .await
            .unwrap();
        assert_no_dangling_targets(&outcome.graph);
    }
}

#[tokio::test]
async fn test_traversal_is_reproducible() {
    let site = FakeSite::default()
        .user("a", "A")
        .user("b", "B")
        .user("c", "C")
        .friends("a", &["b", "c"])
        .friends("b", &["c", "a"])
        .friends("c", &["b"]);

    let first = traverse(&site, &logins(&["a", "c"]), Duration::ZERO, false)
        .await
        .unwrap();
    let second = traverse(&site, &logins(&["a", "c"]), Duration::ZERO, false)
        .await
        .unwrap();

    assert_eq!(first.graph, second.graph);
}

// ============================================================================
// Pacing
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_pauses_after_each_friend_and_each_seed() {
    let site = FakeSite::default()
        .user("alice", "Alice")
        .user("bob", "Bob")
        .user("dan", "Dan")
        .friends("alice", &["bob", "dan"]);

    let start = tokio::time::Instant::now();
    traverse(&site, &logins(&["alice"]), Duration::from_secs(1), false)
        .await
        .unwrap();
    let elapsed = start.elapsed();

    // two friends + one seed
    assert!(elapsed >= Duration::from_secs(3), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(3_100), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_skipped_seeds_do_not_pause() {
    let site = FakeSite::default().user("alice", "Alice");

    let start = tokio::time::Instant::now();
    traverse(
        &site,
        &logins(&["ghost", "alice", "alice"]),
        Duration::from_secs(5),
        false,
    )
    .await
    .unwrap();

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(5), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(5_100), "elapsed {:?}", elapsed);
}

// ============================================================================
// Failure policies
// ============================================================================

#[tokio::test]
async fn test_friend_failure_is_skipped_and_recorded() {
    let site = FakeSite::default()
        .user("s", "S")
        .user("a", "A")
        .user("b", "B")
        .user("c", "C")
        .friends("s", &["a", "b"])
        .friends("b", &["c"])
        .broken("a");

    let outcome = traverse(&site, &logins(&["s"]), Duration::ZERO, false)
        .await
        .unwrap();

    assert!(outcome.is_partial());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].vertex, "A");
    assert_eq!(outcome.failures[0].stage, FailureStage::FriendFriends);
    assert!(outcome.failures[0].error.contains("503"));

    // A stays as an unexpanded vertex, B is still crawled
    assert_eq!(outcome.graph.friends_of("A").unwrap().len(), 0);
    assert_eq!(outcome.graph.friends_of("B").unwrap(), ["C"]);
    assert_no_dangling_targets(&outcome.graph);
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let site = FakeSite::default()
        .user("s", "S")
        .user("a", "A")
        .friends("s", &["a"])
        .timing_out("a");

    let outcome = traverse(&site, &logins(&["s"]), Duration::ZERO, false)
        .await
        .unwrap();

    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].timed_out);
}

#[tokio::test]
async fn test_seed_failure_skips_only_that_seed() {
    let site = alice_bob_carol().user("zed", "Zed").broken("zed");

    let outcome = traverse(&site, &logins(&["zed", "alice"]), Duration::ZERO, false)
        .await
        .unwrap();

    assert_eq!(outcome.failures[0].vertex, "Zed");
    assert_eq!(outcome.failures[0].stage, FailureStage::SeedFriends);
    assert!(!outcome.graph.contains_vertex("Zed"));
    assert!(outcome.graph.contains_vertex("Alice"));
}

#[tokio::test]
async fn test_resolve_failure_is_recorded_by_login() {
    let site = alice_bob_carol().broken("nobody");

    let outcome = traverse(&site, &logins(&["nobody", "alice"]), Duration::ZERO, false)
        .await
        .unwrap();

    assert_eq!(outcome.failures[0].vertex, "nobody");
    assert_eq!(outcome.failures[0].stage, FailureStage::Resolve);
    assert!(outcome.unresolved.is_empty());
    assert!(outcome.graph.contains_vertex("Alice"));
}

#[tokio::test]
async fn test_abort_policy_stops_at_first_failure() {
    let site = FakeSite::default()
        .user("s", "S")
        .user("a", "A")
        .user("b", "B")
        .friends("s", &["a", "b"])
        .broken("a");

    let result = FoafTraversal::new(&site)
        .with_failure_policy(FailurePolicy::Abort)
        .traverse(&logins(&["s"]))
        .await;

    match result {
        Err(CrawlError::Aborted { vertex, source }) => {
            assert_eq!(vertex, "A");
            assert!(source.is_fetch_failure());
        }
        other => panic!("expected abort, got {:?}", other.map(|o| o.graph)),
    }

    // B was never fetched
    assert!(!site.fetches().contains(&url_of("b")));
}

#[tokio::test]
async fn test_progress_callback_sees_each_friend() {
    let site = FakeSite::default()
        .user("s", "S")
        .user("a", "A")
        .user("b", "B")
        .friends("s", &["a", "b"]);

    let messages = std::sync::Arc::new(Mutex::new(Vec::new()));
    let sink = messages.clone();

    FoafTraversal::new(&site)
        .with_progress_callback(std::sync::Arc::new(move |msg: String| {
            sink.lock().unwrap().push(msg);
        }))
        .traverse(&logins(&["s"]))
        .await
        .unwrap();

    let messages = messages.lock().unwrap();
    assert_eq!(
        *messages,
        vec![
            "Resolving s".to_string(),
            "S: friend 1/2 A".to_string(),
            "S: friend 2/2 B".to_string(),
        ]
    );
}
