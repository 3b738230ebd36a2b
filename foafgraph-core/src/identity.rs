use async_trait::async_trait;
use foafgraph_scanner::{ProfileLink, ScanError};
use serde::{Deserialize, Serialize};

/// A resolved user. `display_name` is the vertex key: two identities with the
/// same display name are the same vertex no matter how they were reached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub display_name: String,
    pub profile_url: String,
}

impl Identity {
    pub fn new(display_name: impl Into<String>, profile_url: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            profile_url: profile_url.into(),
        }
    }
}

impl From<ProfileLink> for Identity {
    fn from(link: ProfileLink) -> Self {
        Self {
            display_name: link.display_name,
            profile_url: link.profile_url,
        }
    }
}

/// What the traversal engine needs from a site.
///
/// `resolve` returns `Ok(None)` when the login has no discoverable identity.
/// `friends_of` returns an empty list for users without friends; errors are
/// reserved for failed fetches.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn resolve(&self, login: &str) -> Result<Option<Identity>, ScanError>;

    async fn friends_of(&self, identity: &Identity) -> Result<Vec<Identity>, ScanError>;
}
