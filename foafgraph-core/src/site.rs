use crate::identity::{Identity, ProfileSource};
use async_trait::async_trait;
use foafgraph_scanner::error::Result;
use foafgraph_scanner::{Country, FetchedPage, PageFetcher, ProfileExtractor, ProfileLink, ScanError};
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_SITE: &str = "http://my.opera.com";
pub const DEFAULT_ORDER: &str = "posts";

/// Client for one community site: resolves logins, reads friend lists and
/// discovers members by country.
pub struct SiteClient<F> {
    fetcher: F,
    extractor: ProfileExtractor,
}

impl<F: PageFetcher> SiteClient<F> {
    pub fn new(fetcher: F, site: Url) -> Self {
        Self {
            fetcher,
            extractor: ProfileExtractor::new(site),
        }
    }

    pub fn site(&self) -> &Url {
        self.extractor.site()
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// `<site>/<login>/` with the login percent-encoded as a single segment.
    pub fn profile_url(&self, login: &str) -> Result<Url> {
        let mut url = self.site().clone();
        url.path_segments_mut()
            .map_err(|_| ScanError::InvalidUrl(format!("{} cannot hold a path", self.site())))?
            .clear()
            .push(login)
            .push("");
        Ok(url)
    }

    async fn fetch_ok(&self, url: &Url) -> Result<FetchedPage> {
        self.fetcher.fetch(url).await?.ensure_success()
    }

    /// Resolves a login through its blog page. `Ok(None)` when the page has
    /// no display name heading.
    pub async fn resolve_login(&self, login: &str) -> Result<Option<Identity>> {
        let profile_url = self.profile_url(login)?;
        let blog_url = join(&profile_url, "blog/")?;

        let page = self.fetch_ok(&blog_url).await?;
        let identity = self
            .extractor
            .display_name(&page.body)
            .map(|name| Identity::new(name, profile_url.as_str()));

        if identity.is_none() {
            debug!("No display name on {}", blog_url);
        }
        Ok(identity)
    }

    /// First page of a user's friends. Users without friends give an empty list.
    pub async fn friends(&self, profile_url: &str) -> Result<Vec<ProfileLink>> {
        let friends_url = friends_url(profile_url)?;
        let page = self.fetch_ok(&friends_url).await?;
        Ok(self.extractor.friends(&page.body))
    }

    /// Countries from the member location page, optionally filtered by a
    /// substring of the option value. An empty result is an error.
    pub async fn countries(&self, filter: Option<&str>, order: &str) -> Result<Vec<Country>> {
        let url = join(self.site(), "community/members/location/")?;
        let page = self.fetch_ok(&url).await?;

        let countries = self.extractor.countries(&page.body, filter, order);
        if countries.is_empty() {
            return Err(ScanError::EmptyResult(format!("{} (no locations)", url)));
        }

        info!("Found {} locations", countries.len());
        Ok(countries)
    }

    /// First page of users for a country listing. An empty result is an error.
    pub async fn country_top_users(&self, listing_url: &str) -> Result<Vec<ProfileLink>> {
        let url = Url::parse(listing_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", listing_url, e)))?;
        let page = self.fetch_ok(&url).await?;

        let users = self.extractor.listing_users(&page.body);
        if users.is_empty() {
            return Err(ScanError::EmptyResult(format!("{} (no users)", listing_url)));
        }
        Ok(users)
    }
}

#[async_trait]
impl<F: PageFetcher> ProfileSource for SiteClient<F> {
    async fn resolve(&self, login: &str) -> Result<Option<Identity>> {
        self.resolve_login(login).await
    }

    async fn friends_of(&self, identity: &Identity) -> Result<Vec<Identity>> {
        let friends = self.friends(&identity.profile_url).await?;
        Ok(friends.into_iter().map(Identity::from).collect())
    }
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| ScanError::InvalidUrl(format!("{} + {}: {}", base, path, e)))
}

fn friends_url(profile_url: &str) -> Result<Url> {
    let base = if profile_url.ends_with('/') {
        profile_url.to_string()
    } else {
        format!("{}/", profile_url)
    };
    let base = Url::parse(&base)
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", profile_url, e)))?;
    join(&base, "friends/")
}
