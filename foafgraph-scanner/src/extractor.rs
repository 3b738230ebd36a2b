// Structural queries over my.opera.com community pages

use percent_encoding::percent_decode_str;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;
use url::form_urlencoded::byte_serialize;

static COUNTRY_OPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"select[name="countries"] > option"#).unwrap());
static LISTING_USER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.userinfo > p.uname > b > a").unwrap());
static FRIEND_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#myfriends > ul > li > div > a").unwrap());
static FRIEND_NAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("b").unwrap());
static PROFILE_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#qp > h2").unwrap());

/// A user as linked from a listing or friends page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLink {
    /// `Name(login)`, the form the site uses to tell same-named users apart.
    pub display_name: String,
    pub profile_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub listing_url: String,
}

/// Extracts typed records from community pages of one site.
///
/// Every query returns an explicit empty result when nothing matches; deciding
/// whether "nothing" is an error belongs to the caller.
#[derive(Debug, Clone)]
pub struct ProfileExtractor {
    site: Url,
}

impl ProfileExtractor {
    pub fn new(site: Url) -> Self {
        Self { site }
    }

    pub fn site(&self) -> &Url {
        &self.site
    }

    /// Countries from the member location picker. Option values look like
    /// `/community/members/location/?country=Norway`; the listing URL is that
    /// value with the country re-encoded and the sort order appended.
    pub fn countries(&self, html: &str, filter: Option<&str>, order: &str) -> Vec<Country> {
        let document = Html::parse_document(html);
        let site = self.site_prefix();

        document
            .select(&COUNTRY_OPTION)
            .filter_map(|option| option.value().attr("value"))
            .filter(|value| filter.is_none_or(|f| value.contains(f)))
            .filter_map(|value| {
                let Some((prefix, country)) = value.split_once('=') else {
                    debug!("Skipping location option without '=': {}", value);
                    return None;
                };
                let encoded: String = byte_serialize(country.as_bytes()).collect();
                Some(Country {
                    name: country.to_string(),
                    listing_url: format!("{}{}={}&order={}", site, prefix, encoded, order),
                })
            })
            .collect()
    }

    /// Users on the first page of a country listing.
    pub fn listing_users(&self, html: &str) -> Vec<ProfileLink> {
        let document = Html::parse_document(html);
        document
            .select(&LISTING_USER)
            .filter_map(|anchor| {
                let name = anchor.text().collect::<String>();
                self.profile_link(anchor, name.trim())
            })
            .collect()
    }

    /// Friends on the first page of a user's friends list.
    pub fn friends(&self, html: &str) -> Vec<ProfileLink> {
        let document = Html::parse_document(html);
        document
            .select(&FRIEND_LINK)
            .filter_map(|anchor| {
                let name = anchor
                    .select(&FRIEND_NAME)
                    .next()
                    .map(|b| b.text().collect::<String>())
                    .unwrap_or_default();
                self.profile_link(anchor, name.trim())
            })
            .collect()
    }

    /// The display name heading of a profile page: the first direct text of
    /// `div#qp > h2`, trimmed. Blank headings count as absent.
    pub fn display_name(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let heading = document.select(&PROFILE_HEADING).next()?;
        heading
            .children()
            .filter_map(|node| node.value().as_text())
            .map(|text| text.trim())
            .find(|text| !text.is_empty())
            .map(str::to_string)
    }

    fn profile_link(&self, anchor: ElementRef<'_>, name: &str) -> Option<ProfileLink> {
        let href = anchor.value().attr("href")?;
        let login = login_from_href(href)?;
        Some(ProfileLink {
            display_name: format!("{}({})", name, login),
            profile_url: format!("{}{}", self.site_prefix(), href),
        })
    }

    fn site_prefix(&self) -> &str {
        self.site.as_str().trim_end_matches('/')
    }
}

/// Login from a profile href such as `/alice/` or `/j%C3%B8rn/`: the
/// second-to-last path segment, percent-decoded.
pub fn login_from_href(href: &str) -> Option<String> {
    let segments: Vec<&str> = href.split('/').collect();
    if segments.len() < 2 {
        return None;
    }
    let raw = segments[segments.len() - 2];
    if raw.is_empty() {
        return None;
    }
    Some(percent_decode_str(raw).decode_utf8_lossy().into_owned())
}
