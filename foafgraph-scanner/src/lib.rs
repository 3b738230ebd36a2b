pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod result;

pub use error::ScanError;
pub use extractor::{Country, ProfileExtractor, ProfileLink};
pub use fetcher::{CachePolicy, CachingFetcher, HttpFetcher, PageFetcher};
pub use result::FetchedPage;
