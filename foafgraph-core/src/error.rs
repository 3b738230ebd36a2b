use foafgraph_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Crawl aborted at {vertex}: {source}")]
    Aborted {
        vertex: String,
        #[source]
        source: ScanError,
    },
}

pub type Result<T> = std::result::Result<T, CrawlError>;
