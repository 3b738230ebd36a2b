pub mod crawl;
pub mod dot;
pub mod error;
pub mod graph;
pub mod identity;
pub mod pacing;
pub mod report;
pub mod site;

pub use crawl::{FailurePolicy, FoafTraversal, TraversalOutcome, VertexFailure};
pub use dot::{DotOptions, to_dot, to_dot_with};
pub use error::CrawlError;
pub use graph::FoafGraph;
pub use identity::{Identity, ProfileSource};
pub use site::SiteClient;

use colored::Colorize;

const BANNER: &str = r#"
   __             __                       _
  / _| ___   __ _/ _| __ _ _ __ __ _ _ __ | |__
 | |_ / _ \ / _` | |_ / _` | '__/ _` | '_ \| '_ \
 |  _| (_) | (_| |  _| (_| | | | (_| | |_) | | | |
 |_|  \___/ \__,_|_|  \__, |_|  \__,_| .__/|_| |_|
                      |___/          |_|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_blue().bold());
    println!(
        "  {} {}\n",
        "friend-of-a-friend graphs".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
