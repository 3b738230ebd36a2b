// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    load_logins_from_file, load_logins_from_source, locate_renderer, output_stem,
    parse_login_line, prepare_output_dir, render_svg, request_delay, write_crawl_artifacts,
};

// Re-export crawl functionality from foafgraph-core
pub use foafgraph_core::crawl::{
    FailurePolicy, FoafOptions, TraversalOutcome, TraversalProgressCallback, execute_foaf_crawl,
};
