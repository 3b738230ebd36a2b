use anyhow::{Context, bail};
use chrono::{DateTime, Local};
use clap::ArgMatches;
use colored::Colorize;
use foafgraph_core::crawl::{FailurePolicy, FoafOptions, TraversalOutcome, execute_foaf_crawl};
use foafgraph_core::dot::{DotOptions, to_dot_with};
use foafgraph_core::pacing::RequestPacer;
use foafgraph_core::report::generate_foaf_report;
use foafgraph_core::site::SiteClient;
use foafgraph_scanner::extractor::login_from_href;
use foafgraph_scanner::{CachePolicy, HttpFetcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

// Helper functions for crawl handler

/// Collect seed logins from the command line and an optional logins file
pub fn load_logins_from_source(
    logins: &[String],
    logins_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    let mut all: Vec<String> = logins
        .iter()
        .filter_map(|line| parse_login_line(line))
        .collect();

    if let Some(path) = logins_file {
        all.extend(load_logins_from_file(path)?);
    }

    if all.is_empty() {
        return Err("Either LOGIN or --logins-file must be provided".to_string());
    }
    Ok(all)
}

/// Load and parse logins from a file
pub fn load_logins_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read logins file {}: {}", path.display(), e))?;

    let logins: Vec<String> = content.lines().filter_map(parse_login_line).collect();

    if logins.is_empty() {
        return Err(format!("No logins found in {}", path.display()));
    }

    Ok(logins)
}

/// Parse one line as a login. Profile URLs are reduced to their login;
/// blank lines and `#` comments are skipped.
pub fn parse_login_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        // the login is the first path segment of a profile URL
        let login = url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .and_then(|segment| login_from_href(&format!("/{}/", segment)));
        if login.is_none() {
            eprintln!("⚠️  Skipping profile URL without a login '{}'", line);
        }
        return login;
    }

    Some(line.to_string())
}

/// Pause between requests for `--delay`. Negative values mean no pause.
pub fn request_delay(secs: f64) -> Result<Duration, String> {
    RequestPacer::from_secs_f64(secs)
        .map(|pacer| pacer.delay())
        .map_err(|_| format!("Invalid --delay {}: not a usable number of seconds", secs))
}

/// Find the Graphviz layout program on PATH
pub fn locate_renderer(name: &str) -> Result<PathBuf, String> {
    which::which(name).map_err(|_| format!("Unable to locate `{}`", name))
}

/// Expand `~` and create the output directory if it does not exist
pub fn prepare_output_dir(dir: &str) -> Result<PathBuf, String> {
    let expanded = shellexpand::tilde(dir);
    let path = PathBuf::from(expanded.as_ref());
    fs::create_dir_all(&path)
        .map_err(|e| format!("Failed to create output directory {}: {}", path.display(), e))?;
    Ok(path)
}

/// File stem for one crawl's artifacts
pub fn output_stem(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d_%H%M%S").to_string()
}

pub fn write_artifact(
    dir: &Path,
    stem: &str,
    extension: &str,
    contents: &str,
) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("{}.{}", stem, extension));
    fs::write(&path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

/// Run `<renderer> -Tsvg <dot> -o <svg>` and return the SVG path
pub fn render_svg(renderer: &Path, dot_path: &Path) -> anyhow::Result<PathBuf> {
    let svg_path = dot_path.with_extension("svg");
    info!("Rendering {} with {}", dot_path.display(), renderer.display());

    let status = Command::new(renderer)
        .arg("-Tsvg")
        .arg(dot_path)
        .arg("-o")
        .arg(&svg_path)
        .status()
        .with_context(|| format!("failed to run {}", renderer.display()))?;

    if !status.success() {
        bail!("{} fails ({})", renderer.display(), status);
    }
    Ok(svg_path)
}

/// Install the tracing subscriber; logs go to stderr so reports stay clean
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "foafgraph=debug,foafgraph_core=debug,foafgraph_scanner=debug"
    } else {
        "foafgraph=info,foafgraph_core=info,foafgraph_scanner=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "✗".red().bold(), message);
    std::process::exit(1);
}

pub async fn handle_crawl(sub_matches: &ArgMatches) {
    let logins: Vec<String> = sub_matches
        .get_many::<String>("LOGIN")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let logins_file = sub_matches.get_one::<PathBuf>("logins-file");
    let delay = *sub_matches.get_one::<f64>("delay").unwrap_or(&1.0);
    let all_friends = sub_matches.get_flag("all-friends");
    let fail_fast = sub_matches.get_flag("fail-fast");
    let no_render = sub_matches.get_flag("no-render");
    let write_json = sub_matches.get_flag("json");
    let no_cache = sub_matches.get_flag("no-cache");
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let output_dir = sub_matches
        .get_one::<String>("output-dir")
        .map(String::as_str)
        .unwrap_or("_data");
    let renderer_name = sub_matches
        .get_one::<String>("renderer")
        .map(String::as_str)
        .unwrap_or("circo");
    let title = sub_matches
        .get_one::<String>("title")
        .cloned()
        .unwrap_or_else(|| foafgraph_core::dot::DEFAULT_TITLE.to_string());
    let site = match sub_matches.get_one::<Url>("site") {
        Some(site) => site.clone(),
        None => fail("--site is required"),
    };

    let logins = load_logins_from_source(&logins, logins_file).unwrap_or_else(|e| fail(e));
    let request_delay = request_delay(delay).unwrap_or_else(|e| fail(e));

    // Check the renderer before spending minutes crawling
    let renderer = if no_render {
        None
    } else {
        Some(locate_renderer(renderer_name).unwrap_or_else(|e| fail(e)))
    };

    let output_dir = prepare_output_dir(output_dir).unwrap_or_else(|e| fail(e));

    println!("\n🕸️  Crawling {} seed(s) on {}", logins.len(), site);
    println!("Delay: {}s", delay);
    println!(
        "Friends of friends: {}",
        if all_friends { "all" } else { "mutual only" }
    );
    println!(
        "On fetch failure: {}\n",
        if fail_fast { "abort" } else { "skip vertex" }
    );

    let options = FoafOptions {
        logins,
        site,
        request_delay,
        mutual_only: !all_friends,
        failure_policy: if fail_fast {
            FailurePolicy::Abort
        } else {
            FailurePolicy::SkipVertex
        },
        timeout_secs: timeout,
        cache_policy: if no_cache {
            CachePolicy::Disabled
        } else {
            CachePolicy::InMemory
        },
        show_progress_bars: true,
    };

    let outcome = match execute_foaf_crawl(options).await {
        Ok(outcome) => outcome,
        Err(e) => fail(format!("Crawl failed: {}", e)),
    };

    println!("\n✓ Crawl complete!\n");
    print!("{}", generate_foaf_report(&outcome));

    let stem = output_stem(Local::now());
    match write_crawl_artifacts(&outcome, &output_dir, &stem, &title, write_json) {
        Ok(paths) => {
            for path in paths {
                println!("{} {}", "✓".green().bold(), path.display().to_string().bright_white());
            }
        }
        Err(e) => fail(format!("{:#}", e)),
    }

    if let Some(renderer) = renderer {
        let dot_path = output_dir.join(format!("{}.dot", stem));
        match render_svg(&renderer, &dot_path) {
            Ok(svg) => println!(
                "{} {}",
                "✓".green().bold(),
                svg.display().to_string().bright_white()
            ),
            Err(e) => fail(format!("{:#}", e)),
        }
    }
}

/// Write the .dot file (and optionally .json) for a finished crawl
pub fn write_crawl_artifacts(
    outcome: &TraversalOutcome,
    output_dir: &Path,
    stem: &str,
    title: &str,
    write_json: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    let options = DotOptions {
        title: title.to_string(),
        ..DotOptions::default()
    };
    let mut paths = vec![write_artifact(
        output_dir,
        stem,
        "dot",
        &to_dot_with(&outcome.graph, &options),
    )?];

    if write_json {
        let json = serde_json::to_string_pretty(outcome).context("failed to encode crawl as JSON")?;
        paths.push(write_artifact(output_dir, stem, "json", &json)?);
    }

    Ok(paths)
}

fn site_client(sub_matches: &ArgMatches) -> SiteClient<HttpFetcher> {
    let site = match sub_matches.get_one::<Url>("site") {
        Some(site) => site.clone(),
        None => fail("--site is required"),
    };
    let fetcher = HttpFetcher::new().unwrap_or_else(|e| fail(e));
    SiteClient::new(fetcher, site)
}

pub async fn handle_countries(sub_matches: &ArgMatches) {
    let filter = sub_matches.get_one::<String>("filter").map(String::as_str);
    let order = sub_matches
        .get_one::<String>("order")
        .map(String::as_str)
        .unwrap_or(foafgraph_core::site::DEFAULT_ORDER);

    let client = site_client(sub_matches);
    match client.countries(filter, order).await {
        Ok(countries) => {
            for country in countries {
                println!("{}\t{}", country.name.bright_white(), country.listing_url);
            }
        }
        Err(e) => fail(e),
    }
}

pub async fn handle_top_users(sub_matches: &ArgMatches) {
    let listing_url = match sub_matches.get_one::<String>("LISTING_URL") {
        Some(url) => url,
        None => fail("LISTING_URL is required"),
    };

    let client = site_client(sub_matches);
    match client.country_top_users(listing_url).await {
        Ok(users) => {
            for user in users {
                println!("{}\t{}", user.display_name.bright_white(), user.profile_url);
            }
        }
        Err(e) => fail(e),
    }
}
