use crate::CLAP_STYLING;
use clap::{arg, command};
use foafgraph_core::site::{DEFAULT_ORDER, DEFAULT_SITE};
use url::Url;

fn site_arg() -> clap::Arg {
    arg!(--"site" <URL>)
        .required(false)
        .help("Base URL of the community site")
        .value_parser(clap::value_parser!(Url))
        .default_value(DEFAULT_SITE)
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("foafgraph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("foafgraph")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Log every fetched page and discovered friend")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Build the friend-of-a-friend graph of one or more logins and render it \
                with Graphviz.",
                )
                .arg(
                    arg!([LOGIN] ...)
                        .required(false)
                        .help("Seed login(s) or profile URL(s)")
                        .required_unless_present("logins-file"),
                )
                .arg(
                    arg!(-L --"logins-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of seed logins")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-d --"delay" <SECONDS>)
                        .required(false)
                        .help("Pause between friend list requests")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("1"),
                )
                .arg(
                    arg!(--"all-friends")
                        .required(false)
                        .help("Keep every friend of a friend (default: only those the seed also knows)")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"fail-fast")
                        .required(false)
                        .help("Stop the whole crawl at the first failed page fetch")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-o --"output-dir" <PATH>)
                        .required(false)
                        .help("Directory for the .dot and .svg files")
                        .default_value("_data"),
                )
                .arg(
                    arg!(--"renderer" <BIN>)
                        .required(false)
                        .help("Graphviz layout program used to render the graph")
                        .default_value("circo"),
                )
                .arg(
                    arg!(--"no-render")
                        .required(false)
                        .help("Only write the .dot file")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Also write the graph and crawl markers as JSON")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"title" <TEXT>)
                        .required(false)
                        .help("Graph title")
                        .default_value(foafgraph_core::dot::DEFAULT_TITLE),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"no-cache")
                        .required(false)
                        .help("Fetch pages again even if already seen in this run")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(site_arg()),
        )
        .subcommand(
            command!("countries")
                .about("List the countries of the member location directory")
                .arg(
                    arg!(-f --"filter" <TEXT>)
                        .required(false)
                        .help("Only countries whose listing contains this text"),
                )
                .arg(
                    arg!(--"order" <ORDER>)
                        .required(false)
                        .help("Listing sort order")
                        .default_value(DEFAULT_ORDER),
                )
                .arg(site_arg()),
        )
        .subcommand(
            command!("top-users")
                .about("List the first page of members for a country listing URL")
                .arg(
                    arg!(<LISTING_URL>)
                        .required(true)
                        .help("A listing URL as printed by `foafgraph countries`"),
                )
                .arg(site_arg()),
        )
}
