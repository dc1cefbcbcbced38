use crate::config::{DEFAULT_COLLECTION, DEFAULT_STORAGE_PATH, DEFAULT_TIMEOUT_SECONDS};
use clap::{Arg, ArgMatches, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_STORAGE_PATH: &str = "storage-path";
pub const ARG_COLLECTION: &str = "collection";
pub const ARG_TIMEOUT: &str = "timeout";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Dashboard API base URL, example: https://api.portal.dev")
                .env("PORTAL_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STORAGE_PATH)
                .long(ARG_STORAGE_PATH)
                .help("File the session is persisted to")
                .env("PORTAL_STORAGE_PATH")
                .default_value(DEFAULT_STORAGE_PATH)
                .global(true),
        )
        .arg(
            Arg::new(ARG_COLLECTION)
                .long(ARG_COLLECTION)
                .help("Client-bot collection the settings are written to")
                .env("PORTAL_COLLECTION")
                .default_value(DEFAULT_COLLECTION)
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help(timeout_help())
                .env("PORTAL_TIMEOUT_SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..))
                .global(true),
        )
}

fn timeout_help() -> String {
    format!("HTTP request timeout in seconds (default: {DEFAULT_TIMEOUT_SECONDS})")
}

#[derive(Debug, Clone)]
pub struct Options {
    pub api_url: Option<String>,
    pub storage_path: Option<String>,
    pub collection: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            api_url: matches.get_one::<String>(ARG_API_URL).cloned(),
            storage_path: matches.get_one::<String>(ARG_STORAGE_PATH).cloned(),
            collection: matches.get_one::<String>(ARG_COLLECTION).cloned(),
            timeout_seconds: matches.get_one::<u64>(ARG_TIMEOUT).copied(),
        }
    }
}
