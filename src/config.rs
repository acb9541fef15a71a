//! Process configuration: environment variables read once at startup plus a
//! `clap`-derived CLI for local/dev overrides (SPEC_FULL.md §B
//! "Configuration", grounded in the teacher's `BIND_ADDR`-driven
//! `hosting::Server::run` and the root crate's `clap` dependency).

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "fbf-server", about = "Tactics5x5 authoritative match server")]
pub struct Cli {
    /// Address to bind the HTTP/WebSocket listener to. Falls back to
    /// `BIND_ADDR`, then `127.0.0.1:8080`.
    #[arg(long)]
    pub bind: Option<String>,

    /// Minimum log level for the terminal logger (file logger always runs
    /// at DEBUG, mirroring `fbf_core::log`'s dual-sink bootstrap).
    #[arg(long, default_value = "info")]
    pub log_level: log::LevelFilter,
}

impl Cli {
    /// Resolves the effective bind address: `--bind`, else `BIND_ADDR`, else
    /// the development default.
    pub fn bind_addr(&self) -> String {
        self.bind
            .clone()
            .or_else(|| std::env::var("BIND_ADDR").ok())
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
    }
}
