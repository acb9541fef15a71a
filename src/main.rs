//! `fbf-server` binary entry point: thin CLI wrapper around the library
//! crates, mirroring the teacher's `src/bin/hosting.rs` (SPEC_FULL.md §C.5).

use clap::Parser;
use fbf_registry::MatchRegistry;
use fbf_server::config::Cli;
use fbf_server::dispatcher::Dispatcher;
use fbf_server::hosting::Hosting;
use fbf_server::sink::DispatcherTimeoutSink;
use fbf_timer::SystemClock;
use fbf_timer::TimerService;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();
    fbf_core::log();
    log::set_max_level(cli.log_level);
    fbf_core::install_shutdown_handler();

    let registry = Arc::new(MatchRegistry::new());
    let timers = Arc::new(TimerService::new(Arc::new(SystemClock)));
    let match_service = Arc::new(fbf_match::MatchService::new(registry.clone(), timers));
    let sink = DispatcherTimeoutSink::new(registry.clone());
    let dispatcher = Dispatcher::new(registry, match_service, sink);

    Hosting::new(dispatcher).run(&cli.bind_addr()).await
}
