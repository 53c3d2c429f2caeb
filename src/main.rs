// feedview entry point.
// Loads settings, starts logging and the runtime, then runs the TUI until quit.

use std::process;
use std::sync::Arc;

use clap::Parser;

use feedview::api::PostsClient;
use feedview::app::App;
use feedview::config::{CliArgs, Settings};
use feedview::error::Result;
use feedview::query::QueryClient;
use feedview::state::Route;
use feedview::telemetry;

fn main() {
    if let Err(error) = run() {
        tracing::error!(error = %error, "application error");
        eprintln!("feedview: {}", error);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let settings = Settings::from_cli(CliArgs::parse())?;
    telemetry::init(&settings.logging)?;

    // Fetches run on worker threads; the draw loop stays on this one.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    let source = PostsClient::with_tracing(&settings.base_url)?;
    let client = Arc::new(QueryClient::new(Arc::new(source), settings.query));
    tracing::info!(base_url = %settings.base_url, "starting feedview");

    let mut app = App::new(client);
    if settings.initial_route != Route::Feed {
        app.navigate(settings.initial_route.clone());
    }
    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    result?;
    tracing::info!("exited cleanly");
    Ok(())
}
