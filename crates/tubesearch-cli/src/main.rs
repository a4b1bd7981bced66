mod error;
mod logging;
mod tui;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use time::UtcOffset;
use tubesearch_core::adapters::build_search_service;
use tubesearch_core::config::AppConfig;
use tubesearch_core::identity::build_identity_provider;
use tubesearch_core::orchestration::ClientRuntime;
use tubesearch_core::session::SessionContext;
use tubesearch_core::transport::{HttpTransport, UreqTransport};
use tubesearch_core::view::SearchView;

use crate::error::CliError;
use crate::tui::App;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("tubesearch: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), CliError> {
    // Must be read before any worker thread exists.
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let config = AppConfig::from_env()?;
    logging::init(&config.log_file)?;
    tracing::info!(
        backend = config.backend.variant.as_str(),
        base_url = %config.backend.base_url,
        provider = config.identity.provider_id(),
        "starting tubesearch"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let transport: Arc<dyn HttpTransport> = Arc::new(UreqTransport::new());
    let service = build_search_service(&config.backend, transport.clone());
    let identity = build_identity_provider(&config.identity, transport);
    let session = Arc::new(SessionContext::new());

    let (client, events) = ClientRuntime::new(runtime.handle().clone(), service, identity);
    let mut app = App::new(SearchView::new(session), client, events)
        .backend(config.backend.variant)
        .provider(config.identity.provider_id())
        .local_offset(local_offset);

    let result = tui::run(&mut app);
    drop(app);
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    if let Err(error) = &result {
        tracing::error!(error = %error, "tubesearch exited with an error");
    } else {
        tracing::info!("tubesearch exited");
    }
    result
}
