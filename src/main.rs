use std::process::ExitCode;

use view_copy::config::Config;
use view_copy::context::RunContext;
use view_copy::logging::{self, LogSettings};

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // Returns a no-op guard when SENTRY_DSN is absent.
    let _sentry_guard = sentry::init(sentry_options(config.sentry_dsn.as_deref()));

    let _log_guard = match logging::init(&LogSettings {
        log_dir: config.log_dir.clone(),
        max_log_files: config.max_log_files,
    }) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    logging::install_crash_hook(&config.log_dir);

    tracing::info!("Starting zendesk-view-copy v{}", env!("CARGO_PKG_VERSION"));

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let ctx = RunContext::new(config.log_dir.clone());
    match runtime.block_on(view_copy::run(&config, &ctx)) {
        // Created, unrecreatable and exhausted all end the run normally.
        Ok(outcome) => {
            tracing::info!(attempts = outcome.attempts(), "Run finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            ExitCode::FAILURE
        }
    }
}

fn sentry_options(dsn: Option<&str>) -> sentry::ClientOptions {
    sentry::ClientOptions {
        dsn: dsn.and_then(|s| s.parse().ok()),
        release: Some(env!("CARGO_PKG_VERSION").into()),
        traces_sample_rate: 0.0,
        send_default_pii: false,
        before_send: Some(std::sync::Arc::new(|mut event| {
            if let Some(ref mut user) = event.user {
                user.email = None;
                user.ip_address = None;
                user.username = None;
            }
            if let Some(ref mut request) = event.request {
                request.data = None;
            }
            Some(event)
        })),
        ..Default::default()
    }
}
