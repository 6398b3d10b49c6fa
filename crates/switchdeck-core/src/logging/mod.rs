use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with optional quiet mode.
///
/// Events are written as JSON lines to stderr so stdout stays free for
/// command output. `RUST_LOG` directives are honored on top of the default.
pub fn init_logging(quiet: bool) {
    let directive = if quiet {
        "switchdeck=error"
    } else {
        "switchdeck=info"
    };

    let filter = match directive.parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(filter)
        .init();
}
