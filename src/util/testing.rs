//! Test support: logging setup and canned clade pages.

use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // RUST_LOG wins; otherwise trace our own crate only
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wikiclade=trace"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::ENTER | FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Wrap rows into a `table.clade` with a `tbody`.
pub fn clade_table(rows: &str) -> String {
    format!(r#"<table class="clade"><tbody>{rows}</tbody></table>"#)
}

/// One label row: label cell plus leaf cell.
pub fn clade_row(label: &str, leaf: &str) -> String {
    format!(r#"<tr><td class="clade-label">{label}</td><td class="clade-leaf">{leaf}</td></tr>"#)
}

/// Minimal page around some body markup.
pub fn page(body: &str) -> String {
    format!("<!DOCTYPE html><html><head><title>t</title></head><body>{body}</body></html>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_rows_when_building_fixture_then_nests_in_clade_table() {
        init_test_setup();
        let html = clade_table(&clade_row("", "Felis"));
        assert!(html.starts_with(r#"<table class="clade"><tbody><tr>"#));
        assert!(html.contains(r#"<td class="clade-leaf">Felis</td>"#));
    }
}
