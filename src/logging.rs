//! Tracing setup shared by both binaries.
//!
//! Events go to a console stream and, when configured, to an append-only
//! log file without ANSI colours. `RUST_LOG` overrides the default filter.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

pub(crate) const DEFAULT_FILTER: &str = "brief_agent=info,tower_http=info";

/// Console stream that receives log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    Stdout,
    /// Keeps stdout free for interactive output.
    Stderr,
}

/// Install the global subscriber.
///
/// An unopenable log file is reported and skipped; logging never stops the
/// process from starting.
pub fn init(log_file: Option<&Path>, echo: Echo) {
    let writer = match echo {
        Echo::Stdout => BoxMakeWriter::new(std::io::stdout),
        Echo::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    let (file_layer, file_error) = match log_file.map(file_layer) {
        Some(Ok(layer)) => (Some(layer), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .with(file_layer)
        .try_init();

    if installed.is_err() {
        return;
    }
    if let (Some(path), Some(e)) = (log_file, file_error) {
        tracing::warn!("Could not open log file {}: {}", path.display(), e);
    }
}

/// Formatting layer that appends plain-text events to `path`.
pub fn file_layer<S>(path: &Path) -> std::io::Result<impl Layer<S>>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let file: File = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_layer_appends_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.log");
        std::fs::write(&path, "earlier line\n").unwrap();

        let subscriber = tracing_subscriber::registry().with(file_layer(&path).unwrap());
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Asana task task-7 created");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("earlier line\n"));
        assert!(contents.contains("Asana task task-7 created"));
        assert!(!contents.contains('\u{1b}'));
    }

    #[test]
    fn file_layer_reports_unopenable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("api.log");

        let result = file_layer::<tracing_subscriber::Registry>(&path);

        assert!(result.is_err());
    }
}
