use tracing::Subscriber;
use tracing_subscriber::{
    fmt::MakeWriter, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    EnvFilter, Layer,
};

fn cli_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("brake_export=debug,info")
        } else {
            EnvFilter::new("brake_export=info")
        }
    })
}

/// Compact single-line output shared by every CLI entry point.
fn cli_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
}

pub fn init_cli_logger(verbose: bool) {
    // stderr，避免 --stdout 匯出時混入 CSV 內容
    tracing_subscriber::registry()
        .with(cli_filter(verbose))
        .with(cli_layer(std::io::stderr))
        .init();
}

/// Like [`init_cli_logger`], but an explicit level from a config file wins over the
/// verbose flag when `RUST_LOG` is not set.
pub fn init_with_level(level: Option<&str>, verbose: bool) {
    let filter = match (std::env::var("RUST_LOG").ok(), level) {
        (None, Some(level)) => EnvFilter::new(format!("brake_export={}", level)),
        _ => cli_filter(verbose),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(cli_layer(std::io::stderr))
        .init();
}

pub fn init_lambda_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("brake_export=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(), // Lambda uses JSON format for better CloudWatch integration
        )
        .init();
}

/// In-memory log sink for asserting on formatted output.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

#[cfg(test)]
impl CapturedLogs {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[cfg(test)]
impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
