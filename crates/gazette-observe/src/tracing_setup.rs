//! Tracing subscriber initialization with structured logging and optional
//! OpenTelemetry trace export.
//!
//! The bot process calls [`init_tracing`] once at startup and
//! [`shutdown_tracing`] before exit. `RUST_LOG` controls filtering via
//! `EnvFilter`.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use std::sync::OnceLock;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for interactive runs.
    #[default]
    Pretty,
    /// Line-delimited JSON for log shippers.
    Json,
}

/// Subscriber configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    pub format: LogFormat,
    /// Bridge tracing spans to OpenTelemetry with a stdout exporter
    /// (suitable for local development; swap the exporter for OTLP in
    /// production).
    pub otel: bool,
}

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set.
pub fn init_tracing(options: LogOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    layers.push(EnvFilter::from_default_env().boxed());

    match options.format {
        LogFormat::Pretty => {
            layers.push(tracing_subscriber::fmt::layer().with_target(true).boxed());
        }
        LogFormat::Json => {
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .boxed(),
            );
        }
    }

    if options.otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("gazette");

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        layers.push(tracing_opentelemetry::layer().with_tracer(tracer).boxed());
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// Safe to call even when OTel was not enabled (no-op in that case).
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
