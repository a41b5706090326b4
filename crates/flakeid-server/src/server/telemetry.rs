//! # Logging and metrics
//!
//! Logging always goes through `tracing` with a `fmt` layer. The filter comes
//! from `RUST_LOG` when set, otherwise from the configured `LOG_LEVEL`.
//!
//! ## Feature matrix
//!
//! - `metrics`: Enables OpenTelemetry counters for generated IDs and
//!   generation errors.
//! - `stdout`: Exports those metrics to stdout every five seconds.
//!
//! Without `metrics` the recording functions below compile to no-ops.
//!
//! ```bash
//! cargo run -p flakeid-server --features stdout -- --machine-id 1
//! ```

use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

#[cfg(feature = "metrics")]
use opentelemetry::{
    KeyValue,
    metrics::{Counter, Meter},
};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{Resource, metrics as sdkmetrics};
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

pub struct TelemetryProviders {
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes and shuts down every exporter. Errors are reported on stderr
    /// since the subscriber may already be gone.
    pub fn shutdown(self) {
        #[cfg(feature = "metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {err:#?}");
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {err:#?}");
            }
        }
    }
}

pub fn init_telemetry(level: LevelFilter) -> anyhow::Result<TelemetryProviders> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        )
        .try_init()?;

    #[cfg(feature = "metrics")]
    let meter_provider = {
        let meter_provider = init_metrics();
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        init_metric_handles(opentelemetry::global::meter("flakeid"));
        meter_provider
    };

    Ok(TelemetryProviders {
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

#[cfg(feature = "metrics")]
fn init_metrics() -> sdkmetrics::SdkMeterProvider {
    let resource = Resource::builder()
        .with_service_name("flakeid")
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .build();
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource);

    #[cfg(feature = "stdout")]
    let builder = {
        use opentelemetry_stdout::MetricExporter;
        let exporter = MetricExporter::default();
        let reader = sdkmetrics::PeriodicReader::builder(exporter)
            .with_interval(std::time::Duration::from_secs(5))
            .build();

        builder.with_reader(reader)
    };

    builder.build()
}

// Metric handles - only compiled when metrics feature is enabled
#[cfg(feature = "metrics")]
static IDS_GENERATED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static ID_ERRORS: OnceLock<Counter<u64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = IDS_GENERATED.set(
        meter
            .u64_counter("ids_generated")
            .with_description("Total Snowflake IDs handed out")
            .build(),
    );

    let _ = ID_ERRORS.set(
        meter
            .u64_counter("id_errors")
            .with_description("Failed ID requests, by error kind")
            .build(),
    );
}

// Convenience functions that compile to no-ops when metrics are disabled
#[cfg(feature = "metrics")]
pub fn increment_ids_generated() {
    if let Some(counter) = IDS_GENERATED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_ids_generated() {}

#[cfg(feature = "metrics")]
pub fn increment_id_errors(kind: &'static str) {
    if let Some(counter) = ID_ERRORS.get() {
        counter.add(1, &[KeyValue::new("kind", kind)]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_id_errors(_kind: &'static str) {}
