use anyhow::{Context, anyhow, bail};
use chrono::NaiveDateTime;
use clap::Parser;
use core::time::Duration;
use flakeid::Id64;
use tracing_subscriber::filter::LevelFilter;

/// Layout of the `EPOCH` setting: `YYYYMMDDhhmmss`, interpreted as UTC.
pub const EPOCH_FORMAT: &str = "%Y%m%d%H%M%S";

/// Runtime configuration for the `flakeid-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a `.env`
/// file is loaded first). Only the machine ID is mandatory.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakeid-server",
    version,
    about = "An HTTP service handing out 64-bit Snowflake-like IDs"
)]
pub struct CliArgs {
    /// Machine ID embedded in every generated ID.
    ///
    /// Must be unique across every instance sharing an ID namespace and fit in
    /// 10 bits (0..=1023). Assigning it is an operational concern.
    ///
    /// Environment variable: `MACHINE_ID`
    #[arg(long, env = "MACHINE_ID")]
    pub machine_id: u64,

    /// Epoch from which the timestamp field counts milliseconds, as
    /// `YYYYMMDDhhmmss` in UTC.
    ///
    /// Environment variable: `EPOCH`
    #[arg(long, env = "EPOCH", default_value = "20250101000000")]
    pub epoch: String,

    /// Log verbosity: `trace`, `debug`, `info`, `warn`, `error` or `off`.
    /// `warning`, `fatal` and `panic` are accepted as aliases. `RUST_LOG`
    /// takes precedence when set.
    ///
    /// Environment variable: `LOG_LEVEL`
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Address to listen on.
    ///
    /// Environment variable: `LISTEN`
    #[arg(long, env = "LISTEN", default_value_t = String::from("0.0.0.0:8080"))]
    pub listen: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub machine_id: u64,
    /// Epoch as a duration since 1970-01-01 UTC.
    pub epoch: Duration,
    pub log_level: LevelFilter,
    pub listen: String,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.machine_id > Id64::MAX_MACHINE_ID {
            bail!(
                "MACHINE_ID ({}) exceeds available machine ID space (max = {})",
                args.machine_id,
                Id64::MAX_MACHINE_ID
            );
        }

        Ok(Self {
            machine_id: args.machine_id,
            epoch: parse_epoch(&args.epoch)?,
            log_level: parse_log_level(&args.log_level)?,
            listen: args.listen,
        })
    }
}

/// Parses an `EPOCH` value (`YYYYMMDDhhmmss`, UTC) into a duration since the
/// Unix epoch.
pub fn parse_epoch(raw: &str) -> anyhow::Result<Duration> {
    let millis = NaiveDateTime::parse_from_str(raw, EPOCH_FORMAT)
        .with_context(|| format!("invalid EPOCH ({raw}), expected YYYYMMDDhhmmss"))?
        .and_utc()
        .timestamp_millis();
    let millis = u64::try_from(millis).map_err(|_| anyhow!("EPOCH ({raw}) is before 1970"))?;
    Ok(Duration::from_millis(millis))
}

/// Parses a `LOG_LEVEL` value, accepting the common aliases for the error
/// and warning levels.
pub fn parse_log_level(raw: &str) -> anyhow::Result<LevelFilter> {
    let level = match raw.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::OFF,
        "panic" | "fatal" | "error" => LevelFilter::ERROR,
        "warn" | "warning" => LevelFilter::WARN,
        "info" => LevelFilter::INFO,
        "debug" => LevelFilter::DEBUG,
        "trace" => LevelFilter::TRACE,
        _ => bail!("invalid LOG_LEVEL ({raw})"),
    };
    Ok(level)
}
