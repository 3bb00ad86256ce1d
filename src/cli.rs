use clap::Parser;
use flashpop::config::{AppConfig, DEFAULT_PUBLIC_URL, SeedSource};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use time::{Duration, OffsetDateTime};

const DEFAULT_SESSION_TTL: &str = "30d";

#[allow(clippy::large_enum_variant)]
pub(crate) enum RunOutcome {
    Serve { addr: SocketAddr, config: AppConfig },
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();
    match resolve_config(&cli) {
        Ok((addr, config)) => RunOutcome::Serve { addr, config },
        Err(err) => {
            eprintln!("error: {err}");
            RunOutcome::Exit(2)
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "flashpop",
    version,
    about = "Notification pop-up widget server"
)]
struct Cli {
    #[arg(long, env = "FLASHPOP_HOST", default_value = "127.0.0.1")]
    host: String,
    #[arg(long, env = "FLASHPOP_PORT", default_value_t = 3000)]
    port: u16,
    #[arg(long, env = "FLASHPOP_APP_NAME", default_value = "FlashPop")]
    app_name: String,
    /// Base URL used in embed snippets and by the widget script.
    #[arg(long, env = "FLASHPOP_PUBLIC_URL")]
    public_url: Option<String>,
    /// Session lifetime as <number>[s|m|h|d].
    #[arg(long, env = "FLASHPOP_SESSION_TTL")]
    session_ttl: Option<String>,
    /// Run the scheduled/expired sweep at this interval. Off when unset.
    #[arg(long, env = "FLASHPOP_LIFECYCLE_INTERVAL")]
    lifecycle_interval: Option<String>,
    /// TOML seed file to load instead of the built-in demo data.
    #[arg(long, env = "FLASHPOP_SEED", conflicts_with = "no_seed")]
    seed: Option<PathBuf>,
    #[arg(long, env = "FLASHPOP_NO_SEED")]
    no_seed: bool,
}

fn resolve_config(cli: &Cli) -> Result<(SocketAddr, AppConfig), String> {
    let host: IpAddr = cli
        .host
        .trim()
        .parse()
        .map_err(|_| format!("invalid host '{}'; expected an IP address", cli.host))?;
    let addr = SocketAddr::new(host, cli.port);

    let public_url = match cli.public_url.as_deref().map(str::trim) {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
            url.to_string()
        }
        Some(url) => {
            return Err(format!(
                "invalid public url '{url}'; expected an http:// or https:// URL"
            ));
        }
        None => DEFAULT_PUBLIC_URL.to_string(),
    };

    let session_ttl = parse_duration(
        "session ttl",
        cli.session_ttl.as_deref().unwrap_or(DEFAULT_SESSION_TTL),
    )?;
    if OffsetDateTime::now_utc().checked_add(session_ttl).is_none() {
        return Err(format!(
            "session ttl of {} days reaches past the supported date range",
            session_ttl.whole_days()
        ));
    }
    let lifecycle_interval = cli
        .lifecycle_interval
        .as_deref()
        .map(|raw| {
            let interval = parse_duration("lifecycle interval", raw)?;
            std::time::Duration::try_from(interval)
                .map_err(|_| format!("lifecycle interval '{raw}' is out of range"))
        })
        .transpose()?;

    let seed = match (&cli.seed, cli.no_seed) {
        (_, true) => SeedSource::Empty,
        (Some(path), false) => SeedSource::File(path.clone()),
        (None, false) => SeedSource::Demo,
    };

    Ok((
        addr,
        AppConfig {
            app_name: cli.app_name.clone(),
            public_url,
            session_ttl,
            lifecycle_interval,
            seed,
        },
    ))
}

fn parse_duration(label: &str, raw: &str) -> Result<Duration, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(format!("{label} cannot be empty"));
    }

    let (amount, unit) = match value.chars().last() {
        Some(ch) if ch.is_ascii_alphabetic() => {
            (&value[..value.len() - 1], ch.to_ascii_lowercase())
        }
        _ => (value, 's'),
    };

    let amount: i64 = amount
        .parse()
        .map_err(|_| format!("invalid {label} '{value}'; expected <number>[s|m|h|d]"))?;

    if amount <= 0 {
        return Err(format!("{label} must be greater than 0"));
    }

    let seconds_per_unit: i64 = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => {
            return Err(format!(
                "invalid {label} '{value}'; expected <number>[s|m|h|d]"
            ));
        }
    };
    amount
        .checked_mul(seconds_per_unit)
        .map(Duration::seconds)
        .ok_or_else(|| format!("{label} '{value}' is too large"))
}
