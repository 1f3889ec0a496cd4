use std::{env, time::Duration};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9000/exec";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub endpoint_url: String,
    /// Price per kWh used to derive the logged cost.
    pub charge_rate: f64,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let endpoint_url = match env::var("CHARGE_ENDPOINT_URL") {
            Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => {
                warn!("CHARGE_ENDPOINT_URL not set, using {DEFAULT_ENDPOINT}");
                DEFAULT_ENDPOINT.to_string()
            }
        };

        let charge_rate = parse_var("CHARGE_RATE")
            .filter(|rate: &f64| rate.is_finite() && *rate >= 0.0)
            .unwrap_or(0.0);

        Self {
            port: parse_var("PORT").unwrap_or(DEFAULT_PORT),
            endpoint_url,
            charge_rate,
            request_timeout: Duration::from_secs(
                parse_var("CHARGE_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = env::var(name).ok()?;
    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("ignoring invalid {name}={value:?}");
            None
        }
    }
}
