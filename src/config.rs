//! Process configuration read from the environment (and `.env` via dotenv).

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{invalid_input_error, Error};

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 12;
const DEFAULT_PROMO_CODES: &str = "ORBI20,GEORGIA20,WELCOME20";
const DEFAULT_SNAPSHOT_TTL_SECS: u64 = 30;
/// Georgia, UTC+4.
const DEFAULT_UTC_OFFSET_HOURS: i32 = 4;
const MAX_UTC_OFFSET_HOURS: i32 = 14;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub listen_addr: SocketAddr,
    pub collaborator_timeout: Duration,
    /// Longest a cached driver/booking snapshot serves searches.
    pub snapshot_ttl: Duration,
    /// Offset of the service's local day, used to reject past dates.
    pub utc_offset_hours: i32,
    pub promo_codes: Vec<String>,
    pub admin_phone: Option<String>,
    pub sms: Option<Endpoint>,
    pub email: Option<Endpoint>,
}

#[derive(Clone, Debug)]
pub struct Endpoint {
    pub api_base: String,
    pub api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            collaborator_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            snapshot_ttl: Duration::from_secs(DEFAULT_SNAPSHOT_TTL_SECS),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            promo_codes: parse_list(DEFAULT_PROMO_CODES),
            admin_phone: None,
            sms: None,
            email: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            database_url: optional("DATABASE_URL")?,
            max_connections: parsed("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            listen_addr: parsed(
                "LISTEN_ADDR",
                SocketAddr::from_str(DEFAULT_LISTEN_ADDR).map_err(|_| invalid_input_error())?,
            )?,
            collaborator_timeout: Duration::from_secs(parsed(
                "COLLABORATOR_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            snapshot_ttl: Duration::from_secs(parsed(
                "SNAPSHOT_TTL_SECS",
                DEFAULT_SNAPSHOT_TTL_SECS,
            )?),
            utc_offset_hours: utc_offset_hours(parsed(
                "UTC_OFFSET_HOURS",
                DEFAULT_UTC_OFFSET_HOURS,
            )?)?,
            promo_codes: parse_list(
                &optional("PROMO_CODES")?.unwrap_or_else(|| DEFAULT_PROMO_CODES.into()),
            ),
            admin_phone: optional("ADMIN_PHONE")?,
            sms: endpoint("SMS_API_BASE", "SMS_API_KEY")?,
            email: endpoint("EMAIL_API_BASE", "EMAIL_API_KEY")?,
        })
    }
}

/// Unset and blank both read as `None`.
fn optional(key: &str) -> Result<Option<String>, Error> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => {
            tracing::error!("{} is not valid unicode", key);
            Err(err.into())
        }
    }
}

fn parsed<T: FromStr>(key: &str, default: T) -> Result<T, Error> {
    match optional(key)? {
        Some(value) => value.trim().parse().map_err(|_| {
            tracing::error!("{} has an invalid value: {:?}", key, value);
            invalid_input_error()
        }),
        None => Ok(default),
    }
}

fn utc_offset_hours(hours: i32) -> Result<i32, Error> {
    if hours.abs() > MAX_UTC_OFFSET_HOURS {
        tracing::error!("UTC_OFFSET_HOURS out of range: {}", hours);
        return Err(invalid_input_error());
    }

    Ok(hours)
}

fn endpoint(base_key: &str, key_key: &str) -> Result<Option<Endpoint>, Error> {
    match (optional(base_key)?, optional(key_key)?) {
        (Some(api_base), Some(api_key)) => Ok(Some(Endpoint { api_base, api_key })),
        _ => Ok(None),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_uppercase())
        .filter(|item| !item.is_empty())
        .collect()
}

#[test]
fn parse_list_normalizes_codes() {
    assert_eq!(parse_list(" orbi20, ,Georgia20 "), vec!["ORBI20", "GEORGIA20"]);
}

#[test]
fn blank_and_missing_variables_are_unset() {
    assert_eq!(optional("ORBITRIP_TEST_SURELY_UNSET").unwrap(), None);
    assert_eq!(parsed("ORBITRIP_TEST_SURELY_UNSET", 7u32).unwrap(), 7);
    assert!(endpoint("ORBITRIP_TEST_SURELY_UNSET", "ORBITRIP_TEST_ALSO_UNSET")
        .unwrap()
        .is_none());
}

#[test]
fn utc_offset_must_be_a_real_zone() {
    assert_eq!(utc_offset_hours(4).unwrap(), 4);
    assert_eq!(utc_offset_hours(-11).unwrap(), -11);
    assert!(utc_offset_hours(15).unwrap_err().is_invalid_input_error());
}

#[test]
fn default_config_is_usable() {
    let config = Config::default();

    assert!(config.database_url.is_none());
    assert_eq!(config.listen_addr.port(), 3000);
    assert!(config.collaborator_timeout >= Duration::from_secs(10));
    assert!(!config.snapshot_ttl.is_zero());
    assert_eq!(config.utc_offset_hours, 4);
    assert!(config.promo_codes.contains(&"ORBI20".to_string()));
}
