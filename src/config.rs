use crate::compute::ColumnRoles;
use std::env;
use std::time::Duration;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MAX_UPLOAD: usize = 10 * 1024 * 1024;
const DEFAULT_SESSION_TTL: u64 = 20 * 60; // 20 minutes in seconds

/// Server settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: String,
    pub max_upload_bytes: usize,
    pub session_ttl: Duration,
    pub roles: ColumnRoles,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            addr: DEFAULT_ADDR.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL),
            roles: ColumnRoles::default(),
        }
    }
}

impl AppConfig {
    /// Read `SHEET_TALLY_*` variables, falling back to defaults for anything
    /// missing or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AppConfig::default();
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());

        AppConfig {
            addr: lookup("SHEET_TALLY_ADDR").unwrap_or(defaults.addr),
            max_upload_bytes: parse("SHEET_TALLY_MAX_UPLOAD").unwrap_or(defaults.max_upload_bytes),
            session_ttl: parse("SHEET_TALLY_SESSION_TTL")
                .map(|secs| Duration::from_secs(secs as u64))
                .unwrap_or(defaults.session_ttl),
            roles: ColumnRoles {
                source_a: parse("SHEET_TALLY_SOURCE_A")
                    .filter(|c| *c > 0)
                    .unwrap_or(defaults.roles.source_a),
                source_b: parse("SHEET_TALLY_SOURCE_B")
                    .filter(|c| *c > 0)
                    .unwrap_or(defaults.roles.source_b),
                aggregate: parse("SHEET_TALLY_AGGREGATE")
                    .filter(|c| *c > 0)
                    .unwrap_or(defaults.roles.aggregate),
            },
        }
    }
}
