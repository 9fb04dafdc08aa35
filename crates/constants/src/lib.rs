pub mod endpoints;

/// Default address of the local backend, used when neither the config file nor the
/// command line provide one.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";

/// Environment variable that overrides the configured backend address
pub const API_URL_ENV: &str = "RIVEN_API_URL";

/// Real-Debrid reports its timestamps as CET/CEST wall-clock time
pub const DEBRID_TIME_ZONE: chrono_tz::Tz = chrono_tz::Europe::Paris;

/// Rendered in place of a date that could not be parsed
pub const INVALID_DATE: &str = "Invalid DateTime";

/// Name of the per-user data directory
pub const APP_DIR_NAME: &str = "riven-companion";

pub mod filename {
    pub mod persistent {
        /// The config file, stored in persistent data directory
        pub const CONFIG: &str = "config.json";
    }
}
