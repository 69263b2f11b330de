//! Layered configuration.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults (`Settings::default()`)
//! 2. `config/default.toml` relative to the working directory, if present
//! 3. `CHATRELAY_`-prefixed environment variables, `__` between sections
//!    (`CHATRELAY_SERVER__PORT=4000`)
//!
//! A bare `PORT` variable is honoured for the listening port when nothing
//! else sets it.

mod settings;

use std::env;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{LogSettings, RelaySettings, ServerSettings, Settings};

pub const ENV_PREFIX: &str = "CHATRELAY";

/// Loads the configuration from the default file and environment variables
/// and merges it with default values.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(merge(partial, env::var("PORT").ok()))
}

fn merge(partial: PartialSettings, port_fallback: Option<String>) -> Settings {
    let default = Settings::default();
    let server = partial.server.unwrap_or_default();
    let relay = partial.relay.unwrap_or_default();
    let log = partial.log.unwrap_or_default();

    Settings {
        server: ServerSettings {
            host: server.host.unwrap_or(default.server.host),
            port: server
                .port
                .or_else(|| port_fallback.and_then(|p| p.trim().parse().ok()))
                .unwrap_or(default.server.port),
            allowed_origin: server.allowed_origin.or(default.server.allowed_origin),
        },
        relay: RelaySettings {
            seed_demo_messages: relay
                .seed_demo_messages
                .unwrap_or(default.relay.seed_demo_messages),
            max_messages: relay.max_messages.unwrap_or(default.relay.max_messages),
            max_connections: relay
                .max_connections
                .unwrap_or(default.relay.max_connections),
            report_errors: relay.report_errors.unwrap_or(default.relay.report_errors),
        },
        log: LogSettings {
            level: log.level.unwrap_or(default.log.level),
        },
    }
}
