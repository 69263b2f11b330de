use serde::Deserialize;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    pub server: ServerSettings,
    pub relay: RelaySettings,
    pub log: LogSettings,
}

/// Where the relay listens and which browser origins may connect.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// When set, WebSocket handshakes carrying a different `Origin` are refused.
    pub allowed_origin: Option<String>,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Relay behaviour. A limit of `0` means unbounded.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RelaySettings {
    pub seed_demo_messages: bool,
    pub max_messages: usize,
    pub max_connections: usize,
    /// Send an `error` event back to a session whose event could not be parsed.
    pub report_errors: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub relay: Option<PartialRelaySettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub allowed_origin: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialRelaySettings {
    pub seed_demo_messages: Option<bool>,
    pub max_messages: Option<usize>,
    pub max_connections: Option<usize>,
    pub report_errors: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            allowed_origin: None,
        }
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            seed_demo_messages: true,
            max_messages: 0,
            max_connections: 0,
            report_errors: false,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
