use std::env;

const DEFAULT_PAYLOAD_LIMIT: usize = 8 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct ServerEnvData {
    pub bind_address: String,
    pub port: u16,
    pub workers: usize,

    /// Maximum size of an uploaded spreadsheet in bytes.
    pub payload_limit: usize,
}

impl ServerEnvData {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |name: &str| lookup(name).and_then(|v| v.trim().parse::<usize>().ok());

        Self {
            bind_address: lookup("IMPORT_BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("IMPORT_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(5050),
            workers: parsed("IMPORT_WORKERS").filter(|v| *v > 0).unwrap_or(4),
            payload_limit: parsed("IMPORT_PAYLOAD_LIMIT").unwrap_or(DEFAULT_PAYLOAD_LIMIT),
        }
    }
}

impl Default for ServerEnvData {
    fn default() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }
}
