use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub enable_tracing: bool,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    pub jwt_secret: String,
    /// Admin account created at startup when configured
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BootstrapAdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Multiplier for totals submitted from non-domestic exchanges
    pub conversion_rate: Decimal,
    /// Exchange codes that settle at face value
    pub domestic_exchanges: Vec<String>,
    /// Cash balance seeded into every new account
    pub opening_balance: Decimal,
    /// CSV audit mirror of the order ledger; None disables it
    pub ledger_audit_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            conversion_rate: Decimal::from(90),
            domestic_exchanges: vec!["NSE".to_string(), "BSE".to_string()],
            opening_balance: Decimal::from(10_000),
            ledger_audit_path: None,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        let engine = EngineConfig::default();
        assert_eq!(engine.conversion_rate, Decimal::from(90));
        assert_eq!(engine.domestic_exchanges, vec!["NSE", "BSE"]);
        assert_eq!(engine.opening_balance, Decimal::from(10_000));
        assert!(engine.ledger_audit_path.is_none());
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
log_level: "info"
log_dir: "./logs"
log_file: "paper_exchange.log"
use_json: false
rotation: "daily"
enable_tracing: true
gateway:
  host: "127.0.0.1"
  port: 8080
engine:
  conversion_rate: 90
  domestic_exchanges: ["NSE", "BSE"]
  opening_balance: 10000
  ledger_audit_path: "./data/ledger.csv"
jwt_secret: "test-secret"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.engine.conversion_rate, Decimal::from(90));
        assert_eq!(
            config.engine.ledger_audit_path.as_deref(),
            Some("./data/ledger.csv")
        );
    }
}
