use crate::link::LinkSource;
use station_core::{EngineConfig, ResetPolicy, parse_code_digits};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub link: LinkSource,
    pub tick_interval_ms: u64,
    pub box_count: usize,
    pub code_digits: Vec<u8>,
    pub reset_policy: ResetPolicy,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            link: LinkSource::parse(&env::var("LINK_ADDR").unwrap_or_default()),
            tick_interval_ms: env::var("TICK_INTERVAL_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .expect("Invalid TICK_INTERVAL_MS"),
            box_count: env::var("BOX_COUNT")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .expect("Invalid BOX_COUNT"),
            code_digits: parse_code_digits(&env::var("CODE_DIGITS").unwrap_or_default()),
            reset_policy: env::var("RESET_POLICY")
                .unwrap_or_else(|_| "clock_only".to_string())
                .parse()
                .expect("Invalid RESET_POLICY"),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            box_count: self.box_count,
            code_digits: self.code_digits.clone(),
            reset_policy: self.reset_policy,
            ..EngineConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
