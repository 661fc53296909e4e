use core::fmt;
use std::{env, time::Duration};

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::{models::quiz_game::RoundSettings, service::quiz_runner::QuizTiming};

pub static CONFIG: Lazy<AppConfig> =
    Lazy::new(|| AppConfig::load().unwrap_or_else(|e| panic!("{}", e)));

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub enum Runtime {
    Dev,
    Prod,
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Runtime::Dev => write!(f, "development"),
            Runtime::Prod => write!(f, "production"),
        }
    }
}

impl From<String> for Runtime {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PRODUCTION" => Runtime::Prod,
            _ => Runtime::Dev,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub portal: PortalConfig,
    #[serde(default)]
    pub quiz: QuizConfig,
}

fn default_address() -> String {
    "127.0.0.1".into()
}

fn default_port() -> String {
    "3000".into()
}

fn default_session_retention() -> u32 {
    60
}

fn default_request_timeout() -> u64 {
    10
}

fn default_round_size() -> usize {
    10
}

fn default_question_seconds() -> u32 {
    15
}

fn default_tick_millis() -> u64 {
    1000
}

fn default_feedback_millis() -> u64 {
    2000
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: String,
    /// Minutes a session may sit idle before it is evicted.
    #[serde(default = "default_session_retention")]
    pub session_retention_minutes: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PortalConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl PortalConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Validate)]
pub struct QuizConfig {
    #[serde(default = "default_round_size")]
    #[validate(range(min = 1))]
    pub round_size: usize,
    #[serde(default = "default_question_seconds")]
    #[validate(range(min = 1))]
    pub question_seconds: u32,
    #[serde(default = "default_tick_millis")]
    #[validate(range(min = 1))]
    pub tick_millis: u64,
    #[serde(default = "default_feedback_millis")]
    pub feedback_millis: u64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            round_size: default_round_size(),
            question_seconds: default_question_seconds(),
            tick_millis: default_tick_millis(),
            feedback_millis: default_feedback_millis(),
        }
    }
}

impl QuizConfig {
    pub fn round_settings(&self) -> RoundSettings {
        RoundSettings {
            round_size: self.round_size,
            question_seconds: self.question_seconds,
        }
    }

    pub fn timing(&self) -> QuizTiming {
        QuizTiming {
            tick: Duration::from_millis(self.tick_millis),
            feedback: Duration::from_millis(self.feedback_millis),
        }
    }
}

impl AppConfig {
    fn load() -> Result<Self, ConfigError> {
        let runtime: Runtime = env::var("ENVIRONMENT").unwrap_or_default().into();

        let config = Self::from_config(
            Config::builder()
                .add_source(File::with_name(&format!("src/config/{}.toml", runtime)))
                .add_source(Environment::with_prefix("QUIZ").separator("__"))
                .build()?,
        )?;

        debug!("Loaded {} config: {:?}", runtime, config);
        Ok(config)
    }

    /// Zero round sizes, countdowns or tick periods are rejected here.
    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let config: AppConfig = config.try_deserialize()?;
        config
            .quiz
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid quiz config: {}", e)))?;

        Ok(config)
    }
}
