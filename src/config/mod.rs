/// 환경 변수 기반 설정
// region:    --- Imports
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

// endregion: --- Imports

// region:    --- App Config
#[derive(Debug, Error, PartialEq)]
#[error("설정 값 오류: {key}={value}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: String,
    /// 없으면 메모리 저장소 사용
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// 없으면 프로세스 내 broadcast 만 사용
    pub kafka_brokers: Option<String>,
    pub events_topic: String,
    /// 세 번째 콜 이후 낙찰까지의 유예 시간
    pub sale_grace: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            database_max_connections: 5,
            kafka_brokers: None,
            events_topic: "auction-events".to_string(),
            sale_grace: Duration::from_millis(3000),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 키 조회 함수로부터 설정 구성 (테스트에서 환경 변수 대신 사용)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: non_empty("DATABASE_URL"),
            database_max_connections: parse(
                "DATABASE_MAX_CONNECTIONS",
                non_empty("DATABASE_MAX_CONNECTIONS"),
                defaults.database_max_connections,
            )?,
            kafka_brokers: non_empty("KAFKA_BROKERS"),
            events_topic: non_empty("AUCTION_EVENTS_TOPIC").unwrap_or(defaults.events_topic),
            sale_grace: Duration::from_millis(parse(
                "SALE_GRACE_MS",
                non_empty("SALE_GRACE_MS"),
                defaults.sale_grace.as_millis() as u64,
            )?),
        })
    }
}

fn parse<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError { key, value }),
    }
}

// endregion: --- App Config
