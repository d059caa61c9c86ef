use crate::error::{RelayError, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_COMMAND_PREFIX: &str = "!";
pub const DEFAULT_MODEL: &str = "stabilityai/stable-diffusion-xl-base-1.0";
pub const DEFAULT_HUGGINGFACE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_GUIDANCE_SCALE: f32 = 9.0;
pub const DEFAULT_IMGUR_URL: &str = "https://api.imgur.com";
pub const DEFAULT_MONGO_DATABASE: &str = "image_generation_db";
pub const DEFAULT_MONGO_COLLECTION: &str = "generated_images";

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: Option<String>,
    pub command_prefix: String,
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_token: Option<String>,
    pub model: String,
    pub base_url: String,
    pub guidance_scale: f32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ImgurConfig {
    pub client_id: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub connection_string: Option<String>,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordBackend {
    Mongo,
    Postgres,
    Memory,
}

impl RecordBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Some(RecordBackend::Mongo),
            "postgres" | "psql" | "postgresql" => Some(RecordBackend::Postgres),
            "memory" => Some(RecordBackend::Memory),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordBackend::Mongo => "mongo",
            RecordBackend::Postgres => "postgres",
            RecordBackend::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord: DiscordConfig,
    pub generation: GenerationConfig,
    pub imgur: ImgurConfig,
    pub backend: RecordBackend,
    pub mongo: MongoConfig,
    pub postgres: PostgresConfig,
    pub retry_backoff: Duration,
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_secs(key: &str) -> Option<Duration> {
    env_opt(key)
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
}

impl Default for DiscordConfig {
    fn default() -> Self {
        DiscordConfig {
            token: None,
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
        }
    }
}

impl DiscordConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        DiscordConfig {
            token: env_opt("DISCORD_TOKEN"),
            command_prefix: env_opt("COMMAND_PREFIX")
                .unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.to_string()),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefix = prefix.into();
        self
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            api_token: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_HUGGINGFACE_URL.to_string(),
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
            timeout: Duration::from_secs(120),
        }
    }
}

impl GenerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        GenerationConfig {
            api_token: env_opt("HUGGINGFACE_TOKEN"),
            model: env_opt("HUGGINGFACE_MODEL").unwrap_or(defaults.model),
            base_url: env_opt("HUGGINGFACE_API_URL").unwrap_or(defaults.base_url),
            guidance_scale: env_opt("GUIDANCE_SCALE")
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.guidance_scale),
            timeout: env_secs("HTTP_TIMEOUT_SECS").unwrap_or(defaults.timeout),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_guidance_scale(mut self, scale: f32) -> Self {
        self.guidance_scale = scale;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ImgurConfig {
    fn default() -> Self {
        ImgurConfig {
            client_id: None,
            base_url: DEFAULT_IMGUR_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ImgurConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        ImgurConfig {
            client_id: env_opt("IMGUR_CLIENT_ID"),
            base_url: env_opt("IMGUR_API_URL").unwrap_or(defaults.base_url),
            timeout: env_secs("HTTP_TIMEOUT_SECS").unwrap_or(defaults.timeout),
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            connection_string: None,
            database: DEFAULT_MONGO_DATABASE.to_string(),
            collection: DEFAULT_MONGO_COLLECTION.to_string(),
        }
    }
}

impl MongoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        MongoConfig {
            connection_string: env_opt("MONGODB_CONN_STRING"),
            database: env_opt("MONGODB_DATABASE").unwrap_or(defaults.database),
            collection: env_opt("MONGODB_COLLECTION").unwrap_or(defaults.collection),
        }
    }

    pub fn with_connection_string(mut self, uri: impl Into<String>) -> Self {
        self.connection_string = Some(uri.into());
        self
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        PostgresConfig {
            host: None,
            port: None,
            username: None,
            password: None,
            database: None,
        }
    }
}

impl PostgresConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        PostgresConfig {
            host: env_opt("POSTGRES_HOST"),
            port: env_opt("POSTGRES_PORT").and_then(|s| s.parse().ok()),
            username: env_opt("POSTGRES_USERNAME"),
            password: env_opt("POSTGRES_PASSWORD"),
            database: env_opt("POSTGRES_DATABASE"),
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_connection_info(
        mut self,
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
    ) -> Self {
        self.host = Some(host.into());
        self.port = Some(port);
        self.database = Some(database.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            discord: DiscordConfig::default(),
            generation: GenerationConfig::default(),
            imgur: ImgurConfig::default(),
            backend: RecordBackend::Mongo,
            mongo: MongoConfig::default(),
            postgres: PostgresConfig::default(),
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown `RECORD_BACKEND` values fall back to MongoDB.
    pub fn from_env() -> Self {
        let backend = env_opt("RECORD_BACKEND")
            .and_then(|value| {
                let parsed = RecordBackend::parse(&value);
                if parsed.is_none() {
                    log::warn!("Unknown RECORD_BACKEND '{}', using mongo", value);
                }
                parsed
            })
            .unwrap_or(RecordBackend::Mongo);

        Config {
            discord: DiscordConfig::from_env(),
            generation: GenerationConfig::from_env(),
            imgur: ImgurConfig::from_env(),
            backend,
            mongo: MongoConfig::from_env(),
            postgres: PostgresConfig::from_env(),
            retry_backoff: env_opt("RETRY_BACKOFF_MS")
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or_else(|| Duration::from_millis(500)),
        }
    }

    pub fn with_discord(mut self, config: DiscordConfig) -> Self {
        self.discord = config;
        self
    }

    pub fn with_generation(mut self, config: GenerationConfig) -> Self {
        self.generation = config;
        self
    }

    pub fn with_imgur(mut self, config: ImgurConfig) -> Self {
        self.imgur = config;
        self
    }

    pub fn with_mongo(mut self, config: MongoConfig) -> Self {
        self.mongo = config;
        self.backend = RecordBackend::Mongo;
        self
    }

    pub fn with_postgres(mut self, config: PostgresConfig) -> Self {
        self.postgres = config;
        self.backend = RecordBackend::Postgres;
        self
    }

    pub fn with_memory_records(mut self) -> Self {
        self.backend = RecordBackend::Memory;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Reports every missing credential at once.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        if self.discord.token.is_none() {
            missing.push("DISCORD_TOKEN");
        }
        if self.generation.api_token.is_none() {
            missing.push("HUGGINGFACE_TOKEN");
        }
        if self.imgur.client_id.is_none() {
            missing.push("IMGUR_CLIENT_ID");
        }
        match self.backend {
            RecordBackend::Mongo if self.mongo.connection_string.is_none() => {
                missing.push("MONGODB_CONN_STRING");
            }
            RecordBackend::Postgres if self.postgres.host.is_none() => {
                missing.push("POSTGRES_HOST");
            }
            _ => {}
        }
        if self.discord.command_prefix.trim().is_empty() {
            missing.push("COMMAND_PREFIX");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RelayError::Configuration(format!(
                "missing required settings: {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Config {
        Config::new()
            .with_discord(DiscordConfig::new().with_token("discord"))
            .with_generation(GenerationConfig::new().with_token("hf"))
            .with_imgur(ImgurConfig::new().with_client_id("imgur"))
            .with_mongo(MongoConfig::new().with_connection_string("mongodb://localhost"))
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.discord.command_prefix, "!");
        assert_eq!(config.generation.model, DEFAULT_MODEL);
        assert_eq!(config.generation.guidance_scale, 9.0);
        assert_eq!(config.mongo.database, "image_generation_db");
        assert_eq!(config.mongo.collection, "generated_images");
        assert_eq!(config.backend, RecordBackend::Mongo);
    }

    #[test]
    fn test_validate_complete_config() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_all_missing() {
        let err = Config::new().validate().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
        let detail = err.detail();
        assert!(detail.contains("DISCORD_TOKEN"));
        assert!(detail.contains("HUGGINGFACE_TOKEN"));
        assert!(detail.contains("IMGUR_CLIENT_ID"));
        assert!(detail.contains("MONGODB_CONN_STRING"));
    }

    #[test]
    fn test_memory_backend_needs_no_connection_string() {
        let config = Config::new()
            .with_discord(DiscordConfig::new().with_token("discord"))
            .with_generation(GenerationConfig::new().with_token("hf"))
            .with_imgur(ImgurConfig::new().with_client_id("imgur"))
            .with_memory_records();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_record_backend_parse() {
        assert_eq!(RecordBackend::parse("MongoDB"), Some(RecordBackend::Mongo));
        assert_eq!(RecordBackend::parse("psql"), Some(RecordBackend::Postgres));
        assert_eq!(RecordBackend::parse(" memory "), Some(RecordBackend::Memory));
        assert_eq!(RecordBackend::parse("redis"), None);
    }
}
