use anyhow::{Context, Result, bail};
use rand::RngCore;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
pub const TOKEN_ISSUER: &str = "campus-platform";
pub const TOKEN_AUDIENCE: &str = "campus-api";

// Platform configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub storage: StorageBackend,
    pub postgres: Option<PostgresConfig>,
    pub auth: AuthConfig,
    pub curriculum: CurriculumConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => bail!("unknown storage backend {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_ms: u64,
    pub acquire_timeout_ms: u64,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// True when no secret was configured and one was generated for this
    /// process; tokens will not survive a restart.
    pub secret_generated: bool,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub issuer: String,
    pub audience: String,
    pub leeway_secs: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("secret_generated", &self.secret_generated)
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CurriculumConfig {
    /// Reject progress updates for topics outside the built-in curriculum.
    pub strict_topics: bool,
}

#[derive(Debug, Deserialize)]
struct PlatformConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    storage: Option<String>,
    postgres_url: Option<String>,
    postgres_max_connections: Option<u32>,
    jwt_secret: Option<String>,
    token_ttl_secs: Option<u64>,
    bcrypt_cost: Option<u32>,
    strict_topics: Option<bool>,
}

impl PlatformConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let bind_addr = var("CAMPUS_BIND", "0.0.0.0:5000")
            .parse()
            .with_context(|| "parse CAMPUS_BIND")?;
        let metrics_bind = var("CAMPUS_METRICS_BIND", "0.0.0.0:9090")
            .parse()
            .with_context(|| "parse CAMPUS_METRICS_BIND")?;
        let storage = var("CAMPUS_STORAGE_BACKEND", "memory")
            .parse()
            .with_context(|| "parse CAMPUS_STORAGE_BACKEND")?;

        let postgres = match lookup("CAMPUS_POSTGRES_URL").or_else(|| lookup("DATABASE_URL")) {
            Some(url) => Some(PostgresConfig {
                url,
                max_connections: var("CAMPUS_POSTGRES_MAX_CONNECTIONS", "10")
                    .parse()
                    .with_context(|| "parse CAMPUS_POSTGRES_MAX_CONNECTIONS")?,
                connect_timeout_ms: var("CAMPUS_POSTGRES_CONNECT_TIMEOUT_MS", "5000")
                    .parse()
                    .with_context(|| "parse CAMPUS_POSTGRES_CONNECT_TIMEOUT_MS")?,
                acquire_timeout_ms: var("CAMPUS_POSTGRES_ACQUIRE_TIMEOUT_MS", "5000")
                    .parse()
                    .with_context(|| "parse CAMPUS_POSTGRES_ACQUIRE_TIMEOUT_MS")?,
            }),
            None => None,
        };

        let configured_secret = lookup("CAMPUS_JWT_SECRET")
            .or_else(|| lookup("JWT_SECRET"))
            .filter(|secret| !secret.is_empty());
        let secret_generated = configured_secret.is_none();
        let jwt_secret = configured_secret.unwrap_or_else(generate_secret);

        let auth = AuthConfig {
            jwt_secret,
            secret_generated,
            token_ttl: Duration::from_secs(
                var("CAMPUS_TOKEN_TTL_SECS", &DEFAULT_TOKEN_TTL_SECS.to_string())
                    .parse()
                    .with_context(|| "parse CAMPUS_TOKEN_TTL_SECS")?,
            ),
            bcrypt_cost: var(
                "CAMPUS_BCRYPT_COST",
                &campus_authz::DEFAULT_BCRYPT_COST.to_string(),
            )
            .parse()
            .with_context(|| "parse CAMPUS_BCRYPT_COST")?,
            issuer: TOKEN_ISSUER.to_string(),
            audience: TOKEN_AUDIENCE.to_string(),
            leeway_secs: 30,
        };

        let curriculum = CurriculumConfig {
            strict_topics: parse_bool(&var("CAMPUS_STRICT_TOPICS", "false"))
                .with_context(|| "parse CAMPUS_STRICT_TOPICS")?,
        };

        Ok(Self {
            bind_addr,
            metrics_bind,
            storage,
            postgres,
            auth,
            curriculum,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("CAMPUS_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read CAMPUS_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: PlatformConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse platform config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.storage {
            self.storage = value.parse().with_context(|| "parse storage")?;
        }
        if let Some(url) = override_cfg.postgres_url {
            let pg = self.postgres.get_or_insert_with(|| PostgresConfig {
                url: String::new(),
                max_connections: 10,
                connect_timeout_ms: 5000,
                acquire_timeout_ms: 5000,
            });
            pg.url = url;
        }
        if let Some(value) = override_cfg.postgres_max_connections
            && let Some(pg) = self.postgres.as_mut()
        {
            pg.max_connections = value;
        }
        if let Some(secret) = override_cfg.jwt_secret.filter(|secret| !secret.is_empty()) {
            self.auth.jwt_secret = secret;
            self.auth.secret_generated = false;
        }
        if let Some(value) = override_cfg.token_ttl_secs {
            self.auth.token_ttl = Duration::from_secs(value);
        }
        if let Some(value) = override_cfg.bcrypt_cost {
            self.auth.bcrypt_cost = value;
        }
        if let Some(value) = override_cfg.strict_topics {
            self.curriculum.strict_topics = value;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("invalid boolean {other}"),
    }
}

fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
