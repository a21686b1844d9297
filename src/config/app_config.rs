use std::{env, path::PathBuf, str::FromStr};

use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Where uploaded product images live on disk and how they are addressed publicly.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub root: PathBuf,
    pub url_prefix: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PaginationConfig {
    pub products_per_page: u32,
    pub users_per_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            products_per_page: 10,
            users_per_page: 20,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::ConfigError(format!("Invalid {} value", name)))
}

fn positive(name: &str, value: u32) -> Result<u32> {
    if value == 0 {
        return Err(AppError::ConfigError(format!("{} must be greater than 0", name)));
    }
    Ok(value)
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = PaginationConfig::default();

        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", "3000")?,
                max_body_size: parse_var("MAX_BODY_SIZE", "10485760")?,
            },
            database: DatabaseConfig {
                url: env::var("DB_URL")?,
                max_connections: parse_var("DB_MAX_CONNECTIONS", "20")?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("FRONTEND_URL")?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")
                    .map_err(|_| AppError::ConfigError("JWT_SECRET not set".to_string()))?,
            },
            upload: UploadConfig {
                root: PathBuf::from(
                    env::var("UPLOAD_PATH").unwrap_or_else(|_| "./uploads".to_string()),
                ),
                url_prefix: env::var("STATIC_URL_PREFIX")
                    .unwrap_or_else(|_| "/static".to_string())
                    .trim_end_matches('/')
                    .to_string(),
            },
            pagination: PaginationConfig {
                products_per_page: positive(
                    "PRODUCTS_PER_PAGE",
                    parse_var(
                        "PRODUCTS_PER_PAGE",
                        &defaults.products_per_page.to_string(),
                    )?,
                )?,
                users_per_page: positive(
                    "USERS_PER_PAGE",
                    parse_var("USERS_PER_PAGE", &defaults.users_per_page.to_string())?,
                )?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
