use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

pub const DEFAULT_CRAWLER_AGENTS: &[&str] = &[
    "facebookexternalhit",
    "Facebot",
    "Twitterbot",
    "Slackbot",
    "WhatsApp",
    "LinkedInBot",
    "telegrambot",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub upload: UploadConfig,
    pub preview: PreviewConfig,
    pub collage: CollageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub environment: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_file_bytes: usize,
    pub key_prefix: String,
    pub key_from_filename: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    pub site_name: String,
    pub storefront_url: String,
    pub default_description: String,
    pub crawler_agents: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollageConfig {
    pub placeholder_image_url: String,
    pub fetch_timeout_secs: u64,
    pub jpeg_quality: u8,
}

impl CollageConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 4 * 1024 * 1024,
            key_prefix: "malim".to_string(),
            key_from_filename: true,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            site_name: "Malim".to_string(),
            storefront_url: "https://malim-shop.vercel.app/".to_string(),
            default_description:
                "Consulta los detalles de este increíble artículo de nuestra tienda.".to_string(),
            crawler_agents: DEFAULT_CRAWLER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            placeholder_image_url: "https://malim-shop.vercel.app/placeholder.jpg".to_string(),
            fetch_timeout_secs: 8,
            jpeg_quality: 85,
        }
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow!("{} must be set", name))
}

fn parsed<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        _ => Ok(default),
    }
}

fn list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let endpoint = match env::var("S3_ENDPOINT").ok().filter(|v| !v.trim().is_empty()) {
            Some(endpoint) => endpoint,
            None => format!(
                "https://{}.r2.cloudflarestorage.com",
                required("R2_ACCOUNT_ID")?
            ),
        };

        let preview_defaults = PreviewConfig::default();
        let collage_defaults = CollageConfig::default();
        let upload_defaults = UploadConfig::default();

        let jpeg_quality: u8 = parsed("COLLAGE_JPEG_QUALITY", collage_defaults.jpeg_quality)?;
        if !(1..=100).contains(&jpeg_quality) {
            return Err(anyhow!("COLLAGE_JPEG_QUALITY must be between 1 and 100"));
        }

        Ok(Self {
            server: ServerConfig {
                port: parsed("PORT", 4000)?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                cors_allowed_origins: list(
                    &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| {
                        "https://ecaballerocode.github.io,http://localhost:3000".to_string()
                    }),
                ),
            },
            storage: StorageConfig {
                bucket: required("R2_BUCKET")?,
                endpoint,
                region: env::var("S3_REGION").unwrap_or_else(|_| "auto".to_string()),
                access_key_id: required("R2_ACCESS_KEY")?,
                secret_access_key: required("R2_SECRET_KEY")?,
                public_base_url: required("R2_PUBLIC_URL")?
                    .trim_end_matches('/')
                    .to_string(),
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parsed("DB_MAX_CONNECTIONS", 5)?,
                min_connections: parsed("DB_MIN_CONNECTIONS", 0)?,
            },
            upload: UploadConfig {
                max_file_bytes: parsed("UPLOAD_MAX_FILE_BYTES", upload_defaults.max_file_bytes)?,
                key_prefix: env::var("UPLOAD_KEY_PREFIX").unwrap_or(upload_defaults.key_prefix),
                key_from_filename: parsed("KEY_FROM_FILENAME", upload_defaults.key_from_filename)?,
            },
            preview: PreviewConfig {
                site_name: env::var("SITE_NAME").unwrap_or(preview_defaults.site_name),
                storefront_url: env::var("STOREFRONT_URL")
                    .unwrap_or(preview_defaults.storefront_url),
                default_description: env::var("DEFAULT_DESCRIPTION")
                    .unwrap_or(preview_defaults.default_description),
                crawler_agents: env::var("CRAWLER_AGENTS")
                    .map(|raw| list(&raw))
                    .unwrap_or(preview_defaults.crawler_agents),
            },
            collage: CollageConfig {
                placeholder_image_url: env::var("PLACEHOLDER_IMAGE_URL")
                    .unwrap_or(collage_defaults.placeholder_image_url),
                fetch_timeout_secs: parsed(
                    "COLLAGE_FETCH_TIMEOUT_SECS",
                    collage_defaults.fetch_timeout_secs,
                )?,
                jpeg_quality,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_trims_and_skips_empty() {
        assert_eq!(
            list(" https://a.example , ,http://localhost:3000,"),
            vec!["https://a.example".to_string(), "http://localhost:3000".to_string()]
        );
    }

    #[test]
    fn test_parsed_default_and_error() {
        std::env::remove_var("MALIM_TEST_UNSET_NUMBER");
        assert_eq!(parsed::<u16>("MALIM_TEST_UNSET_NUMBER", 7).unwrap(), 7);

        std::env::set_var("MALIM_TEST_BAD_NUMBER", "seven");
        assert!(parsed::<u16>("MALIM_TEST_BAD_NUMBER", 7).is_err());
        std::env::remove_var("MALIM_TEST_BAD_NUMBER");
    }

    #[test]
    fn test_required_rejects_blank() {
        std::env::set_var("MALIM_TEST_BLANK", "   ");
        assert!(required("MALIM_TEST_BLANK").is_err());
        std::env::remove_var("MALIM_TEST_BLANK");
    }

    #[test]
    fn test_defaults() {
        let collage = CollageConfig::default();
        assert_eq!(collage.jpeg_quality, 85);
        assert_eq!(collage.fetch_timeout(), Duration::from_secs(8));

        let preview = PreviewConfig::default();
        assert_eq!(preview.crawler_agents.len(), DEFAULT_CRAWLER_AGENTS.len());
    }
}
