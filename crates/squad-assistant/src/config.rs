use anyhow::Result;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub database_path: PathBuf,
    pub openai_base_url: String,
    pub openai_api_key: String,
    pub embed_model: String,
    pub gen_model: String,
    pub vector_url: String,
    pub vector_token: String,
    pub admin_token: String,
    pub assistant_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            warn!("Failed to load .env file: {}. Using system environment variables.", e);
        } else {
            info!("Loaded environment variables from .env file");
        }

        let openai_api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        if openai_api_key.is_empty() {
            warn!("OPENAI_API_KEY not set; moderation fails open and generation will error");
        }
        let vector_url = env::var("UPSTASH_VECTOR_REST_URL").unwrap_or_default();
        if vector_url.is_empty() {
            warn!("UPSTASH_VECTOR_REST_URL not set; retrieval will error and fall back");
        }
        let admin_token = env::var("ASSISTANT_ADMIN_TOKEN").unwrap_or_default();
        if admin_token.is_empty() {
            warn!("ASSISTANT_ADMIN_TOKEN not set; admin endpoints are disabled");
        }

        Ok(Self {
            api_host: env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            api_port: env::var("API_PORT").unwrap_or_else(|_| "8000".into()).parse()?,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/assistant.db".into())
                .into(),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".into()),
            openai_api_key,
            embed_model: env::var("OPENAI_EMBED_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".into()),
            gen_model: env::var("OPENAI_GEN_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            vector_url,
            vector_token: env::var("UPSTASH_VECTOR_REST_TOKEN").unwrap_or_default(),
            admin_token,
            assistant_enabled: env::var("ASSISTANT_ENABLED")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
        })
    }

    pub fn print_config(&self) {
        info!("Current Configuration:");
        info!("- API: {}:{}", self.api_host, self.api_port);
        info!("- Database: {}", self.database_path.display());
        info!("- OpenAI base URL: {}", self.openai_base_url);
        info!("- Embed model: {}", self.embed_model);
        info!("- Generation model: {}", self.gen_model);
        info!("- Vector index configured: {}", !self.vector_url.is_empty());
        info!("- Assistant enabled: {}", self.assistant_enabled);
    }

    pub fn api_addr(&self) -> SocketAddr {
        format!("{}:{}", self.api_host, self.api_port).parse().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        Config {
            api_host: "127.0.0.1".to_string(),
            api_port: 8000,
            database_path: PathBuf::from("/tmp/assistant.db"),
            openai_base_url: "https://api.openai.com".to_string(),
            openai_api_key: "test-key".to_string(),
            embed_model: "text-embedding-3-small".to_string(),
            gen_model: "gpt-4o-mini".to_string(),
            vector_url: "https://vector.example.com".to_string(),
            vector_token: "token".to_string(),
            admin_token: "admin".to_string(),
            assistant_enabled: true,
        }
    }

    // ===== API Address Tests =====

    #[test]
    fn test_api_addr_parsing() {
        let config = create_test_config();
        let addr = config.api_addr();

        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_api_addr_with_zero_address() {
        let mut config = create_test_config();
        config.api_host = "0.0.0.0".to_string();
        config.api_port = 5000;

        let addr = config.api_addr();
        assert_eq!(addr.port(), 5000);
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
    }

    #[test]
    fn test_config_clone() {
        let config1 = create_test_config();
        let config2 = config1.clone();

        assert_eq!(config1.api_host, config2.api_host);
        assert_eq!(config1.gen_model, config2.gen_model);
    }
}
