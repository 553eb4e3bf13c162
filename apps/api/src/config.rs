use anyhow::{bail, Context, Result};

/// Deployment environment. Production turns on HSTS and stricter startup warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" | "local" | "test" => Ok(AppEnv::Development),
            "prod" | "production" => Ok(AppEnv::Production),
            other => bail!("APP_ENV must be 'development' or 'production', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every key has a default; malformed values abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub app_env: AppEnv,
    pub ollama_url: String,
    /// Model used for career insights.
    pub ollama_model: String,
    /// Model standing in for the sequence-to-sequence CV rewriter.
    pub rewrite_model: String,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub body_max_bytes: usize,
    pub cors_allow_origins: Vec<String>,
    pub cv_chunk_chars: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the process env.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ollama_model = var("OLLAMA_MODEL").unwrap_or_else(|| "llama3.2:3b".to_string());
        let cv_chunk_chars = parse_or(&var, "CV_CHUNK_CHARS", 1500usize)?;
        if cv_chunk_chars < 200 {
            bail!("CV_CHUNK_CHARS must be at least 200, got {cv_chunk_chars}");
        }

        Ok(Config {
            port: parse_or(&var, "PORT", 8080u16)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            app_env: match var("APP_ENV") {
                Some(raw) => AppEnv::parse(&raw)?,
                None => AppEnv::Development,
            },
            ollama_url: var("OLLAMA_URL")
                .unwrap_or_else(|| "http://127.0.0.1:11434".to_string())
                .trim_end_matches('/')
                .to_string(),
            rewrite_model: var("REWRITE_MODEL").unwrap_or_else(|| ollama_model.clone()),
            ollama_model,
            llm_timeout_secs: parse_or(&var, "LLM_TIMEOUT_SECS", 120u64)?,
            llm_max_retries: parse_or(&var, "LLM_MAX_RETRIES", 3u32)?.max(1),
            body_max_bytes: parse_or(&var, "BODY_MAX_BYTES", 5 * 1024 * 1024usize)?,
            cors_allow_origins: var("CORS_ALLOW_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or_else(|| vec!["*".to_string()]),
            cv_chunk_chars,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env == AppEnv::Production
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.ollama_url, "http://127.0.0.1:11434");
        assert_eq!(config.ollama_model, "llama3.2:3b");
        assert_eq!(config.rewrite_model, "llama3.2:3b");
        assert_eq!(config.llm_max_retries, 3);
        assert_eq!(config.body_max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.cors_allow_origins, vec!["*".to_string()]);
    }

    #[test]
    fn test_rewrite_model_falls_back_to_ollama_model() {
        let config = config_from(&[("OLLAMA_MODEL", "mistral:7b")]).unwrap();
        assert_eq!(config.rewrite_model, "mistral:7b");

        let config =
            config_from(&[("OLLAMA_MODEL", "mistral:7b"), ("REWRITE_MODEL", "flan-t5")]).unwrap();
        assert_eq!(config.rewrite_model, "flan-t5");
    }

    #[test]
    fn test_origins_are_split_and_trimmed() {
        let config = config_from(&[(
            "CORS_ALLOW_ORIGINS",
            "https://a.example/, https://b.example ,,",
        )])
        .unwrap();
        assert_eq!(
            config.cors_allow_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_production_env_is_recognized() {
        let config = config_from(&[("APP_ENV", "Production")]).unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_unknown_app_env_is_rejected() {
        assert!(config_from(&[("APP_ENV", "staging")]).is_err());
    }

    #[test]
    fn test_tiny_chunk_size_is_rejected() {
        assert!(config_from(&[("CV_CHUNK_CHARS", "10")]).is_err());
    }

    #[test]
    fn test_ollama_url_trailing_slash_is_stripped() {
        let config = config_from(&[("OLLAMA_URL", "http://gpu-box:11434/")]).unwrap();
        assert_eq!(config.ollama_url, "http://gpu-box:11434");
    }
}
