use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// GeneratorDefaults lives in studybud_core so the engine and the config
// file share one definition.
use studybud_core::GeneratorDefaults;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub generators: GeneratorDefaults,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl ServerConfig {
    fn default_host() -> String {
        "127.0.0.1".to_string()
    }

    const fn default_port() -> u16 {
        8000
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeminiConfig {
    /// Empty means no generative backend; the service runs on fallbacks.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "GeminiConfig::default_model")]
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: Self::default_model(),
        }
    }
}

impl GeminiConfig {
    fn default_model() -> String {
        "gemini-1.5-flash".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DatabaseConfig {
    /// Override for the SQLite file location. Defaults to
    /// `~/studybud/conversations.db` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load `~/studybud/config.json`, falling back to built-in defaults
    /// when the file does not exist. `GEMINI_API_KEY` and `GEMINI_MODEL`
    /// environment variables override the provider section either way.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_dir()?.join("config.json");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                config.providers.gemini.api_key = key;
            }
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.trim().is_empty() {
                config.providers.gemini.model = model;
            }
        }

        Ok(config)
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?;
        Ok(home.join("studybud"))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// Database file location: the explicit override, or the default file
    /// under the config directory.
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        self.database.path.as_ref().map_or_else(
            || Ok(Self::config_dir()?.join("conversations.db")),
            |path| Ok(path.clone()),
        )
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "server": {
    "host": "127.0.0.1",
    "port": 8000
  },
  "providers": {
    "gemini": {
      "api_key": "your-gemini-api-key-here",
      "model": "gemini-1.5-flash"
    }
  },
  "generators": {
    "explain_level": "basic",
    "quiz_count": 3,
    "summary_sentences": 2
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Add your Gemini API key (or leave it empty for fallback mode)");
        println!("   2. Run 'studybud serve' to start the HTTP service");
        println!("   3. POST to /api/chat with a message like \"explain: photosynthesis\"");
        println!();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert!(config.providers.gemini.api_key.is_empty());
        assert_eq!(config.providers.gemini.model, "gemini-1.5-flash");
        assert!(config.database.path.is_none());
        assert_eq!(config.generators.quiz_count, 3);
    }

    #[test]
    fn partial_sections_fill_in() {
        let config: Config = serde_json::from_str(
            r#"{"server": {"port": 9000}, "generators": {"quiz_count": 5}}"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.generators.quiz_count, 5);
        assert_eq!(config.generators.summary_sentences, 2);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.providers.gemini.model, config.providers.gemini.model);
    }
}
