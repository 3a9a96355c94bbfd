//! Server configuration from the environment.

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use scrawl_room::{RoomConfig, WordBank};
use tracing::info;

use crate::ScrawlError;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// CSV word list (`category,word,difficulty`). The built-in list is
    /// used when unset.
    pub words_file: Option<PathBuf>,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            words_file: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            room: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `WORDS_FILE` and `LOG_LEVEL`, loading a
    /// `.env` file first when one exists.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds a config from any variable source. Unparseable values fall
    /// back to their defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: var("HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: var("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            words_file: var("WORDS_FILE")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            log_level: var("LOG_LEVEL")
                .filter(|l| !l.trim().is_empty())
                .unwrap_or(defaults.log_level),
            room: defaults.room,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Loads the word bank named by `words_file`, or the built-in one.
    pub fn load_words(&self) -> Result<WordBank, ScrawlError> {
        let Some(path) = &self.words_file else {
            return Ok(WordBank::builtin());
        };
        let bank = WordBank::from_csv(BufReader::new(File::open(path)?))?;
        if bank.is_empty() {
            return Err(ScrawlError::Config(format!(
                "word list {} has no usable words",
                path.display()
            )));
        }
        info!(path = %path.display(), words = bank.len(), "word list loaded");
        Ok(bank)
    }
}
