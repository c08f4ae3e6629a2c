use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration with strongly-typed sections.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Core server configuration.
    pub server: ServerConfig,
    /// Database configuration (optional).
    pub database: Option<DatabaseConfig>,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub home_dir: String, // will be normalized to an absolute path
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database connection URL (e.g., "sqlite://userdir.db").
    pub url: String,
    /// Maximum number of connections in the pool (optional, defaults to 10).
    pub max_conns: Option<u32>,
}

/// Logging settings: console level plus an optional rotating file sink.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingSection {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: Option<String>, // "logs/userdir.log", relative to home_dir
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // Empty => resolved to $HOME/.userdir by normalize_home_dir_inplace.
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            console_level: "info".to_string(),
            file: Some("logs/userdir.log".to_string()),
            file_level: "debug".to_string(),
            max_size_mb: Some(100),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: Some(DatabaseConfig {
                url: "sqlite://userdir.db".to_string(),
                max_conns: Some(10),
            }),
            logging: Some(LoggingSection::default()),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    /// Also normalizes `server.home_dir` into an absolute path and creates the directory.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        // Start from a minimal base where optional sections are None, so they
        // remain None unless explicitly provided by YAML/ENV.
        let base = AppConfig {
            server: ServerConfig::default(),
            database: None,
            logging: None,
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path.as_ref()))
            // Example: USERDIR__SERVER__PORT=4000 maps to server.port
            .merge(Env::prefixed("USERDIR__").split("__"));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| "Failed to extract config from figment".to_string())?;

        normalize_home_dir_inplace(&mut config.server)
            .context("Failed to resolve server.home_dir")?;

        Ok(config)
    }

    /// Load configuration from file or create with default values.
    /// Also normalizes `server.home_dir` into an absolute path and creates the directory.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c = Self::default();
                normalize_home_dir_inplace(&mut c.server)
                    .context("Failed to resolve server.home_dir (defaults)")?;
                Ok(c)
            }
        }
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        let logging = self.logging.get_or_insert_with(LoggingSection::default);
        logging.console_level = match args.verbose {
            0 => logging.console_level.clone(), // keep
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        };
    }
}

/// Command line arguments structure.
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
}

const fn default_subdir() -> &'static str {
    ".userdir"
}

/// Normalize `server.home_dir` into an absolute, existing directory.
/// Empty => `$HOME/.userdir`; `~` prefixes are expanded; relative paths are
/// resolved against the current working directory.
fn normalize_home_dir_inplace(server: &mut ServerConfig) -> Result<()> {
    let raw = server.home_dir.trim();

    let mut resolved: PathBuf = if raw.is_empty() {
        home_base()?.join(default_subdir())
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home_base()?.join(rest)
    } else {
        PathBuf::from(raw)
    };

    if resolved.is_relative() {
        resolved = std::env::current_dir()
            .context("cannot determine current directory")?
            .join(resolved);
    }

    std::fs::create_dir_all(&resolved)
        .with_context(|| format!("cannot create home_dir {}", resolved.display()))?;

    server.home_dir = resolved.to_string_lossy().to_string();
    Ok(())
}

fn home_base() -> Result<PathBuf> {
    #[cfg(windows)]
    let var = "APPDATA";
    #[cfg(not(windows))]
    let var = "HOME";

    std::env::var_os(var)
        .map(PathBuf::from)
        .with_context(|| format!("{var} is not set"))
}
