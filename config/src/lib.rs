#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod duration;

use app_config::AppConfig;
pub use app_config::get_config_dir;
pub use args::Args;
use color_eyre::Result;
use serde::Deserialize;
use std::{
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};
use url::Url;

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

/// Effective settings, layered from built-in defaults, the user's
/// `config.yaml` and command-line arguments (later wins).
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    app_config: AppConfig,
    pub base_url: Url,
    #[serde(default)]
    pub api_key: String,
    #[serde(deserialize_with = "duration::deserialize")]
    pub interval: Duration,
    /// 0 means unlimited.
    pub samples: u64,
    #[serde(default)]
    pub remaining: Option<u64>,
    pub top: usize,
    pub ema_alpha: f64,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub show_critical_path: bool,
    #[serde(deserialize_with = "duration::deserialize")]
    pub timeout: Duration,
    #[serde(default)]
    pub output_file: Option<PathBuf>,
    #[serde(default)]
    pub verbose: bool,
}

impl Config {
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        Self::from_dir(&get_config_dir(), args)
    }

    pub fn from_dir(config_dir: &Path, args: Args) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("config_dir", config_dir.display().to_string())?
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        let config_files = [("config.yaml", config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let path = config_dir.join(file);
            if path.exists() {
                debug!(path = %path.display(), "loading config file");
            }
            let source = config::File::from(path).format(*format).required(false);
            builder = builder.add_source(source);
        }

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;

        Ok(cfg)
    }

    pub fn config_dir(&self) -> &Path {
        &self.app_config.config_dir
    }

    /// The run is unbounded when `samples` is 0.
    pub fn is_unbounded(&self) -> bool {
        self.samples == 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(eyre::eyre!(
                "no API key configured: set IMMICH_API_KEY or pass --api-key (Immich UI: User Settings -> API Keys)"
            ));
        }
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(eyre::eyre!("base_url must be an http(s) URL, got {}", self.base_url));
        }
        if !self.ema_alpha.is_finite() || self.ema_alpha <= 0.0 || self.ema_alpha > 1.0 {
            return Err(eyre::eyre!("ema_alpha must be within (0, 1], got {}", self.ema_alpha));
        }
        if self.timeout.is_zero() {
            return Err(eyre::eyre!("timeout must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use temp_dir::TempDir;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("queue-eta").chain(argv.iter().copied()))
    }

    #[test]
    fn defaults_apply_without_file_or_args() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_dir(dir.path(), Args::default()).unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:2283/api");
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.samples, 10);
        assert_eq!(config.top, 8);
        assert_eq!(config.ema_alpha, 0.3);
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.remaining, None);
        assert!(!config.show_critical_path);
        assert_eq!(config.config_dir(), dir.path());
    }

    #[test]
    fn args_override_config_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.child("config.yaml"),
            "base_url: https://photos.example.com/api\ninterval: 2m\ntop: 3\nfocus: faces\n",
        )
        .unwrap();

        let config = Config::from_dir(
            dir.path(),
            args(&["--interval", "30", "--ema-alpha", "0.5", "--samples", "0", "--show-critical-path"]),
        )
        .unwrap();
        assert_eq!(config.base_url.as_str(), "https://photos.example.com/api");
        assert_eq!(config.interval, Duration::from_secs(30));
        assert_eq!(config.top, 3);
        assert_eq!(config.focus.as_deref(), Some("faces"));
        assert_eq!(config.ema_alpha, 0.5);
        assert!(config.is_unbounded());
        assert!(config.show_critical_path);
    }

    #[test]
    fn validation_requires_an_api_key() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::from_dir(dir.path(), Args::default()).unwrap();
        config.api_key = String::new();
        assert!(config.validate().is_err());
        config.api_key = "secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_alpha_and_scheme() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::from_dir(dir.path(), Args::default()).unwrap();
        config.api_key = "secret".to_string();

        config.ema_alpha = 0.0;
        assert!(config.validate().is_err());
        config.ema_alpha = 1.0;
        assert!(config.validate().is_ok());

        config.base_url = Url::parse("ftp://example.com/api").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn unparsable_interval_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::from_dir(dir.path(), args(&["--interval", "soon"]));
        assert!(result.is_err());
    }
}
