use clap::Parser;
use std::path::PathBuf;

/// Polls the Immich jobs endpoint and estimates queue drain rate and ETA.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Base URL of the Immich API, ending in `/api`.
    #[clap(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// API key sent as `x-api-key` (Immich UI: User Settings -> API Keys).
    #[clap(long, env = "IMMICH_API_KEY", hide_env_values = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Time between samples, e.g. `60`, `90s` or `5m`.
    #[clap(long, value_name = "DURATION")]
    pub interval: Option<String>,

    /// Number of samples to take, 0 runs until interrupted.
    #[clap(long, value_name = "N")]
    pub samples: Option<u64>,

    /// Remaining item count to use as the total ETA numerator instead of the
    /// total pending count.
    #[clap(long, value_name = "N")]
    pub remaining: Option<u64>,

    /// Number of queues listed per sample, ordered by pending.
    #[clap(long, value_name = "N")]
    pub top: Option<usize>,

    /// EMA smoothing factor for rates (0.1 is very smooth, 0.5 snappier).
    #[clap(long, value_name = "ALPHA")]
    pub ema_alpha: Option<f64>,

    /// Queue to pin to the top of the listing, e.g. `metadataExtraction`.
    #[clap(long, value_name = "QUEUE")]
    pub focus: Option<String>,

    /// Also show the ETA of the slowest non-empty queue.
    #[clap(long = "show-critical-path", action)]
    pub show_critical_path: bool,

    /// Timeout of a single request to the jobs endpoint.
    #[clap(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Append every sample as a JSON line to this file.
    #[clap(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Enables debug logging.
    #[clap(short, long, action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(base_url) = &self.base_url {
                cache.insert("base_url".to_string(), base_url.clone().into());
            }
            if let Some(api_key) = &self.api_key {
                cache.insert("api_key".to_string(), api_key.clone().into());
            }
            if let Some(interval) = &self.interval {
                cache.insert("interval".to_string(), interval.clone().into());
            }
            if let Some(samples) = self.samples {
                cache.insert("samples".to_string(), samples.into());
            }
            if let Some(remaining) = self.remaining {
                cache.insert("remaining".to_string(), remaining.into());
            }
            if let Some(top) = self.top {
                cache.insert("top".to_string(), (top as u64).into());
            }
            if let Some(ema_alpha) = self.ema_alpha {
                cache.insert("ema_alpha".to_string(), ema_alpha.into());
            }
            if let Some(focus) = &self.focus {
                cache.insert("focus".to_string(), focus.clone().into());
            }
            if self.show_critical_path {
                cache.insert("show_critical_path".to_string(), true.into());
            }
            if let Some(timeout) = &self.timeout {
                cache.insert("timeout".to_string(), timeout.clone().into());
            }
            if let Some(output_file) = &self.output_file {
                cache.insert("output_file".to_string(), output_file.display().to_string().into());
            }
            if self.verbose {
                cache.insert("verbose".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!(
        "{}

Authors: {author}

Config directory: {config_dir_path}",
        clap::crate_version!()
    )
}
