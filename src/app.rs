use color_eyre::Result;
use eyre::Context as _;
use queue_eta_config::Config;
use queue_eta_estimator::{
    EngineConfig,
    RateEtaEngine,
};
use queue_eta_gatherer::{
    render,
    HttpJobSource,
    JobSource as _,
    JsonLinesExporter,
    Poller,
    PollerConfig,
    ReportOptions,
};

pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config;

        let source = HttpJobSource::new(&config.base_url, config.api_key.clone(), config.timeout)
            .wrap_err("Failed to set up the jobs endpoint client")?;
        let engine = RateEtaEngine::new(EngineConfig {
            alpha: config.ema_alpha,
            remaining: config.remaining,
        })?;
        let mut exporter = config
            .output_file
            .as_ref()
            .map(|path| {
                JsonLinesExporter::create(path).wrap_err_with(|| format!("Failed to open {}", path.display()))
            })
            .transpose()?;

        print_banner(&config, &source.describe());
        info!(
            source = %source.describe(),
            config_dir = %config.config_dir().display(),
            "starting to poll"
        );

        let options = ReportOptions {
            top: config.top,
            focus: config.focus.clone(),
            show_critical_path: config.show_critical_path,
        };
        let mut poller = Poller::new(
            source,
            engine,
            PollerConfig {
                interval: config.interval,
                samples: config.samples,
            },
        );

        let summary = poller
            .run(|report| {
                println!("{}", render(report, &options));
                if let Some(exporter) = exporter.as_mut() {
                    if let Err(err) = exporter.append(report) {
                        warn!(%err, path = %exporter.path().display(), "failed to export sample");
                    }
                }
            })
            .await
            .wrap_err("Polling the jobs endpoint failed")?;

        let export_failures = exporter.as_ref().map_or(0, JsonLinesExporter::failures);
        if let Some(exporter) = exporter.as_ref().filter(|exporter| exporter.failures() > 0) {
            warn!(
                failed = exporter.failures(),
                samples = summary.ticks,
                path = %exporter.path().display(),
                "some samples were not exported"
            );
        }
        info!(
            samples = summary.ticks,
            interrupted = summary.interrupted,
            export_failures,
            "finished polling"
        );
        Ok(())
    }
}

fn print_banner(config: &Config, jobs_url: &str) {
    println!("Polling:  {jobs_url}");
    println!("Interval: {}", humantime::format_duration(config.interval));
    if config.is_unbounded() {
        println!("Samples:  forever");
    } else {
        println!("Samples:  {}", config.samples);
    }
    if let Some(remaining) = config.remaining {
        println!(
            "Remaining override (total ETA numerator): {}",
            queue_eta_gatherer::report::format_count(i64::try_from(remaining).unwrap_or(i64::MAX))
        );
    }
    println!("EMA α:    {}", config.ema_alpha);
    println!();
}
