use clap::Parser;
use color_eyre::Result;
use queue_eta::{
    init_errors,
    init_logging,
    App,
    Args,
    Config,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_errors()?;
    let config = Config::new(Args::parse())?;
    init_logging(config.verbose)?;
    config.validate()?;
    App::new(config)?.run().await
}
