use vacancy_app::config::AppConfig;
use vacancy_app::{logging, runner};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load_from_env()?;
    logging::initialize(config.log_destination, &config.log_file);
    runner::run_once(&config)?;
    Ok(())
}
