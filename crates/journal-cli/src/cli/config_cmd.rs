use std::path::Path;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::AppConfig;

pub fn execute(args: ConfigArgs, config_path: &Path) -> anyhow::Result<()> {
    match args.action {
        ConfigAction::Show => {
            let cfg = AppConfig::load_or_default(config_path)?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        ConfigAction::Set { key, value } => {
            let mut cfg = AppConfig::load_or_default(config_path)?;
            cfg.set(&key, &value)?;
            cfg.save(config_path)?;
            println!("Configuration updated.");
        }
        ConfigAction::Path => println!("{}", config_path.display()),
    }
    Ok(())
}
