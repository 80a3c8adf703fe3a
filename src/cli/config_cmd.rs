use anyhow::Result;

use crate::cli::output::OutputOptions;
use crate::core::config::AppConfig;

/// Write a default config file, refusing to clobber an existing one.
pub fn init(_opts: &OutputOptions) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        anyhow::bail!("Config already exists at {}", path.display());
    }
    let written = AppConfig::default().save()?;
    println!("Wrote {}", written.display());
    Ok(())
}

pub fn check(opts: &OutputOptions) -> Result<()> {
    let config = AppConfig::load()?;
    let issues = config.validate();
    if issues.is_empty() {
        println!("Config OK ({})", AppConfig::config_path().display());
        if opts.verbose {
            eprintln!("log dir: {}", config.log_dir().display());
        }
        return Ok(());
    }
    for issue in &issues {
        eprintln!("  {}", issue);
    }
    anyhow::bail!("{} config issue(s)", issues.len())
}
