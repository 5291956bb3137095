use anyhow::Result;

use scrollfx_core::AppConfig;

pub fn run(write: bool) -> Result<()> {
    let config = AppConfig::default();

    if write {
        let path = AppConfig::config_path();
        if path.exists() {
            println!("Config already exists at {}; not overwriting.", path.display());
            return Ok(());
        }
        config.save()?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
