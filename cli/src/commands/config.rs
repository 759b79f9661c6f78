//! Config command - show the resolved configuration.

use anyhow::Result;
use tunnelkeeper_core::{ConfigStore, Mode};

pub async fn run(json: bool) -> Result<()> {
    let store = ConfigStore::new()?;
    let config = store.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let mode = match config.mode {
        Mode::Local => "local",
        Mode::Remote => "remote",
    };

    println!(
        "Config file:  {}",
        store.config_dir().join("config.json").display()
    );
    println!("Mode:         {}", mode);
    println!("Gateway host: {}", config.gateway_host);
    println!("Gateway port: {}", config.gateway_port);
    println!("Local port:   {}", config.desired_local_port());
    if let Some(identity) = &config.identity_file {
        println!("Identity:     {}", identity.display());
    }

    Ok(())
}
