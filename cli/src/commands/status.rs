//! Status command - report whether a usable tunnel is available.

use anyhow::Result;
use tunnelkeeper_core::{ConfigStore, SystemTunnelManager};

pub async fn run(json: bool) -> Result<()> {
    let config = ConfigStore::new()?.load().await?;
    let manager = SystemTunnelManager::system(config);

    let port = manager.port_if_running().await;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "available": port.is_some(),
                "port": port,
            })
        );
        return Ok(());
    }

    match port {
        Some(port) => println!("Control tunnel available on 127.0.0.1:{}", port),
        None => println!("No control tunnel available."),
    }

    Ok(())
}
