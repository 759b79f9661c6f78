//! Run command - ensure the control tunnel and hold it open.

use anyhow::Result;
use tunnelkeeper_core::{ConfigStore, SystemTunnelManager};

pub async fn run() -> Result<()> {
    let config = ConfigStore::new()?.load().await?;
    let manager = SystemTunnelManager::system(config);

    let port = manager.ensure_control_tunnel().await?;
    println!("Control tunnel ready on 127.0.0.1:{}", port);
    println!("Press Ctrl-C to stop.");

    tokio::signal::ctrl_c().await?;
    manager.stop_all().await;

    Ok(())
}
