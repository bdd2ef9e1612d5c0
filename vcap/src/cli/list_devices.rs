use anyhow::{Context, Result};
use clap::Parser;

use vcap_source::{list_devices, register_backend};

#[derive(Parser, Debug)]
pub struct ListDevicesCommand {
    /// Capture backend to enumerate
    #[arg(long, default_value = "v4l2")]
    pub backend: String,
}

impl ListDevicesCommand {
    pub async fn run(self) -> Result<()> {
        let backend = self.backend;
        let devices = tokio::task::spawn_blocking(move || {
            register_backend();
            list_devices(&backend)
        })
        .await?
        .context("cannot enumerate capture devices")?;

        if devices.is_empty() {
            println!("No capture devices found.");
            return Ok(());
        }

        println!("Available devices:");
        for device in devices {
            println!("  {} ({})", device.name, device.description);
        }
        Ok(())
    }
}
