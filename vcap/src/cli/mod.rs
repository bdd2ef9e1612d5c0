use anyhow::Result;
use clap::{Parser, Subcommand};

mod capture;
mod list_devices;
mod probe;

pub use capture::CaptureCommand;
pub use list_devices::ListDevicesCommand;
pub use probe::ProbeCommand;

#[derive(Parser, Debug)]
#[command(name = "vcap")]
#[command(about = "Video capture pipeline: devices, files and in-memory inputs")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Capture converted frames from a device or file (default)
    Capture(CaptureCommand),
    /// Probe a container through the in-memory IO path and print its streams
    Probe(ProbeCommand),
    /// List available capture devices and exit
    ListDevices(ListDevicesCommand),
}

impl Args {
    pub async fn run(self) -> Result<()> {
        let command = self
            .command
            .unwrap_or(Command::Capture(CaptureCommand::default()));

        match command {
            Command::Capture(cmd) => cmd.run().await,
            Command::Probe(cmd) => cmd.run().await,
            Command::ListDevices(cmd) => cmd.run().await,
        }
    }
}
