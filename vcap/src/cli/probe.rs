use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use vcap_source::{Target, Transport, probe};
use vcap_types::{MediaKind, StreamInfo};

#[derive(Parser, Debug)]
pub struct ProbeCommand {
    /// Container file to probe
    pub file: PathBuf,
}

impl ProbeCommand {
    /// Reads the whole file up front and demuxes it through the in-memory
    /// read callback, exercising the same path a network or archive feed
    /// would use.
    pub async fn run(self) -> Result<()> {
        let path = self.file;
        tokio::task::spawn_blocking(move || probe_bytes(path)).await?
    }
}

fn probe_bytes(path: PathBuf) -> Result<()> {
    let data =
        std::fs::read(&path).with_context(|| format!("cannot read {}", path.display()))?;
    println!("Probing {} ({} bytes in memory)", path.display(), data.len());

    let transport = Transport::open(Target::bytes(data)).context("cannot open input")?;
    let streams = probe(&transport).context("cannot probe input")?;

    println!("{} stream(s):", streams.len());
    for stream in streams.iter() {
        print_stream(stream);
    }
    Ok(())
}

fn print_stream(stream: &StreamInfo) {
    let codec = stream
        .codec_id
        .map_or_else(|| "unknown".to_string(), |c| format!("{c:?}"));

    match stream.kind {
        MediaKind::Video => {
            let detail = stream.video.as_ref().map_or(String::new(), |v| {
                let fps = v
                    .frame_rate
                    .map_or(String::new(), |r| format!(" @ {:.2} fps", r.to_f64()));
                format!(" {}x{}{fps}", v.width, v.height)
            });
            println!("  #{} video {codec}{detail}", stream.index);
        }
        MediaKind::Audio => {
            let detail = stream.audio.as_ref().map_or(String::new(), |a| {
                format!(" {} Hz, {} ch", a.sample_rate, a.channels)
            });
            println!("  #{} audio {codec}{detail}", stream.index);
        }
        MediaKind::Other => println!("  #{} other {codec}", stream.index),
    }

    if let Some(bitrate) = stream.bitrate {
        println!("      bitrate: {} b/s", bitrate);
    }
    if let Some(duration) = stream.duration {
        println!("      duration: {:.2}s", duration.as_secs_f64());
    }
}
