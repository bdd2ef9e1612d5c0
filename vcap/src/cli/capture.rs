use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use vcap_session::{CaptureSession, SessionConfig};
use vcap_source::Target;
use vcap_types::PixelFormat;

#[derive(Parser, Debug)]
pub struct CaptureCommand {
    /// Capture target: `all`, a device index, a `/dev/...` device path,
    /// or a container file
    #[arg(default_value = "all")]
    pub target: String,

    /// Output frame width in pixels
    #[arg(long, default_value = "640")]
    pub width: u32,

    /// Output frame height in pixels
    #[arg(long, default_value = "480")]
    pub height: u32,

    /// Requested capture frame rate
    #[arg(long, default_value = "30")]
    pub fps: u32,

    /// Output pixel format: rgb24, bgr24, rgba, bgra, gray8
    #[arg(long, default_value = "rgb24")]
    pub format: String,

    /// Stop after this many frames (default: until end of stream or signal)
    #[arg(short = 'n', long)]
    pub frames: Option<u64>,

    /// Append raw converted frames to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Default for CaptureCommand {
    fn default() -> Self {
        Self {
            target: "all".to_string(),
            width: 640,
            height: 480,
            fps: 30,
            format: "rgb24".to_string(),
            frames: None,
            output: None,
        }
    }
}

impl CaptureCommand {
    pub async fn run(self) -> Result<()> {
        let format = parse_format(&self.format)?;
        let config = SessionConfig::new(self.width, self.height)
            .with_fps(self.fps)
            .with_format(format);
        let target = Target::parse(&self.target);
        let frames = self.frames;
        let output = self.output;

        // The session is not Send, so it lives entirely inside the
        // blocking worker; only the shutdown flag crosses threads.
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut worker =
            tokio::task::spawn_blocking(move || capture_loop(target, config, frames, output, shutdown_rx));

        tokio::select! {
            result = &mut worker => return result?,
            _ = wait_for_signal() => {
                info!("shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
        }

        worker.await?
    }
}

fn capture_loop(
    target: Target,
    config: SessionConfig,
    frames: Option<u64>,
    output: Option<PathBuf>,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<()> {
    let mut session =
        CaptureSession::open(target, config).context("cannot open capture session")?;

    println!("Streams:");
    for stream in session.streams().iter() {
        println!("  #{} {:?} codec={:?}", stream.index, stream.kind, stream.codec_id);
    }
    println!(
        "Capturing {}x{} {:?} frames ({} bytes each)",
        config.width,
        config.height,
        config.format,
        session.output_len()
    );

    let mut sink = match output {
        Some(path) => {
            Some(File::create(&path).with_context(|| format!("cannot create {}", path.display()))?)
        }
        None => None,
    };

    let mut buf = Vec::with_capacity(session.output_len());
    let mut count: u64 = 0;

    while !*shutdown_rx.borrow() {
        match session.read_frame(&mut buf) {
            Ok(true) => {}
            Ok(false) => {
                info!(frames = count, "end of stream");
                break;
            }
            // A fatal fault leaves the session unusable; recovery would be
            // a fresh session, so tear this one down and surface the error.
            Err(e) => {
                error!(error = %e, frames = count, "capture failed");
                session.close();
                return Err(e.into());
            }
        }
        count += 1;
        info!(frame = count, bytes = buf.len(), "captured frame");

        if let Some(file) = &mut sink {
            file.write_all(&buf).context("cannot write frame")?;
        }
        if frames.is_some_and(|limit| count >= limit) {
            break;
        }
    }

    session.close();
    println!("Captured {count} frames.");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn wait_for_signal() -> Result<()> {
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

fn parse_format(name: &str) -> Result<PixelFormat> {
    match name.to_ascii_lowercase().as_str() {
        "rgb24" => Ok(PixelFormat::Rgb24),
        "bgr24" => Ok(PixelFormat::Bgr24),
        "rgba" => Ok(PixelFormat::Rgba),
        "bgra" => Ok(PixelFormat::Bgra),
        "gray8" => Ok(PixelFormat::Gray8),
        other => bail!("unknown output pixel format: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_formats_parse() {
        assert_eq!(parse_format("rgb24").unwrap(), PixelFormat::Rgb24);
        assert_eq!(parse_format("BGRA").unwrap(), PixelFormat::Bgra);
    }

    #[test]
    fn planar_format_is_rejected() {
        assert!(parse_format("yuv420p").is_err());
    }

    #[test]
    fn loop_drains_a_file_and_writes_every_frame() {
        let dir = std::env::temp_dir();
        let input = dir.join(format!("vcap-loop-{}.y4m", std::process::id()));
        let output = dir.join(format!("vcap-loop-{}.raw", std::process::id()));

        // Two uncompressed 64x48 frames, enough to exercise the whole loop.
        let (w, h) = (64usize, 48usize);
        let mut clip = b"YUV4MPEG2 W64 H48 F30:1 Ip A1:1 C420\n".to_vec();
        for _ in 0..2 {
            clip.extend_from_slice(b"FRAME\n");
            clip.extend(std::iter::repeat_n(128u8, w * h + 2 * (w / 2) * (h / 2)));
        }
        std::fs::write(&input, clip).unwrap();

        let config = SessionConfig::new(32, 24);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        capture_loop(
            Target::file(&input),
            config,
            None,
            Some(output.clone()),
            shutdown_rx,
        )
        .unwrap();

        let written = std::fs::metadata(&output).unwrap().len();
        assert_eq!(written, 2 * (32 * 24 * 3) as u64);

        let _ = std::fs::remove_file(&input);
        let _ = std::fs::remove_file(&output);
    }
}
