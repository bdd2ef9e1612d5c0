/*!
    The capture session.
*/

use tracing::{error, info};

use vcap_decode::{DecodePoll, VideoDecoder};
use vcap_source::{DeviceOptions, Target, Transport, probe, select};
use vcap_transform::{SourceParams, TargetSpec, VideoConverter};
use vcap_types::{Error, Result, StreamTable, VideoFrame};

use crate::config::SessionConfig;

/// Lifecycle of a session after construction. `Opening` and the ordered
/// teardown of a failed open have no run-time representation: the
/// constructor's error path drops every partially acquired resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Frames can be read.
    Ready,
    /// The transport is exhausted; every further read reports end of stream.
    Finished,
    /// A fatal decode or conversion fault occurred; reading again is misuse.
    Failed,
}

/**
    A video capture session.

    Owns the whole pipeline for one input: transport, decoder, converter
    and the reusable decoded frame. Dropping the session releases them in
    reverse acquisition order (converter, decoder, frame, transport),
    exactly once, from any state.

    The session is not reentrant; drive it from one thread.
*/
pub struct CaptureSession {
    // Field order is drop order: reverse of acquisition.
    converter: VideoConverter,
    decoder: VideoDecoder,
    /// Reusable decoded frame, overwritten on every decode cycle.
    frame: VideoFrame,
    streams: StreamTable,
    video_index: usize,
    audio_index: Option<usize>,
    transport: Transport,
    state: State,
}

impl CaptureSession {
    /**
        Open a capture session.

        Runs the full acquisition sequence: backend registration
        (process-wide, idempotent) → transport open → demux probe → stream
        selection → decoder init → converter init. The first failing step
        aborts the open and releases everything acquired before it.
    */
    pub fn open(target: Target, config: SessionConfig) -> Result<Self> {
        config.validate()?;

        let options = DeviceOptions {
            framerate: Some(config.fps),
            video_size: Some((config.width, config.height)),
            ..DeviceOptions::default()
        };
        let transport = Transport::open_with(target, &options)?;

        let streams = probe(&transport)?;

        let video_index = select::best_video(&streams)
            .ok_or_else(|| Error::selection("input has no usable video stream"))?;
        let audio_index = select::best_audio(&streams);
        info!(
            video_stream = video_index,
            audio_stream = ?audio_index,
            streams = streams.len(),
            "selected streams"
        );

        let time_base = transport
            .stream_time_base(video_index)
            .ok_or_else(|| Error::selection("selected stream has no time base"))?;
        let decoder = VideoDecoder::new(transport.codec_config(video_index)?, time_base)?;

        let (width, height) = decoder.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::probe("selected stream reports no picture geometry"));
        }
        let format = decoder
            .pixel_format()
            .ok_or_else(|| Error::probe("selected stream reports no pixel format"))?;
        let source = SourceParams {
            width,
            height,
            format,
        };
        let converter = VideoConverter::new(
            source,
            TargetSpec::new(config.width, config.height, config.format),
        )?;
        info!(
            source_width = source.width,
            source_height = source.height,
            source_format = ?source.format,
            target_width = config.width,
            target_height = config.height,
            target_format = ?config.format,
            "capture session ready"
        );

        Ok(Self {
            converter,
            decoder,
            frame: VideoFrame::empty(),
            streams,
            video_index,
            audio_index,
            transport,
            state: State::Ready,
        })
    }

    /**
        The stream table discovered by the probe.
    */
    pub fn streams(&self) -> &StreamTable {
        &self.streams
    }

    /**
        Index of the selected video stream.
    */
    pub fn video_stream_index(&self) -> usize {
        self.video_index
    }

    /**
        Index of the selected audio stream, if the input has audio.
    */
    pub fn audio_stream_index(&self) -> Option<usize> {
        self.audio_index
    }

    /**
        Size in bytes of one output frame.
    */
    pub fn output_len(&self) -> usize {
        self.converter.output_len()
    }

    /**
        Read the next converted frame into `out`.

        Loops internally: packets of other streams are discarded, packets
        the decoder rejects are logged and skipped, and "need more input"
        keeps the loop going. Returns `Ok(true)` with `out` holding exactly
        [`output_len`](Self::output_len) bytes, or `Ok(false)` at end of
        stream — idempotently on every later call as well. A fatal decode
        or conversion fault fails the session; reading after that is a
        precondition violation.
    */
    pub fn read_frame(&mut self, out: &mut Vec<u8>) -> Result<bool> {
        match self.state {
            State::Ready => {}
            State::Finished => return Ok(false),
            State::Failed => {
                return Err(Error::precondition(
                    "read_frame called on a failed session",
                ));
            }
        }

        loop {
            match self.decoder.poll(&mut self.frame) {
                Ok(DecodePoll::Frame) => {
                    return match self.converter.convert(&self.frame, out) {
                        Ok(()) => Ok(true),
                        Err(e) => {
                            self.state = State::Failed;
                            error!(error = %e, "frame conversion failed");
                            Err(e)
                        }
                    };
                }
                Ok(DecodePoll::EndOfStream) => {
                    self.state = State::Finished;
                    info!(stream = self.video_index, "end of stream");
                    return Ok(false);
                }
                Ok(DecodePoll::NeedsInput) => {
                    if let Err(e) = self.feed_decoder() {
                        self.state = State::Failed;
                        return Err(e);
                    }
                }
                Err(e) => {
                    self.state = State::Failed;
                    error!(error = %e, "fatal decode error");
                    return Err(e);
                }
            }
        }
    }

    /**
        Close the session, releasing all owned resources.

        Equivalent to dropping it; reading after close is a compile error
        because `close` consumes the session.
    */
    pub fn close(self) {}

    /// Feed packets until one of the selected stream is accepted or the
    /// transport ends. Rejected packets are logged and skipped.
    fn feed_decoder(&mut self) -> Result<()> {
        loop {
            match self.transport.read_packet()? {
                Some(packet) if packet.stream_index == self.video_index => {
                    match self.decoder.send(&packet) {
                        Ok(()) => return Ok(()),
                        Err(e) => {
                            error!(error = %e, "decoder rejected packet, skipping");
                            continue;
                        }
                    }
                }
                // Packets of other streams are not ours to decode.
                Some(_) => continue,
                None => {
                    self.decoder.send_eof();
                    return Ok(());
                }
            }
        }
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state)
            .field("video_index", &self.video_index)
            .field("audio_index", &self.audio_index)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcap_types::PixelFormat;

    /// A tiny uncompressed YUV4MPEG clip, good enough to decode for real.
    fn y4m_clip(frames: usize) -> Vec<u8> {
        let (w, h) = (64usize, 48usize);
        let mut data = b"YUV4MPEG2 W64 H48 F30:1 Ip A1:1 C420\n".to_vec();
        for _ in 0..frames {
            data.extend_from_slice(b"FRAME\n");
            data.extend(std::iter::repeat_n(128u8, w * h + 2 * (w / 2) * (h / 2)));
        }
        data
    }

    #[test]
    fn reads_every_frame_then_ends() {
        let config = SessionConfig::new(32, 24).with_format(PixelFormat::Rgb24);
        let mut session = CaptureSession::open(Target::bytes(y4m_clip(3)), config).unwrap();

        let mut out = Vec::new();
        let mut produced = 0;
        while session.read_frame(&mut out).unwrap() {
            assert_eq!(out.len(), session.output_len());
            produced += 1;
        }
        assert_eq!(produced, 3);
    }

    #[test]
    fn end_of_stream_is_terminal() {
        let mut session = CaptureSession::open(
            Target::bytes(y4m_clip(1)),
            SessionConfig::new(16, 16),
        )
        .unwrap();

        let mut out = Vec::new();
        assert!(session.read_frame(&mut out).unwrap());
        assert!(!session.read_frame(&mut out).unwrap());

        // Once the stream has ended it stays ended; no frame resurrects.
        for _ in 0..4 {
            assert!(!session.read_frame(&mut out).unwrap());
        }
    }

    #[test]
    fn invalid_config_fails_before_any_open() {
        // Geometry validation runs first, so even an unopenable target
        // must report the config error.
        let config = SessionConfig::new(0, 480);
        let err = CaptureSession::open(Target::file("/definitely/not/here.mp4"), config)
            .unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }

    #[test]
    fn nonexistent_file_fails_open() {
        let err = CaptureSession::open(
            Target::file("/definitely/not/here.mp4"),
            SessionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Open(_)));
    }

    #[test]
    fn garbage_input_fails_probe() {
        let err = CaptureSession::open(Target::bytes(vec![0xAA; 512]), SessionConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::Probe(_)));
    }
}
