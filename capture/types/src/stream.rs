/*!
    Stream and device description types.
*/

use std::time::Duration;

use crate::{PixelFormat, Rational, SampleFormat};

/**
    The kind of media carried by an elementary stream.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Video pictures.
    Video,
    /// Audio samples.
    Audio,
    /// Anything else (subtitles, data, attachments).
    Other,
}

/**
    Codec identity.

    This is a subset of codecs commonly encountered in capture containers;
    unknown codecs are carried as `None` on the stream descriptor.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    // Video
    H264,
    H265,
    Vp8,
    Vp9,
    Av1,
    Mpeg4,
    Mpeg2Video,
    Mjpeg,
    RawVideo,
    // Audio
    Aac,
    Opus,
    Mp3,
    Vorbis,
    Flac,
    Ac3,
    PcmS16Le,
}

/**
    Video-specific stream parameters.
*/
#[derive(Clone, Debug)]
pub struct VideoParams {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format, if recognized.
    pub pixel_format: Option<PixelFormat>,
    /// Frame rate, if known.
    pub frame_rate: Option<Rational>,
    /// Codec profile (codec-specific value), if known.
    pub profile: Option<i32>,
    /// Codec level (codec-specific value), if known.
    pub level: Option<i32>,
}

impl VideoParams {
    /**
        Pixel area of one frame, used by stream ranking.
    */
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/**
    Audio-specific stream parameters.
*/
#[derive(Clone, Debug)]
pub struct AudioParams {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels.
    pub channels: u16,
    /// Sample format, if recognized.
    pub sample_format: Option<SampleFormat>,
}

/**
    Descriptor for one elementary stream within a container.
*/
#[derive(Clone, Debug)]
pub struct StreamInfo {
    /// Stream index within the container.
    pub index: usize,
    /// Media kind.
    pub kind: MediaKind,
    /// Codec identity, if recognized.
    pub codec_id: Option<CodecId>,
    /// Video parameters (present iff `kind` is `Video`).
    pub video: Option<VideoParams>,
    /// Audio parameters (present iff `kind` is `Audio`).
    pub audio: Option<AudioParams>,
    /// Stream duration, if known.
    pub duration: Option<Duration>,
    /// Time base for timestamps.
    pub time_base: Rational,
    /// Bitrate in bits per second, if known.
    pub bitrate: Option<u64>,
}

/**
    The ordered set of elementary streams discovered by the demux probe.

    Built once per transport and read-only afterward.
*/
#[derive(Clone, Debug, Default)]
pub struct StreamTable {
    streams: Vec<StreamInfo>,
}

impl StreamTable {
    /**
        Build a table from probed stream descriptors.
    */
    pub fn new(streams: Vec<StreamInfo>) -> Self {
        Self { streams }
    }

    /**
        Number of streams in the table.
    */
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /**
        Returns true if the table holds no streams.
    */
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /**
        Look up a stream by its container index.
    */
    pub fn get(&self, index: usize) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.index == index)
    }

    /**
        Iterate over all stream descriptors.
    */
    pub fn iter(&self) -> impl Iterator<Item = &StreamInfo> {
        self.streams.iter()
    }
}

/**
    A capture device discovered during enumeration.

    Produced only while enumerating; not retained after a device is opened.
*/
#[derive(Clone, Debug)]
pub struct DeviceInfo {
    /// Device identity, e.g. `/dev/video0`.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_stream(index: usize, width: u32, height: u32) -> StreamInfo {
        StreamInfo {
            index,
            kind: MediaKind::Video,
            codec_id: Some(CodecId::H264),
            video: Some(VideoParams {
                width,
                height,
                pixel_format: Some(PixelFormat::Yuv420p),
                frame_rate: Some(Rational::new(30, 1)),
                profile: None,
                level: None,
            }),
            audio: None,
            duration: Some(Duration::from_secs(10)),
            time_base: Rational::new(1, 90000),
            bitrate: None,
        }
    }

    #[test]
    fn lookup_is_by_container_index() {
        let table = StreamTable::new(vec![video_stream(3, 1280, 720)]);
        assert_eq!(table.len(), 1);
        assert!(table.get(0).is_none());
        assert_eq!(table.get(3).unwrap().index, 3);
    }

    #[test]
    fn empty_table() {
        let table = StreamTable::default();
        assert!(table.is_empty());
        assert!(table.get(0).is_none());
    }

    #[test]
    fn video_params_area() {
        let stream = video_stream(0, 1920, 1080);
        assert_eq!(stream.video.unwrap().area(), 2_073_600);
    }
}
