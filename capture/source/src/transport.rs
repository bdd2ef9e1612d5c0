/*!
    Transport open and packet reading.
*/

use std::ffi::CString;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::ptr;

use ffmpeg_next::ffi;
use ffmpeg_next::format::context::Input as InputContext;
use tracing::{error, info};

use vcap_types::{Error, Packet, Rational, Result};

use crate::codec_config::CodecConfig;
use crate::convert::{duration_from_ffmpeg, pts_from_ffmpeg, rational_from_ffmpeg};
use crate::device::{self, DeviceOptions};
use crate::io::{self, MemoryIo};

/**
    What to open a transport over.

    One open sequence serves every addressing mode; the variant only
    decides how the input context is obtained.
*/
pub enum Target {
    /// Enumerate all capture devices and use the first that opens.
    AllDevices,
    /// A single capture device, addressed by its device name or path.
    Device(String),
    /// A capture device addressed by its position in the enumeration order.
    DeviceIndex(usize),
    /// A container file on the filesystem.
    File(PathBuf),
    /// An in-memory byte source read through a callback.
    Memory(Box<dyn Read + Send>),
}

impl Target {
    /**
        Open every device of the capture backend.
    */
    pub fn all() -> Self {
        Self::AllDevices
    }

    /**
        Open one capture device by name.
    */
    pub fn device(name: impl Into<String>) -> Self {
        Self::Device(name.into())
    }

    /**
        Open the n-th enumerated capture device.
    */
    pub fn device_index(index: usize) -> Self {
        Self::DeviceIndex(index)
    }

    /**
        Open a container file.
    */
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /**
        Open an in-memory byte source.
    */
    pub fn memory(reader: impl Read + Send + 'static) -> Self {
        Self::Memory(Box::new(reader))
    }

    /**
        Open a byte buffer.
    */
    pub fn bytes(data: Vec<u8>) -> Self {
        Self::memory(Cursor::new(data))
    }

    /**
        Interpret a command-line target string.

        `all` enumerates the capture backend; a bare number addresses the
        n-th enumerated device; a path under `/dev/` addresses a device by
        name; anything else is a container file.
    */
    pub fn parse(spec: &str) -> Self {
        if spec == "all" {
            Self::AllDevices
        } else if let Ok(index) = spec.parse::<usize>() {
            Self::DeviceIndex(index)
        } else if spec.starts_with("/dev/") {
            Self::Device(spec.to_string())
        } else {
            Self::File(PathBuf::from(spec))
        }
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllDevices => f.write_str("AllDevices"),
            Self::Device(name) => f.debug_tuple("Device").field(name).finish(),
            Self::DeviceIndex(index) => f.debug_tuple("DeviceIndex").field(index).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Memory(_) => f.write_str("Memory(..)"),
        }
    }
}

/**
    An open byte source feeding the demuxer.

    Exclusive owner of the underlying FFmpeg input context and, for memory
    targets, of the AVIO context and the boxed reader behind it. Exactly one
    exists per session; dropping it releases the input before the IO state.
*/
pub struct Transport {
    input: InputContext,
    // Kept alive for memory targets; must drop after `input`.
    _io: Option<MemoryIo>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Transport { .. }")
    }
}

impl Transport {
    /**
        Open a transport with default device options.
    */
    pub fn open(target: Target) -> Result<Self> {
        Self::open_with(target, &DeviceOptions::default())
    }

    /**
        Open a transport.

        Device targets register the capture backend first (idempotent,
        process-wide) and apply `options`; file and memory targets ignore
        them. Every failure is an [`Error::Open`] or, if the container
        cannot be identified, an [`Error::Probe`].
    */
    pub fn open_with(target: Target, options: &DeviceOptions) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::open(e.to_string()))?;

        match target {
            Target::File(path) => {
                let input = open_file(&path)?;
                info!(path = %path.display(), "opened container file");
                Ok(Self { input, _io: None })
            }
            Target::Memory(reader) => {
                let (input, memory_io) = io::open_memory(reader)?;
                info!("opened in-memory input");
                Ok(Self {
                    input,
                    _io: Some(memory_io),
                })
            }
            Target::Device(name) => {
                let format = device::find_input_format(options.backend())?;
                info!(device = %name, "attempting to open capture device");
                let input = open_device(&name, format, options)?;
                info!(device = %name, "capture device opened");
                Ok(Self { input, _io: None })
            }
            Target::DeviceIndex(index) => {
                let backend = options.backend();
                let format = device::find_input_format(backend)?;
                let devices = device::list_devices(backend)?;
                let candidate = devices.get(index).ok_or_else(|| {
                    Error::open(format!(
                        "device index {index} out of range: {} {backend} device(s) found",
                        devices.len()
                    ))
                })?;
                info!(device = %candidate.name, index, "attempting to open capture device");
                let input = open_device(&candidate.name, format, options)?;
                info!(device = %candidate.name, "capture device opened");
                Ok(Self { input, _io: None })
            }
            Target::AllDevices => {
                let backend = options.backend();
                let format = device::find_input_format(backend)?;
                let devices = device::list_devices(backend)?;
                if devices.is_empty() {
                    return Err(Error::open(format!("no {backend} capture devices found")));
                }

                // First successful open wins; later devices are skipped.
                for candidate in &devices {
                    info!(device = %candidate.name, "attempting to open capture device");
                    match open_device(&candidate.name, format, options) {
                        Ok(input) => {
                            info!(device = %candidate.name, "capture device opened");
                            return Ok(Self { input, _io: None });
                        }
                        Err(e) => {
                            error!(device = %candidate.name, error = %e, "cannot open capture device");
                        }
                    }
                }

                Err(Error::open(format!(
                    "none of the {} enumerated {backend} devices could be opened",
                    devices.len()
                )))
            }
        }
    }

    pub(crate) fn input(&self) -> &InputContext {
        &self.input
    }

    /**
        Codec configuration of one stream, for decoder construction.
    */
    pub fn codec_config(&self, stream_index: usize) -> Result<CodecConfig> {
        let stream = self
            .input
            .streams()
            .find(|s| s.index() == stream_index)
            .ok_or_else(|| {
                Error::precondition(format!("stream index {stream_index} out of range"))
            })?;
        Ok(CodecConfig::new(stream.parameters()))
    }

    /**
        Time base of one stream.
    */
    pub fn stream_time_base(&self, stream_index: usize) -> Option<Rational> {
        self.input
            .streams()
            .find(|s| s.index() == stream_index)
            .map(|s| rational_from_ffmpeg(s.time_base()))
    }

    /**
        Read the next demuxed packet, from any stream.

        Returns `Ok(None)` at end of stream. Packets arrive in container
        order, interleaved between streams; filtering on `stream_index` is
        the caller's job.
    */
    pub fn read_packet(&mut self) -> Result<Option<Packet>> {
        let Some((stream, ffmpeg_packet)) = self.input.packets().next() else {
            return Ok(None);
        };

        let data = ffmpeg_packet.data().map(|d| d.to_vec()).unwrap_or_default();

        Ok(Some(Packet::new(
            data,
            stream.index(),
            pts_from_ffmpeg(ffmpeg_packet.pts()),
            pts_from_ffmpeg(ffmpeg_packet.dts()),
            duration_from_ffmpeg(ffmpeg_packet.duration()),
            rational_from_ffmpeg(stream.time_base()),
            ffmpeg_packet.is_key(),
        )))
    }
}

fn open_file(path: &Path) -> Result<InputContext> {
    ffmpeg_next::format::input(&path).map_err(|e| {
        if e.to_string().contains("No such file") {
            Error::open(format!("no such file: {}", path.display()))
        } else {
            Error::probe(format!("cannot open {}: {e}", path.display()))
        }
    })
}

fn open_device(
    name: &str,
    format: *const ffi::AVInputFormat,
    options: &DeviceOptions,
) -> Result<InputContext> {
    let c_name =
        CString::new(name).map_err(|_| Error::open(format!("invalid device name: {name:?}")))?;

    let mut dict = options.to_av_dict();
    let mut ctx: *mut ffi::AVFormatContext = ptr::null_mut();
    let ret = unsafe { ffi::avformat_open_input(&mut ctx, c_name.as_ptr(), format, &mut dict) };
    unsafe { ffi::av_dict_free(&mut dict) };
    if ret < 0 {
        return Err(Error::open(format!(
            "cannot open device {name}: {}",
            ffmpeg_next::Error::from(ret)
        )));
    }

    let ret = unsafe { ffi::avformat_find_stream_info(ctx, ptr::null_mut()) };
    if ret < 0 {
        unsafe { ffi::avformat_close_input(&mut ctx) };
        return Err(Error::probe(format!(
            "cannot find stream info in device {name}: {}",
            ffmpeg_next::Error::from(ret)
        )));
    }

    Ok(unsafe { InputContext::wrap(ctx) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_parse_symbolic_all() {
        assert!(matches!(Target::parse("all"), Target::AllDevices));
    }

    #[test]
    fn target_parse_device_path() {
        match Target::parse("/dev/video0") {
            Target::Device(name) => assert_eq!(name, "/dev/video0"),
            other => panic!("expected device target, got {other:?}"),
        }
    }

    #[test]
    fn target_parse_device_index() {
        assert!(matches!(Target::parse("0"), Target::DeviceIndex(0)));
        assert!(matches!(Target::parse("3"), Target::DeviceIndex(3)));
    }

    #[test]
    fn target_parse_file_path() {
        assert!(matches!(Target::parse("clip.mp4"), Target::File(_)));
    }

    #[test]
    fn nonexistent_file_is_open_error() {
        let err = Transport::open(Target::file("/definitely/not/here.mp4")).unwrap_err();
        assert!(matches!(err, Error::Open(_)));
    }

    #[test]
    fn empty_memory_source_is_probe_error() {
        // A reader that reports end-of-stream immediately must fail the
        // probe cleanly instead of hanging.
        let err = Transport::open(Target::bytes(Vec::new())).unwrap_err();
        assert!(matches!(err, Error::Probe(_)));
    }

    #[test]
    fn garbage_memory_source_is_probe_error() {
        let err = Transport::open(Target::bytes(vec![0x55; 256])).unwrap_err();
        assert!(matches!(err, Error::Probe(_)));
    }

    /// Yields at most one byte per read call, the shortest legal read.
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    #[test]
    fn short_reads_of_garbage_are_probe_error() {
        let err = Transport::open(Target::memory(Trickle(Cursor::new(vec![0x55; 256]))))
            .unwrap_err();
        assert!(matches!(err, Error::Probe(_)));
    }

    #[test]
    fn short_reads_of_valid_input_still_open() {
        // One uncompressed 64x48 frame behind a reader that never fills
        // the buffer; the demuxer must keep asking, not treat the short
        // read as end of data.
        let (w, h) = (64usize, 48usize);
        let mut clip = b"YUV4MPEG2 W64 H48 F30:1 Ip A1:1 C420\n".to_vec();
        clip.extend_from_slice(b"FRAME\n");
        clip.extend(std::iter::repeat_n(128u8, w * h + 2 * (w / 2) * (h / 2)));

        let transport = Transport::open(Target::memory(Trickle(Cursor::new(clip)))).unwrap();
        assert!(transport.input().streams().count() > 0);
    }

    #[test]
    fn failing_reader_does_not_crash() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
            }
        }

        assert!(Transport::open(Target::memory(Broken)).is_err());
    }
}
