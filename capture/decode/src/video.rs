/*!
    Video decoder implementation.
*/

use ffmpeg_next::{
    codec::{self, decoder::Video as VideoDecoderFFmpeg},
    ffi,
    packet::Mut as PacketMut,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use vcap_source::CodecConfig;
use vcap_types::{Error, Packet, PixelFormat, Pts, Rational, Result, VideoFrame};

/**
    Outcome of polling the decoder for a frame.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodePoll {
    /// A decoded frame was written into the caller's buffer.
    Frame,
    /// The decoder has nothing buffered; feed it another packet.
    NeedsInput,
    /// The decoder is fully drained after end of input.
    EndOfStream,
}

/**
    Video decoder bound to one stream's codec parameters.

    Drive it poll-first: call [`poll`](Self::poll) until it reports
    `NeedsInput`, then [`send`](Self::send) the next packet of the selected
    stream. At end of input, [`send_eof`](Self::send_eof) switches the
    decoder into draining; once drained, `poll` reports `EndOfStream`
    forever.
*/
pub struct VideoDecoder {
    decoder: VideoDecoderFFmpeg,
    time_base: Rational,
    /// Scratch frame the decoder writes into; reused across polls.
    scratch: VideoFrameFFmpeg,
}

impl VideoDecoder {
    /**
        Create a decoder from a stream's codec configuration and time base.
    */
    pub fn new(codec_config: CodecConfig, time_base: Rational) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::decode(e.to_string()))?;

        let parameters = codec_config.into_parameters();

        let decoder_ctx = codec::context::Context::from_parameters(parameters)
            .map_err(|e| Error::decode(format!("cannot create codec context: {e}")))?;

        let decoder = decoder_ctx
            .decoder()
            .video()
            .map_err(|e| Error::decode(format!("cannot open video decoder: {e}")))?;

        Ok(Self {
            decoder,
            time_base,
            scratch: VideoFrameFFmpeg::empty(),
        })
    }

    /**
        Picture geometry negotiated from the codec parameters.
    */
    pub fn dimensions(&self) -> (u32, u32) {
        (self.decoder.width(), self.decoder.height())
    }

    /**
        Negotiated source pixel format, if this pipeline supports it.
    */
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        pixel_format_from_ffmpeg(self.decoder.format())
    }

    /**
        Time base of the decoded stream.
    */
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /**
        Submit one compressed packet.

        A failure here is a property of the packet, not of the decoder: the
        caller logs it, skips the packet, and keeps looping.
    */
    pub fn send(&mut self, packet: &Packet) -> Result<()> {
        let mut ffmpeg_pkt = if packet.data.is_empty() {
            ffmpeg_next::Packet::empty()
        } else {
            ffmpeg_next::Packet::copy(&packet.data)
        };

        // Timing fields are not settable through the safe wrapper.
        unsafe {
            let pkt = ffmpeg_pkt.as_mut_ptr();
            if let Some(Pts(pts)) = packet.pts {
                (*pkt).pts = pts;
            }
            if let Some(Pts(dts)) = packet.dts {
                (*pkt).dts = dts;
            }
            (*pkt).duration = packet.duration.0;
        }

        self.decoder
            .send_packet(&ffmpeg_pkt)
            .map_err(|e| Error::decode(format!("packet rejected: {e}")))
    }

    /**
        Tell the decoder no more packets are coming, so it can drain its
        buffered frames.
    */
    pub fn send_eof(&mut self) {
        // EAGAIN/EOF here just mean buffered frames are still pending or
        // the drain already started; both resolve through poll.
        let _ = self.decoder.send_eof();
    }

    /**
        Try to retrieve one decoded frame into `frame`.

        `frame` is a reusable buffer: its contents are fully overwritten on
        `Frame` and untouched otherwise. Rows are copied stride-stripped so
        the output is tightly packed regardless of the decoder's padding.
    */
    pub fn poll(&mut self, frame: &mut VideoFrame) -> Result<DecodePoll> {
        match self.decoder.receive_frame(&mut self.scratch) {
            Ok(()) => {
                copy_frame(&self.scratch, self.time_base, frame)?;
                Ok(DecodePoll::Frame)
            }
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                Ok(DecodePoll::NeedsInput)
            }
            Err(ffmpeg_next::Error::Eof) => Ok(DecodePoll::EndOfStream),
            Err(e) => Err(Error::decode(format!("cannot receive frame: {e}"))),
        }
    }
}

/**
    Copy a decoded FFmpeg frame into the reusable output frame,
    stride-stripped.
*/
fn copy_frame(src: &VideoFrameFFmpeg, time_base: Rational, out: &mut VideoFrame) -> Result<()> {
    let width = src.width();
    let height = src.height();
    if width == 0 || height == 0 {
        return Err(Error::decode("decoded frame has zero dimensions"));
    }

    let ffmpeg_format = src.format();
    let format = pixel_format_from_ffmpeg(ffmpeg_format).ok_or_else(|| {
        Error::decode(format!("unsupported decoder pixel format: {ffmpeg_format:?}"))
    })?;

    out.data.clear();
    copy_planes(src, format, &mut out.data)?;

    out.width = width;
    out.height = height;
    out.format = format;
    out.pts = src.pts().map(Pts);
    out.time_base = time_base;
    Ok(())
}

fn copy_planes(frame: &VideoFrameFFmpeg, format: PixelFormat, out: &mut Vec<u8>) -> Result<()> {
    let width = frame.width() as usize;
    let height = frame.height() as usize;

    match format {
        // Packed formats: single interleaved plane.
        PixelFormat::Rgb24 | PixelFormat::Bgr24 | PixelFormat::Rgba | PixelFormat::Bgra
        | PixelFormat::Gray8 => {
            let row_bytes = width * format.bytes_per_pixel().unwrap_or(1);
            copy_plane(frame, 0, row_bytes, height, out);
        }

        // Planar YUV: three planes, chroma subsampled per format.
        PixelFormat::Yuv420p | PixelFormat::Yuv422p | PixelFormat::Yuv444p => {
            let (uv_width, uv_height) = match format {
                PixelFormat::Yuv420p => (width.div_ceil(2), height.div_ceil(2)),
                PixelFormat::Yuv422p => (width.div_ceil(2), height),
                _ => (width, height),
            };
            copy_plane(frame, 0, width, height, out);
            copy_plane(frame, 1, uv_width, uv_height, out);
            copy_plane(frame, 2, uv_width, uv_height, out);
        }

        // Semi-planar: luma plane plus interleaved chroma plane.
        PixelFormat::Nv12 => {
            copy_plane(frame, 0, width, height, out);
            copy_plane(frame, 1, width, height.div_ceil(2), out);
        }

        _ => {
            return Err(Error::decode(format!(
                "pixel format {format:?} not supported for frame copy"
            )));
        }
    }

    Ok(())
}

fn copy_plane(
    frame: &VideoFrameFFmpeg,
    plane: usize,
    row_bytes: usize,
    rows: usize,
    out: &mut Vec<u8>,
) {
    let stride = frame.stride(plane);
    let data = frame.data(plane);
    out.reserve(row_bytes * rows);
    for row in 0..rows {
        let start = row * stride;
        out.extend_from_slice(&data[start..start + row_bytes]);
    }
}

/**
    Convert FFmpeg pixel format to our PixelFormat.
*/
fn pixel_format_from_ffmpeg(format: ffmpeg_next::format::Pixel) -> Option<PixelFormat> {
    use ffmpeg_next::format::Pixel;

    match format {
        Pixel::YUV420P | Pixel::YUVJ420P => Some(PixelFormat::Yuv420p),
        Pixel::NV12 => Some(PixelFormat::Nv12),
        Pixel::YUV422P | Pixel::YUVJ422P => Some(PixelFormat::Yuv422p),
        Pixel::YUV444P | Pixel::YUVJ444P => Some(PixelFormat::Yuv444p),
        Pixel::RGB24 => Some(PixelFormat::Rgb24),
        Pixel::BGR24 => Some(PixelFormat::Bgr24),
        Pixel::RGBA => Some(PixelFormat::Rgba),
        Pixel::BGRA => Some(PixelFormat::Bgra),
        Pixel::GRAY8 => Some(PixelFormat::Gray8),
        _ => None,
    }
}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("time_base", &self.time_base)
            .field("dimensions", &self.dimensions())
            .finish_non_exhaustive()
    }
}
