/*!
    Video frame conversion.
*/

use ffmpeg_next::{
    software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags},
    util::frame::video::Video as VideoFrameFFmpeg,
};

use vcap_types::{Error, PixelFormat, Result, VideoFrame};

/**
    Scaling algorithm for video resizing.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScalingAlgorithm {
    /// Nearest neighbor - fastest, lowest quality.
    Nearest,
    /// Bilinear interpolation - fast, acceptable quality.
    #[default]
    Bilinear,
    /// Bicubic interpolation - moderate speed, good quality.
    Bicubic,
    /// Lanczos resampling - slowest, highest quality.
    Lanczos,
}

impl ScalingAlgorithm {
    fn to_ffmpeg_flags(self) -> ScalerFlags {
        match self {
            Self::Nearest => ScalerFlags::POINT,
            Self::Bilinear => ScalerFlags::BILINEAR,
            Self::Bicubic => ScalerFlags::BICUBIC,
            Self::Lanczos => ScalerFlags::LANCZOS,
        }
    }
}

/**
    Geometry and pixel format of the frames fed into the converter,
    as negotiated by the decoder.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceParams {
    /// Source width in pixels.
    pub width: u32,
    /// Source height in pixels.
    pub height: u32,
    /// Source pixel format.
    pub format: PixelFormat,
}

/**
    Target geometry and pixel layout requested by the caller.

    The format must be packed; planar targets have no per-pixel byte count
    and cannot fill a `width * height * bytes_per_pixel` buffer.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetSpec {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// Target pixel format (packed).
    pub format: PixelFormat,
    /// Scaling algorithm.
    pub algorithm: ScalingAlgorithm,
}

impl TargetSpec {
    /**
        Create a target spec with the default (bilinear) algorithm.
    */
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            algorithm: ScalingAlgorithm::default(),
        }
    }

    /**
        Set the scaling algorithm.
    */
    pub fn with_algorithm(mut self, algorithm: ScalingAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/**
    Video frame converter with endpoints fixed at construction.

    Converts decoded frames between formats, handling pixel format
    conversion (YUV to RGB etc.), scaling, and stride differences on both
    sides. The output is always a tightly packed row-major buffer of
    exactly `width * height * bytes_per_pixel` bytes.
*/
pub struct VideoConverter {
    scaler: ScalerContext,
    source: SourceParams,
    target: TargetSpec,
    /// Reusable FFmpeg-side frames for the scaler run.
    src_frame: VideoFrameFFmpeg,
    dst_frame: VideoFrameFFmpeg,
}

impl VideoConverter {
    /**
        Build a converter between fixed endpoints.

        Fails if either endpoint has zero geometry or the target format is
        not packed.
    */
    pub fn new(source: SourceParams, target: TargetSpec) -> Result<Self> {
        if source.width == 0 || source.height == 0 {
            return Err(Error::conversion("source geometry is zero"));
        }
        if target.width == 0 || target.height == 0 {
            return Err(Error::conversion("target geometry is zero"));
        }
        if !target.format.is_packed() {
            return Err(Error::conversion(format!(
                "target format {:?} is not packed",
                target.format
            )));
        }

        ffmpeg_next::init().map_err(|e| Error::conversion(e.to_string()))?;

        let src_pixel = pixel_format_to_ffmpeg(source.format)?;
        let dst_pixel = pixel_format_to_ffmpeg(target.format)?;

        let scaler = ScalerContext::get(
            src_pixel,
            source.width,
            source.height,
            dst_pixel,
            target.width,
            target.height,
            target.algorithm.to_ffmpeg_flags(),
        )
        .map_err(|e| Error::conversion(format!("cannot create scaler: {e}")))?;

        let src_frame = VideoFrameFFmpeg::new(src_pixel, source.width, source.height);
        let dst_frame = VideoFrameFFmpeg::new(dst_pixel, target.width, target.height);

        Ok(Self {
            scaler,
            source,
            target,
            src_frame,
            dst_frame,
        })
    }

    /**
        The source endpoint.
    */
    pub fn source(&self) -> SourceParams {
        self.source
    }

    /**
        The target endpoint.
    */
    pub fn target(&self) -> TargetSpec {
        self.target
    }

    /**
        Size in bytes of one converted frame.
    */
    pub fn output_len(&self) -> usize {
        let bpp = self.target.format.bytes_per_pixel().unwrap_or(0);
        self.target.width as usize * self.target.height as usize * bpp
    }

    /**
        Convert one frame into `out`.

        `out` is resized to exactly [`output_len`](Self::output_len) bytes
        and fully overwritten; nothing accumulates across calls. The frame
        must match the source endpoint the converter was built for.
    */
    pub fn convert(&mut self, frame: &VideoFrame, out: &mut Vec<u8>) -> Result<()> {
        if frame.width != self.source.width
            || frame.height != self.source.height
            || frame.format != self.source.format
        {
            return Err(Error::conversion(format!(
                "frame is {}x{} {:?} but converter was built for {}x{} {:?}",
                frame.width,
                frame.height,
                frame.format,
                self.source.width,
                self.source.height,
                self.source.format,
            )));
        }
        if frame.data.is_empty() {
            return Err(Error::conversion("input frame has no data"));
        }

        fill_ffmpeg_frame(&mut self.src_frame, frame)?;

        self.scaler
            .run(&self.src_frame, &mut self.dst_frame)
            .map_err(|e| Error::conversion(format!("scaling failed: {e}")))?;

        // Pack the scaled frame, stripping any stride padding.
        let width = self.target.width as usize;
        let height = self.target.height as usize;
        let row_bytes = width * self.target.format.bytes_per_pixel().unwrap_or(0);
        let stride = self.dst_frame.stride(0);
        let data = self.dst_frame.data(0);

        out.clear();
        out.reserve_exact(row_bytes * height);
        for row in 0..height {
            let start = row * stride;
            out.extend_from_slice(&data[start..start + row_bytes]);
        }

        Ok(())
    }
}

/**
    Copy a tightly packed frame into the (possibly padded) FFmpeg frame.
*/
fn fill_ffmpeg_frame(dst: &mut VideoFrameFFmpeg, src: &VideoFrame) -> Result<()> {
    let width = src.width as usize;
    let height = src.height as usize;

    match src.format {
        PixelFormat::Rgb24 | PixelFormat::Bgr24 | PixelFormat::Rgba | PixelFormat::Bgra
        | PixelFormat::Gray8 => {
            let row_bytes = width * src.format.bytes_per_pixel().unwrap_or(1);
            fill_plane(dst, 0, &src.data, 0, row_bytes, height)
        }

        PixelFormat::Yuv420p | PixelFormat::Yuv422p | PixelFormat::Yuv444p => {
            let (uv_width, uv_height) = match src.format {
                PixelFormat::Yuv420p => (width.div_ceil(2), height.div_ceil(2)),
                PixelFormat::Yuv422p => (width.div_ceil(2), height),
                _ => (width, height),
            };
            let y_size = width * height;
            let uv_size = uv_width * uv_height;

            fill_plane(dst, 0, &src.data, 0, width, height)?;
            fill_plane(dst, 1, &src.data, y_size, uv_width, uv_height)?;
            fill_plane(dst, 2, &src.data, y_size + uv_size, uv_width, uv_height)
        }

        PixelFormat::Nv12 => {
            let y_size = width * height;
            fill_plane(dst, 0, &src.data, 0, width, height)?;
            fill_plane(dst, 1, &src.data, y_size, width, height.div_ceil(2))
        }

        _ => Err(Error::conversion(format!(
            "pixel format {:?} not supported for input",
            src.format
        ))),
    }
}

fn fill_plane(
    dst: &mut VideoFrameFFmpeg,
    plane: usize,
    src: &[u8],
    src_offset: usize,
    row_bytes: usize,
    rows: usize,
) -> Result<()> {
    let needed = src_offset + row_bytes * rows;
    if src.len() < needed {
        return Err(Error::conversion(format!(
            "input frame data too short: {} bytes, plane {plane} needs {needed}",
            src.len()
        )));
    }

    let stride = dst.stride(plane);
    let data = dst.data_mut(plane);
    for row in 0..rows {
        let src_start = src_offset + row * row_bytes;
        let dst_start = row * stride;
        data[dst_start..dst_start + row_bytes]
            .copy_from_slice(&src[src_start..src_start + row_bytes]);
    }
    Ok(())
}

/**
    Convert our PixelFormat to FFmpeg's Pixel format.
*/
fn pixel_format_to_ffmpeg(format: PixelFormat) -> Result<ffmpeg_next::format::Pixel> {
    use ffmpeg_next::format::Pixel;

    match format {
        PixelFormat::Yuv420p => Ok(Pixel::YUV420P),
        PixelFormat::Nv12 => Ok(Pixel::NV12),
        PixelFormat::Yuv422p => Ok(Pixel::YUV422P),
        PixelFormat::Yuv444p => Ok(Pixel::YUV444P),
        PixelFormat::Rgb24 => Ok(Pixel::RGB24),
        PixelFormat::Bgr24 => Ok(Pixel::BGR24),
        PixelFormat::Rgba => Ok(Pixel::RGBA),
        PixelFormat::Bgra => Ok(Pixel::BGRA),
        PixelFormat::Gray8 => Ok(Pixel::GRAY8),
        _ => Err(Error::conversion(format!(
            "pixel format {format:?} not supported",
        ))),
    }
}

impl std::fmt::Debug for VideoConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoConverter")
            .field("source", &self.source)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcap_types::{Pts, Rational};

    fn source_720p() -> SourceParams {
        SourceParams {
            width: 1280,
            height: 720,
            format: PixelFormat::Yuv420p,
        }
    }

    #[test]
    fn zero_source_geometry_is_rejected() {
        let source = SourceParams {
            width: 0,
            height: 0,
            format: PixelFormat::Yuv420p,
        };
        let err =
            VideoConverter::new(source, TargetSpec::new(640, 480, PixelFormat::Rgb24)).unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }

    #[test]
    fn zero_target_geometry_is_rejected() {
        let err = VideoConverter::new(source_720p(), TargetSpec::new(640, 0, PixelFormat::Rgb24))
            .unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }

    #[test]
    fn planar_target_is_rejected() {
        let err =
            VideoConverter::new(source_720p(), TargetSpec::new(640, 480, PixelFormat::Yuv420p))
                .unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }

    #[test]
    fn output_len_matches_geometry() {
        let converter =
            VideoConverter::new(source_720p(), TargetSpec::new(640, 480, PixelFormat::Rgb24))
                .unwrap();
        assert_eq!(converter.output_len(), 921_600);

        let converter =
            VideoConverter::new(source_720p(), TargetSpec::new(320, 200, PixelFormat::Bgra))
                .unwrap();
        assert_eq!(converter.output_len(), 320 * 200 * 4);
    }

    #[test]
    fn converts_720p_yuv_to_640x480_rgb() {
        let source = source_720p();
        let mut converter =
            VideoConverter::new(source, TargetSpec::new(640, 480, PixelFormat::Rgb24)).unwrap();

        // Mid-gray YUV frame: Y=128, U=V=128.
        let y_size = 1280 * 720;
        let uv_size = 640 * 360;
        let frame = VideoFrame::new(
            vec![128; y_size + 2 * uv_size],
            1280,
            720,
            PixelFormat::Yuv420p,
            Some(Pts(0)),
            Rational::new(1, 30),
        );

        let mut out = vec![0xAA; 3]; // stale contents must be discarded
        converter.convert(&frame, &mut out).unwrap();
        assert_eq!(out.len(), 921_600);
        // Gray in, gray out: all three channels roughly equal.
        let (r, g, b) = (out[0] as i32, out[1] as i32, out[2] as i32);
        assert!((r - g).abs() < 8 && (g - b).abs() < 8);
    }

    #[test]
    fn mismatched_frame_geometry_is_rejected() {
        let mut converter =
            VideoConverter::new(source_720p(), TargetSpec::new(640, 480, PixelFormat::Rgb24))
                .unwrap();

        let frame = VideoFrame::new(
            vec![0; 640 * 480 * 3 / 2],
            640,
            480,
            PixelFormat::Yuv420p,
            None,
            Rational::new(1, 30),
        );
        let mut out = Vec::new();
        assert!(converter.convert(&frame, &mut out).is_err());
    }

    #[test]
    fn short_frame_data_is_rejected() {
        let mut converter =
            VideoConverter::new(source_720p(), TargetSpec::new(640, 480, PixelFormat::Rgb24))
                .unwrap();

        let frame = VideoFrame::new(
            vec![128; 64], // far too short for 1280x720
            1280,
            720,
            PixelFormat::Yuv420p,
            None,
            Rational::new(1, 30),
        );
        let mut out = Vec::new();
        assert!(converter.convert(&frame, &mut out).is_err());
    }
}
