/*!
    Pixel and sample format types.
*/

/**
    Video pixel formats.

    This is a subset of formats commonly encountered in capture pipelines.
    Not all FFmpeg pixel formats are represented.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp (most common video format)
    Yuv420p,
    /// Semi-planar YUV 4:2:0, 12bpp (common hardware decoder output)
    Nv12,
    /// Planar YUV 4:2:2, 16bpp
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Packed RGB, 24bpp
    Rgb24,
    /// Packed BGR, 24bpp
    Bgr24,
    /// Packed RGBA, 32bpp
    Rgba,
    /// Packed BGRA, 32bpp (common for display)
    Bgra,
    /// Single-plane 8-bit luma
    Gray8,
}

impl PixelFormat {
    /**
        Returns the number of bytes per pixel for packed formats.

        Planar formats have no per-pixel byte count and return `None`;
        they cannot be used as conversion targets.
    */
    pub const fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::Gray8 => Some(1),
            Self::Rgb24 | Self::Bgr24 => Some(3),
            Self::Rgba | Self::Bgra => Some(4),
            Self::Yuv420p | Self::Nv12 | Self::Yuv422p | Self::Yuv444p => None,
        }
    }

    /**
        Returns true if pixels are stored in a single interleaved plane.
    */
    pub const fn is_packed(self) -> bool {
        self.bytes_per_pixel().is_some()
    }

    /**
        Returns the number of bits per pixel, averaged for planar formats.
    */
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Gray8 => 8,
            Self::Yuv420p | Self::Nv12 => 12,
            Self::Yuv422p => 16,
            Self::Yuv444p | Self::Rgb24 | Self::Bgr24 => 24,
            Self::Rgba | Self::Bgra => 32,
        }
    }
}

/**
    Audio sample formats, as reported by the demux probe.

    Audio is probed and selectable but never decoded by this pipeline.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SampleFormat {
    /// 32-bit floating point, range [-1.0, 1.0]
    F32,
    /// 64-bit floating point
    F64,
    /// Signed 16-bit integer
    S16,
    /// Signed 32-bit integer
    S32,
    /// Unsigned 8-bit integer
    U8,
}

impl SampleFormat {
    /**
        Returns the number of bytes per sample.
    */
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::S16 => 2,
            Self::S32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_formats_have_pixel_width() {
        assert_eq!(PixelFormat::Rgb24.bytes_per_pixel(), Some(3));
        assert_eq!(PixelFormat::Bgra.bytes_per_pixel(), Some(4));
        assert_eq!(PixelFormat::Gray8.bytes_per_pixel(), Some(1));
    }

    #[test]
    fn planar_formats_are_not_conversion_targets() {
        assert_eq!(PixelFormat::Yuv420p.bytes_per_pixel(), None);
        assert_eq!(PixelFormat::Nv12.bytes_per_pixel(), None);
        assert!(!PixelFormat::Yuv422p.is_packed());
        assert!(PixelFormat::Rgb24.is_packed());
    }

    #[test]
    fn output_size_arithmetic() {
        // 640x480 RGB frames are exactly 921600 bytes.
        let bpp = PixelFormat::Rgb24.bytes_per_pixel().unwrap();
        assert_eq!(640 * 480 * bpp, 921_600);
    }

    #[test]
    fn sample_format_bytes_per_sample() {
        assert_eq!(SampleFormat::U8.bytes_per_sample(), 1);
        assert_eq!(SampleFormat::S16.bytes_per_sample(), 2);
        assert_eq!(SampleFormat::F64.bytes_per_sample(), 8);
    }
}
