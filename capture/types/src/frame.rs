/*!
    Decoded video frame type.
*/

use crate::{PixelFormat, Pts, Rational};

/**
    One fully decoded video frame.

    Rows are stored tightly packed (no stride padding) in plane order for
    planar formats, or interleaved for packed formats. The capture session
    owns a single `VideoFrame` and overwrites it on every decode cycle, so
    callers that need to retain pixels must copy them out — which is what
    the format converter does.
*/
#[derive(Clone, Debug)]
pub struct VideoFrame {
    /// Tightly packed pixel data.
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format of `data`.
    pub format: PixelFormat,
    /// Presentation timestamp, if known.
    pub pts: Option<Pts>,
    /// Time base for `pts`.
    pub time_base: Rational,
}

impl VideoFrame {
    /**
        Create a frame from its parts.
    */
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        pts: Option<Pts>,
        time_base: Rational,
    ) -> Self {
        Self {
            data,
            width,
            height,
            format,
            pts,
            time_base,
        }
    }

    /**
        Create an empty frame to be filled by a decoder.

        The decoder overwrites every field on each successful poll; the
        initial values only exist so the buffer can be reused across calls.
    */
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
            format: PixelFormat::Yuv420p,
            pts: None,
            time_base: Rational::new(1, 1),
        }
    }

    /**
        Returns true if the frame holds no pixels.
    */
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frame_is_empty() {
        assert!(VideoFrame::empty().is_empty());
    }

    #[test]
    fn filled_frame_is_not_empty() {
        let frame = VideoFrame::new(
            vec![0; 4 * 4 * 3],
            4,
            4,
            PixelFormat::Rgb24,
            Some(Pts(0)),
            Rational::new(1, 30),
        );
        assert!(!frame.is_empty());
    }
}
