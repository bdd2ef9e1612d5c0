/*!
    Session configuration.
*/

use vcap_types::{Error, PixelFormat, Result};

/**
    Output configuration for a capture session.

    Width, height and format describe what every converted frame looks
    like; they are fixed for the session's lifetime. The frame rate is a
    request forwarded to device targets and ignored by file and memory
    targets.
*/
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Output frame width in pixels.
    pub width: u32,
    /// Output frame height in pixels.
    pub height: u32,
    /// Requested capture frame rate.
    pub fps: u32,
    /// Output pixel format (packed).
    pub format: PixelFormat,
}

impl SessionConfig {
    /**
        Create a config with the given geometry, 30 fps and RGB24 output.
    */
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fps: 30,
            format: PixelFormat::Rgb24,
        }
    }

    /**
        Set the requested frame rate.
    */
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /**
        Set the output pixel format.
    */
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    /**
        Size in bytes of one output frame.
    */
    pub fn output_len(&self) -> usize {
        let bpp = self.format.bytes_per_pixel().unwrap_or(0);
        self.width as usize * self.height as usize * bpp
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::conversion("output geometry is zero"));
        }
        if !self.format.is_packed() {
            return Err(Error::conversion(format!(
                "output format {:?} is not packed",
                self.format
            )));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_is_vga_rgb() {
        let config = SessionConfig::default();
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.format, PixelFormat::Rgb24);
        assert_eq!(config.output_len(), 921_600);
    }

    #[test]
    fn zero_geometry_fails_validation() {
        assert!(SessionConfig::new(0, 480).validate().is_err());
        assert!(SessionConfig::new(640, 0).validate().is_err());
        assert!(SessionConfig::new(640, 480).validate().is_ok());
    }

    #[test]
    fn planar_output_fails_validation() {
        let config = SessionConfig::new(640, 480).with_format(PixelFormat::Yuv420p);
        assert!(config.validate().is_err());
    }

    #[test]
    fn output_len_tracks_format() {
        let config = SessionConfig::new(320, 200).with_format(PixelFormat::Bgra);
        assert_eq!(config.output_len(), 320 * 200 * 4);
    }
}
