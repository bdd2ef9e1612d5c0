/*!
    Capture session composing transport, decode and conversion.

    A [`CaptureSession`] opens a transport, probes it, selects the best
    video stream, and wires a decoder and a format converter to it. The one
    public operation, [`read_frame`](CaptureSession::read_frame), hides the
    packet/frame state machine behind a single call that loops until a
    frame is produced, the transport is exhausted, or a fatal error occurs.
*/

mod config;
mod session;

pub use config::SessionConfig;
pub use session::CaptureSession;

// Callers build targets and inspect streams through these.
pub use vcap_source::{DeviceOptions, Target};
pub use vcap_types::{Error, PixelFormat, Result, StreamTable, VideoFrame};
