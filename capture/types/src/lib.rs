/*!
    Shared types for the vcap capture pipeline.

    This crate defines the vocabulary of the pipeline — the types that cross
    crate boundaries. It has no dependency on FFmpeg, making it lightweight and
    enabling consumers to depend on it without pulling in FFmpeg bindings.
*/

mod error;
mod format;
mod frame;
mod packet;
mod stream;
mod time;

pub use error::{Error, Result};
pub use format::{PixelFormat, SampleFormat};
pub use frame::VideoFrame;
pub use packet::Packet;
pub use stream::{
    AudioParams, CodecId, DeviceInfo, MediaKind, StreamInfo, StreamTable, VideoParams,
};
pub use time::{MediaDuration, Pts, Rational};
