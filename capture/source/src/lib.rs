/*!
    Transport, demuxing and stream selection for the vcap capture pipeline.

    This crate handles the input side of the pipeline. It opens media from a
    capture device, a container file, or an in-memory byte source behind a
    read callback, probes the container into a stream table, and produces
    encoded packets that downstream crates can decode.
*/

mod codec_config;
mod convert;
pub mod device;
mod io;
mod probe;
pub mod select;
mod transport;

pub use codec_config::CodecConfig;
pub use device::{DeviceOptions, list_devices, register_backend};
pub use probe::probe;
pub use transport::{Target, Transport};
