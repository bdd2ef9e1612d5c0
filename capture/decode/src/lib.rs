/*!
    Packet-to-frame decoding for the vcap capture pipeline.

    This crate transforms encoded packets into raw frames. The decoder is a
    two-state machine: it either needs more input or has a frame ready, and
    it surfaces that distinction to the caller instead of treating "need
    more input" as an error.
*/

mod video;

pub use video::{DecodePoll, VideoDecoder};
