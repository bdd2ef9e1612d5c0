/*!
    Frame rescaling and pixel format conversion for the vcap capture
    pipeline.

    This crate converts decoded frames to a fixed target geometry and packed
    pixel layout, writing into a caller-owned buffer. Both endpoints are
    fixed when the converter is built; they are not renegotiated per frame.
*/

mod video;

pub use video::{ScalingAlgorithm, SourceParams, TargetSpec, VideoConverter};
