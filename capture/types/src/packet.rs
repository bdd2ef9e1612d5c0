/*!
    Demuxed packet type.
*/

use crate::{MediaDuration, Pts, Rational};

/**
    One compressed, stream-tagged unit of data read from the transport.

    Packets are produced in container order, interleaved between streams.
    `stream_index` identifies the elementary stream the packet belongs to;
    the session discards packets whose index differs from the selected one.
*/
#[derive(Clone, Debug)]
pub struct Packet {
    /// Compressed payload.
    pub data: Vec<u8>,
    /// Index of the stream this packet belongs to.
    pub stream_index: usize,
    /// Presentation timestamp, if known.
    pub pts: Option<Pts>,
    /// Decode timestamp, if known.
    pub dts: Option<Pts>,
    /// Packet duration in time-base units.
    pub duration: MediaDuration,
    /// Time base of the originating stream.
    pub time_base: Rational,
    /// Whether this packet starts a keyframe.
    pub keyframe: bool,
}

impl Packet {
    /**
        Create a new packet.
    */
    pub fn new(
        data: Vec<u8>,
        stream_index: usize,
        pts: Option<Pts>,
        dts: Option<Pts>,
        duration: MediaDuration,
        time_base: Rational,
        keyframe: bool,
    ) -> Self {
        Self {
            data,
            stream_index,
            pts,
            dts,
            duration,
            time_base,
            keyframe,
        }
    }

    /**
        Returns true if the packet carries no payload.
    */
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
