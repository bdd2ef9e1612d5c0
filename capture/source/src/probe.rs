/*!
    Demux probe: container structure and per-stream parameters.
*/

use std::time::Duration;

use ffmpeg_next::ffi;
use ffmpeg_next::format::context::Input as InputContext;
use ffmpeg_next::format::stream::Stream;
use tracing::info;

use vcap_types::{
    AudioParams, Error, MediaKind, Result, StreamInfo, StreamTable, VideoParams,
};

use crate::convert::{
    codec_id_from_ffmpeg, media_kind_from_ffmpeg, pixel_format_from_ffmpeg, rational_from_ffmpeg,
    sample_format_from_ffmpeg,
};
use crate::transport::Transport;

/**
    Probe an open transport into a stream table.

    The table carries every elementary stream the container declares, with
    codec identity, geometry or audio layout, duration and time base. It is
    built once per transport; selection and decoding work from it afterward.
*/
pub fn probe(transport: &Transport) -> Result<StreamTable> {
    let input = transport.input();

    let streams: Vec<StreamInfo> = input
        .streams()
        .map(|stream| stream_info(input, &stream))
        .collect();

    if streams.is_empty() {
        return Err(Error::probe("container declares no streams"));
    }

    for stream in &streams {
        info!(
            index = stream.index,
            kind = ?stream.kind,
            codec = ?stream.codec_id,
            "probed stream"
        );
    }

    Ok(StreamTable::new(streams))
}

fn stream_info(input: &InputContext, stream: &Stream) -> StreamInfo {
    let kind = media_kind_from_ffmpeg(stream.parameters().medium());
    let time_base = rational_from_ffmpeg(stream.time_base());

    // Prefer the stream's own duration, then the container's.
    let duration = if stream.duration() > 0 && time_base.den != 0 {
        let seconds = stream.duration() as f64 * time_base.num as f64 / time_base.den as f64;
        Some(Duration::from_secs_f64(seconds))
    } else if input.duration() > 0 {
        Some(Duration::from_micros(input.duration() as u64))
    } else {
        None
    };

    let codec_id = codec_id_from_ffmpeg(stream.parameters().id());

    let video = match kind {
        MediaKind::Video => video_params(stream),
        _ => None,
    };
    let audio = match kind {
        MediaKind::Audio => audio_params(stream),
        _ => None,
    };

    // Bitrate lives on the codec parameters, which the safe wrapper does
    // not expose.
    // SAFETY: reading from a valid AVCodecParameters pointer FFmpeg owns.
    let bitrate = unsafe {
        let params = stream.parameters().as_ptr();
        ((*params).bit_rate > 0).then(|| (*params).bit_rate as u64)
    };

    StreamInfo {
        index: stream.index(),
        kind,
        codec_id,
        video,
        audio,
        duration,
        time_base,
        bitrate,
    }
}

fn video_params(stream: &Stream) -> Option<VideoParams> {
    let decoder_ctx =
        ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).ok()?;
    let decoder = decoder_ctx.decoder().video().ok()?;

    let frame_rate = if stream.avg_frame_rate().numerator() != 0 {
        Some(rational_from_ffmpeg(stream.avg_frame_rate()))
    } else if stream.rate().numerator() != 0 {
        Some(rational_from_ffmpeg(stream.rate()))
    } else {
        None
    };

    // SAFETY: reading from a valid AVCodecParameters pointer FFmpeg owns.
    let (profile, level) = unsafe {
        let params = stream.parameters().as_ptr();
        (
            ((*params).profile != ffi::FF_PROFILE_UNKNOWN).then_some((*params).profile),
            ((*params).level != ffi::FF_LEVEL_UNKNOWN).then_some((*params).level),
        )
    };

    Some(VideoParams {
        width: decoder.width(),
        height: decoder.height(),
        pixel_format: pixel_format_from_ffmpeg(decoder.format()),
        frame_rate,
        profile,
        level,
    })
}

fn audio_params(stream: &Stream) -> Option<AudioParams> {
    let decoder_ctx =
        ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).ok()?;
    let decoder = decoder_ctx.decoder().audio().ok()?;

    Some(AudioParams {
        sample_rate: decoder.rate(),
        channels: decoder.channels(),
        sample_format: sample_format_from_ffmpeg(decoder.format()),
    })
}
