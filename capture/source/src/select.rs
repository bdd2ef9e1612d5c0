/*!
    Stream selection.

    Picks the most suitable stream of a kind out of a probed stream table.
    Better-known codec beats unknown, then larger pictures (or higher sample
    rates), then higher bitrate; ties resolve to the lowest stream index, so
    selection is deterministic for a fixed table and independent of stream
    order.
*/

use std::cmp::Reverse;

use vcap_types::{MediaKind, StreamInfo, StreamTable};

/**
    Select the best video stream. `None` means the container has no video.
*/
pub fn best_video(table: &StreamTable) -> Option<usize> {
    table
        .iter()
        .filter(|s| s.kind == MediaKind::Video && s.video.is_some())
        .min_by_key(|s| (Reverse(video_score(s)), s.index))
        .map(|s| s.index)
}

/**
    Select the best audio stream. `None` means the container has no audio,
    which is not an error: capture-only inputs usually lack it.
*/
pub fn best_audio(table: &StreamTable) -> Option<usize> {
    table
        .iter()
        .filter(|s| s.kind == MediaKind::Audio && s.audio.is_some())
        .min_by_key(|s| (Reverse(audio_score(s)), s.index))
        .map(|s| s.index)
}

fn video_score(stream: &StreamInfo) -> (u8, u64, u64) {
    let known_codec = u8::from(stream.codec_id.is_some());
    let area = stream.video.as_ref().map_or(0, |v| v.area());
    (known_codec, area, stream.bitrate.unwrap_or(0))
}

fn audio_score(stream: &StreamInfo) -> (u8, u64, u64) {
    let known_codec = u8::from(stream.codec_id.is_some());
    let sample_rate = stream.audio.as_ref().map_or(0, |a| a.sample_rate as u64);
    (known_codec, sample_rate, stream.bitrate.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcap_types::{AudioParams, CodecId, PixelFormat, Rational, SampleFormat, VideoParams};

    fn video(index: usize, codec: Option<CodecId>, w: u32, h: u32, bitrate: u64) -> StreamInfo {
        StreamInfo {
            index,
            kind: MediaKind::Video,
            codec_id: codec,
            video: Some(VideoParams {
                width: w,
                height: h,
                pixel_format: Some(PixelFormat::Yuv420p),
                frame_rate: Some(Rational::new(30, 1)),
                profile: None,
                level: None,
            }),
            audio: None,
            duration: None,
            time_base: Rational::new(1, 90000),
            bitrate: (bitrate > 0).then_some(bitrate),
        }
    }

    fn audio(index: usize, sample_rate: u32) -> StreamInfo {
        StreamInfo {
            index,
            kind: MediaKind::Audio,
            codec_id: Some(CodecId::Aac),
            video: None,
            audio: Some(AudioParams {
                sample_rate,
                channels: 2,
                sample_format: Some(SampleFormat::F32),
            }),
            duration: None,
            time_base: Rational::new(1, 48000),
            bitrate: None,
        }
    }

    #[test]
    fn picks_video_regardless_of_stream_order() {
        // Audio first in the container must not shadow the video stream.
        let table = StreamTable::new(vec![
            audio(0, 48000),
            video(1, Some(CodecId::H264), 1280, 720, 0),
        ]);
        assert_eq!(best_video(&table), Some(1));
        assert_eq!(best_audio(&table), Some(0));
    }

    #[test]
    fn prefers_larger_picture() {
        let table = StreamTable::new(vec![
            video(0, Some(CodecId::H264), 640, 360, 0),
            video(1, Some(CodecId::H264), 1920, 1080, 0),
        ]);
        assert_eq!(best_video(&table), Some(1));
    }

    #[test]
    fn prefers_known_codec_over_resolution() {
        let table = StreamTable::new(vec![
            video(0, None, 3840, 2160, 0),
            video(1, Some(CodecId::H264), 1280, 720, 0),
        ]);
        assert_eq!(best_video(&table), Some(1));
    }

    #[test]
    fn bitrate_breaks_equal_geometry() {
        let table = StreamTable::new(vec![
            video(0, Some(CodecId::H264), 1280, 720, 1_000_000),
            video(1, Some(CodecId::H264), 1280, 720, 4_000_000),
        ]);
        assert_eq!(best_video(&table), Some(1));
    }

    #[test]
    fn full_tie_resolves_to_lowest_index() {
        let table = StreamTable::new(vec![
            video(2, Some(CodecId::H264), 1280, 720, 0),
            video(5, Some(CodecId::H264), 1280, 720, 0),
        ]);
        assert_eq!(best_video(&table), Some(2));
    }

    #[test]
    fn selection_is_deterministic() {
        let table = StreamTable::new(vec![
            video(0, Some(CodecId::H264), 1280, 720, 0),
            audio(1, 48000),
            video(2, Some(CodecId::H265), 1280, 720, 0),
        ]);
        let first = best_video(&table);
        for _ in 0..16 {
            assert_eq!(best_video(&table), first);
        }
    }

    #[test]
    fn missing_kinds_are_not_found() {
        let table = StreamTable::new(vec![video(0, Some(CodecId::H264), 1280, 720, 0)]);
        assert_eq!(best_audio(&table), None);

        let empty = StreamTable::default();
        assert_eq!(best_video(&empty), None);
        assert_eq!(best_audio(&empty), None);
    }
}
