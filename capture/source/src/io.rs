/*!
    Custom AVIO input over an arbitrary byte reader.

    This lets the demuxer consume media that never touches the filesystem:
    FFmpeg pulls bytes through a read callback that forwards to a boxed
    [`std::io::Read`] value. End of data is reported as a clean end of
    stream, reader faults as an I/O error.
*/

use std::io::Read;
use std::os::raw::{c_int, c_void};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::{ptr, slice};

use ffmpeg_next::ffi;
use ffmpeg_next::format::context::Input as InputContext;

use vcap_types::{Error, Result};

/// Size of the buffer FFmpeg reads through. Matches the demuxer's usual
/// probe granularity; FFmpeg may reallocate it internally.
const AVIO_BUFFER_SIZE: usize = 4096;

struct ReadState {
    reader: Box<dyn Read + Send>,
}

/**
    The read callback handed to `avio_alloc_context`.

    `opaque` is a `ReadState` owned by the enclosing [`MemoryIo`]. A short
    read is fine (FFmpeg retries), zero bytes means end of stream, and a
    reader error or panic is surfaced as `EIO`.
*/
unsafe extern "C" fn read_packet(opaque: *mut c_void, buf: *mut u8, buf_size: c_int) -> c_int {
    if opaque.is_null() || buf.is_null() || buf_size <= 0 {
        return ffi::AVERROR(ffi::EINVAL);
    }

    let state = unsafe { &mut *(opaque as *mut ReadState) };
    let dst = unsafe { slice::from_raw_parts_mut(buf, buf_size as usize) };

    match catch_unwind(AssertUnwindSafe(|| state.reader.read(dst))) {
        Ok(Ok(0)) => ffi::AVERROR_EOF,
        Ok(Ok(n)) => n as c_int,
        Ok(Err(_)) | Err(_) => ffi::AVERROR(ffi::EIO),
    }
}

/**
    Owner of the custom AVIO context and the boxed reader behind it.

    Must outlive the `AVFormatContext` that reads through it; the transport
    guarantees this by dropping its input context first. `avformat_close_input`
    leaves custom IO alone, so the buffer and the context are released here.
*/
pub(crate) struct MemoryIo {
    avio: *mut ffi::AVIOContext,
    state: *mut ReadState,
}

impl MemoryIo {
    fn new(reader: Box<dyn Read + Send>) -> Result<Self> {
        let state = Box::into_raw(Box::new(ReadState { reader }));

        let buffer = unsafe { ffi::av_malloc(AVIO_BUFFER_SIZE) } as *mut u8;
        if buffer.is_null() {
            unsafe { drop(Box::from_raw(state)) };
            return Err(Error::open("could not allocate AVIO buffer"));
        }

        let avio = unsafe {
            ffi::avio_alloc_context(
                buffer,
                AVIO_BUFFER_SIZE as c_int,
                0,
                state as *mut c_void,
                Some(read_packet),
                None,
                None,
            )
        };
        if avio.is_null() {
            unsafe {
                ffi::av_free(buffer as *mut c_void);
                drop(Box::from_raw(state));
            }
            return Err(Error::open("could not allocate AVIO context"));
        }

        Ok(Self { avio, state })
    }
}

impl Drop for MemoryIo {
    fn drop(&mut self) {
        unsafe {
            // FFmpeg may have swapped the buffer, so free whatever the
            // context currently points at, then the context, then the reader.
            ffi::av_freep(&mut (*self.avio).buffer as *mut *mut u8 as *mut c_void);
            ffi::avio_context_free(&mut self.avio);
            drop(Box::from_raw(self.state));
        }
    }
}

/**
    Open a demuxer over an in-memory byte source.

    Returns the input context together with the IO owner; the caller must
    keep the IO owner alive for as long as the input context exists and
    drop it after the input context.
*/
pub(crate) fn open_memory(reader: Box<dyn Read + Send>) -> Result<(InputContext, MemoryIo)> {
    let io = MemoryIo::new(reader)?;

    unsafe {
        let mut ctx = ffi::avformat_alloc_context();
        if ctx.is_null() {
            return Err(Error::open("could not allocate format context"));
        }
        (*ctx).pb = io.avio;

        // avformat_open_input frees the context itself on failure.
        let ret = ffi::avformat_open_input(&mut ctx, ptr::null(), ptr::null(), ptr::null_mut());
        if ret < 0 {
            return Err(Error::probe(format!(
                "could not open memory input: {}",
                ffmpeg_next::Error::from(ret)
            )));
        }

        let ret = ffi::avformat_find_stream_info(ctx, ptr::null_mut());
        if ret < 0 {
            ffi::avformat_close_input(&mut ctx);
            return Err(Error::probe(format!(
                "could not find stream info in memory input: {}",
                ffmpeg_next::Error::from(ret)
            )));
        }

        Ok((InputContext::wrap(ctx), io))
    }
}
