//! FFmpeg-backed stream decoder.
//!
//! Each instance owns one named thread that opens the source, decodes the
//! best video stream and presents RGBA frames on its surface. Destroying the
//! instance raises a stop flag; the thread checks it after opening and
//! between packets, so a decoder torn down while still connecting exits as
//! soon as the open call returns.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Once};
use std::thread;

use log::{debug, info, trace, warn};
use playa_ffmpeg as ffmpeg;

use super::{DecoderBackend, DecoderError, DecoderInstance, DecoderStatus, SharedStatus};
use crate::core::surface::{FrameSurface, SurfaceFrame};

static FFMPEG_LOG_INIT: Once = Once::new();

fn init_ffmpeg_logging() {
    FFMPEG_LOG_INIT.call_once(|| {
        unsafe {
            // Camera streams are noisy (missing refs, late packets); keep stderr clean
            ffmpeg::ffi::av_log_set_level(ffmpeg::ffi::AV_LOG_QUIET);
        }
    });
}

/// Socket timeout handed to the demuxer, microseconds.
const OPEN_TIMEOUT_US: &str = "5000000";

/// Spawns one decoding thread per instance.
#[derive(Debug)]
pub struct FfmpegBackend {
    /// Frames wider than this are scaled down (aspect kept).
    max_width: u32,
    next_thread: AtomicU64,
}

impl FfmpegBackend {
    pub fn new() -> Self {
        Self::with_max_width(1280)
    }

    pub fn with_max_width(max_width: u32) -> Self {
        Self {
            max_width: max_width.max(16),
            next_thread: AtomicU64::new(0),
        }
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderBackend for FfmpegBackend {
    fn construct(
        &self,
        source: &str,
        surface: FrameSurface,
    ) -> Result<Box<dyn DecoderInstance>, DecoderError> {
        init_ffmpeg_logging();

        let stop = Arc::new(AtomicBool::new(false));
        let status = SharedStatus::new();
        let worker_id = self.next_thread.fetch_add(1, Ordering::Relaxed);

        let job = DecodeJob {
            source: source.to_string(),
            surface,
            status: status.clone(),
            stop: Arc::clone(&stop),
            max_width: self.max_width,
        };

        let handle = thread::Builder::new()
            .name(format!("ipwall-decoder-{}", worker_id))
            .spawn(move || job.run())
            .map_err(|e| DecoderError::Spawn(e.to_string()))?;

        debug!("Decoder thread {} spawned for {}", worker_id, source);

        Ok(Box::new(FfmpegInstance {
            source: source.to_string(),
            status,
            stop,
            handle: Some(handle),
        }))
    }
}

struct FfmpegInstance {
    source: String,
    status: SharedStatus,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl DecoderInstance for FfmpegInstance {
    fn status(&self) -> DecoderStatus {
        self.status.get()
    }

    fn destroy(mut self: Box<Self>) {
        self.stop.store(true, Ordering::SeqCst);
        // Detach: the thread may be blocked inside avformat_open_input and
        // will exit by itself once that returns
        if let Some(handle) = self.handle.take()
            && handle.is_finished()
        {
            let _ = handle.join();
        }
        trace!("Decoder for {} released", self.source);
    }
}

impl Drop for FfmpegInstance {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

struct DecodeJob {
    source: String,
    surface: FrameSurface,
    status: SharedStatus,
    stop: Arc<AtomicBool>,
    max_width: u32,
}

impl DecodeJob {
    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn run(self) {
        let result = self.decode();
        match result {
            // Torn down: whatever the open or decode did no longer matters
            Ok(()) | Err(_) if self.stopped() => {
                trace!("Decoder for {} stopped", self.source);
            }
            Ok(()) => {
                info!("Stream ended: {}", self.source);
                self.status.set(DecoderStatus::Ended);
            }
            Err(e) => {
                warn!("Decoder failed for {}: {}", self.source, e);
                self.status.set(DecoderStatus::Failed(e));
            }
        }
        if self.stopped() {
            self.surface.clear();
        }
    }

    fn decode(&self) -> Result<(), DecoderError> {
        let mut options = ffmpeg::Dictionary::new();
        if self.source.to_ascii_lowercase().starts_with("rtsp://") {
            options.set("rtsp_transport", "tcp");
        }
        options.set("timeout", OPEN_TIMEOUT_US);

        let mut ictx = ffmpeg::format::input_with_dictionary(&self.source, options)
            .map_err(|e| DecoderError::Open(e.to_string()))?;

        // Torn down while connecting: release the input and leave
        if self.stopped() {
            return Ok(());
        }

        let stream = ictx
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or(DecoderError::NoVideoStream)?;
        let stream_idx = stream.index();

        let codec_params = stream.parameters();
        let codec_id = codec_params.id();
        let decoder_ctx = ffmpeg::codec::context::Context::from_parameters(codec_params)
            .map_err(|e| DecoderError::UnsupportedCodec(format!("{:?}: {}", codec_id, e)))?;
        let mut decoder = decoder_ctx
            .decoder()
            .video()
            .map_err(|e| DecoderError::UnsupportedCodec(format!("{:?}: {}", codec_id, e)))?;

        let mut scaler: Option<Scaler> = None;

        for (stream, packet) in ictx.packets() {
            if self.stopped() {
                return Ok(());
            }
            if stream.index() != stream_idx {
                continue;
            }
            if let Err(e) = decoder.send_packet(&packet) {
                // Corrupt packets are common on live streams, skip them
                trace!("Dropping packet for {}: {}", self.source, e);
                continue;
            }

            let mut decoded = ffmpeg::util::frame::video::Video::empty();
            while decoder.receive_frame(&mut decoded).is_ok() {
                let frame = self.convert(&mut scaler, &decoded)?;
                self.surface.present(frame);
                if !matches!(self.status.get(), DecoderStatus::Playing) {
                    info!("Stream playing: {}", self.source);
                    self.status.set(DecoderStatus::Playing);
                }
            }
        }

        Ok(())
    }

    fn convert(
        &self,
        scaler: &mut Option<Scaler>,
        decoded: &ffmpeg::util::frame::video::Video,
    ) -> Result<SurfaceFrame, DecoderError> {
        let (src_w, src_h) = (decoded.width(), decoded.height());
        let needs_new = scaler
            .as_ref()
            .is_none_or(|s| s.src != (src_w, src_h, decoded.format()));
        if needs_new {
            *scaler = Some(Scaler::new(decoded.format(), src_w, src_h, self.max_width)?);
        }
        let Some(scaler) = scaler.as_mut() else {
            return Err(DecoderError::Decode("scaler missing".to_string()));
        };

        let mut rgba_frame = ffmpeg::util::frame::video::Video::empty();
        scaler
            .ctx
            .run(decoded, &mut rgba_frame)
            .map_err(|e| DecoderError::Decode(format!("Failed to scale frame: {}", e)))?;

        let (width, height) = (scaler.dst.0 as usize, scaler.dst.1 as usize);
        let rgba_data = rgba_frame.data(0);
        let stride = rgba_frame.stride(0);
        let row_bytes = width * 4;
        let mut output = vec![0u8; row_bytes * height];
        for y in 0..height {
            let src = y * stride;
            let dst = y * row_bytes;
            output[dst..dst + row_bytes].copy_from_slice(&rgba_data[src..src + row_bytes]);
        }

        Ok(SurfaceFrame { width, height, rgba: output })
    }
}

struct Scaler {
    ctx: ffmpeg::software::scaling::Context,
    src: (u32, u32, ffmpeg::format::Pixel),
    dst: (u32, u32),
}

impl Scaler {
    fn new(
        format: ffmpeg::format::Pixel,
        width: u32,
        height: u32,
        max_width: u32,
    ) -> Result<Self, DecoderError> {
        let (dst_w, dst_h) = if width > max_width && width > 0 {
            let h = (height as u64 * max_width as u64 / width as u64).max(1) as u32;
            (max_width, h)
        } else {
            (width, height)
        };

        let ctx = ffmpeg::software::scaling::Context::get(
            format,
            width,
            height,
            ffmpeg::format::Pixel::RGBA,
            dst_w,
            dst_h,
            ffmpeg::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| DecoderError::Decode(format!("Failed to create scaler: {}", e)))?;

        Ok(Self {
            ctx,
            src: (width, height, format),
            dst: (dst_w, dst_h),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(source: &str) -> (DecodeJob, FrameSurface, SharedStatus, Arc<AtomicBool>) {
        let surface = FrameSurface::new();
        let status = SharedStatus::new();
        let stop = Arc::new(AtomicBool::new(false));
        let job = DecodeJob {
            source: source.to_string(),
            surface: surface.clone(),
            status: status.clone(),
            stop: Arc::clone(&stop),
            max_width: 640,
        };
        (job, surface, status, stop)
    }

    #[test]
    fn test_stopped_job_clears_surface_and_keeps_status() {
        init_ffmpeg_logging();
        let (job, surface, status, stop) = job("/nonexistent/ipwall-missing.mp4");
        stop.store(true, Ordering::SeqCst);
        job.run();
        assert_eq!(status.get(), DecoderStatus::Connecting);
        assert_eq!(surface.frame_since(0), Some((1, None)));
    }

    #[test]
    fn test_open_failure_is_reported() {
        init_ffmpeg_logging();
        let (job, surface, status, _stop) = job("/nonexistent/ipwall-missing.mp4");
        job.run();
        assert!(matches!(status.get(), DecoderStatus::Failed(DecoderError::Open(_))));
        assert_eq!(surface.frame_since(0), None);
    }
}
