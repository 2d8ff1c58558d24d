use std::path::Path;

use ffmpeg_next::Rational;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Default output codec: MPEG-4 Part 2 (`mp4v`), available in every ffmpeg build.
pub const DEFAULT_CODEC: ffmpeg_next::codec::Id = ffmpeg_next::codec::Id::MPEG4;

/// Largest time-base denominator MPEG-4 Part 2 accepts.
const MAX_RATE_TERM: i32 = 65_535;

/// Output frame rate as a rational, so 29.97 stays 30000/1001.
///
/// Unknown rates fall back to 30 fps. Rates with no small rational form are
/// rounded to whole frames per second.
fn frame_rate_for(metadata: &VideoMetadata) -> Rational {
    let fps = metadata.output_fps();
    let rate = Rational::from(fps);
    let (num, den) = (rate.numerator(), rate.denominator());
    if num > 0 && den > 0 && num <= MAX_RATE_TERM && den <= MAX_RATE_TERM {
        rate
    } else {
        Rational((fps.round() as i32).max(1), 1)
    }
}

/// Encodes RGB frames via ffmpeg-next. Video only; no audio track is written.
pub struct FfmpegWriter {
    codec: ffmpeg_next::codec::Id,
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    frame_rate: Rational,
    frame_count: usize,
    video_stream_index: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            codec: DEFAULT_CODEC,
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            frame_rate: Rational(0, 1),
            frame_count: 0,
            video_stream_index: 0,
        }
    }

    pub fn with_codec(mut self, codec: ffmpeg_next::codec::Id) -> Self {
        self.codec = codec;
        self
    }

    /// Drains every packet the encoder has ready into the container.
    fn drain_packets(
        encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
        octx: &mut ffmpeg_next::format::context::Output,
        stream_index: usize,
        time_base: Rational,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let ost_time_base = octx
            .stream(stream_index)
            .ok_or("FfmpegWriter: output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(stream_index);
            encoded.rescale_ts(time_base, ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        self.width = metadata.width;
        self.height = metadata.height;
        self.frame_rate = frame_rate_for(metadata);

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(self.codec)
            .ok_or_else(|| format!("Encoder not found: {:?}", self.codec))?;

        let mut ost = octx.add_stream(Some(codec))?;
        self.video_stream_index = ost.index();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(self.frame_rate.invert());
        encoder_ctx.set_frame_rate(Some(self.frame_rate));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(scaler), Some(octx)) = (
            self.encoder.as_mut(),
            self.scaler.as_mut(),
            self.octx.as_mut(),
        ) else {
            return Err("FfmpegWriter: not opened".into());
        };
        if frame.width() != self.width || frame.height() != self.height || frame.channels() != 3 {
            return Err(format!(
                "FfmpegWriter: expected {}x{} RGB frame, got {}x{}x{}",
                self.width,
                self.height,
                frame.width(),
                frame.height(),
                frame.channels()
            )
            .into());
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );

        // Copy row by row; ffmpeg rows may be padded past width * 3.
        let stride = rgb_frame.stride(0);
        let row_bytes = self.width as usize * 3;
        let data = rgb_frame.data_mut(0);
        for (row, src) in frame.data().chunks_exact(row_bytes).enumerate() {
            let dst_start = row * stride;
            data[dst_start..dst_start + row_bytes].copy_from_slice(src);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        encoder.send_frame(&yuv_frame)?;
        let time_base = self.frame_rate.invert();
        Self::drain_packets(encoder, octx, self.video_stream_index, time_base)?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let (Some(encoder), Some(octx)) = (self.encoder.as_mut(), self.octx.as_mut()) {
            encoder.send_eof()?;
            let time_base = self.frame_rate.invert();
            Self::drain_packets(encoder, octx, self.video_stream_index, time_base)?;
            octx.write_trailer()?;
        }

        self.octx = None;
        self.encoder = None;
        self.scaler = None;

        Ok(())
    }
}
