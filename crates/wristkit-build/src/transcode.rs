//! PNG to TXI transcoding stage

use crate::txi::{self, PixelFormat, RleMode};
use bytes::{Bytes, BytesMut};
use futures::{StreamExt, TryStreamExt, stream};
use image::{ColorType, ImageFormat};
use std::io;
use wristkit_core::{BuildError, BuildResult, ByteStream, Contents, FileRecord};
use wristkit_stream::{RecordStream, boxed};

const PLUGIN: &str = "image";

/// Transcoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeOptions {
    /// Format for images that need an alpha channel
    pub rgba_format: PixelFormat,
    pub rle: RleMode,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            rgba_format: PixelFormat::Rgba8888,
            rle: RleMode::Auto,
        }
    }
}

/// Pick the TXI format for a decoded image.
///
/// Colour images only keep an alpha channel when some pixel actually uses
/// it. Greyscale images always become A8, which stores the grey level
/// only, so the alpha channel of a grey+alpha image is discarded.
pub fn output_format(color: ColorType, rgba: &[u8], rgba_format: PixelFormat) -> PixelFormat {
    if !color.has_color() {
        if color.has_alpha() {
            tracing::debug!(?color, "greyscale alpha channel discarded");
        }
        PixelFormat::A8
    } else if color.has_alpha() && rgba.chunks_exact(4).any(|pixel| pixel[3] != 0xFF) {
        rgba_format
    } else {
        PixelFormat::Rgb565
    }
}

/// Decode PNG bytes and encode them as TXI
pub fn transcode_png(data: &[u8], options: TranscodeOptions) -> BuildResult<Vec<u8>> {
    let decoded = image::load_from_memory_with_format(data, ImageFormat::Png)
        .map_err(|e| BuildError::Image(e.to_string()))?;
    let color = decoded.color();
    let rgba = decoded.to_rgba8();
    let format = output_format(color, rgba.as_raw(), options.rgba_format);
    txi::encode(rgba.width(), rgba.height(), format, rgba.as_raw(), options.rle)
}

/// Transcode every `.png` record to TXI; other records pass through.
///
/// Buffered records are converted before they are emitted. Streamed
/// records get a lazy stream that starts decoding on first read and
/// reports failures through that stream.
pub fn transcode_images(input: RecordStream, options: TranscodeOptions) -> RecordStream {
    boxed(input.and_then(move |record| transcode_record(record, options)))
}

async fn transcode_record(mut record: FileRecord, options: TranscodeOptions) -> BuildResult<FileRecord> {
    if record.is_directory() || record.extension().as_deref() != Some("png") {
        return Ok(record);
    }

    let path = record.path().to_string();
    match record.take_contents() {
        Contents::Buffer(data) => {
            let encoded = tokio::task::spawn_blocking(move || transcode_png(&data, options))
                .await
                .map_err(|e| BuildError::internal(format!("image task failed: {e}")))?
                .map_err(|e| BuildError::fatal_at(PLUGIN, path.as_str(), e.to_string()))?;
            tracing::debug!(%path, bytes = encoded.len(), "image transcoded");
            record.set_contents(Contents::Buffer(Bytes::from(encoded)));
        }
        Contents::Stream(source) => {
            record.set_contents(Contents::Stream(lazy_transcode(path, source, options)));
        }
        Contents::Null => {}
    }
    Ok(record)
}

fn lazy_transcode(path: String, source: ByteStream, options: TranscodeOptions) -> ByteStream {
    stream::once(async move {
        let mut source = source;
        let mut data = BytesMut::new();
        while let Some(chunk) = source.next().await {
            data.extend_from_slice(&chunk?);
        }

        let encoded = tokio::task::spawn_blocking(move || transcode_png(&data, options))
            .await
            .map_err(io::Error::other)?
            .map_err(|e| BuildError::fatal_at(PLUGIN, path.as_str(), e.to_string()))?;
        tracing::debug!(%path, bytes = encoded.len(), "image transcoded");
        Ok::<_, io::Error>(Bytes::from(encoded))
    })
    .boxed()
}

#[cfg(test)]
#[path = "transcode/transcode_tests.rs"]
mod transcode_tests;
