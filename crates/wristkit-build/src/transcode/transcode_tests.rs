#![allow(non_snake_case)]

use super::*;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use wristkit_stream::{collect, from_records};

fn png(image: DynamicImage) -> Vec<u8> {
    let mut out = Vec::new();
    image.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
    out
}

fn format_of(data: &[u8]) -> PixelFormat {
    txi::decode(data).unwrap().format
}

#[test]
fn transcode_png___grayscale___single_channel() {
    let image = GrayImage::from_pixel(4, 4, Luma([90]));

    let data = transcode_png(&png(DynamicImage::ImageLuma8(image)), TranscodeOptions::default()).unwrap();

    assert_eq!(format_of(&data), PixelFormat::A8);
}

#[test]
fn output_format___grey_with_alpha___a8_drops_alpha() {
    let rgba = [90, 90, 90, 0, 90, 90, 90, 255];

    assert_eq!(output_format(ColorType::La8, &rgba, PixelFormat::Rgba8888), PixelFormat::A8);
}

#[test]
fn transcode_png___rgb___packed_rgb() {
    let image = RgbImage::from_pixel(4, 4, Rgb([10, 200, 30]));

    let data = transcode_png(&png(DynamicImage::ImageRgb8(image)), TranscodeOptions::default()).unwrap();

    assert_eq!(format_of(&data), PixelFormat::Rgb565);
}

#[test]
fn transcode_png___opaque_rgba___degrades_to_rgb() {
    let image = RgbaImage::from_pixel(4, 4, Rgba([10, 200, 30, 255]));

    let data = transcode_png(&png(DynamicImage::ImageRgba8(image)), TranscodeOptions::default()).unwrap();

    assert_eq!(format_of(&data), PixelFormat::Rgb565);
}

#[test]
fn transcode_png___translucent_rgba___selected_format() {
    let mut image = RgbaImage::from_pixel(4, 4, Rgba([10, 200, 30, 255]));
    image.put_pixel(1, 1, Rgba([0, 0, 0, 128]));
    let data = png(DynamicImage::ImageRgba8(image));

    let default = transcode_png(&data, TranscodeOptions::default()).unwrap();
    let reduced = transcode_png(
        &data,
        TranscodeOptions {
            rgba_format: PixelFormat::Rgba6666,
            ..TranscodeOptions::default()
        },
    )
    .unwrap();

    assert_eq!(format_of(&default), PixelFormat::Rgba8888);
    assert_eq!(format_of(&reduced), PixelFormat::Rgba6666);
}

#[test]
fn transcode_png___same_input___same_output() {
    let image = RgbImage::from_fn(8, 8, |x, y| Rgb([x as u8 * 30, y as u8 * 30, 7]));
    let data = png(DynamicImage::ImageRgb8(image));

    let first = transcode_png(&data, TranscodeOptions::default()).unwrap();
    let second = transcode_png(&data, TranscodeOptions::default()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn transcode_png___empty_input___error() {
    assert!(matches!(
        transcode_png(&[], TranscodeOptions::default()),
        Err(BuildError::Image(_))
    ));
}

// Stage tests

#[tokio::test]
async fn transcode_images___buffered___converted_others_untouched() {
    let image = png(DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([1]))));

    let records = collect(transcode_images(
        from_records([
            FileRecord::buffer("resources/a.png", image),
            FileRecord::buffer("resources/index.view", "<svg/>"),
            FileRecord::directory("resources/icons"),
        ]),
        TranscodeOptions::default(),
    ))
    .await
    .unwrap();

    assert_eq!(records[0].path(), "resources/a.png");
    assert_eq!(&records[0].bytes().unwrap()[..4], txi::MAGIC);
    assert_eq!(records[1].bytes().unwrap().as_ref(), b"<svg/>");
    assert!(records[2].is_directory());
}

#[tokio::test]
async fn transcode_images___corrupt_buffer___error_names_file() {
    let result = collect(transcode_images(
        from_records([FileRecord::buffer("resources/bad.png", "not a png")]),
        TranscodeOptions::default(),
    ))
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.path(), Some("resources/bad.png"));
}

#[tokio::test]
async fn transcode_images___stream___not_read_until_consumed() {
    let image = png(DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]))));
    let touched = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&touched);
    let source = stream::once(async move {
        flag.store(true, Ordering::SeqCst);
        Ok(Bytes::from(image))
    })
    .boxed();

    let mut records = collect(transcode_images(
        from_records([FileRecord::stream("resources/a.png", source)]),
        TranscodeOptions::default(),
    ))
    .await
    .unwrap();

    assert!(!touched.load(Ordering::SeqCst));
    let record = records.remove(0).into_buffered().await.unwrap();
    assert!(touched.load(Ordering::SeqCst));
    assert_eq!(format_of(record.bytes().unwrap()), PixelFormat::Rgb565);
}

#[tokio::test]
async fn transcode_images___corrupt_stream___error_on_inner_stream() {
    let source = stream::once(async { Ok(Bytes::from_static(b"garbage")) }).boxed();

    let mut records = collect(transcode_images(
        from_records([FileRecord::stream("resources/bad.png", source)]),
        TranscodeOptions::default(),
    ))
    .await
    .unwrap();

    let err = records.remove(0).into_buffered().await.unwrap_err();
    assert!(err.is_project_error());
    assert_eq!(err.path(), Some("resources/bad.png"));
    assert!(matches!(err, BuildError::Fatal { ref plugin, .. } if plugin == "image"));
}
