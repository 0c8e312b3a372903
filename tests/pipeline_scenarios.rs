//! End-to-end pipeline tests.
//!
//! Each test feeds bytes plus a declared media type through the pipeline and
//! checks what comes back.

mod support;

use std::sync::{Arc, Mutex};

use pngflat::pipeline::{Event, PNG_MEDIA_TYPE};
use pngflat::{png, process, Error, FlattenPolicy, Outcome, PassReason, Pipeline, Rgb};
use support::synthetic;

const DARK: [u8; 4] = [0x1E, 0x1E, 0x1E, 255];
const LIGHT: [u8; 4] = [255, 255, 255, 255];

/// 1x1 fully transparent pixel flattens to the background.
#[test]
fn test_single_transparent_pixel() {
    let input = png::encode(&[0, 0, 0, 0], 1, 1).unwrap();
    let out = Pipeline::default().run(&input, "image/png");

    let Outcome::Flattened(analysis) = out.outcome else {
        panic!("expected flatten, got {:?}", out.outcome);
    };
    assert_eq!(analysis.transparent_ratio, 1.0);
    assert_eq!(analysis.avg_luma, 255.0);
    assert_eq!(out.media_type, PNG_MEDIA_TYPE);

    // Luma 255 is light content, so the dark background is chosen.
    let flat = png::decode(&out.bytes).unwrap();
    assert_eq!((flat.width(), flat.height()), (1, 1));
    assert_eq!(flat.pixels, DARK);
}

/// 1x1 opaque white passes through byte-for-byte.
#[test]
fn test_single_opaque_pixel() {
    let input = png::encode(&[255, 255, 255, 255], 1, 1).unwrap();
    let out = Pipeline::default().run(&input, "image/png");

    let Outcome::PassThrough(PassReason::BelowThreshold(analysis)) = out.outcome else {
        panic!("expected pass-through, got {:?}", out.outcome);
    };
    assert_eq!(analysis.transparent_ratio, 0.0);
    assert_eq!(out.bytes.as_ref(), input.as_slice());
    assert_eq!(out.media_type, "image/png");
}

/// Exactly half transparent flattens; black content gets the light background.
#[test]
fn test_half_transparent_black() {
    let pixels = [
        0, 0, 0, 0, // transparent
        0, 0, 0, 255, // black
        0, 0, 0, 255, // black
        0, 0, 0, 0, // transparent
    ];
    let input = png::encode(&pixels, 2, 2).unwrap();
    let out = Pipeline::default().run(&input, "image/png");

    let Outcome::Flattened(analysis) = out.outcome else {
        panic!("expected flatten, got {:?}", out.outcome);
    };
    assert_eq!(analysis.transparent_ratio, 0.5);
    assert_eq!(analysis.avg_luma, 0.0);

    let flat = png::decode(&out.bytes).unwrap();
    let expected: Vec<u8> = [LIGHT, [0, 0, 0, 255], [0, 0, 0, 255], LIGHT].concat();
    assert_eq!(flat.pixels, expected);
}

/// Non-PNG media types are never inspected.
#[test]
fn test_jpeg_passes_through() {
    let input = b"\xFF\xD8\xFF\xE0\x00\x10JFIF\x00";
    let (bytes, media_type) = process(input, "image/jpeg");

    assert_eq!(bytes, input);
    assert_eq!(media_type, "image/jpeg");
}

/// PNG bytes declared as something else are left alone too.
#[test]
fn test_png_bytes_with_other_media_type() {
    let input = png::encode(&[0, 0, 0, 0], 1, 1).unwrap();
    let out = Pipeline::default().run(&input, "image/x-icon");

    assert_eq!(out.outcome, Outcome::PassThrough(PassReason::NotPng));
    assert_eq!(out.bytes.as_ref(), input.as_slice());
}

/// A stream cut before IEND degrades to the original bytes.
#[test]
fn test_truncated_png() {
    let full = png::encode(&[0, 0, 0, 0], 1, 1).unwrap();
    let input = &full[..full.len() - 12];
    let out = Pipeline::default().run(input, "image/png");

    assert_eq!(
        out.outcome,
        Outcome::PassThrough(PassReason::DecodeFailed(Error::Truncated))
    );
    assert_eq!(out.bytes.as_ref(), input);
    assert_eq!(out.media_type, "image/png");
}

/// A stream cut mid-chunk is also a pass-through.
#[test]
fn test_truncated_mid_chunk() {
    let full = png::encode(&synthetic::random_rgba(8, 8, 7), 8, 8).unwrap();
    let input = &full[..40];
    let (bytes, media_type) = process(input, "image/png");

    assert_eq!(bytes, input);
    assert_eq!(media_type, "image/png");
}

/// Flattened output is opaque, so a second run leaves it alone.
#[test]
fn test_flatten_is_idempotent() {
    let pixels = synthetic::icon_on_transparent(16, 5, [200, 30, 30]);
    let input = png::encode(&pixels, 16, 16).unwrap();

    let (first, media_type) = process(&input, "image/png");
    assert_ne!(first, input);
    assert_eq!(media_type, "image/png");

    let out = Pipeline::default().run(&first, &media_type);
    let Outcome::PassThrough(PassReason::BelowThreshold(analysis)) = out.outcome else {
        panic!("expected pass-through, got {:?}", out.outcome);
    };
    assert_eq!(analysis.transparent_ratio, 0.0);
    assert_eq!(out.bytes.as_ref(), first.as_slice());
}

/// Just under the threshold passes through.
#[test]
fn test_below_threshold() {
    // 3 of 8 pixels transparent.
    let mut pixels = synthetic::solid_color_rgba(8, 1, 0, 0, 0, 255);
    for i in 0..3 {
        pixels[i * 4 + 3] = 0;
    }
    let input = png::encode(&pixels, 8, 1).unwrap();
    let out = Pipeline::default().run(&input, "image/png");

    assert!(!out.is_flattened());
    assert_eq!(out.bytes.as_ref(), input.as_slice());
}

/// Every output pixel is opaque after a flatten of a soft-edged image.
#[test]
fn test_flatten_gradient_is_opaque() {
    let pixels = synthetic::gradient_rgba(32, 32);
    let input = png::encode(&pixels, 32, 32).unwrap();
    let policy = FlattenPolicy::builder().threshold(0.1).build();
    let out = Pipeline::new(policy).run(&input, "image/png");

    assert!(out.is_flattened());
    let flat = png::decode(&out.bytes).unwrap();
    assert_eq!(flat.pixels.len(), 32 * 32 * 4);
    assert!(flat.pixels.chunks_exact(4).all(|px| px[3] == 255));
}

/// Shrink-and-center leaves a background border around the content.
#[test]
fn test_scaled_policy_adds_border() {
    // Top half transparent, bottom half opaque red: ratio 0.5, dark content.
    let mut pixels = synthetic::solid_color_rgba(10, 10, 255, 0, 0, 255);
    for px in pixels[..10 * 5 * 4].chunks_exact_mut(4) {
        px[3] = 0;
    }
    let input = png::encode(&pixels, 10, 10).unwrap();
    let policy = FlattenPolicy::builder()
        .scale(0.8)
        .light(Rgb::new(1, 2, 3))
        .build();
    let out = Pipeline::new(policy).run(&input, "image/png");
    assert!(out.is_flattened());

    let flat = png::decode(&out.bytes).unwrap();
    let px = |x: usize, y: usize| &flat.pixels[(y * 10 + x) * 4..(y * 10 + x) * 4 + 4];
    const BG: [u8; 4] = [1, 2, 3, 255];
    const RED: [u8; 4] = [255, 0, 0, 255];

    // The 8x8 content region sits at (1, 1); row 8 is sampled from the red half.
    assert_eq!(px(1, 8), RED);
    assert_eq!(px(8, 8), RED);
    assert_eq!(px(0, 8), BG);
    assert_eq!(px(9, 8), BG);
    assert_eq!(px(5, 9), BG);
    assert_eq!(px(5, 0), BG);
    // Transparent source rows blend to the background inside the region.
    assert_eq!(px(5, 1), BG);

    let red = flat.pixels.chunks_exact(4).filter(|p| *p == RED).count();
    assert!(red > 0 && red < 50, "red pixels: {red}");
}

/// Indexed input with tRNS is flattened like any other color type.
#[test]
fn test_indexed_input_flattens() {
    let mut out = Vec::new();
    {
        let mut encoder = ::png::Encoder::new(&mut out, 2, 1);
        encoder.set_color(::png::ColorType::Indexed);
        encoder.set_depth(::png::BitDepth::Eight);
        encoder.set_palette(vec![0, 0, 0, 250, 250, 250]);
        encoder.set_trns(vec![0]);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[0, 1]).unwrap();
        writer.finish().unwrap();
    }

    let processed = Pipeline::default().run(&out, "image/png");
    let Outcome::Flattened(analysis) = processed.outcome else {
        panic!("expected flatten, got {:?}", processed.outcome);
    };
    assert_eq!(analysis.transparent_ratio, 0.5);

    // Content is near-white, so the dark background fills the transparent pixel.
    let flat = png::decode(&processed.bytes).unwrap();
    assert_eq!(flat.pixels, [DARK, [250, 250, 250, 255]].concat());
}

/// Observers see one event per run and do not change output.
#[test]
fn test_observer_events() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let pipeline = Pipeline::default().with_observer(move |event: &Event<'_>| {
        let label = match event {
            Event::Flattened { width, height, .. } => format!("flattened {width}x{height}"),
            Event::PassThrough { reason } => format!("pass: {reason}"),
        };
        sink.lock().unwrap().push(label);
    });

    let transparent = png::encode(&[0; 16], 2, 2).unwrap();
    let flattened = pipeline.run(&transparent, "image/png");
    assert_eq!(
        flattened.bytes,
        Pipeline::default().run(&transparent, "image/png").bytes
    );
    pipeline.run(b"GIF89a", "image/gif");
    pipeline.run(b"\x89PNG\r\n\x1a\n", "image/png");

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            "flattened 2x2".to_string(),
            "pass: not a PNG media type".to_string(),
            "pass: decode failed: PNG stream truncated before IEND".to_string(),
        ]
    );
}
