use convert_my_image::engine::{ImageTransformer, SourceImage, TransformerConfig};
use convert_my_image::{OutputFormat, ResizePolicy, ResizePreset};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::hint::black_box;
use std::io::Cursor;

fn source(width: u32, height: u32, format: ImageFormat) -> SourceImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    SourceImage::new("bench.img", format.to_mime_type(), buf)
}

pub fn convert_formats(c: &mut Criterion) {
    let transformer = ImageTransformer::new();
    let input = source(1280, 720, ImageFormat::Jpeg);
    let policy = ResizePolicy::from(ResizePreset::Post);

    let mut group = c.benchmark_group("convert_720p_to_square");
    for format in OutputFormat::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(format), &format, |b, &format| {
            b.iter(|| {
                transformer
                    .convert(black_box(&input), &policy, format)
                    .unwrap()
            })
        });
    }
    group.finish();
}

pub fn composite_modes(c: &mut Criterion) {
    let input = source(1920, 1080, ImageFormat::Png);
    let policy = ResizePolicy::from(ResizePreset::Story);

    let mut group = c.benchmark_group("composite_1080p_to_story");
    for (name, config) in [
        ("stretch", TransformerConfig::stretch()),
        ("cover_crop", TransformerConfig::cover_crop()),
    ] {
        let transformer = ImageTransformer::with_config(config).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                transformer
                    .convert(black_box(&input), &policy, OutputFormat::WebP)
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, convert_formats, composite_modes);
criterion_main!(benches);
