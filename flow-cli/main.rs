use std::env;
use std::time::Instant;

use flow_cli::display::{to_display_8bit, GammaLut};
use flow_cli::io::load_grayscale;
use flow_cli::{init_threads, FlowPipeline, PipelineError};
use flow_lk::FlowError;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

fn main() -> Result<(), PipelineError> {
    let args: Vec<String> = env::args().collect();
    let prev_path = args.get(1).map(String::as_str).unwrap_or("frame0.png");
    let next_path = args.get(2).map(String::as_str).unwrap_or("frame1.png");
    let out_path = args.get(3).map(String::as_str).unwrap_or("matches.png");

    init_threads(None)?;

    let (prev, pw, ph) = load_grayscale(prev_path)?;
    let (next, nw, nh) = load_grayscale(next_path)?;
    if (pw, ph) != (nw, nh) {
        return Err(FlowError::MismatchedFrames {
            prev: (pw, ph),
            next: (nw, nh),
        }
        .into());
    }

    let pipeline = FlowPipeline::default();

    let t0 = Instant::now();
    let report = pipeline.run(&prev, &next, pw, ph)?;
    let elapsed = t0.elapsed();

    println!("Time taken: {:.2?}", elapsed);
    println!("Detected {} corners", report.corners.len());
    println!(
        "Tracked {} corners, {} inliers after RANSAC",
        report.matches.len(),
        report.estimate.inliers.len()
    );
    let m = report.estimate.model.0;
    println!(
        "Affine model: [{:.4} {:.4} {:.2}; {:.4} {:.4} {:.2}]",
        m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2]
    );

    // Overlay on the previous frame: inlier matches in green with their
    // flow vectors, outliers in red.
    let lut = GammaLut::default();
    let display = to_display_8bit(&prev, &lut);
    let gray = image::GrayImage::from_raw(pw as u32, ph as u32, display)
        .ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "display buffer size mismatch")
        })?;
    let mut output: RgbaImage = image::DynamicImage::ImageLuma8(gray).into_rgba8();

    let inlier_set: std::collections::HashSet<usize> =
        report.estimate.inliers.iter().copied().collect();
    for (i, mat) in report.matches.iter().enumerate() {
        let color = if inlier_set.contains(&i) {
            Rgba([0, 255, 0, 255])
        } else {
            Rgba([255, 0, 0, 255])
        };
        let src = (mat.source.x as f32, mat.source.y as f32);
        draw_hollow_circle_mut(
            &mut output,
            (mat.source.x as i32, mat.source.y as i32),
            3,
            color,
        );
        draw_line_segment_mut(&mut output, src, (mat.tracked.x, mat.tracked.y), color);
    }

    output.save(out_path)?;
    println!("Saved result image as {}", out_path);
    Ok(())
}
