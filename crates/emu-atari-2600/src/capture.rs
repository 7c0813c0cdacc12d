//! Headless capture: PNG screenshots.

#![allow(clippy::cast_possible_truncation)]

use std::error::Error;
use std::fs;
use std::path::Path;

use emu_core::Processor;

use crate::Atari2600;
use crate::video::FrameBuffer;

/// Save a frame as a PNG file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_screenshot(frame: &FrameBuffer, path: &Path) -> Result<(), Box<dyn Error>> {
    let width = frame.width();
    let height = frame.height();

    let file = fs::File::create(path)?;
    let w = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for &pixel in frame.pixels() {
        rgba.extend_from_slice(&[(pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8, 0xFF]);
    }

    writer.write_image_data(&rgba)?;
    Ok(())
}

/// Run `num_frames` frames, saving each one under `dir/frames/`.
///
/// # Errors
///
/// Returns an error if emulation fails or a frame cannot be saved.
pub fn record<P: Processor>(
    vcs: &mut Atari2600<P>,
    dir: &Path,
    num_frames: u32,
) -> Result<(), Box<dyn Error>> {
    let frames_dir = dir.join("frames");
    fs::create_dir_all(&frames_dir)?;

    for i in 1..=num_frames {
        vcs.run_frame()?;
        let filename = frames_dir.join(format!("{i:06}.png"));
        save_screenshot(vcs.framebuffer(), &filename)?;
    }

    log::info!("Captured {num_frames} frames to {}", frames_dir.display());
    Ok(())
}
