// Screenshot functionality
//
// Captures the composed RGBA frame buffer and saves it as a PNG file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during screenshot operations
#[derive(Debug)]
pub enum ScreenshotError {
    /// I/O error
    Io(io::Error),

    /// PNG encoding error
    PngEncoding(png::EncodingError),

    /// The frame buffer does not match the reported dimensions
    BadFrameSize { expected: usize, found: usize },
}

impl std::fmt::Display for ScreenshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenshotError::Io(e) => write!(f, "I/O error: {}", e),
            ScreenshotError::PngEncoding(e) => write!(f, "PNG encoding error: {}", e),
            ScreenshotError::BadFrameSize { expected, found } => {
                write!(
                    f,
                    "Frame size mismatch: expected {} bytes, got {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for ScreenshotError {}

impl From<io::Error> for ScreenshotError {
    fn from(e: io::Error) -> Self {
        ScreenshotError::Io(e)
    }
}

impl From<png::EncodingError> for ScreenshotError {
    fn from(e: png::EncodingError) -> Self {
        ScreenshotError::PngEncoding(e)
    }
}

/// Save a screenshot of the current frame
///
/// # Arguments
///
/// * `frame` - RGBA8 frame buffer (width x height x 4 bytes)
/// * `width` / `height` - Frame dimensions in pixels
/// * `rom_path` - Optional path to the currently loaded ROM (for naming)
///
/// # Returns
///
/// Result containing the path to the saved screenshot or an error
pub fn save_screenshot(
    frame: &[u8],
    width: u32,
    height: u32,
    rom_path: Option<&Path>,
) -> Result<PathBuf, ScreenshotError> {
    let expected = (width * height * 4) as usize;
    if frame.len() != expected {
        return Err(ScreenshotError::BadFrameSize {
            expected,
            found: frame.len(),
        });
    }

    // Create screenshots directory
    let screenshots_dir = get_screenshot_directory(rom_path);
    fs::create_dir_all(&screenshots_dir)?;

    // Generate filename with timestamp
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("screenshot_{}.png", timestamp);
    let file_path = screenshots_dir.join(filename);

    save_png(&file_path, frame, width, height)?;

    Ok(file_path)
}

/// Get the screenshot directory for the current ROM
///
/// Creates a directory structure like: screenshots/<rom_name>/
fn get_screenshot_directory(rom_path: Option<&Path>) -> PathBuf {
    let base_dir = PathBuf::from("screenshots");

    if let Some(rom_path) = rom_path {
        if let Some(rom_name) = rom_path.file_stem() {
            return base_dir.join(rom_name);
        }
    }

    base_dir.join("default")
}

/// Save RGBA data as a PNG file
fn save_png(path: &Path, data: &[u8], width: u32, height: u32) -> Result<(), ScreenshotError> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_validation() {
        let frame = vec![0u8; 16];
        let result = save_screenshot(&frame, 256, 224, None);
        assert!(matches!(result, Err(ScreenshotError::BadFrameSize { .. })));
    }

    #[test]
    fn test_get_screenshot_directory() {
        let dir = get_screenshot_directory(None);
        assert!(dir.ends_with("screenshots/default"));

        let rom_path = PathBuf::from("test/game.sfc");
        let dir = get_screenshot_directory(Some(&rom_path));
        assert!(dir.ends_with("screenshots/game"));
    }
}
