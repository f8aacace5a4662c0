//! Replays still images from a directory as a live feed.
//!
//! Files are taken in name order and cycle. The first decodable image fixes the
//! native size; later frames of another size are resized to it.

use image::{RgbaImage, imageops};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use super::device::{CameraDevice, FrameSource};
use super::profiles::ConstraintProfile;
use crate::error::{DeviceError, DeviceErrorKind};

const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, Clone)]
pub struct StillsDevice {
    dir: PathBuf,
}

impl StillsDevice {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn list(&self) -> Result<Vec<PathBuf>, DeviceError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            DeviceError::new(
                DeviceErrorKind::NotFound,
                format!("{}: {}", self.dir.display(), e),
            )
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_image_ext(p))
            .collect();
        files.sort();
        Ok(files)
    }
}

fn has_image_ext(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| EXTENSIONS.contains(&s.to_lowercase().as_str()))
        .unwrap_or(false)
}

impl CameraDevice for StillsDevice {
    /// Size constraints are treated as preferences: a recorded feed has one size.
    fn open(&mut self, profile: &ConstraintProfile) -> Result<Box<dyn FrameSource>, DeviceError> {
        let mut files = self.list()?;

        // First decodable file fixes the native size; drop the unreadable ones before it
        let mut native = None;
        while !files.is_empty() {
            match image::image_dimensions(&files[0]) {
                Ok(dim) if dim.0 > 0 && dim.1 > 0 => {
                    native = Some(dim);
                    break;
                }
                Ok(_) => {
                    files.remove(0);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", files[0].display(), e);
                    files.remove(0);
                }
            }
        }
        let (width, height) = native.ok_or_else(|| {
            DeviceError::new(
                DeviceErrorKind::NotFound,
                format!("no images in {}", self.dir.display()),
            )
        })?;

        debug!(
            "Stills feed '{}' for profile '{}': {} files at {}x{}",
            self.dir.display(),
            profile.label,
            files.len(),
            width,
            height
        );

        Ok(Box::new(StillsStream {
            files,
            next: 0,
            width,
            height,
            active: true,
        }))
    }

    fn name(&self) -> String {
        format!("stills {}", self.dir.display())
    }
}

struct StillsStream {
    files: Vec<PathBuf>,
    next: usize,
    width: u32,
    height: u32,
    active: bool,
}

impl FrameSource for StillsStream {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn poll_ready(&mut self) -> Result<bool, DeviceError> {
        Ok(self.active)
    }

    fn snapshot(&mut self) -> Result<RgbaImage, DeviceError> {
        if !self.active {
            return Err(DeviceError::new(DeviceErrorKind::Other, "stream stopped"));
        }
        let path = &self.files[self.next % self.files.len()];
        self.next += 1;

        let img = image::open(path)
            .map_err(|e| {
                DeviceError::new(DeviceErrorKind::Other, format!("{}: {}", path.display(), e))
            })?
            .to_rgba8();

        if img.dimensions() == (self.width, self.height) {
            Ok(img)
        } else {
            Ok(imageops::resize(
                &img,
                self.width,
                self.height,
                imageops::FilterType::Triangle,
            ))
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn stop(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_cycles_in_name_order() {
        let dir = scratch("photobooth_test_stills_cycle");
        RgbaImage::from_pixel(4, 3, Rgba([1, 0, 0, 255]))
            .save(dir.join("a.png"))
            .unwrap();
        RgbaImage::from_pixel(8, 6, Rgba([2, 0, 0, 255]))
            .save(dir.join("b.png"))
            .unwrap();
        std::fs::write(dir.join("notes.txt"), "not an image").unwrap();

        let mut device = StillsDevice::new(&dir);
        let mut stream = device.open(&ConstraintProfile::any()).unwrap();
        assert_eq!(stream.dimensions(), (4, 3));

        let reds: Vec<u8> = (0..3)
            .map(|_| stream.snapshot().unwrap())
            .map(|img| {
                assert_eq!(img.dimensions(), (4, 3));
                img.get_pixel(0, 0)[0]
            })
            .collect();
        assert_eq!(reds, vec![1, 2, 1]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_dir_not_found() {
        let dir = scratch("photobooth_test_stills_empty");
        let mut device = StillsDevice::new(&dir);
        let err = device.open(&ConstraintProfile::any()).err().unwrap();
        assert_eq!(err.kind, DeviceErrorKind::NotFound);

        let mut missing = StillsDevice::new(dir.join("nope"));
        let err = missing.open(&ConstraintProfile::any()).err().unwrap();
        assert_eq!(err.kind, DeviceErrorKind::NotFound);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
