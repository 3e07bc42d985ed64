//! Writing extracted images to the output directory.

use crate::error::Result;
use crate::types::ImageRef;
use std::fs;
use std::path::PathBuf;

/// Writes images for a single extraction call under generated names.
///
/// The ordinal counter belongs to the sink, so concurrent extractions with
/// distinct seeds never share or interleave counters.
#[derive(Debug)]
pub struct ImageSink {
    output_dir: PathBuf,
    seed: u64,
    /// Ordinal the next written image receives.
    next_ordinal: usize,
    written: Vec<ImageRef>,
}

impl ImageSink {
    /// Create a sink writing into `output_dir`, creating it if needed.
    pub fn create(output_dir: impl Into<PathBuf>, seed: u64) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;

        Ok(Self {
            output_dir,
            seed,
            next_ordinal: 1,
            written: Vec::new(),
        })
    }

    /// Generated file name for a 1-based ordinal.
    pub fn file_name(seed: u64, ordinal: usize) -> String {
        format!("image_{}_{}.png", seed, ordinal)
    }

    /// Write one image. The ordinal only advances when the write succeeds.
    pub fn write(&mut self, original_path: &str, bytes: &[u8]) -> Result<ImageRef> {
        let file_name = Self::file_name(self.seed, self.next_ordinal);
        fs::write(self.output_dir.join(&file_name), bytes)?;
        self.next_ordinal += 1;

        log::debug!("Extracted {} -> {}", original_path, file_name);

        let image = ImageRef {
            file_name,
            original_path: original_path.to_string(),
        };
        self.written.push(image.clone());
        Ok(image)
    }

    /// Number of images written so far.
    pub fn count(&self) -> usize {
        self.written.len()
    }

    /// Consume the sink, returning every image written in ordinal order.
    pub fn into_written(self) -> Vec<ImageRef> {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_names_are_sequential_per_sink() {
        let dir = TempDir::new().unwrap();
        let mut sink = ImageSink::create(dir.path(), 1700000000000).unwrap();

        let first = sink.write("ppt/media/image1.png", b"one").unwrap();
        let second = sink.write("ppt/media/image2.jpeg", b"two").unwrap();

        assert_eq!(first.file_name, "image_1700000000000_1.png");
        assert_eq!(second.file_name, "image_1700000000000_2.png");
        assert_eq!(second.original_path, "ppt/media/image2.jpeg");
        assert_eq!(fs::read(dir.path().join(&second.file_name)).unwrap(), b"two");
        assert_eq!(sink.count(), 2);
    }

    #[test]
    fn test_creates_missing_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("uploads").join("images");

        let mut sink = ImageSink::create(&nested, 5).unwrap();
        sink.write("xl/media/image1.png", b"px").unwrap();

        assert!(nested.join("image_5_1.png").is_file());
    }

    #[test]
    fn test_separate_sinks_do_not_share_counters() {
        let dir = TempDir::new().unwrap();
        let mut a = ImageSink::create(dir.path(), 1).unwrap();
        let mut b = ImageSink::create(dir.path(), 2).unwrap();

        a.write("m/a.png", b"a").unwrap();
        let from_b = b.write("m/b.png", b"b").unwrap();

        assert_eq!(from_b.file_name, "image_2_1.png");
        assert_eq!(a.into_written().len(), 1);
    }
}
