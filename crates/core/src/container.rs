//! Read access to the ZIP package underlying an Office Open XML document.

use crate::error::{Error, Result};
use std::io::{Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

/// An opened OOXML container.
///
/// Entries are decompressed one at a time on request; the archive itself is
/// never loaded into memory as a whole.
pub struct Container<R: Read + Seek> {
    archive: ZipArchive<R>,
    /// Entry names in archive order.
    names: Vec<String>,
}

impl<R: Read + Seek> Container<R> {
    /// Open a container from a reader.
    ///
    /// Fails with [`Error::Format`] if the stream is not a ZIP archive or the
    /// archive has no entries.
    pub fn open(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::Format(format!("Failed to open ZIP: {}", e)))?;

        if archive.len() == 0 {
            return Err(Error::Format("ZIP archive contains no entries".to_string()));
        }

        let mut names = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| Error::Format(format!("Failed to read entry #{}: {}", index, e)))?;
            names.push(entry.name().to_string());
        }

        log::debug!("Opened container with {} entries", names.len());

        Ok(Self { archive, names })
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether an entry with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Names of all entries satisfying `predicate`, in archive order.
    pub fn list_entries<F>(&self, predicate: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        self.names
            .iter()
            .filter(|name| predicate(name))
            .cloned()
            .collect()
    }

    /// Read an entry's raw bytes.
    ///
    /// The size declared in the archive is not trusted for allocation; an
    /// entry whose content does not match it is a [`Error::Format`] error.
    pub fn read_bytes(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self.archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => Error::MissingEntry(name.to_string()),
            other => Error::Format(format!("Failed to open '{}': {}", name, other)),
        })?;

        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .map_err(|e| Error::Format(format!("Failed to read '{}': {}", name, e)))?;

        if content.len() as u64 != file.size() {
            return Err(Error::Format(format!(
                "Entry '{}' declares {} bytes but holds {}",
                name,
                file.size(),
                content.len()
            )));
        }

        Ok(content)
    }

    /// Read an entry and decode it as UTF-8.
    pub fn read_text(&mut self, name: &str) -> Result<String> {
        let bytes = self.read_bytes(name)?;
        String::from_utf8(bytes)
            .map_err(|_| Error::Format(format!("Entry '{}' is not valid UTF-8", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::PackageBuilder;
    use std::io::Cursor;

    #[test]
    fn test_open_rejects_non_zip() {
        let err = Container::open(Cursor::new(b"not a zip file".to_vec())).err().unwrap();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_open_rejects_empty_archive() {
        let err = Container::open(PackageBuilder::new().build()).err().unwrap();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_read_text_and_bytes() {
        let package = PackageBuilder::new()
            .entry("a.xml", "<a/>")
            .entry("media/b.png", [0x89u8, 0x50]);
        let mut container = Container::open(package.build()).unwrap();

        assert_eq!(container.len(), 2);
        assert_eq!(container.read_text("a.xml").unwrap(), "<a/>");
        assert_eq!(container.read_bytes("media/b.png").unwrap(), vec![0x89, 0x50]);
    }

    #[test]
    fn test_missing_entry() {
        let package = PackageBuilder::new().entry("a.xml", "<a/>");
        let mut container = Container::open(package.build()).unwrap();

        let err = container.read_text("b.xml").unwrap_err();
        assert!(matches!(err, Error::MissingEntry(ref name) if name == "b.xml"));
        assert!(err.is_missing_entry());
    }

    #[test]
    fn test_forged_declared_size_is_format_error() {
        let package = PackageBuilder::new()
            .entry("a.xml", "<a/>")
            .entry("media/big.png", [1u8, 2, 3])
            .to_bytes_declaring("media/big.png", 0xFFFF_FFF0);
        let mut container = Container::open(Cursor::new(package)).unwrap();

        assert!(matches!(container.read_bytes("media/big.png"), Err(Error::Format(_))));
        assert_eq!(container.read_text("a.xml").unwrap(), "<a/>");
    }

    #[test]
    fn test_invalid_utf8_is_format_error() {
        let package = PackageBuilder::new().entry("bad.xml", [0xffu8, 0xfe, 0x00]);
        let mut container = Container::open(package.build()).unwrap();
        assert!(matches!(container.read_text("bad.xml"), Err(Error::Format(_))));
    }

    #[test]
    fn test_list_entries_keeps_archive_order() {
        let package = PackageBuilder::new()
            .entry("ppt/slides/slide2.xml", "")
            .entry("ppt/slides/slide10.xml", "")
            .entry("ppt/presentation.xml", "")
            .entry("ppt/slides/slide1.xml", "");
        let container = Container::open(package.build()).unwrap();

        let slides = container.list_entries(|name| name.starts_with("ppt/slides/"));
        assert_eq!(
            slides,
            vec!["ppt/slides/slide2.xml", "ppt/slides/slide10.xml", "ppt/slides/slide1.xml"]
        );
        assert!(container.contains("ppt/presentation.xml"));
        assert!(!container.contains("ppt/missing.xml"));
    }
}
