//! In-memory package builder for tests.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

/// Builds a ZIP package entry by entry.
#[derive(Default)]
pub struct PackageBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry with the given content.
    pub fn entry(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.entries.push((name.to_string(), content.as_ref().to_vec()));
        self
    }

    /// Serialize the package.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in &self.entries {
            writer
                .start_file(name.as_str(), FileOptions::default())
                .expect("start zip entry");
            writer.write_all(content).expect("write zip entry");
        }
        writer.finish().expect("finish zip").into_inner()
    }

    /// Serialize the package, then overwrite the uncompressed size that the
    /// central directory declares for `name`. The stored content is untouched.
    pub fn to_bytes_declaring(&self, name: &str, declared_size: u32) -> Vec<u8> {
        const CENTRAL_HEADER: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];

        let mut bytes = self.to_bytes();
        let mut offset = 0;
        while offset + 46 <= bytes.len() {
            if bytes[offset..offset + 4] != CENTRAL_HEADER {
                offset += 1;
                continue;
            }
            let name_len = u16::from_le_bytes([bytes[offset + 28], bytes[offset + 29]]) as usize;
            let name_start = offset + 46;
            if bytes.get(name_start..name_start + name_len) == Some(name.as_bytes()) {
                bytes[offset + 24..offset + 28].copy_from_slice(&declared_size.to_le_bytes());
                return bytes;
            }
            offset = name_start;
        }
        panic!("no central directory entry named {}", name);
    }

    /// Serialize the package into a seekable reader.
    pub fn build(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.to_bytes())
    }
}
