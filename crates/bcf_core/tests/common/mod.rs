#![allow(dead_code)]

use bcf_core::{BcfDocument, DocumentError};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub const MARKUP_XML: &str = "<Markup><Topic Guid=\"t\"><Title>Clash</Title></Topic></Markup>";
pub const VIEWPOINT_XML: &str = "<VisualizationInfo><PerspectiveCamera/></VisualizationInfo>";
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3];

/// Writes a zip with the given `(name, bytes)` entries; names ending in `/` become directories.
pub fn build_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).expect("archive file should be created");
    let mut writer = ZipWriter::new(file);
    for (name, bytes) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(name.trim_end_matches('/'), SimpleFileOptions::default())
                .expect("directory entry should be added");
        } else {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("entry should start");
            writer.write_all(bytes).expect("entry should be written");
        }
    }
    writer.finish().expect("archive should finish");
}

/// Entry names of a zip in central-directory order.
pub fn entry_names(path: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(File::open(path).expect("archive should open"))
        .expect("archive should parse");
    (0..archive.len())
        .map(|index| {
            archive
                .by_index(index)
                .expect("entry should be readable")
                .name()
                .to_string()
        })
        .collect()
}

pub fn entry_bytes(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(path).expect("archive should open"))
        .expect("archive should parse");
    let mut entry = archive.by_name(name).expect("entry should exist");
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).expect("entry should read");
    bytes
}

/// Files and directories directly under `dir`.
pub fn dir_listing(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|entry| entry.expect("dir entry").path())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Markup collaborator whose save always fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsavableMarkup(pub String);

impl BcfDocument for UnsavableMarkup {
    const ROLE: &'static str = "markup";

    fn empty() -> Self {
        Self(String::new())
    }

    fn load_from_path(path: &Path) -> Result<Self, DocumentError> {
        std::fs::read_to_string(path)
            .map(Self)
            .map_err(|source| DocumentError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    fn save_to_path(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, b"<Markup").map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Err(DocumentError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "serializer rejected markup"),
        })
    }
}
