use crate::error::{ProcessingError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

/// Extensions that can be read as a layer, in order of preference.
const LAYER_EXTENSIONS: &[&str] = &["shp", "geojson", "json"];

/// Extracts a zipped layer (a shapefile bundle or a GeoJSON file) into a
/// temporary directory that lives as long as the manager.
pub struct TempFileManager {
    temp_dir: TempDir,
    extracted_files: Vec<PathBuf>,
}

impl TempFileManager {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().map_err(|e| {
            ProcessingError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to create temporary directory: {}", e),
            ))
        })?;

        Ok(Self {
            temp_dir,
            extracted_files: Vec::new(),
        })
    }

    pub fn temp_dir_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Extract every file entry, preserving the archive's relative paths.
    pub fn extract_all(&mut self, zip_path: &Path) -> Result<&[PathBuf]> {
        let file = File::open(zip_path)?;
        let mut archive = ZipArchive::new(file)?;

        for i in 0..archive.len() {
            let mut zip_file = archive.by_index(i)?;
            if zip_file.is_dir() {
                continue;
            }

            let Some(relative) = zip_file.enclosed_name().map(Path::to_path_buf) else {
                debug!(entry = zip_file.name(), "skipping unsafe archive entry");
                continue;
            };
            if relative
                .components()
                .any(|c| matches!(c, Component::Normal(name) if name.to_string_lossy().starts_with("__MACOSX")))
            {
                continue;
            }

            let dest_path = self.temp_dir.path().join(&relative);
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let mut dest_file = File::create(&dest_path)?;
            let mut writer = BufWriter::new(&mut dest_file);
            std::io::copy(&mut zip_file, &mut writer)?;
            writer.flush()?;

            self.extracted_files.push(dest_path);
        }

        debug!(
            archive = %zip_path.display(),
            files = self.extracted_files.len(),
            "extracted archive"
        );
        Ok(&self.extracted_files)
    }

    /// The single readable layer among the extracted files.
    pub fn find_layer_file(&self) -> Result<PathBuf> {
        for extension in LAYER_EXTENSIONS {
            let candidates: Vec<&PathBuf> = self
                .extracted_files
                .iter()
                .filter(|p| has_extension(p, extension))
                .collect();

            match candidates.as_slice() {
                [] => continue,
                [single] => return Ok((*single).clone()),
                many => {
                    return Err(ProcessingError::InvalidFormat(format!(
                        "archive contains {} .{} files, expected one",
                        many.len(),
                        extension
                    )))
                }
            }
        }

        Err(ProcessingError::InvalidFormat(
            "archive contains no .shp or .geojson layer".to_string(),
        ))
    }
}

pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
