//! Reading resources out of dependency archives (JARs) and exploded
//! directories: the template manifest shipped by generator libraries and the
//! JAR manifest used to recognise the generator itself.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use zip::ZipArchive;

mod jar;
mod manifest;

pub use jar::{codegen_version, is_codegen_archive, version_from_jar_name, JarManifest};
pub use manifest::{parse_annotations_manifest, ManifestEntry, ManifestEntryKind};

#[derive(Clone, Debug)]
pub struct Archive {
    path: PathBuf,
}

impl Archive {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a file from the archive.
    ///
    /// Returns `Ok(None)` when the file isn't present.
    pub fn read(&self, name: &str) -> anyhow::Result<Option<Vec<u8>>> {
        if self.path.is_dir() {
            let candidate = self.path.join(name);
            if !candidate.exists() {
                return Ok(None);
            }
            let mut buf = Vec::new();
            File::open(&candidate)
                .with_context(|| format!("failed to open {}", candidate.display()))?
                .read_to_end(&mut buf)
                .with_context(|| format!("failed to read {}", candidate.display()))?;
            return Ok(Some(buf));
        }

        let file = File::open(&self.path)
            .with_context(|| format!("failed to open archive {}", self.path.display()))?;
        let mut zip = ZipArchive::new(file)
            .with_context(|| format!("failed to read zip {}", self.path.display()))?;
        let result = match zip.by_name(name) {
            Ok(mut entry) => {
                let mut buf = Vec::new();
                entry.read_to_end(&mut buf).with_context(|| {
                    format!("failed to read {} from {}", name, self.path.display())
                })?;
                Ok(Some(buf))
            }
            Err(zip::result::ZipError::FileNotFound) => Ok(None),
            Err(err) => Err(err).with_context(|| {
                format!("failed to read {} from zip {}", name, self.path.display())
            }),
        };
        result
    }

    /// Read a text resource; invalid UTF-8 is replaced rather than rejected.
    pub fn read_to_string(&self, name: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .read(name)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Read and parse the template manifest at `manifest_path`.
    ///
    /// Returns an empty list when the archive has no manifest.
    pub fn annotations_manifest(&self, manifest_path: &str) -> anyhow::Result<Vec<ManifestEntry>> {
        let Some(text) = self.read_to_string(manifest_path)? else {
            return Ok(Vec::new());
        };
        let entries = parse_annotations_manifest(&text);
        tracing::debug!(
            archive = %self.path.display(),
            entries = entries.len(),
            "read annotations manifest"
        );
        Ok(entries)
    }
}
