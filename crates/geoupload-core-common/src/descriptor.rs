//! Description of the files that make up one uploaded dataset.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The sibling files that together form one logical dataset, e.g. a Shapefile's
/// `.shp`/`.shx`/`.dbf`/`.prj` set.
///
/// Files keep insertion order; the first one is the primary file whose extension
/// selects the reader. Every file's lower-cased extension is in [`extensions`](Self::extensions).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDescriptor {
    original_name: String,
    files: Vec<PathBuf>,
    extensions: BTreeSet<String>,
}

/// Lower-cased extension of `path`, without the dot.
#[must_use]
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

impl FileDescriptor {
    /// Creates an empty descriptor for an upload named `original_name`.
    pub fn new(original_name: impl Into<String>) -> Self {
        Self {
            original_name: original_name.into(),
            ..Self::default()
        }
    }

    /// Creates a descriptor holding a single file.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut descriptor = Self::new(name);
        descriptor.add_file(path);
        descriptor
    }

    /// Builds a descriptor from `primary` and every file in `work_dir` with the same stem.
    ///
    /// Only the file name of `primary` is used. Stems compare case-insensitively;
    /// siblings are added in name order after the primary file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if `work_dir` cannot be listed.
    pub fn discover(work_dir: &Path, primary: impl AsRef<Path>) -> io::Result<Self> {
        let primary = primary.as_ref();
        let primary_name = primary
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "primary file has no name"))?;
        let stem = primary
            .file_stem()
            .map(|s| s.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let mut descriptor = Self::new(primary_name.to_string_lossy());
        descriptor.add_file(primary_name);

        let mut siblings = Vec::new();
        for entry in fs::read_dir(work_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if name.as_os_str() == primary_name {
                continue;
            }
            let path = PathBuf::from(&name);
            let sibling_stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_ascii_lowercase());
            if sibling_stem.as_deref() == Some(stem.as_str()) {
                siblings.push(path);
            }
        }
        siblings.sort();
        for sibling in siblings {
            descriptor.add_file(sibling);
        }

        log::debug!(
            "Discovered {} file(s) for dataset '{}'",
            descriptor.files.len(),
            descriptor.original_name
        );
        Ok(descriptor)
    }

    /// Appends a file and records its extension.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if let Some(ext) = extension_of(&path) {
            self.extensions.insert(ext);
        }
        self.files.push(path);
    }

    #[must_use]
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    #[must_use]
    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The file whose extension selects the reader.
    #[must_use]
    pub fn primary_file(&self) -> Option<&Path> {
        self.files.first().map(PathBuf::as_path)
    }

    #[must_use]
    pub fn primary_extension(&self) -> Option<String> {
        self.primary_file().and_then(extension_of)
    }

    #[must_use]
    pub fn has_extension(&self, extension: &str) -> bool {
        self.extensions.contains(&extension.to_ascii_lowercase())
    }

    /// First file carrying `extension` (any case).
    #[must_use]
    pub fn file_with_extension(&self, extension: &str) -> Option<&Path> {
        self.files
            .iter()
            .find(|f| {
                extension_of(f).is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
            })
            .map(PathBuf::as_path)
    }

    /// Required extensions absent from this descriptor.
    #[must_use]
    pub fn missing_companions(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|ext| !self.has_extension(ext))
            .map(|ext| (*ext).to_string())
            .collect()
    }
}
