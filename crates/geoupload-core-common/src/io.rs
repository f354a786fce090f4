//! Reader traits implemented by every supported input format.
//!
//! A [`FeatureReader`] opens a dataset described by a [`FileDescriptor`] inside a
//! working directory. The resulting [`Dataset`] hands out its features once, as a
//! lazy forward-only [`FeatureStream`].

use std::path::{Path, PathBuf};

use format_shared::{FormatReadError, FormatResult};

use crate::crs::Crs;
use crate::descriptor::FileDescriptor;
use crate::feature::{FeatureRecord, FieldInfo};

/// Single-pass stream of features borrowed from an open [`Dataset`].
pub type FeatureStream<'a> = Box<dyn Iterator<Item = FormatResult<FeatureRecord>> + 'a>;

/// Capability shared by all format readers.
pub trait FeatureReader {
    /// Opens the dataset described by `descriptor`.
    ///
    /// Paths in the descriptor are resolved against `work_dir` when relative.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatReadError`] if the files are missing or malformed.
    fn open(&self, work_dir: &Path, descriptor: &FileDescriptor) -> FormatResult<Box<dyn Dataset>>;
}

/// An opened dataset.
pub trait Dataset {
    /// Name of the feature type (layer), usually the primary file stem.
    fn type_name(&self) -> &str;

    /// CRS declared by the source, if any.
    fn native_crs(&self) -> Option<Crs>;

    /// Attribute columns known before reading features. Empty for schemaless formats.
    fn fields(&self) -> Vec<FieldInfo> {
        Vec::new()
    }

    /// Streams the features. The stream is not restartable: a second call yields
    /// whatever the first one left unread.
    fn features(&mut self) -> FeatureStream<'_>;
}

/// Resolves the descriptor's primary file against `work_dir`.
///
/// # Errors
///
/// Returns [`FormatReadError::Io`] when the descriptor is empty.
pub fn resolve_primary(work_dir: &Path, descriptor: &FileDescriptor) -> FormatResult<PathBuf> {
    let primary = descriptor.primary_file().ok_or_else(|| FormatReadError::Io {
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "descriptor lists no files"),
        context: Some(descriptor.original_name().to_string()),
    })?;
    Ok(work_dir.join(primary))
}

/// Resolves the first descriptor file with `extension` against `work_dir`.
#[must_use]
pub fn resolve_companion(
    work_dir: &Path,
    descriptor: &FileDescriptor,
    extension: &str,
) -> Option<PathBuf> {
    descriptor
        .file_with_extension(extension)
        .map(|file| work_dir.join(file))
}

/// File stem of `path`, used as the default type name and feature id prefix.
#[must_use]
pub fn type_name_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "features".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_and_absolute_paths() {
        let mut fd = FileDescriptor::new("roads");
        fd.add_file("roads.shp");
        fd.add_file("/data/roads.dbf");

        let work = Path::new("/uploads/42");
        assert_eq!(
            resolve_primary(work, &fd).unwrap(),
            PathBuf::from("/uploads/42/roads.shp")
        );
        assert_eq!(
            resolve_companion(work, &fd, "DBF"),
            Some(PathBuf::from("/data/roads.dbf"))
        );
        assert_eq!(resolve_companion(work, &fd, "prj"), None);
    }

    #[test]
    fn empty_descriptor_is_an_io_error() {
        let fd = FileDescriptor::new("empty");
        let err = resolve_primary(Path::new("."), &fd).unwrap_err();
        assert!(matches!(err, FormatReadError::Io { .. }));
    }

    #[test]
    fn type_name_is_file_stem() {
        assert_eq!(type_name_of(Path::new("/a/regions.kml")), "regions");
    }
}
