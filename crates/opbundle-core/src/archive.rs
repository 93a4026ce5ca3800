//! Reading bundles packaged as `.tar.gz` archives
//!
//! Archives are read in memory; nothing is unpacked to disk.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tar::Archive;

use crate::bundle::{MANIFESTS_DIR, is_manifest_file};
use crate::error::{CoreError, Result};

/// Check if a path looks like a gzipped tarball
pub fn is_archive(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.ends_with(".tar.gz") || name.ends_with(".tgz")
}

/// Archive file name without its `.tar.gz` / `.tgz` suffix
pub fn archive_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    name.strip_suffix(".tar.gz")
        .or_else(|| name.strip_suffix(".tgz"))
        .unwrap_or(name.as_str())
        .to_string()
}

/// Read manifest documents from an archive
///
/// When the archive contains a `manifests/` directory (at any depth) only
/// files below it are returned, otherwise every manifest file is. Entries are
/// sorted by path.
pub fn read_manifest_documents(archive_path: &Path) -> Result<Vec<(PathBuf, String)>> {
    let file = File::open(archive_path)?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);

    let mut documents = Vec::new();
    let mut has_manifests_dir = false;

    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry.path()?.to_path_buf();
        if !is_manifest_file(&path) {
            continue;
        }

        let in_manifests = path
            .components()
            .any(|c| matches!(c, Component::Normal(name) if name == MANIFESTS_DIR));
        has_manifests_dir |= in_manifests;

        let mut content = String::new();
        entry.read_to_string(&mut content).map_err(|e| CoreError::Archive {
            message: format!("{}: {}", path.display(), e),
        })?;

        documents.push((path, content, in_manifests));
    }

    let mut documents: Vec<(PathBuf, String)> = documents
        .into_iter()
        .filter(|(_, _, in_manifests)| !has_manifests_dir || *in_manifests)
        .map(|(path, content, _)| (path, content))
        .collect();
    documents.sort_by(|a, b| a.0.cmp(&b.0));

    tracing::debug!(
        archive = %archive_path.display(),
        documents = documents.len(),
        "Read manifests from archive"
    );

    Ok(documents)
}
