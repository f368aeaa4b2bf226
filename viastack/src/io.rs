//! IO utilities.
//!
//! The packer and emitters never touch the filesystem; these helpers persist
//! their [`Artifact`]s on behalf of callers.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::emit::Artifact;
use crate::error::{with_err_context, ErrorContext, ErrorSource, Result};
use crate::log;

pub fn create_dir_all(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    with_err_context(std::fs::create_dir_all(path), || {
        ErrorContext::CreateDir(path.to_path_buf())
    })?;
    Ok(())
}

pub fn create_file(path: impl AsRef<Path>) -> Result<std::fs::File> {
    let path = path.as_ref();
    let file = with_err_context(std::fs::File::create(path), || {
        ErrorContext::CreateFile(path.to_path_buf())
    })?;
    Ok(file)
}

pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let data = with_err_context(std::fs::read_to_string(path), || {
        ErrorContext::ReadFile(path.to_path_buf())
    })?;
    Ok(data)
}

pub fn canonicalize<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    let path = with_err_context(std::fs::canonicalize(path), || {
        ErrorContext::ReadFile(path.to_path_buf())
    })?;
    Ok(path)
}

/// The path at which `artifact` is stored inside `dest_dir`.
pub fn artifact_path(artifact: &Artifact, dest_dir: impl AsRef<Path>) -> PathBuf {
    dest_dir.as_ref().join(artifact.file_name())
}

/// Fails with [`ErrorSource::AlreadyExists`] if `path` exists.
pub fn ensure_absent(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Err(ErrorSource::AlreadyExists(path.to_path_buf()).into());
    }
    Ok(())
}

/// Writes `artifact` into `dest_dir`, creating the directory if needed.
///
/// Existing artifacts are never overwritten.
pub fn write_artifact(artifact: &Artifact, dest_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dest_dir = dest_dir.as_ref();
    let path = artifact_path(artifact, dest_dir);
    ensure_absent(&path)?;

    if !dest_dir.exists() {
        log::debug!("creating destination directory {dest_dir:?}");
        create_dir_all(dest_dir)?;
    }

    let mut file = create_file(&path)?;
    with_err_context(file.write_all(artifact.contents().as_bytes()), || {
        ErrorContext::CreateFile(path.clone())
    })?;
    log::info!("wrote {} to {path:?}", artifact.name);
    Ok(path)
}
