use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Non-blank, trimmed lines of a seed file.
pub fn read_seed_lines(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Move a processed seed file into `archive_dir`. Returns its new path.
pub fn archive_seed_file(path: &Path, archive_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(archive_dir)
        .with_context(|| format!("Failed to create archive dir: {}", archive_dir.display()))?;
    let file_name = path
        .file_name()
        .with_context(|| format!("Seed path has no file name: {}", path.display()))?;
    let destination = archive_dir.join(file_name);

    if fs::rename(path, &destination).is_err() {
        // rename fails across filesystems
        fs::copy(path, &destination).with_context(|| {
            format!(
                "Failed to archive {} to {}",
                path.display(),
                destination.display()
            )
        })?;
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove archived seed file: {}", path.display()))?;
    }

    Ok(destination)
}
