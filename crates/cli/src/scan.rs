//! Pre-transfer inspection of the upload source.
//!
//! Directory uploads are tracked by file count, so the total must be
//! known before the job is submitted. The walk skips the same metadata
//! directories the engine is told to exclude, keeping the declared total
//! in step with what the engine will actually transfer.

use std::path::Path;

/// Counts the files under `root` that a directory upload will transfer.
///
/// `excluded` holds relative path prefixes to skip, matching the
/// exclusion set passed to the engine.
pub fn count_upload_files(root: &Path, excluded: &[&str]) -> std::io::Result<u64> {
    let mut count = 0;
    walk_dir(root, root, excluded, &mut count)?;
    Ok(count)
}

fn walk_dir(
    root: &Path,
    current: &Path,
    excluded: &[&str],
    count: &mut u64,
) -> std::io::Result<()> {
    for entry in std::fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;

        if metadata.is_dir() {
            let rel = path.strip_prefix(root).map_err(std::io::Error::other)?;
            if excluded.iter().any(|prefix| rel == Path::new(prefix)) {
                continue;
            }
            walk_dir(root, &path, excluded, count)?;
        } else if metadata.is_file() {
            *count += 1;
        }
    }

    Ok(())
}
