//! Pipeline checkout for hosts missing the voice scripts
//!
//! Performs a shallow, blobless, sparse clone of the pipeline repository
//! into a staging directory, then imports the voice subtree into the
//! voice directory. The staging clone is removed whether or not the
//! import succeeds.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Fetch the voice subtree of the pipeline repository into `voice_dir`
///
/// Returns the number of files imported.
///
/// # Errors
///
/// Returns error if git is unavailable, the clone or sparse-checkout
/// fails, the repository has no such subtree, or the import cannot write
/// into the voice directory.
pub async fn fetch_pipeline(repo: &str, subdir: &str, voice_dir: &Path) -> Result<usize> {
    let staging = tempfile::tempdir().map_err(|e| {
        Error::Checkout(format!("failed to create staging directory: {e}"))
    })?;
    let clone_dir = staging.path().join("pipeline");

    tracing::info!(repo, subdir, "fetching pipeline scripts");

    run_git(&[
        "clone",
        "--depth",
        "1",
        "--filter=blob:none",
        "--sparse",
        repo,
        &clone_dir.to_string_lossy(),
    ])
    .await?;

    run_git(&[
        "-C",
        &clone_dir.to_string_lossy(),
        "sparse-checkout",
        "set",
        subdir,
    ])
    .await?;

    let subtree = clone_dir.join(subdir);
    if !subtree.is_dir() {
        return Err(Error::Checkout(format!(
            "repository {repo} has no {subdir} directory"
        )));
    }

    let imported = import_tree(&subtree, voice_dir)?;
    tracing::info!(imported, dest = %voice_dir.display(), "pipeline scripts imported");

    staging.close()?;
    Ok(imported)
}

/// Run a git subcommand, surfacing stderr on failure
async fn run_git(args: &[&str]) -> Result<()> {
    let output = tokio::process::Command::new("git")
        .args(args)
        .output()
        .await
        .map_err(|e| Error::Checkout(format!("failed to run git: {e}")))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(Error::Checkout(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or_default(),
            stderr.trim()
        )))
    }
}

/// Copy a directory tree into `dest`, returning the number of files copied
///
/// Existing files are overwritten so a re-fetch refreshes stale scripts.
///
/// # Errors
///
/// Returns error if a directory cannot be read or a file cannot be copied.
pub fn import_tree(src: &Path, dest: &Path) -> Result<usize> {
    let mut copied = 0;
    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(src.to_path_buf(), dest.to_path_buf())];

    while let Some((from, to)) = pending.pop() {
        std::fs::create_dir_all(&to)?;
        for entry in std::fs::read_dir(&from)? {
            let entry = entry?;
            let target = to.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                pending.push((entry.path(), target));
            } else {
                std::fs::copy(entry.path(), &target)?;
                copied += 1;
            }
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_copies_nested_tree() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();

        std::fs::write(src.path().join("client.py"), "a").unwrap();
        std::fs::create_dir(src.path().join("whisper")).unwrap();
        std::fs::write(src.path().join("whisper/audio_stream.py"), "b").unwrap();

        let copied = import_tree(src.path(), dest.path()).unwrap();
        assert_eq!(copied, 2);
        assert!(dest.path().join("client.py").is_file());
        assert!(dest.path().join("whisper/audio_stream.py").is_file());
    }

    #[test]
    fn import_overwrites_existing_files() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();

        std::fs::write(src.path().join("client.py"), "new").unwrap();
        std::fs::write(dest.path().join("client.py"), "old").unwrap();

        import_tree(src.path(), dest.path()).unwrap();
        assert_eq!(
            std::fs::read_to_string(dest.path().join("client.py")).unwrap(),
            "new"
        );
    }

    #[test]
    fn import_into_missing_dest_creates_it() {
        let src = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("client.py"), "a").unwrap();

        let dest = root.path().join("voice");
        let copied = import_tree(src.path(), &dest).unwrap();
        assert_eq!(copied, 1);
        assert!(dest.join("client.py").is_file());
    }
}
