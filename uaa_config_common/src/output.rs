//! Writing generated configuration files.

use std::{fs, io::Write, os::unix::fs::PermissionsExt};

use tempfile::NamedTempFile;

use crate::env::{dir_from_env, CONFIG_DIR_OVERRIDE};
use crate::prelude::*;

/// The directory a generator writes its config file into.
#[derive(Clone, Debug)]
pub struct OutputDir {
    dir: PathBuf,
}

impl OutputDir {
    /// Write files into `dir`.
    pub fn new<P: Into<PathBuf>>(dir: P) -> OutputDir {
        OutputDir { dir: dir.into() }
    }

    /// Write files into `$UAA_CONFIG_DIR`, or into `default` if it's not set.
    pub fn from_env(default: &str) -> Result<OutputDir> {
        Ok(OutputDir::new(dir_from_env(CONFIG_DIR_OVERRIDE, default)?))
    }

    /// The full path of `file_name` in this directory.
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Replace `file_name` with `contents`.
    ///
    /// We write to a temporary file next to the target and rename it into
    /// place, so readers see either the old file or the complete new one.
    pub fn write(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path(file_name);
        let mut tmp = NamedTempFile::new_in(&self.dir).with_context(|| {
            format!("could not create temporary file in {}", self.dir.display())
        })?;
        tmp.write_all(contents.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .with_context(|| format!("could not write {}", path.display()))?;
        // Temporary files are created 0600, but other containers in the pod
        // read our output.
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o644))
            .with_context(|| format!("could not set permissions on {}", path.display()))?;
        tmp.persist(&path)
            .with_context(|| format!("could not replace {}", path.display()))?;
        info!("wrote {}", path.display());
        Ok(path)
    }
}
