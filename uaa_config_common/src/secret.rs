//! Secrets mounted into our container by the deployment.

use std::fs;

use crate::env::{dir_from_env, SECRETS_DIR_OVERRIDE};
use crate::prelude::*;

/// Where Kubernetes mounts our secrets unless told otherwise.
pub const DEFAULT_SECRETS_DIR: &str = "/run/secrets";

/// A directory of mounted secrets. Each secret is a single file, addressed by
/// a path like `var-nats-password/password` relative to the root.
#[derive(Clone, Debug)]
pub struct SecretStore {
    root: PathBuf,
}

impl SecretStore {
    /// Read secrets from below `root`.
    pub fn new<P: Into<PathBuf>>(root: P) -> SecretStore {
        SecretStore { root: root.into() }
    }

    /// Read secrets from `$UAA_SECRETS_DIR`, or from `/run/secrets` if it's
    /// not set.
    pub fn from_env() -> Result<SecretStore> {
        Ok(SecretStore::new(dir_from_env(
            SECRETS_DIR_OVERRIDE,
            DEFAULT_SECRETS_DIR,
        )?))
    }

    /// The directory we read secrets from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The full path of the secret `relative_path`.
    pub fn path(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path)
    }

    /// Read the secret at `relative_path`, stripping any trailing whitespace.
    ///
    /// There's no sensible default for a missing secret, so this fails if the
    /// file can't be read.
    pub fn read(&self, relative_path: &str) -> Result<String> {
        let path = self.path(relative_path);
        debug!("reading secret {}", relative_path);
        let mut value = fs::read_to_string(&path)
            .with_context(|| format!("could not read secret {}", path.display()))?;
        let trimmed_len = value.trim_end().len();
        value.truncate(trimmed_len);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_strips_trailing_whitespace_only() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("var-nats-password")).unwrap();
        fs::write(
            dir.path().join("var-nats-password/password"),
            "  s3cret\r\n\n",
        )
        .unwrap();

        let store = SecretStore::new(dir.path());
        assert_eq!(store.read("var-nats-password/password").unwrap(), "  s3cret");
    }

    #[test]
    fn read_keeps_multi_line_certificates() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("var-uaa-ca")).unwrap();
        let pem = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";
        fs::write(dir.path().join("var-uaa-ca/certificate"), pem).unwrap();

        let store = SecretStore::new(dir.path());
        assert_eq!(
            store.read("var-uaa-ca/certificate").unwrap(),
            "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----",
        );
    }

    #[test]
    fn missing_secret_names_its_path() {
        let dir = TempDir::new().unwrap();
        let store = SecretStore::new(dir.path());
        let err = store.read("var-uaa-ca/certificate").unwrap_err();
        assert!(format!("{}", err).contains("var-uaa-ca/certificate"));
    }
}
