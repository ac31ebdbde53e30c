//! Environment variables supplied by the deployment.

use std::env;

use crate::prelude::*;

/// The domain under which the platform's system routes live.
pub const SYSTEM_DOMAIN: &str = "SYSTEM_DOMAIN";

/// The JDBC-style URL of the UAA database.
pub const DB_URL: &str = "DB_URL";

/// The database adapter, such as `mysql` or `postgresql`.
pub const DB_ADAPTER: &str = "DB_ADAPTER";

/// Overrides the directory our secrets are mounted at.
pub const SECRETS_DIR_OVERRIDE: &str = "UAA_SECRETS_DIR";

/// Overrides the directory we write our config file into.
pub const CONFIG_DIR_OVERRIDE: &str = "UAA_CONFIG_DIR";

/// Look up an environment variable which must be set to a non-empty value.
/// Unset and blank values are both errors, so we never render URLs like
/// `https://uaa.`.
pub fn required_var(name: &str) -> Result<String> {
    let value = env::var(name)
        .with_context(|| format!("couldn't get {} from the environment", name))?;
    if value.trim().is_empty() {
        bail!("{} is set, but it is empty", name);
    }
    Ok(value)
}

/// Look up an optional environment variable, treating an empty value as unset.
pub fn optional_var(name: &str) -> Result<Option<String>> {
    match env::var(name) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => {
            Err(err).with_context(|| format!("couldn't get {} from the environment", name))
        }
    }
}

/// Look up an optional directory override, falling back to `default`.
pub fn dir_from_env(name: &str, default: &str) -> Result<PathBuf> {
    Ok(optional_var(name)?
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names, because tests run in parallel
    // and share one process environment.

    #[test]
    fn required_var_rejects_missing_and_empty_values() {
        env::remove_var("UAA_CONFIG_TEST_MISSING");
        let err = required_var("UAA_CONFIG_TEST_MISSING").unwrap_err();
        assert!(format!("{}", err).contains("UAA_CONFIG_TEST_MISSING"));

        env::set_var("UAA_CONFIG_TEST_EMPTY", "  ");
        assert!(required_var("UAA_CONFIG_TEST_EMPTY").is_err());

        env::set_var("UAA_CONFIG_TEST_PRESENT", "example.com");
        assert_eq!(
            required_var("UAA_CONFIG_TEST_PRESENT").unwrap(),
            "example.com"
        );
    }

    #[test]
    fn dir_from_env_falls_back_to_default() {
        env::remove_var("UAA_CONFIG_TEST_DIR_UNSET");
        assert_eq!(
            dir_from_env("UAA_CONFIG_TEST_DIR_UNSET", "/run/secrets").unwrap(),
            PathBuf::from("/run/secrets"),
        );

        env::set_var("UAA_CONFIG_TEST_DIR_SET", "/tmp/secrets");
        assert_eq!(
            dir_from_env("UAA_CONFIG_TEST_DIR_SET", "/run/secrets").unwrap(),
            PathBuf::from("/tmp/secrets"),
        );
    }
}
