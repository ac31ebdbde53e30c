//! Generate `uaa.yml` for the UAA server.
//!
//! Reads `DB_ADAPTER`, `DB_URL` and `SYSTEM_DOMAIN` from the environment, and
//! the deployment manifest plus UAA's credentials from our mounted secrets.

use std::{env, net::Ipv4Addr, process};
use uaa_config_common::{
    env::{required_var, DB_ADAPTER, DB_URL, SYSTEM_DOMAIN},
    network::discover_ipv4,
    output::OutputDir,
    prelude::*,
    quick_main,
    secret::SecretStore,
    tracing_support::initialize_tracing,
    uaa_config_common_version,
};

mod config;
mod scim;

use crate::config::{UaaConfig, UaaEnv, UaaInputs};

/// Instructions on how to use this program.
const USAGE: &str = "Usage: generate-uaa-config

Writes uaa.yml into $UAA_CONFIG_DIR (default /etc/config), reading secrets
from $UAA_SECRETS_DIR (default /run/secrets).

Requires DB_ADAPTER, DB_URL and SYSTEM_DOMAIN.";

/// The directory we write into unless `UAA_CONFIG_DIR` is set.
const DEFAULT_CONFIG_DIR: &str = "/etc/config";

/// The file we generate.
const CONFIG_FILE: &str = "uaa.yml";

quick_main!(run);

/// Our main entry point.
fn run() -> Result<()> {
    initialize_tracing();

    let args = env::args().skip(1).collect::<Vec<_>>();
    match args.first().map(String::as_str) {
        None => {}
        Some("--version") => {
            println!(
                "{} {} (uaa_config_common {})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                uaa_config_common_version(),
            );
            process::exit(0);
        }
        Some("--help") => {
            println!("{}", USAGE);
            process::exit(0);
        }
        Some(_) => {
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    }

    let uaa_env = UaaEnv {
        system_domain: required_var(SYSTEM_DOMAIN)?,
        db_url: required_var(DB_URL)?,
        db_adapter: required_var(DB_ADAPTER)?,
    };
    let secrets = SecretStore::from_env()?;
    let out = OutputDir::from_env(DEFAULT_CONFIG_DIR)?;
    let addr = discover_ipv4()?;
    generate(&secrets, &out, uaa_env, addr)?;
    Ok(())
}

/// Resolve all our inputs, then write `uaa.yml`.
fn generate(
    secrets: &SecretStore,
    out: &OutputDir,
    uaa_env: UaaEnv,
    addr: Ipv4Addr,
) -> Result<PathBuf> {
    let inputs = UaaInputs::load(secrets, uaa_env, addr)?;
    debug!(
        "generating UAA config for {} with {} OAuth clients",
        inputs.env.system_domain,
        inputs.clients.len(),
    );
    let yaml = UaaConfig::new(&inputs).to_yaml()?;
    out.write(CONFIG_FILE, &yaml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{secrets_dir, uaa_env};
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
addons:
- name: uaa
  jobs:
  - name: uaa
    properties:
      uaa:
        clients:
          cc_service_key_client:
            secret: ((uaa_clients_cc_service_key_client_secret))
"#;

    #[test]
    fn generate_writes_uaa_yml() {
        let secrets = secrets_dir(MANIFEST);
        let out_dir = TempDir::new().unwrap();

        let path = generate(
            &SecretStore::new(secrets.path()),
            &OutputDir::new(out_dir.path()),
            uaa_env(),
            Ipv4Addr::new(10, 1, 2, 3),
        )
        .unwrap();

        assert_eq!(path, out_dir.path().join(CONFIG_FILE));
        let config: serde_json::Value =
            serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            config["oauth"]["clients"]["cc_service_key_client"]["secret"],
            "cc-key"
        );
        assert_eq!(config["zones"]["internal"]["hostnames"][2], "10-1-2-3.uaa-native");
    }

    #[test]
    fn generate_is_idempotent() {
        let secrets = secrets_dir(MANIFEST);
        let out_dir = TempDir::new().unwrap();
        let store = SecretStore::new(secrets.path());
        let out = OutputDir::new(out_dir.path());

        let path = generate(&store, &out, uaa_env(), Ipv4Addr::new(10, 1, 2, 3)).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        generate(&store, &out, uaa_env(), Ipv4Addr::new(10, 1, 2, 3)).unwrap();
        let second = fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_secret_leaves_no_file() {
        let secrets = secrets_dir(MANIFEST);
        fs::remove_file(secrets.path().join("var-uaa-jwt-signing-key/private_key")).unwrap();
        let out_dir = TempDir::new().unwrap();

        let result = generate(
            &SecretStore::new(secrets.path()),
            &OutputDir::new(out_dir.path()),
            uaa_env(),
            Ipv4Addr::new(10, 1, 2, 3),
        );

        assert!(result.is_err());
        assert!(!out_dir.path().join(CONFIG_FILE).exists());
    }
}
