//! Generate `registrar_settings.json`, which tells the route registrar how to
//! advertise UAA's routes.
//!
//! Reads `SYSTEM_DOMAIN` from the environment and the NATS password from our
//! mounted secrets.

use std::{env, net::Ipv4Addr, path::PathBuf, process};
use tracing::debug;
use uaa_config_common::{
    env::{required_var, SYSTEM_DOMAIN},
    network::discover_ipv4,
    output::OutputDir,
    quick_main,
    secret::SecretStore,
    tracing_support::initialize_tracing,
    uaa_config_common_version, Result,
};

mod settings;

use crate::settings::{RegistrarInputs, RegistrarSettings};

/// Instructions on how to use this program.
const USAGE: &str = "Usage: generate-route-registrar-config

Writes registrar_settings.json into $UAA_CONFIG_DIR (default /run/config),
reading secrets from $UAA_SECRETS_DIR (default /run/secrets).";

/// The directory we write into unless `UAA_CONFIG_DIR` is set.
const DEFAULT_CONFIG_DIR: &str = "/run/config";

/// The file we generate.
const SETTINGS_FILE: &str = "registrar_settings.json";

quick_main!(run);

/// Our main entry point.
fn run() -> Result<()> {
    initialize_tracing();

    // We take no real arguments, so parse manually.
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

    let system_domain = required_var(SYSTEM_DOMAIN)?;
    let secrets = SecretStore::from_env()?;
    let out = OutputDir::from_env(DEFAULT_CONFIG_DIR)?;
    let addr = discover_ipv4()?;
    generate(&secrets, &out, system_domain, addr)?;
    Ok(())
}

/// Resolve all our inputs, then write our settings file.
fn generate(
    secrets: &SecretStore,
    out: &OutputDir,
    system_domain: String,
    addr: Ipv4Addr,
) -> Result<PathBuf> {
    let inputs = RegistrarInputs::load(secrets, system_domain, addr)?;
    debug!("generating route registrar settings for {}", inputs.system_domain);
    let json = RegistrarSettings::new(&inputs).to_json()?;
    out.write(SETTINGS_FILE, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn generate_writes_settings_file() {
        let secrets_dir = TempDir::new().unwrap();
        fs::create_dir(secrets_dir.path().join("var-nats-password")).unwrap();
        fs::write(
            secrets_dir.path().join("var-nats-password/password"),
            "nats-pw\n",
        )
        .unwrap();
        let out_dir = TempDir::new().unwrap();

        let path = generate(
            &SecretStore::new(secrets_dir.path()),
            &OutputDir::new(out_dir.path()),
            "example.com".to_owned(),
            Ipv4Addr::new(172, 17, 0, 4),
        )
        .unwrap();

        assert_eq!(path, out_dir.path().join(SETTINGS_FILE));
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["host"], "172-17-0-4.uaa-native");
        assert_eq!(parsed["message_bus_servers"][0]["password"], "nats-pw");
    }

    #[test]
    fn missing_secret_leaves_no_file() {
        let secrets_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();

        let result = generate(
            &SecretStore::new(secrets_dir.path()),
            &OutputDir::new(out_dir.path()),
            "example.com".to_owned(),
            Ipv4Addr::new(172, 17, 0, 4),
        );

        assert!(result.is_err());
        assert!(!out_dir.path().join(SETTINGS_FILE).exists());
    }
}
