//! The `uaa.yml` file read by the UAA server.

use std::net::Ipv4Addr;
use uaa_config_common::{
    manifest::{resolve_client_secrets, ClientMap, DeploymentManifest},
    network::host_label,
    prelude::*,
    secret::SecretStore,
};

use crate::scim::ScimUser;

/// Where the full deployment manifest is mounted.
pub const MANIFEST_SECRET: &str = "with-ops/manifest.yaml";

/// The ID we use for our single JWT and SAML key.
const KEY_ID: &str = "key-1";

/// The label of our single encryption key.
const ENCRYPTION_KEY_LABEL: &str = "default_key";

/// Values from the environment.
#[derive(Clone, Debug)]
pub struct UaaEnv {
    /// The platform's system domain, such as `example.com`.
    pub system_domain: String,
    /// The database URL.
    pub db_url: String,
    /// The database adapter, such as `mysql`.
    pub db_adapter: String,
}

/// Everything we need to know to generate `uaa.yml`.
#[derive(Clone, Debug)]
pub struct UaaInputs {
    /// Values from the environment.
    pub env: UaaEnv,
    /// The address of this pod.
    pub addr: Ipv4Addr,
    /// The secret for UAA's `admin` OAuth client.
    pub admin_client_secret: String,
    /// The CA certificate UAA should trust.
    pub ca_certificate: String,
    /// The password for the `uaa` database user.
    pub database_password: String,
    /// The passphrase for our encryption key.
    pub encryption_passphrase: String,
    /// The PEM private key used to sign JWTs.
    pub jwt_signing_key: String,
    /// The SAML service provider certificate.
    pub saml_certificate: String,
    /// The private key for `saml_certificate`.
    pub saml_private_key: String,
    /// The password for the `admin` SCIM user.
    pub admin_password: String,
    /// OAuth clients, with their secrets already filled in.
    pub clients: ClientMap,
}

impl UaaInputs {
    /// Read our manifest and secrets from `secrets`.
    pub fn load(secrets: &SecretStore, env: UaaEnv, addr: Ipv4Addr) -> Result<UaaInputs> {
        let clients = load_oauth_clients(secrets)?;
        Ok(UaaInputs {
            env,
            addr,
            admin_client_secret: secrets.read("var-uaa-admin-client-secret/password")?,
            ca_certificate: secrets.read("var-uaa-ca/certificate")?,
            database_password: secrets.read("var-uaa-database-password/password")?,
            encryption_passphrase: secrets
                .read("var-uaa-default-encryption-passphrase/password")?,
            jwt_signing_key: secrets.read("var-uaa-jwt-signing-key/private_key")?,
            saml_certificate: secrets.read("var-uaa-login-saml/certificate")?,
            saml_private_key: secrets.read("var-uaa-login-saml/private_key")?,
            admin_password: secrets.read("var-cf-admin-password/password")?,
            clients,
        })
    }
}

/// Pull the OAuth clients out of the `uaa` job in our deployment manifest,
/// filling in any `((placeholder))` secrets.
///
/// TODO: Declare our OAuth clients directly instead of borrowing them from a
/// BOSH manifest.
pub fn load_oauth_clients(secrets: &SecretStore) -> Result<ClientMap> {
    let manifest = DeploymentManifest::from_yaml(&secrets.read(MANIFEST_SECRET)?)?;
    let job = manifest
        .addon("uaa")
        .and_then(|addon| addon.job("uaa"))
        .with_context(|| format!("could not find the uaa job in {}", MANIFEST_SECRET))?;
    match job.oauth_clients() {
        Some(clients) => resolve_client_secrets(clients, |path| secrets.read(path)),
        None => {
            warn!("the uaa job declares no OAuth clients");
            Ok(ClientMap::new())
        }
    }
}

/// Top-level UAA configuration.
#[derive(Debug, Serialize)]
pub struct UaaConfig {
    /// The `admin` OAuth client.
    pub admin: Admin,
    /// Extra CA certificates to trust, as PEM.
    pub ca_certs: Vec<String>,
    /// How to reach UAA's database.
    pub database: Database,
    /// Keys for encrypting data at rest.
    pub encryption: Encryption,
    /// The issuer named in our tokens.
    pub issuer: Issuer,
    /// Token signing.
    pub jwt: Jwt,
    /// The login server and its SAML identity.
    pub login: Login,
    /// OAuth clients to register at startup.
    pub oauth: OAuth,
    /// SCIM user settings and bootstrap users.
    pub scim: Scim,
    /// Spring profiles to activate, such as `default,mysql`.
    pub spring_profiles: String,
    /// UAA's public URL.
    pub uaa: Uaa,
    /// Identity zone settings.
    pub zones: Zones,
}

#[derive(Debug, Serialize)]
pub struct Admin {
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
pub struct Database {
    pub url: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Encryption {
    /// Which entry of `encryption_keys` to encrypt new data with.
    pub active_key_label: String,
    pub encryption_keys: Vec<EncryptionKey>,
}

#[derive(Debug, Serialize)]
pub struct EncryptionKey {
    pub label: String,
    pub passphrase: String,
}

#[derive(Debug, Serialize)]
pub struct Issuer {
    pub uri: String,
}

#[derive(Debug, Serialize)]
pub struct Jwt {
    pub token: JwtToken,
}

#[derive(Debug, Serialize)]
pub struct JwtToken {
    pub policy: JwtPolicy,
}

/// Token signing keys, keyed by key ID.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtPolicy {
    /// The key ID used to sign new tokens.
    pub active_key_id: String,
    pub keys: BTreeMap<String, JwtKey>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtKey {
    /// A PEM private key.
    pub signing_key: String,
}

/// Login server settings.
#[derive(Debug, Serialize)]
pub struct Login {
    /// Our SAML entity ID, which is the login host name.
    #[serde(rename = "entityID")]
    pub entity_id: String,
    #[serde(rename = "entityBaseURL")]
    pub entity_base_url: String,
    pub saml: Saml,
    pub url: String,
}

/// SAML service provider keys, keyed by key ID.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Saml {
    pub active_key_id: String,
    pub keys: BTreeMap<String, SamlKey>,
}

#[derive(Debug, Serialize)]
pub struct SamlKey {
    pub certificate: String,
    pub key: String,
    /// Always empty, since our key is not encrypted.
    pub passphrase: String,
}

#[derive(Debug, Serialize)]
pub struct OAuth {
    /// Clients keyed by ID, with all of their fields passed through.
    pub clients: ClientMap,
}

#[derive(Debug, Serialize)]
pub struct Scim {
    /// Whether to expose user IDs through the SCIM API.
    pub userids_enabled: bool,
    pub user: ScimUserPolicy,
    /// Users as `|`-separated records. See [`ScimUser`].
    pub users: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ScimUserPolicy {
    /// Whether to update users that already exist in the database.
    #[serde(rename = "override")]
    pub override_existing: bool,
}

#[derive(Debug, Serialize)]
pub struct Uaa {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct Zones {
    pub internal: InternalZone,
}

/// The default identity zone.
#[derive(Debug, Serialize)]
pub struct InternalZone {
    /// Every hostname UAA answers to in this zone.
    pub hostnames: Vec<String>,
}

impl UaaConfig {
    /// Build our configuration from `inputs`.
    pub fn new(inputs: &UaaInputs) -> UaaConfig {
        let domain = &inputs.env.system_domain;
        let uaa_url = format!("https://uaa.{}", domain);
        let login_url = format!("https://login.{}", domain);

        let mut jwt_keys = BTreeMap::new();
        jwt_keys.insert(
            KEY_ID.to_owned(),
            JwtKey {
                signing_key: inputs.jwt_signing_key.clone(),
            },
        );
        let mut saml_keys = BTreeMap::new();
        saml_keys.insert(
            KEY_ID.to_owned(),
            SamlKey {
                certificate: inputs.saml_certificate.clone(),
                key: inputs.saml_private_key.clone(),
                passphrase: String::new(),
            },
        );

        UaaConfig {
            admin: Admin {
                client_secret: inputs.admin_client_secret.clone(),
            },
            ca_certs: vec![inputs.ca_certificate.clone()],
            database: Database {
                url: inputs.env.db_url.clone(),
                username: "uaa".to_owned(),
                password: inputs.database_password.clone(),
            },
            encryption: Encryption {
                active_key_label: ENCRYPTION_KEY_LABEL.to_owned(),
                encryption_keys: vec![EncryptionKey {
                    label: ENCRYPTION_KEY_LABEL.to_owned(),
                    passphrase: inputs.encryption_passphrase.clone(),
                }],
            },
            issuer: Issuer {
                uri: uaa_url.clone(),
            },
            jwt: Jwt {
                token: JwtToken {
                    policy: JwtPolicy {
                        active_key_id: KEY_ID.to_owned(),
                        keys: jwt_keys,
                    },
                },
            },
            login: Login {
                entity_id: format!("login.{}", domain),
                entity_base_url: login_url.clone(),
                saml: Saml {
                    active_key_id: KEY_ID.to_owned(),
                    keys: saml_keys,
                },
                url: login_url,
            },
            oauth: OAuth {
                clients: inputs.clients.clone(),
            },
            scim: Scim {
                userids_enabled: true,
                user: ScimUserPolicy {
                    override_existing: true,
                },
                users: vec![ScimUser::bootstrap_admin(&inputs.admin_password).to_string()],
            },
            spring_profiles: format!("default,{}", inputs.env.db_adapter),
            uaa: Uaa { url: uaa_url },
            zones: Zones {
                internal: InternalZone {
                    hostnames: vec![
                        "uaa.service.cf.internal".to_owned(),
                        "uaa".to_owned(),
                        host_label(inputs.addr),
                    ],
                },
            },
        }
    }

    /// Serialize as YAML.
    ///
    /// We go through `serde_json::Value` first, so the pass-through client
    /// fields end up as plain string-keyed mappings.
    pub fn to_yaml(&self) -> Result<String> {
        let value = serde_json::to_value(self).context("could not convert uaa.yml to JSON")?;
        Ok(serde_yaml::to_string(&value).context("could not serialize uaa.yml")?)
    }
}
