//! The parts of a BOSH-style deployment manifest that we care about.
//!
//! We only model the path down to the UAA job's OAuth clients, and ignore
//! everything else in the document. Each client is kept as an open-ended
//! mapping, because UAA understands far more client fields than we touch.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::prelude::*;

/// OAuth clients, keyed by client ID.
pub type ClientMap = BTreeMap<String, OAuthClient>;

/// A deployment manifest.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DeploymentManifest {
    /// Add-ons, each of which bundles a list of jobs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub addons: Vec<Addon>,
}

impl DeploymentManifest {
    /// Parse a manifest from YAML.
    pub fn from_yaml(yaml: &str) -> Result<DeploymentManifest> {
        serde_yaml::from_str(yaml).context("could not parse deployment manifest")
    }

    /// Find the add-on named `name`.
    pub fn addon(&self, name: &str) -> Result<&Addon> {
        self.addons
            .iter()
            .find(|addon| addon.name == name)
            .ok_or_else(|| format_err!("manifest has no addon named {:?}", name))
    }
}

/// A group of jobs in a manifest.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Addon {
    /// The name of this add-on.
    pub name: String,
    /// The jobs which make up this add-on.
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs: Vec<Job>,
}

impl Addon {
    /// Find the job named `name`.
    pub fn job(&self, name: &str) -> Result<&Job> {
        self.jobs
            .iter()
            .find(|job| job.name == name)
            .ok_or_else(|| {
                format_err!("addon {:?} has no job named {:?}", self.name, name)
            })
    }
}

/// A job within an add-on.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Job {
    /// The name of this job.
    pub name: String,
    /// Job properties. `properties: ~` is treated like no properties.
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: JobProperties,
}

impl Job {
    /// The OAuth clients declared under `properties.uaa.clients`, if any.
    pub fn oauth_clients(&self) -> Option<&ClientMap> {
        self.properties
            .uaa
            .as_ref()
            .and_then(|uaa| uaa.clients.as_ref())
    }
}

/// The properties of a job.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct JobProperties {
    /// Properties for the UAA server.
    #[serde(default)]
    pub uaa: Option<UaaProperties>,
}

/// UAA server properties.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct UaaProperties {
    /// OAuth clients to register.
    #[serde(default)]
    pub clients: Option<ClientMap>,
}

/// Deserialize a YAML `~` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> ::std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An OAuth client registration.
///
/// We keep every field exactly as written, including a `secret: ~`, and only
/// ever replace a `secret` holding a placeholder.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OAuthClient {
    /// The client's fields, such as `secret`, `scope` and `authorities`.
    pub fields: Map<String, Value>,
}

impl OAuthClient {
    /// The raw `secret` field, if present.
    pub fn secret(&self) -> Option<&Value> {
        self.fields.get("secret")
    }

    /// Replace the `secret` field with `value`.
    pub fn set_secret(&mut self, value: String) {
        self.fields.insert("secret".to_owned(), Value::String(value));
    }

    /// If `secret` is a placeholder like `((uaa_clients_cc_secret))`, return
    /// the placeholder name. Anything else, including non-string secrets and
    /// placeholders with surrounding whitespace, is not a placeholder.
    pub fn secret_placeholder(&self) -> Option<&str> {
        lazy_static! {
            static ref PLACEHOLDER: Regex =
                Regex::new(r"^\(\((?P<name>[^)]+)\)\)$").expect("invalid regex in source");
        }
        let secret = self.secret()?.as_str()?;
        PLACEHOLDER
            .captures(secret)
            .and_then(|caps| caps.name("name"))
            .map(|name| name.as_str())
    }
}

/// The secret file holding the value of the placeholder `name`. Underscores
/// become hyphens, so `uaa_clients_cc_secret` lives in
/// `var-uaa-clients-cc-secret/password`.
pub fn placeholder_secret_path(name: &str) -> String {
    format!("var-{}/password", name.replace('_', "-"))
}

/// Return a copy of `clients` with every placeholder secret replaced by the
/// value returned from `lookup`, which is passed the secret's path.
///
/// Clients without a placeholder are copied unchanged, so running this over
/// its own output changes nothing.
pub fn resolve_client_secrets<F>(clients: &ClientMap, mut lookup: F) -> Result<ClientMap>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut resolved = ClientMap::new();
    for (client_id, client) in clients {
        let mut client = client.clone();
        if let Some(path) = client.secret_placeholder().map(placeholder_secret_path) {
            debug!("client {} takes its secret from {}", client_id, path);
            let value = lookup(&path).with_context(|| {
                format!("could not resolve secret for OAuth client {}", client_id)
            })?;
            client.set_secret(value);
        }
        resolved.insert(client_id.to_owned(), client);
    }
    Ok(resolved)
}
