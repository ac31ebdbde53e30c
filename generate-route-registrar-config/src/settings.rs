//! The `registrar_settings.json` format read by the route registrar.

use serde::Serialize;
use std::net::Ipv4Addr;
use uaa_config_common::{network::host_label, secret::SecretStore, Result};

/// The secret holding the NATS password.
pub const NATS_PASSWORD_SECRET: &str = "var-nats-password/password";

/// Everything we need to know to generate our settings.
#[derive(Clone, Debug)]
pub struct RegistrarInputs {
    /// The platform's system domain, such as `example.com`.
    pub system_domain: String,
    /// The NATS password.
    pub nats_password: String,
    /// The address of this pod.
    pub addr: Ipv4Addr,
}

impl RegistrarInputs {
    /// Collect our inputs from `secrets`.
    pub fn load(
        secrets: &SecretStore,
        system_domain: String,
        addr: Ipv4Addr,
    ) -> Result<RegistrarInputs> {
        Ok(RegistrarInputs {
            system_domain,
            nats_password: secrets.read(NATS_PASSWORD_SECRET)?,
            addr,
        })
    }
}

/// Top-level route registrar settings.
#[derive(Debug, Serialize)]
pub struct RegistrarSettings {
    /// NATS servers to register our routes with.
    pub message_bus_servers: Vec<MessageBusServer>,
    /// The address the router should forward traffic to.
    pub host: String,
    /// Routes to advertise.
    pub routes: Vec<Route>,
    /// Connection details for the routing API.
    pub routing_api: RoutingApi,
}

/// A NATS server to announce routes on.
#[derive(Debug, Serialize)]
pub struct MessageBusServer {
    /// The server's `host:port`.
    pub host: String,
    /// NATS user name.
    pub user: String,
    /// NATS password.
    pub password: String,
}

/// A route to advertise.
#[derive(Debug, Serialize)]
pub struct Route {
    /// How to check that UAA is still alive.
    pub health_check: HealthCheck,
    /// The route's name, which is also its component.
    pub name: String,
    /// How often to re-announce the route, like `10s`.
    pub registration_interval: String,
    /// The SAN the router expects on UAA's TLS certificate.
    pub service_cert_domain_san: String,
    /// Tags for the route.
    pub tags: RouteTags,
    /// The TLS port UAA listens on.
    pub tls_port: u16,
    /// Hostnames this route serves.
    pub uris: Vec<String>,
}

/// How the registrar decides whether to keep advertising a route.
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    /// The health check's name.
    pub name: String,
    /// Script which exits 0 while UAA is healthy.
    pub script_path: String,
}

/// Tags attached to a route.
#[derive(Debug, Serialize)]
pub struct RouteTags {
    /// The component serving the route.
    pub component: String,
}

/// How to talk to the routing API.
#[derive(Debug, Serialize)]
pub struct RoutingApi {
    /// CA bundle for verifying the routing API.
    pub ca_certs: String,
    /// Our client certificate.
    pub client_cert_path: String,
    /// The private key for `client_cert_path`.
    pub client_private_key_path: String,
    /// CA which signed the routing API's certificate.
    pub server_ca_cert_path: String,
    /// The routing API's URL.
    pub api_url: String,
    /// The UAA URL used to fetch routing API tokens.
    pub oauth_url: String,
    /// OAuth client used to authenticate to the routing API.
    pub client_id: String,
    /// Whether to skip TLS verification.
    pub skip_ssl_validation: bool,
}

impl RegistrarSettings {
    /// Build our settings from `inputs`.
    pub fn new(inputs: &RegistrarInputs) -> RegistrarSettings {
        let domain = &inputs.system_domain;
        RegistrarSettings {
            // This points at the fronting service, not at individual NATS
            // pods.
            message_bus_servers: vec![MessageBusServer {
                host: "nats:4222".to_owned(),
                user: "nats".to_owned(),
                password: inputs.nats_password.clone(),
            }],
            host: host_label(inputs.addr),
            routes: vec![Route {
                // TODO: Check `http://:8080/healthz` for `ok` instead of
                // always reporting healthy.
                health_check: HealthCheck {
                    name: "uaa-healthcheck".to_owned(),
                    script_path: "/bin/true".to_owned(),
                },
                name: "uaa".to_owned(),
                registration_interval: "10s".to_owned(),
                service_cert_domain_san: "uaa.service.cf.internal".to_owned(),
                tags: RouteTags {
                    component: "uaa".to_owned(),
                },
                tls_port: 8443,
                uris: ["uaa", "login"]
                    .iter()
                    .flat_map(|sub| {
                        vec![format!("{}.{}", sub, domain), format!("*.{}.{}", sub, domain)]
                    })
                    .collect(),
            }],
            routing_api: RoutingApi {
                ca_certs: "/run/config/ca.crt".to_owned(),
                client_cert_path: "/run/config/client.crt".to_owned(),
                client_private_key_path: "/run/config/client.key".to_owned(),
                server_ca_cert_path: "/run/config/server_ca.crt".to_owned(),
                api_url: "https://routing-api.service.cf.internal:3001".to_owned(),
                oauth_url: "https://uaa.service.cf.internal:8443".to_owned(),
                client_id: "routing_api_client".to_owned(),
                skip_ssl_validation: false,
            },
        }
    }

    /// Serialize as a single line of JSON.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string(self)?;
        json.push('\n');
        Ok(json)
    }
}
