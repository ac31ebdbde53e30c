//! SCIM users that UAA creates at startup.

use std::fmt;

/// The groups our bootstrap administrator belongs to.
pub const ADMIN_GROUPS: &[&str] = &[
    "clients.read",
    "cloud_controller.admin",
    "doppler.firehose",
    "network.admin",
    "openid",
    "routing.router_groups.read",
    "routing.router_groups.write",
    "scim.read",
    "scim.write",
];

/// A user to create when UAA boots.
///
/// UAA reads these from `scim.users` as `|`-separated records, which we
/// produce using our `Display` implementation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScimUser {
    pub name: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Group names, which must not contain `,` or `|`.
    pub groups: Vec<String>,
    /// The identity provider that owns this user. `uaa` for internal users.
    pub origin: String,
}

impl ScimUser {
    /// The `admin` user, which can do anything on the platform.
    pub fn bootstrap_admin(password: &str) -> ScimUser {
        ScimUser {
            name: "admin".to_owned(),
            password: password.to_owned(),
            email: "admin".to_owned(),
            first_name: String::new(),
            last_name: String::new(),
            groups: ADMIN_GROUPS.iter().map(|&g| g.to_owned()).collect(),
            origin: "uaa".to_owned(),
        }
    }
}

impl fmt::Display for ScimUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // UAA expects exactly this field order.
        write!(
            f,
            "{}|{}|{}|{}|{}|{}|{}",
            self.name,
            self.password,
            self.email,
            self.first_name,
            self.last_name,
            self.groups.join(","),
            self.origin,
        )
    }
}

#[test]
fn bootstrap_admin_record() {
    let admin = ScimUser::bootstrap_admin("hunter2");
    assert_eq!(
        admin.to_string(),
        "admin|hunter2|admin|||\
         clients.read,cloud_controller.admin,doppler.firehose,network.admin,\
         openid,routing.router_groups.read,routing.router_groups.write,\
         scim.read,scim.write|uaa",
    );
    assert_eq!(admin.to_string().split('|').count(), 7);
}
