//! Code shared between the UAA configuration generators.

#![warn(missing_docs)]

pub mod env;
pub mod errors;
pub mod manifest;
pub mod network;
pub mod output;
pub mod secret;
pub mod tracing_support;

/// Common imports used by many modules.
pub mod prelude {
    pub use anyhow::{bail, format_err, Context as _};
    pub use serde::{Deserialize, Serialize};
    pub use std::{
        collections::BTreeMap,
        fmt,
        path::{Path, PathBuf},
    };
    pub use tracing::{debug, error, info, instrument, trace, warn};

    pub use super::{Error, Result};
}

/// Error type for this crate's functions.
pub use anyhow::Error;

/// Result type for this crate's functions.
pub type Result<T, E = Error> = ::std::result::Result<T, E>;

/// The version of `uaa_config_common` linked into a generator.
pub fn uaa_config_common_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
