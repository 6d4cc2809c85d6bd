//! Shared building blocks for veil.
//!
//! - [`address`]: RFC 5321 mailbox parsing into [`EmailAddress`]
//! - [`identity`]: an address paired with its display name
//! - [`domain`]: the [`Domain`] newtype used for owned domains
//! - [`config`]: [`Config`], read from the environment or a RON file
//! - [`logging`]: subscriber setup and the span-scoped logging macros

pub mod address;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod logging;

pub use address::EmailAddress;
pub use config::Config;
pub use domain::Domain;
pub use error::{AddressError, ConfigError};
pub use identity::{Identity, NamedAddress};
pub use tracing;
