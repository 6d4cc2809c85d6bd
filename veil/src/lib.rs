//! veil relays mail through reversible aliases, so neither side of a
//! conversation learns the other's real address.
//!
//! - [`policy`]: decide per envelope sender whether to reject, unmask or mask
//! - [`message`]: the parsed view of an inbound message
//! - [`inbound`]: where messages come from ([`Inbound`])
//! - [`dispatcher`]: wires it all together ([`Dispatcher`])
//!
//! The alias codec lives in [`veil_alias`] and the outbound relay in
//! [`veil_relay`].

pub mod bcc;
pub mod dispatcher;
pub mod error;
pub mod inbound;
pub mod message;
pub mod policy;

pub use dispatcher::{BLOCKED_REASON, Dispatcher, DropReason, Outcome};
pub use error::{DispatchError, InboundError};
pub use inbound::{Inbound, PipedMessage};
pub use message::ParsedMessage;
pub use policy::{Decision, PolicyGate};
pub use veil_alias as alias;
pub use veil_common as common;
pub use veil_relay as relay;
