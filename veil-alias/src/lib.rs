//! Reversible address aliasing
//!
//! When mail for an owned mailbox is forwarded on, the forward is sent *from*
//! a synthetic address that carries both the owned mailbox and the original
//! sender. A reply to that address can then be decoded back into both
//! identities and relayed to the original sender from the owned mailbox,
//! without either side learning the other's real address.
//!
//! ```text
//! sales{Sales_Team}+spammer{John_Smith}=bad.com@mine.com
//! ^^^^^ ^^^^^^^^^^^ ^^^^^^^ ^^^^^^^^^^^^ ^^^^^^^ ^^^^^^^^
//! owned  owned name  sender  sender name  sender   owned
//! local              local                domain   domain
//! ```
//!
//! - [`AliasCodec::encode`] picks the owned mailbox and builds the alias
//! - [`decode`] reverses it; it is total and never fails
//!
//! Display names are lossy: whitespace and `_` both become a single `_`, and
//! decoding title-cases each word.

mod decode;
mod encode;
mod error;
mod grammar;

pub use decode::{AliasPart, DecodedAlias, decode};
pub use encode::{Alias, AliasCodec, encode};
pub use error::AliasError;
pub use grammar::{escape_name, unescape_name};
