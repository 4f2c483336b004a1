//! # Lobbykit Serde
//! Conversion between scalar field values and the strings stored in a
//! lobby relay. Every value that a replicated record holds goes through
//! [`FieldCodec`] on its way onto and off of the wire.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod codec;
mod error;
mod list;
mod number;
mod wire_enum;

pub use codec::FieldCodec;
pub use error::DecodeError;
pub use list::{escape_element, join_escaped, split_escaped, LIST_ESCAPE, LIST_SEPARATOR};
