use crate::{error::DecodeError, list};

/// A value that can be written to and read back from a single relay field.
///
/// Implementations must round-trip: `T::decode(&value.encode()) == Ok(value)`.
pub trait FieldCodec: Sized {
    /// Converts the value into its wire string
    fn encode(&self) -> String;

    /// Parses a wire string produced by [`FieldCodec::encode`]
    fn decode(wire: &str) -> Result<Self, DecodeError>;

    /// The wire string to export, or `None` if the value is absent and the
    /// field should be skipped. The relay cannot represent absence, so only
    /// optional values ever return `None`.
    fn to_wire(&self) -> Option<String> {
        Some(self.encode())
    }
}

impl FieldCodec for bool {
    fn encode(&self) -> String {
        if *self { "true" } else { "false" }.to_string()
    }

    fn decode(wire: &str) -> Result<Self, DecodeError> {
        if wire.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if wire.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(DecodeError::InvalidBool {
                value: wire.to_string(),
            })
        }
    }
}

impl FieldCodec for String {
    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(wire: &str) -> Result<Self, DecodeError> {
        Ok(wire.to_string())
    }
}

impl<T: FieldCodec> FieldCodec for Option<T> {
    fn encode(&self) -> String {
        match self {
            Some(value) => value.encode(),
            None => String::new(),
        }
    }

    fn decode(wire: &str) -> Result<Self, DecodeError> {
        T::decode(wire).map(Some)
    }

    fn to_wire(&self) -> Option<String> {
        self.as_ref().map(FieldCodec::encode)
    }
}

impl<T: FieldCodec> FieldCodec for Vec<T> {
    fn encode(&self) -> String {
        list::join_escaped(self.iter().map(FieldCodec::encode))
    }

    fn decode(wire: &str) -> Result<Self, DecodeError> {
        list::split_escaped(wire)?
            .iter()
            .map(|element| T::decode(element))
            .collect()
    }
}
