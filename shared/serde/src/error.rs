use thiserror::Error;

/// Errors that can occur while decoding a wire string into a field value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Wire value is not a recognizable boolean
    #[error("Expected a boolean (`true` or `false`), found {value:?}")]
    InvalidBool { value: String },

    /// Wire value could not be parsed as the expected numeric type
    #[error("Expected a value of type {type_name}, found {value:?}")]
    InvalidNumber {
        type_name: &'static str,
        value: String,
    },

    /// Enum index on the wire does not correspond to any variant
    #[error("Index {index} does not name a variant of enum {type_name}")]
    UnknownEnumIndex { type_name: &'static str, index: i32 },

    /// Escape sequence in an encoded list is not one the encoder produces
    #[error("Invalid escape sequence in encoded list at byte {position}: unexpected {found:?}")]
    InvalidEscape { position: usize, found: char },

    /// Encoded list ends in the middle of an escape sequence
    #[error("Encoded list ends with a dangling escape character at byte {position}")]
    DanglingEscape { position: usize },

    /// Encoded list contains an element with no content and no empty marker
    #[error("Encoded list contains an unmarked empty element ending at byte {position}")]
    EmptyElement { position: usize },
}
