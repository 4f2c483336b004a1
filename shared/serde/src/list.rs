use std::mem;

use crate::error::DecodeError;

/// Separates encoded elements of a list
pub const LIST_SEPARATOR: char = ',';
/// Escapes the separator, itself, and the empty-element marker
pub const LIST_ESCAPE: char = '\\';
// `\e` stands for an element whose own encoding is the empty string, so that
// `[]` and `[""]` have distinct wire forms.
const EMPTY_MARK: char = 'e';

/// Escapes one already-encoded element so it can be joined into a list
pub fn escape_element(element: &str) -> String {
    if element.is_empty() {
        return format!("{}{}", LIST_ESCAPE, EMPTY_MARK);
    }

    let mut output = String::with_capacity(element.len());
    for c in element.chars() {
        if c == LIST_ESCAPE || c == LIST_SEPARATOR {
            output.push(LIST_ESCAPE);
        }
        output.push(c);
    }
    output
}

/// Joins encoded elements into a single wire string
pub fn join_escaped<I: IntoIterator<Item = String>>(elements: I) -> String {
    let mut output = String::new();
    for (index, element) in elements.into_iter().enumerate() {
        if index > 0 {
            output.push(LIST_SEPARATOR);
        }
        output.push_str(&escape_element(&element));
    }
    output
}

/// Splits a wire string produced by [`join_escaped`] back into its elements
pub fn split_escaped(wire: &str) -> Result<Vec<String>, DecodeError> {
    let mut elements = Vec::new();
    if wire.is_empty() {
        return Ok(elements);
    }

    let mut current = String::new();
    let mut marked_empty = false;
    let mut chars = wire.char_indices();

    while let Some((position, c)) = chars.next() {
        if marked_empty && c != LIST_SEPARATOR {
            return Err(DecodeError::InvalidEscape { position, found: c });
        }

        match c {
            LIST_ESCAPE => match chars.next() {
                Some((_, LIST_ESCAPE)) => current.push(LIST_ESCAPE),
                Some((_, LIST_SEPARATOR)) => current.push(LIST_SEPARATOR),
                Some((_, EMPTY_MARK)) if current.is_empty() => marked_empty = true,
                Some((position, found)) => {
                    return Err(DecodeError::InvalidEscape { position, found });
                }
                None => return Err(DecodeError::DanglingEscape { position }),
            },
            LIST_SEPARATOR => {
                elements.push(finish_element(&mut current, &mut marked_empty, position)?);
            }
            other => current.push(other),
        }
    }

    elements.push(finish_element(&mut current, &mut marked_empty, wire.len())?);
    Ok(elements)
}

fn finish_element(
    current: &mut String,
    marked_empty: &mut bool,
    position: usize,
) -> Result<String, DecodeError> {
    if *marked_empty {
        *marked_empty = false;
        return Ok(String::new());
    }
    if current.is_empty() {
        return Err(DecodeError::EmptyElement { position });
    }
    Ok(mem::take(current))
}
