mod error;
mod record_log;
mod transfer;

pub use error::RecordError;
pub use record_log::RecordLog;
pub use transfer::{
    check_unique_wire_keys, export_record, import_record, record_wire_keys, wire_key, RecordSink,
    RecordSource,
};

use std::fmt::Debug;

use lobbykit_serde::DecodeError;

/// A structured value that can be flattened into relay fields and rebuilt
/// from them.
///
/// The field table is static and lists fields in declaration order, so the
/// same content always produces the same sequence of wire writes.
pub trait Record: Default + Clone + PartialEq + Debug + 'static {
    /// Name used in logs
    const NAME: &'static str;

    /// The record's field descriptors, in declaration order
    fn fields() -> &'static [FieldDescriptor<Self>];
}

/// One entry in a record's field table
pub struct FieldDescriptor<R: 'static> {
    /// Field name; the field's wire key is this name under the record prefix
    pub name: &'static str,
    pub kind: FieldKind<R>,
}

impl<R: 'static> FieldDescriptor<R> {
    pub fn is_transferred(&self) -> bool {
        !matches!(self.kind, FieldKind::Ignored)
    }
}

/// How a field moves on and off the wire
pub enum FieldKind<R: 'static> {
    /// A single encoded value. `read` returns `None` for an absent value.
    Scalar {
        read: fn(&R) -> Option<String>,
        write: fn(&mut R, &str) -> Result<(), DecodeError>,
    },
    /// A record of its own, flattened under `{prefix}.{name}`
    Nested {
        export: fn(&R, &str, &mut dyn RecordSink),
        import: fn(&mut R, &str, &dyn RecordSource) -> Result<(), RecordError>,
        keys: fn(&str) -> Vec<String>,
    },
    /// Local-only state, never exported or imported
    Ignored,
}

/// Implements [`Record`] from a field list.
///
/// Each entry maps a struct field to its wire name and must end with a comma.
/// Plain entries use the field type's `FieldCodec`; `nested` entries hold a
/// `Record`; `ignore` entries are local-only.
///
/// ```
/// use lobbykit_shared::{impl_record, import_record, export_record};
///
/// #[derive(Clone, Debug, Default, PartialEq)]
/// struct Inner { skin: i32 }
/// impl_record!(Inner { skin => "Skin", });
///
/// #[derive(Clone, Debug, Default, PartialEq)]
/// struct Outer { night: bool, inner: Inner, scratch: u8 }
/// impl_record!(Outer {
///     night => "Night",
///     nested inner => "Inner",
///     ignore scratch => "Scratch",
/// });
///
/// let outer = Outer { night: true, inner: Inner { skin: 3 }, scratch: 9 };
/// let mut wire = Vec::new();
/// export_record(&outer, None, &mut wire);
/// assert_eq!(wire, vec![
///     ("Night".to_string(), "true".to_string()),
///     ("Inner.Skin".to_string(), "3".to_string()),
/// ]);
/// ```
#[macro_export]
macro_rules! impl_record {
    ($record:ident { $($fields:tt)* }) => {
        impl $crate::Record for $record {
            const NAME: &'static str = stringify!($record);

            fn fields() -> &'static [$crate::FieldDescriptor<Self>] {
                static FIELDS: &[$crate::FieldDescriptor<$record>] =
                    $crate::__record_fields!($record; []; $($fields)*);
                FIELDS
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_fields {
    ($record:ident; [$($done:expr,)*];) => {
        &[$($done,)*]
    };
    ($record:ident; [$($done:expr,)*]; nested $field:ident => $name:literal, $($rest:tt)*) => {
        $crate::__record_fields!($record; [$($done,)* $crate::FieldDescriptor {
            name: $name,
            kind: $crate::FieldKind::Nested {
                export: |record: &$record, prefix: &str, sink: &mut dyn $crate::RecordSink| {
                    $crate::export_record(&record.$field, Some(prefix), sink)
                },
                import: |record: &mut $record, prefix: &str, source: &dyn $crate::RecordSource| {
                    record.$field = $crate::import_record(Some(prefix), source)?;
                    Ok(())
                },
                keys: |prefix: &str| {
                    let record = <$record as Default>::default();
                    $crate::__nested_keys(&record.$field, prefix)
                },
            },
        },]; $($rest)*)
    };
    ($record:ident; [$($done:expr,)*]; ignore $field:ident => $name:literal, $($rest:tt)*) => {
        $crate::__record_fields!($record; [$($done,)* $crate::FieldDescriptor {
            name: $name,
            kind: $crate::FieldKind::Ignored,
        },]; $($rest)*)
    };
    ($record:ident; [$($done:expr,)*]; $field:ident => $name:literal, $($rest:tt)*) => {
        $crate::__record_fields!($record; [$($done,)* $crate::FieldDescriptor {
            name: $name,
            kind: $crate::FieldKind::Scalar {
                read: |record: &$record| $crate::FieldCodec::to_wire(&record.$field),
                write: |record: &mut $record, wire: &str| {
                    record.$field = $crate::FieldCodec::decode(wire)?;
                    Ok(())
                },
            },
        },]; $($rest)*)
    };
}

#[doc(hidden)]
pub fn __nested_keys<N: Record>(_: &N, prefix: &str) -> Vec<String> {
    record_wire_keys::<N>(Some(prefix))
}
