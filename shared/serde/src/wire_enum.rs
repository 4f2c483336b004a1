/// Declares a fieldless enum that travels as its integer discriminant.
///
/// ```
/// lobbykit_serde::wire_enum! {
///     #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
///     pub enum Difficulty {
///         #[default]
///         Easy = 0,
///         Hard = 1,
///     }
/// }
///
/// use lobbykit_serde::FieldCodec;
/// assert_eq!(Difficulty::Hard.encode(), "1");
/// assert_eq!(Difficulty::decode("0"), Ok(Difficulty::Easy));
/// assert!(Difficulty::decode("7").is_err());
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $index:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant = $index,
            )+
        }

        impl $name {
            /// The integer this variant is sent as
            pub fn wire_index(&self) -> i32 {
                match self {
                    $( $name::$variant => $index, )+
                }
            }
        }

        impl $crate::FieldCodec for $name {
            fn encode(&self) -> String {
                self.wire_index().to_string()
            }

            fn decode(wire: &str) -> Result<Self, $crate::DecodeError> {
                let index = <i32 as $crate::FieldCodec>::decode(wire)?;
                match index {
                    $( $index => Ok($name::$variant), )+
                    _ => Err($crate::DecodeError::UnknownEnumIndex {
                        type_name: stringify!($name),
                        index,
                    }),
                }
            }
        }
    };
}
