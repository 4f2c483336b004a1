use crate::{codec::FieldCodec, error::DecodeError};

// Numbers use Rust's locale-independent formatting: `.` as the decimal point,
// no digit grouping, and the shortest float representation that parses back
// to the same bits.
macro_rules! impl_number_codec {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FieldCodec for $ty {
                fn encode(&self) -> String {
                    self.to_string()
                }

                fn decode(wire: &str) -> Result<Self, DecodeError> {
                    wire.parse::<$ty>().map_err(|_| DecodeError::InvalidNumber {
                        type_name: stringify!($ty),
                        value: wire.to_string(),
                    })
                }
            }
        )+
    };
}

impl_number_codec!(u8, u16, u32, u64, i8, i16, i32, i64, usize, f32, f64);
