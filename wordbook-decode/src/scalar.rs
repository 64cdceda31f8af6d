//! Scalar target types
//!
//! A scalar is decoded from exactly one word. Integers and floats use the
//! target type's own `FromStr`, so width and sign are validated by the type
//! (`"300"` fails for `u8`, `"-1"` fails for `u32`). Booleans accept only the
//! literal words `true` and `false`.

use crate::{Decode, Shape};
use wordbook_core::ScalarKind;

/// A type that can be parsed from a single word.
pub trait Scalar: Default + Sized + 'static {
    const KIND: ScalarKind;

    fn parse_word(word: &str) -> Result<Self, String>;
}

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::String;

    fn parse_word(word: &str) -> Result<Self, String> {
        Ok(word.to_string())
    }
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn parse_word(word: &str) -> Result<Self, String> {
        match word {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err("expected `true` or `false`".to_string()),
        }
    }
}

macro_rules! impl_from_str_scalar {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: ScalarKind = $kind;

                fn parse_word(word: &str) -> Result<Self, String> {
                    word.parse::<$ty>().map_err(|e| e.to_string())
                }
            }
        )+
    };
}

impl_from_str_scalar!(ScalarKind::Int => i8, i16, i32, i64, i128, isize);
impl_from_str_scalar!(ScalarKind::Uint => u8, u16, u32, u64, u128, usize);
impl_from_str_scalar!(ScalarKind::Float => f32, f64);

macro_rules! impl_scalar_decode {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Decode for $ty {
                fn shape() -> Shape<Self> {
                    Shape::scalar()
                }
            }
        )+
    };
}

impl_scalar_decode!(
    String, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bool_spellings() {
        assert_eq!(bool::parse_word("true"), Ok(true));
        assert_eq!(bool::parse_word("false"), Ok(false));
        for word in ["True", "TRUE", "1", "t", "yes", ""] {
            assert!(bool::parse_word(word).is_err(), "{word:?} accepted");
        }
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(i64::parse_word("-23"), Ok(-23));
        assert_eq!(f64::parse_word("1.5"), Ok(1.5));
        assert_eq!(u16::parse_word("23"), Ok(23));
        assert!(u32::parse_word("-1").is_err());
        assert!(u8::parse_word("300").is_err());
        assert!(i32::parse_word("0x10").is_err());
        assert!(f32::parse_word("one").is_err());
    }

    #[test]
    fn test_strings_are_verbatim() {
        assert_eq!(String::parse_word(" a b "), Ok(" a b ".to_string()));
        assert_eq!(String::KIND, ScalarKind::String);
        assert_eq!(usize::KIND, ScalarKind::Uint);
    }

    proptest! {
        #[test]
        fn prop_integers_round_trip(n in any::<i64>()) {
            prop_assert_eq!(i64::parse_word(&n.to_string()), Ok(n));
        }

        #[test]
        fn prop_unsigned_rejects_negative(n in 1u64..u64::MAX) {
            let word = format!("-{n}");
            prop_assert!(u64::parse_word(&word).is_err());
        }
    }
}
