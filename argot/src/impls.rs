/*!
The built-in [`ArgumentType`] implementations: integers, strings, flags, and
any primitive type with a [`FromStr`] implementation.
 */

use core::{marker::PhantomData, str::FromStr};

use crate::argument::{ArgumentType, ParseStatus};
use crate::storage::Storage;

/**
A signed integer argument (`i32`).

Accepts an optional leading `+` or `-` followed by one or more decimal digits,
and nothing else: no whitespace, no trailing garbage, no partial parses. Values
that don't fit in an `i32` aren't accepted either.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct Int;

impl ArgumentType for Int {
    type Value = i32;
    const PLACEHOLDER: &'static str = "int";

    fn parse_and_save(&self, token: &str, storage: &mut Storage<'_, i32>) -> ParseStatus {
        match token.parse() {
            Ok(value) => {
                storage.save(value);
                ParseStatus::Success
            }
            Err(_) => ParseStatus::NotParsed,
        }
    }

    fn display_value(&self, value: &i32) -> Option<String> {
        Some(value.to_string())
    }
}

/// A string argument. Every token is a valid string, so this type never
/// rejects anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Str;

impl ArgumentType for Str {
    type Value = String;
    const PLACEHOLDER: &'static str = "string";

    fn parse_and_save(&self, token: &str, storage: &mut Storage<'_, String>) -> ParseStatus {
        storage.save(token.to_owned());
        ParseStatus::Success
    }

    fn display_value(&self, value: &String) -> Option<String> {
        Some(value.clone())
    }
}

/**
A boolean flag. Flags never consume a value; they're offered the empty token
each time they appear, and reject anything else.

Each appearance of a single flag toggles it, so a flag given twice ends up back
where it started. A repeated flag instead records one value per appearance:
the opposite of its default.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct Flag;

impl ArgumentType for Flag {
    type Value = bool;
    const PLACEHOLDER: &'static str = "";

    fn parse_and_save(&self, token: &str, storage: &mut Storage<'_, bool>) -> ParseStatus {
        if !token.is_empty() {
            return ParseStatus::NotParsed;
        }

        match storage.value_mut() {
            Some(value) => *value = !*value,
            None => {
                let value = !storage.default_value().copied().unwrap_or(false);
                storage.save(value)
            }
        }

        ParseStatus::Success
    }

    fn display_value(&self, value: &bool) -> Option<String> {
        Some(value.to_string())
    }
}

/**
Types that can be parsed with [`FromStr`] and used through [`Parsed`]. This is
implemented for the numeric primitives and [`char`]; implement it for your own
types to use them as arguments without writing an [`ArgumentType`].
*/
pub trait ParsedValue: FromStr + Default + 'static {
    const PLACEHOLDER: &'static str;

    /// Render a value for usage messages
    fn display(&self) -> Option<String> {
        None
    }
}

macro_rules! from_str {
    ($($type:ident => $placeholder:literal)*) => {
        $(
            impl ParsedValue for $type {
                const PLACEHOLDER: &'static str = $placeholder;

                #[inline]
                fn display(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

from_str! {
    u8 => "u8"
    u16 => "u16"
    u32 => "u32"
    u64 => "u64"
    u128 => "u128"
    usize => "usize"
    i8 => "i8"
    i16 => "i16"
    i32 => "i32"
    i64 => "i64"
    i128 => "i128"
    isize => "isize"
    f32 => "float"
    f64 => "double"
    char => "char"
}

/// An argument whose values are parsed with [`FromStr`]. Tokens that fail to
/// parse aren't accepted.
#[derive(Debug)]
pub struct Parsed<T> {
    phantom: PhantomData<fn() -> T>,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            phantom: PhantomData,
        }
    }
}

impl<T: ParsedValue> ArgumentType for Parsed<T> {
    type Value = T;
    const PLACEHOLDER: &'static str = T::PLACEHOLDER;

    fn parse_and_save(&self, token: &str, storage: &mut Storage<'_, T>) -> ParseStatus {
        match token.parse() {
            Ok(value) => {
                storage.save(value);
                ParseStatus::Success
            }
            Err(_) => ParseStatus::NotParsed,
        }
    }

    fn display_value(&self, value: &T) -> Option<String> {
        value.display()
    }
}
