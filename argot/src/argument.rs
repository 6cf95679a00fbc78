/*!
Argument descriptors: the identity, policy, and typed storage of a single
command-line argument.

The parser holds its arguments as boxed [`Argument`] trait objects, so that
integers, strings, flags, and user types can share one registry. Each of those
is a [`Descriptor`], which pairs the untyped [`Metadata`] with an
[`ArgumentType`] (the part that knows how to interpret a token) and a
[`Storage`] cell of that type's values.

Implementing [`ArgumentType`] is how you teach the parser about your own types;
see [`Parsed`][crate::Parsed] for the common case of a type with a
[`FromStr`][core::str::FromStr] implementation.
*/

use core::any::Any;

use crate::storage::Storage;

/// The outcome of offering a single token to an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// The token was accepted and saved.
    Success,

    /// The token doesn't look like a value of this type. The parser may
    /// offer it to another argument.
    NotParsed,

    /// The token was clearly meant for this argument, but it's malformed.
    /// The whole parse is aborted.
    Invalid,
}

/// Whether an argument holds one value or a sequence of them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,

    /// The argument may appear any number of times, and must appear at least
    /// `min_count` times for the parse to be valid.
    Repeated { min_count: usize },
}

/// The untyped part of an argument: its names and parsing policy.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub full_name: String,
    pub nickname: Option<char>,
    pub description: String,

    /// If true, this argument consumes a value (`--name value`); otherwise
    /// it's a flag.
    pub takes_parameter: bool,
    pub positional: bool,
    pub cardinality: Cardinality,

    /// Set once a token has been successfully saved into this argument
    pub was_parsed: bool,
}

impl Metadata {
    #[must_use]
    pub fn new(
        full_name: impl Into<String>,
        description: impl Into<String>,
        takes_parameter: bool,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            nickname: None,
            description: description.into(),
            takes_parameter,
            positional: false,
            cardinality: Cardinality::Single,
            was_parsed: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        matches!(self.cardinality, Cardinality::Repeated { .. })
    }
}

/**
The value-type specific half of an argument. An [`ArgumentType`] decides
whether a token is a valid value, and how it's saved.

The implementing type itself can carry configuration (for instance, a maximum
length); it's stored in the [`Descriptor`] alongside the metadata and the
storage cell.
*/
pub trait ArgumentType: 'static {
    type Value: Default + 'static;

    /// The name of the value in usage messages, as in `--count=<int>`
    const PLACEHOLDER: &'static str;

    /**
    Interpret `token` and, if it's acceptable, save it into `storage`.

    Flags are offered the empty token when they appear on the command line.
    Return [`ParseStatus::NotParsed`] for tokens that don't belong to this
    argument, so that the parser can try elsewhere, and
    [`ParseStatus::Invalid`] only when the whole parse should be abandoned.
    */
    fn parse_and_save(&self, token: &str, storage: &mut Storage<'_, Self::Value>) -> ParseStatus;

    /// Render a value for the `[default = ...]` annotation in usage messages.
    /// Types that return `None` are annotated with just `[default]`.
    #[expect(unused_variables)]
    #[inline]
    fn display_value(&self, value: &Self::Value) -> Option<String> {
        None
    }
}

/**
The type-erased interface the parser uses to drive arguments. It's
implemented by [`Descriptor`]; you rarely need to implement it yourself.
*/
pub trait Argument {
    fn metadata(&self) -> &Metadata;

    /// Offer `token` to this argument. On success, the value is saved and
    /// the argument is marked as parsed.
    fn parse_and_save(&mut self, token: &str) -> ParseStatus;

    /// Check, after parsing, that this argument is satisfied: a single
    /// argument needs a default or a parsed value, and a repeated one must
    /// have appeared, at least its minimum count of times.
    fn validate(&self) -> bool;

    /// Annotations for usage messages, such as `[default = 5]`
    fn info(&self) -> String;

    fn placeholder(&self) -> &'static str;

    /// The single value, for a [`Cardinality::Single`] argument
    fn value(&self) -> Option<&dyn Any>;

    /// The `Vec` of values, for a [`Cardinality::Repeated`] argument
    fn values(&self) -> Option<&dyn Any>;

    /// The number of values stored so far
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A complete argument: metadata, a type, and storage for its values.
pub struct Descriptor<'a, A: ArgumentType> {
    pub(crate) metadata: Metadata,
    pub(crate) kind: A,
    pub(crate) storage: Storage<'a, A::Value>,
}

impl<'a, A: ArgumentType> Descriptor<'a, A> {
    #[must_use]
    pub(crate) fn new(metadata: Metadata, kind: A) -> Self {
        Self {
            metadata,
            kind,
            storage: Storage::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &A {
        &self.kind
    }

    #[inline]
    pub fn kind_mut(&mut self) -> &mut A {
        &mut self.kind
    }

    #[inline]
    #[must_use]
    pub fn storage(&self) -> &Storage<'a, A::Value> {
        &self.storage
    }
}

impl<A: ArgumentType> Argument for Descriptor<'_, A> {
    #[inline]
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn parse_and_save(&mut self, token: &str) -> ParseStatus {
        let status = self.kind.parse_and_save(token, &mut self.storage);

        if status == ParseStatus::Success {
            self.metadata.was_parsed = true;
        }

        status
    }

    fn validate(&self) -> bool {
        match self.metadata.cardinality {
            Cardinality::Single => {
                self.metadata.was_parsed || self.storage.default_value().is_some()
            }
            Cardinality::Repeated { min_count } => {
                self.metadata.was_parsed && self.storage.len() >= min_count
            }
        }
    }

    fn info(&self) -> String {
        match self.metadata.cardinality {
            Cardinality::Single => match self.storage.default_value() {
                None => String::new(),
                Some(value) => match self.kind.display_value(value) {
                    Some(value) => format!("[default = {value}]"),
                    None => String::from("[default]"),
                },
            },
            Cardinality::Repeated { min_count } => format!("[repeated, min args = {min_count}]"),
        }
    }

    #[inline]
    fn placeholder(&self) -> &'static str {
        A::PLACEHOLDER
    }

    fn value(&self) -> Option<&dyn Any> {
        match self.metadata.cardinality {
            Cardinality::Single => self.storage.value().map(|value| value as &dyn Any),
            Cardinality::Repeated { .. } => None,
        }
    }

    fn values(&self) -> Option<&dyn Any> {
        match self.metadata.cardinality {
            Cardinality::Repeated { .. } => self.storage.values().map(|values| values as &dyn Any),
            Cardinality::Single => None,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.storage.len()
    }
}
