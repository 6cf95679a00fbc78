#![no_std]

/*!
Low-level classification of command-line tokens. Takes care of distinctions
between long options, short clusters, positionals, and the `--` splitter. No
type handling happens here, and nothing here knows which options exist.
Usually this is too low level to use directly; see the `argot` crate.
*/

use ::core::{
    fmt::{self, Debug, Write},
    str::{self, Utf8Error},
};

/**
A single, raw argument passed in from the command line.

This type is used in two ways: to indicate option names, and to indicate
arguments themselves. For instance, given `--target foo --path=bar input.txt`,
`target`, `foo`, `path`, `bar`, and `input.txt` would all be passed as [`Arg`]
values to the relevant functions.

An [`Arg`] internally is just a byte slice, since that's what the OS gives us.
Callers can turn it into a [`str`] with [`Arg::as_str`], and from there parse
it however they need.
*/
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Arg<'arg>(&'arg [u8]);

impl<'arg> Arg<'arg> {
    #[inline]
    #[must_use]
    pub const fn new(bytes: &'arg [u8]) -> Self {
        Self(bytes)
    }

    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> &'arg [u8] {
        self.0
    }

    /// Interpret this argument as UTF-8.
    #[inline]
    pub fn as_str(&self) -> Result<&'arg str, Utf8Error> {
        str::from_utf8(self.0)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq<str> for Arg<'_> {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Arg<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

/**
Debug-print an arg. This implementation does its best to treat the arg as a
string, but includes non-utf-8 bytes in their hex representation as needed.
 */
impl Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
            f.write_char('[')?;

            let mut bytes = bytes.iter().copied();

            if let Some(b) = bytes.next() {
                write!(f, "{b:#x}")?;
                bytes.try_for_each(|b| write!(f, ",{b:#x}"))?;
            }

            f.write_char(']')
        }

        if self.0.is_empty() {
            return f.write_str("\"\"");
        }

        self.0.utf8_chunks().enumerate().try_for_each(|(i, chunk)| {
            if i > 0 {
                write!(f, "..")?
            }

            let s = chunk.valid();
            let b = chunk.invalid();

            match (s, b) {
                (s, b"") => write!(f, "{s:?}"),
                ("", b) => write_bytes(f, b),
                (s, b) => {
                    write!(f, "{s:?}..")?;
                    write_bytes(f, b)
                }
            }
        })
    }
}

/**
The prefixes that distinguish options from positionals. These are per-parser
settings rather than global constants, so that a parser can, for instance,
turn off the `--` splitter.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Syntax {
    /// Introduces a cluster of one-character options, such as `-xvf`
    pub short_prefix: u8,

    /// Introduces a long option, such as `--verbose`
    pub long_prefix: &'static str,

    /// A token that, when it appears on its own, causes every later token to
    /// be treated as positional. `None` disables this behavior.
    pub splitter: Option<&'static str>,
}

impl Syntax {
    pub const STANDARD: Self = Self {
        short_prefix: b'-',
        long_prefix: "--",
        splitter: Some("--"),
    };

    #[inline]
    fn is_splitter(&self, argument: &[u8]) -> bool {
        self.splitter
            .is_some_and(|splitter| splitter.as_bytes() == argument)
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Self::STANDARD
    }
}

/**
The option characters of a short cluster, with the prefix removed. Given
`-xf=io.txt`, the cluster is `xf=io.txt`; it's up to the visitor to decide
where the option characters end and an attached value begins, since that
depends on which characters name options that take values.

A cluster is never empty: a lone `-` is visited as a positional.
*/
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cluster<'arg>(&'arg [u8]);

impl<'arg> Cluster<'arg> {
    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> &'arg [u8] {
        self.0
    }

    #[inline]
    pub fn as_str(&self) -> Result<&'arg str, Utf8Error> {
        str::from_utf8(self.0)
    }
}

impl Debug for Cluster<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Arg(self.0).fmt(f)
    }
}

/**
The [`ArgumentsParser`] type operates by passing arguments it finds into a
[`Visitor`], to be handled. Every visit method that handles an option also
receives the `raw` token, exactly as it appeared on the command line, so that
the visitor can fall back to treating it as a positional if the option isn't
recognized.
 */
pub trait Visitor<'arg> {
    type Value;

    /// A positional parameter, or any token following the splitter.
    fn visit_positional(self, argument: Arg<'arg>) -> Self::Value;

    /// A long option that definitely has an argument, because it was given
    /// as `--option=argument`
    fn visit_long_option(
        self,
        raw: Arg<'arg>,
        option: Arg<'arg>,
        argument: Arg<'arg>,
    ) -> Self::Value;

    /// A long option or flag, such as `--option`
    fn visit_long(
        self,
        raw: Arg<'arg>,
        option: Arg<'arg>,
        arg: impl ArgAccess<'arg>,
    ) -> Self::Value;

    /// A cluster of short options or flags, such as `-o`, `-xvf`, or `-o=value`
    fn visit_short(
        self,
        raw: Arg<'arg>,
        cluster: Cluster<'arg>,
        arg: impl ArgAccess<'arg>,
    ) -> Self::Value;
}

/**
[`ArgAccess`] allows a visitor to decide if a given option needs an argument,
based on the identity of the option.

Consider `--foo bar`. Is this a pair of parameters (the flag `--foo` and the
positional parameter `bar`) or a single option `--foo bar` that takes an
argument? The [`ArgumentsParser`] can't independently classify a given
argument, so instead, a visitor can request the next token via this trait only
for options that need one.
*/
pub trait ArgAccess<'arg>: Sized {
    /**
    Get the next token from the parser, whole and uninterpreted. This should
    only be called by options that need it; flags should simply ignore it, to
    ensure that the next command line argument can correctly be parsed
    independently.

    This returns [`None`] if all of the CLI arguments have been exhausted.
    */
    fn take(self) -> Option<Arg<'arg>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    PositionalOnly,
}

/**
An `ArgumentsParser` is the main entry point into `argot_parser`. It parses
arguments in each call to `next_arg`, sending those arguments to the given
[`Visitor`]. It handles distinguishing options and positionals, and the `--`
splitter.

`argot_parser` operates entirely on borrowed data, because we assume that
command-line arguments are loaded early on and then handled in a borrowed form
for the rest of the parse. The ubiquitous `'arg` lifetime refers to this
borrowed command line data.
*/
#[derive(Debug, Clone)]
pub struct ArgumentsParser<'arg, I> {
    state: State,
    syntax: Syntax,
    args: I,
    _arg: core::marker::PhantomData<&'arg [u8]>,
}

impl<'arg, I> ArgumentsParser<'arg, I>
where
    I: Iterator<Item = &'arg [u8]>,
{
    /**
    Create a new [`ArgumentsParser`] from an iterator of byte slices, where
    each byte slice is a single argument received from the command line. This
    list should *exclude* the name of the program, which is commonly passed as
    the first argument in the list.
     */
    #[inline]
    #[must_use]
    pub fn new(args: impl IntoIterator<IntoIter = I>) -> Self {
        Self::with_syntax(args, Syntax::STANDARD)
    }

    #[inline]
    #[must_use]
    pub fn with_syntax(args: impl IntoIterator<IntoIter = I>, syntax: Syntax) -> Self {
        Self {
            state: State::Ready,
            syntax,
            args: args.into_iter(),
            _arg: core::marker::PhantomData,
        }
    }

    /// True once the splitter has been seen. Every later token is visited
    /// as a positional.
    #[inline]
    #[must_use]
    pub fn positional_only(&self) -> bool {
        self.state == State::PositionalOnly
    }

    /// Put `self` into a `PositionalOnly` state, then process a positional
    /// argument
    #[inline]
    fn positional_only_arg<V>(&mut self, visitor: V) -> Option<V::Value>
    where
        V: Visitor<'arg>,
    {
        self.state = State::PositionalOnly;
        self.args
            .next()
            .map(Arg)
            .map(|arg| visitor.visit_positional(arg))
    }

    pub fn next_arg<V>(&mut self, visitor: V) -> Option<V::Value>
    where
        V: Visitor<'arg>,
    {
        if self.state == State::PositionalOnly {
            return self.positional_only_arg(visitor);
        }

        let argument = self.args.next()?;

        if self.syntax.is_splitter(argument) {
            return self.positional_only_arg(visitor);
        }

        let raw = Arg(argument);

        if let Some(option) = argument.strip_prefix(self.syntax.long_prefix.as_bytes()) {
            // A bare long prefix names nothing; it's only special when it's
            // also the splitter, which was handled above.
            if option.is_empty() {
                return Some(visitor.visit_positional(raw));
            }

            return Some(match split_once(option, b'=') {
                Some((option, argument)) => {
                    visitor.visit_long_option(raw, Arg(option), Arg(argument))
                }
                None => visitor.visit_long(raw, Arg(option), StandardArgAccess { parent: self }),
            });
        }

        Some(match argument {
            [prefix, cluster @ ..] if *prefix == self.syntax.short_prefix && !cluster.is_empty() => {
                visitor.visit_short(raw, Cluster(cluster), StandardArgAccess { parent: self })
            }
            positional => visitor.visit_positional(Arg(positional)),
        })
    }
}

/// ArgAccess implementation that gets the next argument from the list.
struct StandardArgAccess<'a, 'arg, I> {
    parent: &'a mut ArgumentsParser<'arg, I>,
}

impl<'arg, I> ArgAccess<'arg> for StandardArgAccess<'_, 'arg, I>
where
    I: Iterator<Item = &'arg [u8]>,
{
    fn take(self) -> Option<Arg<'arg>> {
        self.parent.args.next().map(Arg)
    }
}

fn split_once(input: &[u8], delimiter: u8) -> Option<(&[u8], &[u8])> {
    memchr::memchr(delimiter, input).map(|i| (&input[..i], &input[i + 1..]))
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use alloc::{format, string::String, vec::Vec};

    use super::*;

    /// Records every event as a string. Options whose name starts with `v`
    /// take a value from the next token.
    struct Recorder;

    impl<'arg> Visitor<'arg> for Recorder {
        type Value = String;

        fn visit_positional(self, argument: Arg<'arg>) -> String {
            format!("pos {argument:?}")
        }

        fn visit_long_option(self, _raw: Arg<'arg>, option: Arg<'arg>, argument: Arg<'arg>) -> String {
            format!("long {option:?}={argument:?}")
        }

        fn visit_long(self, _raw: Arg<'arg>, option: Arg<'arg>, arg: impl ArgAccess<'arg>) -> String {
            match option.bytes().first() {
                Some(b'v') => format!("long {option:?} {:?}", arg.take()),
                _ => format!("long {option:?}"),
            }
        }

        fn visit_short(self, raw: Arg<'arg>, cluster: Cluster<'arg>, arg: impl ArgAccess<'arg>) -> String {
            match cluster.bytes() {
                [b'v'] => format!("short {cluster:?} {:?}", arg.take()),
                _ => format!("short {cluster:?} from {raw:?}"),
            }
        }
    }

    fn record(args: &[&'static str], syntax: Syntax) -> Vec<String> {
        let mut parser = ArgumentsParser::with_syntax(args.iter().map(|s| s.as_bytes()), syntax);
        let mut events = Vec::new();

        while let Some(event) = parser.next_arg(Recorder) {
            events.push(event);
        }

        events
    }

    #[test]
    fn classifies_tokens() {
        let events = record(
            &["input", "--flag", "--path=a=b", "-xyz", "-", "-v", "5"],
            Syntax::STANDARD,
        );

        assert_eq!(
            events,
            [
                "pos \"input\"",
                "long \"flag\"",
                "long \"path\"=\"a=b\"",
                "short \"xyz\" from \"-xyz\"",
                "pos \"-\"",
                "short \"v\" Some(\"5\")",
            ]
        );
    }

    #[test]
    fn value_is_taken_whole() {
        let events = record(&["--value", "--", "-x"], Syntax::STANDARD);

        assert_eq!(events, ["long \"value\" Some(\"--\")", "short \"x\" from \"-x\""]);
    }

    #[test]
    fn missing_value() {
        let events = record(&["--value"], Syntax::STANDARD);

        assert_eq!(events, ["long \"value\" None"]);
    }

    #[test]
    fn splitter_forces_positionals() {
        let events = record(&["a", "--", "--flag", "-x", "--"], Syntax::STANDARD);

        assert_eq!(events, ["pos \"a\"", "pos \"--flag\"", "pos \"-x\"", "pos \"--\""]);
    }

    #[test]
    fn splitter_can_be_disabled() {
        let syntax = Syntax {
            splitter: None,
            ..Syntax::STANDARD
        };
        let events = record(&["--", "--flag"], syntax);

        assert_eq!(events, ["pos \"--\"", "long \"flag\""]);
    }

    #[test]
    fn custom_prefixes() {
        let syntax = Syntax {
            short_prefix: b'/',
            long_prefix: "//",
            splitter: None,
        };
        let events = record(&["//flag", "/x", "-x"], syntax);

        assert_eq!(events, ["long \"flag\"", "short \"x\" from \"/x\"", "pos \"-x\""]);
    }
}
