/*!
The error type for a failed parse.

[`ArgParser::parse`][crate::ArgParser::parse] only reports pass or fail; the
[`ParseError`] describing a failure is kept by the parser afterwards, and
[`ArgParser::try_parse`][crate::ArgParser::try_parse] returns it directly.
 */

/// Everything that can make a parse fail
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No option or positional argument claimed the token
    #[error("unrecognized argument {token:?}")]
    UnrecognizedArgument { token: String },

    /// An option that takes a value was the last token on the command line
    #[error("option {option} requires a value")]
    MissingValue { option: String },

    /// An option got a value that its type rejected
    #[error("option {option}: invalid value {value:?}")]
    InvalidValue { option: String, value: String },

    /// A flag was given a value, as in `--verbose=yes`
    #[error("flag {option} doesn't take a value (got {value:?})")]
    UnexpectedValue { option: String, value: String },

    /// A positional argument's type reported the token as malformed
    #[error("argument <{name}>: invalid value {value:?}")]
    Rejected { name: String, value: String },

    #[error("argument {token} isn't valid UTF-8")]
    InvalidUtf8 { token: String },

    /// An argument with no default, or a repeated one, never appeared
    #[error("required argument {name:?} was omitted")]
    MissingArgument { name: String },

    /// A repeated argument appeared fewer times than its minimum count
    #[error("argument {name:?} needs at least {expected} values, got {found}")]
    TooFewValues {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Two registered arguments share a short name
    #[error("short name -{nickname} is used by both {first:?} and {second:?}")]
    DuplicateNickname {
        nickname: char,
        first: String,
        second: String,
    },
}
