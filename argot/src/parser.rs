/*!
The parser engine: the registry of arguments, and the scan that matches
command-line tokens against it.
 */

use std::{
    collections::{HashMap, hash_map::Entry},
    ffi::OsStr,
};

use argot_parser::{Arg, ArgAccess, ArgumentsParser, Cluster, Syntax, Visitor};
use tracing::{debug, warn};

use crate::{
    Flag, Int, Str,
    argument::{Argument, ArgumentType, Cardinality, ParseStatus},
    build::{Builder, Registration},
    errors::ParseError,
    help::{HelpStyle, Usage},
    util::arg_as_str,
};

/**
A command-line parser. Arguments are registered with the `add_*` methods (or
[`push_argument`][Self::push_argument]), then [`parse`][Self::parse] matches a
command line against them, and the values are read back with
[`get_value`][Self::get_value] and [`get_values`][Self::get_values], or straight
from caller-owned variables given to `redirect_to`.

The `'a` lifetime is that of any caller-owned storage the arguments write to.

```
use argot::ArgParser;

let mut parser = ArgParser::new("program");
parser.add_int_argument("param").nickname('p');
parser.add_flag("verbose").nickname('v');

assert!(parser.parse(["program", "-v", "-p", "5"]));
assert_eq!(parser.get_value::<i32>("param"), Some(5));
assert_eq!(parser.get_value::<bool>("verbose"), Some(true));
```
*/
pub struct ArgParser<'a> {
    name: String,
    syntax: Syntax,

    /// Every registered argument, in registration order
    arguments: Vec<Box<dyn Argument + 'a>>,
    by_name: HashMap<String, usize>,

    // These two are rebuilt from `arguments` at the start of every parse
    by_nickname: HashMap<char, usize>,
    positional: Vec<usize>,

    help: Option<usize>,
    error: Option<ParseError>,
}

impl<'a> ArgParser<'a> {
    /// Create a parser. The name heads the usage message.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_syntax(name, Syntax::STANDARD)
    }

    /// Create a parser that uses different prefixes, or no splitter.
    #[must_use]
    pub fn with_syntax(name: impl Into<String>, syntax: Syntax) -> Self {
        Self {
            name: name.into(),
            syntax,
            arguments: Vec::new(),
            by_name: HashMap::new(),
            by_nickname: HashMap::new(),
            positional: Vec::new(),
            help: None,
            error: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Register an integer option, `--name=<int>`
    pub fn add_int_argument(&mut self, full_name: impl Into<String>) -> Registration<'_, 'a, Int> {
        self.add_argument(full_name, true)
    }

    /// Register a string option, `--name=<string>`
    pub fn add_string_argument(
        &mut self,
        full_name: impl Into<String>,
    ) -> Registration<'_, 'a, Str> {
        self.add_argument(full_name, true)
    }

    /// Register a boolean flag, `--name`. Flags default to `false`.
    pub fn add_flag(&mut self, full_name: impl Into<String>) -> Registration<'_, 'a, Flag> {
        let builder = Builder::<Flag>::new(full_name, "", false).default_value(false);
        Registration::new(self, builder)
    }

    /// Register an argument of any [`ArgumentType`].
    pub fn add_argument<A>(
        &mut self,
        full_name: impl Into<String>,
        takes_parameter: bool,
    ) -> Registration<'_, 'a, A>
    where
        A: ArgumentType + Default,
    {
        Registration::new(self, Builder::new(full_name, "", takes_parameter))
    }

    /**
    Register an argument that was built elsewhere, usually with a
    [`Builder`]. If an argument with the same full name was already
    registered, it's replaced.
    */
    pub fn push_argument(&mut self, argument: impl Argument + 'a) {
        let name = argument.metadata().full_name.clone();
        let argument: Box<dyn Argument + 'a> = Box::new(argument);

        match self.by_name.entry(name) {
            Entry::Occupied(entry) => {
                warn!(name = entry.key().as_str(), "replacing a registered argument");
                self.arguments[*entry.get()] = argument;
            }
            Entry::Vacant(entry) => {
                entry.insert(self.arguments.len());
                self.arguments.push(argument);
            }
        }
    }

    /**
    Register the help flag. When it appears on the command line, the parse
    succeeds even if required arguments are missing, and [`help`][Self::help]
    returns true. Its `description` describes the whole program in the usage
    message.
    */
    pub fn add_help(
        &mut self,
        nickname: char,
        full_name: impl Into<String>,
        description: impl Into<String>,
    ) {
        let builder = Builder::<Flag>::new(full_name, description, false)
            .nickname(nickname)
            .default_value(false);
        let name = builder.full_name().to_owned();

        self.push_argument(builder.build());
        self.help = self.by_name.get(&name).copied();
    }

    /// True if the help flag appeared on the command line
    #[must_use]
    pub fn help(&self) -> bool {
        self.help
            .is_some_and(|index| self.arguments[index].metadata().was_parsed)
    }

    /// Look up a registered argument by its full name
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&(dyn Argument + 'a)> {
        self.by_name
            .get(name)
            .map(|&index| self.arguments[index].as_ref())
    }

    /// All registered arguments, in registration order. The help flag, if
    /// any, is included.
    pub fn arguments(&self) -> impl Iterator<Item = &(dyn Argument + 'a)> {
        self.arguments.iter().map(|argument| argument.as_ref())
    }

    pub(crate) fn help_argument(&self) -> Option<&(dyn Argument + 'a)> {
        self.help.map(|index| self.arguments[index].as_ref())
    }

    /**
    Get the value of a single-valued argument. Returns `None` if there's no
    argument called `name`, if it's repeated, or if its values aren't of type
    `T`.
    */
    #[must_use]
    pub fn get_value<T: Clone + 'static>(&self, name: &str) -> Option<T> {
        self.argument(name)?.value()?.downcast_ref::<T>().cloned()
    }

    /**
    Get the values of a repeated argument, in the order they appeared.
    Returns `None` if there's no argument called `name`, if it isn't
    repeated, or if its values aren't of type `T`.
    */
    #[must_use]
    pub fn get_values<T: Clone + 'static>(&self, name: &str) -> Option<Vec<T>> {
        self.argument(name)?
            .values()?
            .downcast_ref::<Vec<T>>()
            .cloned()
    }

    /// The reason the most recent parse failed, if it did
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// A human-readable account of the most recent parse failure, or an
    /// empty string if it succeeded.
    #[must_use]
    pub fn log(&self) -> String {
        self.error
            .as_ref()
            .map(ParseError::to_string)
            .unwrap_or_default()
    }

    /**
    Parse a command line. The first item is the program name, and is
    skipped. Returns true if every token was claimed by an argument and
    every argument is satisfied; otherwise the reason is available from
    [`error`][Self::error].
    */
    pub fn parse<I>(&mut self, args: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        self.try_parse(args).is_ok()
    }

    /// Parse the command line of the current process.
    pub fn parse_env(&mut self) -> bool {
        self.parse(std::env::args_os())
    }

    /// Like [`parse`][Self::parse], but returns the error directly.
    pub fn try_parse<I>(&mut self, args: I) -> Result<(), ParseError>
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let args: Vec<I::Item> = args.into_iter().collect();
        let result = self.scan(
            args.iter()
                .skip(1)
                .map(|arg| arg.as_ref().as_encoded_bytes()),
        );

        if let Err(ref error) = result {
            debug!(%error, "parse failed");
        }

        self.error = result.as_ref().err().cloned();
        result
    }

    /// Render the usage message
    #[must_use]
    pub fn help_description(&self) -> String {
        self.help_description_with(HelpStyle::default())
    }

    #[must_use]
    pub fn help_description_with(&self, style: HelpStyle) -> String {
        Usage::new(self, style).to_string()
    }

    /// Rebuild the derived indexes: short names, and positionals in
    /// registration order.
    fn build(&mut self) -> Result<(), ParseError> {
        self.by_nickname.clear();
        self.positional.clear();

        for (index, argument) in self.arguments.iter().enumerate() {
            let metadata = argument.metadata();

            if let Some(nickname) = metadata.nickname {
                match self.by_nickname.entry(nickname) {
                    Entry::Vacant(entry) => {
                        entry.insert(index);
                    }
                    Entry::Occupied(entry) => {
                        return Err(ParseError::DuplicateNickname {
                            nickname,
                            first: self.arguments[*entry.get()].metadata().full_name.clone(),
                            second: metadata.full_name.clone(),
                        });
                    }
                }
            }

            if metadata.positional {
                self.positional.push(index);
            }
        }

        Ok(())
    }

    fn scan<'arg>(&mut self, args: impl Iterator<Item = &'arg [u8]>) -> Result<(), ParseError> {
        self.build()?;

        let mut tokens = ArgumentsParser::with_syntax(args, self.syntax);

        let mut positional_only = false;

        while let Some(result) = tokens.next_arg(Scan { parser: self }) {
            result?;

            if !positional_only && tokens.positional_only() {
                positional_only = true;
                debug!("splitter reached; the remaining arguments are positional");
            }
        }

        if self.help() {
            debug!("help was requested; skipping validation");
            return Ok(());
        }

        self.validate()
    }

    fn validate(&self) -> Result<(), ParseError> {
        match self.arguments.iter().find(|argument| !argument.validate()) {
            None => Ok(()),
            Some(argument) => {
                let name = argument.metadata().full_name.clone();

                Err(match argument.metadata().cardinality {
                    Cardinality::Single => ParseError::MissingArgument { name },
                    Cardinality::Repeated { min_count } if argument.len() < min_count => {
                        ParseError::TooFewValues {
                            name,
                            expected: min_count,
                            found: argument.len(),
                        }
                    }
                    Cardinality::Repeated { .. } => ParseError::MissingArgument { name },
                })
            }
        }
    }

    /// Offer a token to each positional argument in turn. A single-valued
    /// positional only claims one token.
    fn save_positional(&mut self, token: &str) -> Result<(), ParseError> {
        for &index in &self.positional {
            let argument = &mut self.arguments[index];

            if argument.metadata().was_parsed && !argument.metadata().is_repeated() {
                continue;
            }

            match argument.parse_and_save(token) {
                ParseStatus::Success => {
                    debug!(token, name = %argument.metadata().full_name, "positional");
                    return Ok(());
                }
                ParseStatus::NotParsed => {}
                ParseStatus::Invalid => {
                    return Err(ParseError::Rejected {
                        name: argument.metadata().full_name.clone(),
                        value: token.to_owned(),
                    });
                }
            }
        }

        Err(ParseError::UnrecognizedArgument {
            token: token.to_owned(),
        })
    }

    /// Save the value of a named option. Once an option has been named, a
    /// value it doesn't accept is fatal.
    fn save_option(&mut self, index: usize, option: String, value: &str) -> Result<(), ParseError> {
        let argument = &mut self.arguments[index];

        match argument.parse_and_save(value) {
            ParseStatus::Success => {
                debug!(%option, value, name = %argument.metadata().full_name, "option");
                Ok(())
            }
            ParseStatus::NotParsed | ParseStatus::Invalid => Err(ParseError::InvalidValue {
                option,
                value: value.to_owned(),
            }),
        }
    }

    fn takes_parameter(&self, index: usize) -> bool {
        self.arguments[index].metadata().takes_parameter
    }

    fn long_option(&self, name: &str) -> String {
        format!("{}{name}", self.syntax.long_prefix)
    }

    fn short_option(&self, nickname: char) -> String {
        format!("{}{nickname}", self.syntax.short_prefix as char)
    }
}

/// Visitor that dispatches each token from the [`ArgumentsParser`] to the
/// right argument.
struct Scan<'p, 'a> {
    parser: &'p mut ArgParser<'a>,
}

impl<'arg> Visitor<'arg> for Scan<'_, '_> {
    type Value = Result<(), ParseError>;

    fn visit_positional(self, argument: Arg<'arg>) -> Self::Value {
        self.parser.save_positional(arg_as_str(argument)?)
    }

    fn visit_long_option(self, raw: Arg<'arg>, option: Arg<'arg>, argument: Arg<'arg>) -> Self::Value {
        let name = arg_as_str(option)?;

        let Some(&index) = self.parser.by_name.get(name) else {
            return self.parser.save_positional(arg_as_str(raw)?);
        };

        let option = self.parser.long_option(name);
        let value = arg_as_str(argument)?;

        if !self.parser.takes_parameter(index) {
            return Err(ParseError::UnexpectedValue {
                option,
                value: value.to_owned(),
            });
        }

        self.parser.save_option(index, option, value)
    }

    fn visit_long(self, raw: Arg<'arg>, option: Arg<'arg>, arg: impl ArgAccess<'arg>) -> Self::Value {
        let name = arg_as_str(option)?;

        let Some(&index) = self.parser.by_name.get(name) else {
            return self.parser.save_positional(arg_as_str(raw)?);
        };

        let option = self.parser.long_option(name);

        if !self.parser.takes_parameter(index) {
            return self.parser.save_option(index, option, "");
        }

        match arg.take() {
            Some(value) => self.parser.save_option(index, option, arg_as_str(value)?),
            None => Err(ParseError::MissingValue { option }),
        }
    }

    /**
    Resolve each character of the cluster in turn. An option that takes a
    value ends the cluster, taking the rest of it (after an optional `=`) or
    else the next token. The bare attached form, `-p5`, is accepted on top
    of `-p=5` and `-p 5`. A character that names nothing also ends the
    cluster; if it was the first one, the whole token is handled as a
    positional instead.
    */
    fn visit_short(self, raw: Arg<'arg>, cluster: Cluster<'arg>, arg: impl ArgAccess<'arg>) -> Self::Value {
        let cluster = cluster.as_str().map_err(|_| ParseError::InvalidUtf8 {
            token: String::from_utf8_lossy(raw.bytes()).into_owned(),
        })?;

        for (position, nickname) in cluster.char_indices() {
            let Some(&index) = self.parser.by_nickname.get(&nickname) else {
                if position == 0 {
                    return self.parser.save_positional(arg_as_str(raw)?);
                }

                debug!(cluster, unresolved = %nickname, "ignoring the rest of a short cluster");
                return Ok(());
            };

            let option = self.parser.short_option(nickname);
            let rest = &cluster[position + nickname.len_utf8()..];

            if self.parser.takes_parameter(index) {
                let value = match rest.strip_prefix('=') {
                    Some(value) => value,
                    None if !rest.is_empty() => rest,
                    None => match arg.take() {
                        Some(value) => arg_as_str(value)?,
                        None => return Err(ParseError::MissingValue { option }),
                    },
                };

                return self.parser.save_option(index, option, value);
            }

            if let Some(value) = rest.strip_prefix('=') {
                return Err(ParseError::UnexpectedValue {
                    option,
                    value: value.to_owned(),
                });
            }

            self.parser.save_option(index, option, "")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_line() {
        let mut parser = ArgParser::new("My Empty Parser");
        assert!(parser.parse(["app"]));
        assert!(parser.parse(Vec::<String>::new()));
        assert_eq!(parser.log(), "");
    }

    #[test]
    fn positional_before_options_in_registry() {
        let mut parser = ArgParser::new("parser");
        parser.add_string_argument("file").positional();
        parser.add_string_argument("input");

        assert!(parser.parse(["app", "--input=io.txt", "picture.png"]));
        assert_eq!(parser.get_value::<String>("file").as_deref(), Some("picture.png"));
        assert_eq!(parser.get_value::<String>("input").as_deref(), Some("io.txt"));
    }

    #[test]
    fn single_positionals_claim_one_token_each() {
        let mut parser = ArgParser::new("parser");
        parser.add_string_argument("source").positional();
        parser.add_string_argument("destination").positional();

        assert!(parser.parse(["cp", "a.txt", "b.txt"]));
        assert_eq!(parser.get_value::<String>("source").as_deref(), Some("a.txt"));
        assert_eq!(parser.get_value::<String>("destination").as_deref(), Some("b.txt"));

        let mut parser = ArgParser::new("parser");
        parser.add_string_argument("source").positional();
        assert!(!parser.parse(["cp", "a.txt", "b.txt"]));
        assert_eq!(
            parser.error(),
            Some(&ParseError::UnrecognizedArgument {
                token: String::from("b.txt")
            })
        );
    }

    #[test]
    fn positional_falls_through_by_type() {
        let mut parser = ArgParser::new("parser");
        parser.add_int_argument("numbers").multi_value(0).positional();
        parser.add_string_argument("words").multi_value(0).positional();

        assert!(parser.parse(["app", "1", "one", "2", "two"]));
        assert_eq!(parser.get_values::<i32>("numbers"), Some(vec![1, 2]));
        assert_eq!(
            parser.get_values::<String>("words"),
            Some(vec![String::from("one"), String::from("two")])
        );
    }

    #[test]
    fn missing_value() {
        let mut parser = ArgParser::new("parser");
        parser.add_int_argument("param").nickname('p');

        assert_eq!(
            parser.try_parse(["app", "--param"]),
            Err(ParseError::MissingValue {
                option: String::from("--param")
            })
        );
        assert_eq!(
            parser.try_parse(["app", "-p"]),
            Err(ParseError::MissingValue {
                option: String::from("-p")
            })
        );
    }

    #[test]
    fn invalid_named_value_aborts() {
        let mut parser = ArgParser::new("parser");
        parser.add_int_argument("param").default_value(0);

        assert!(!parser.parse(["app", "--param=abc"]));
        assert_eq!(
            parser.error(),
            Some(&ParseError::InvalidValue {
                option: String::from("--param"),
                value: String::from("abc"),
            })
        );
        assert_eq!(parser.log(), "option --param: invalid value \"abc\"");
    }

    #[test]
    fn flag_rejects_joined_value() {
        let mut parser = ArgParser::new("parser");
        parser.add_flag("verbose").nickname('v');

        assert!(matches!(
            parser.try_parse(["app", "--verbose=yes"]),
            Err(ParseError::UnexpectedValue { .. })
        ));
        assert!(matches!(
            parser.try_parse(["app", "-v=yes"]),
            Err(ParseError::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn attached_short_value() {
        let mut parser = ArgParser::new("parser");
        parser.add_flag("extract").nickname('x');
        parser.add_int_argument("level").nickname('l');

        assert!(parser.parse(["app", "-xl9"]));
        assert_eq!(parser.get_value::<bool>("extract"), Some(true));
        assert_eq!(parser.get_value::<i32>("level"), Some(9));
    }

    #[test]
    fn partial_cluster_is_accepted() {
        let mut parser = ArgParser::new("parser");
        parser.add_flag("all").nickname('a');

        assert!(parser.parse(["app", "-az"]));
        assert_eq!(parser.get_value::<bool>("all"), Some(true));
    }

    #[test]
    fn unresolved_cluster_is_positional() {
        let mut parser = ArgParser::new("parser");
        parser.add_flag("all").nickname('a');
        parser.add_string_argument("rest").positional();

        assert!(parser.parse(["app", "-za"]));
        assert_eq!(parser.get_value::<bool>("all"), Some(false));
        assert_eq!(parser.get_value::<String>("rest").as_deref(), Some("-za"));
    }

    #[test]
    fn unknown_long_option_is_unrecognized() {
        let mut parser = ArgParser::new("parser");
        parser.add_flag("all");

        assert_eq!(
            parser.try_parse(["app", "--nope"]),
            Err(ParseError::UnrecognizedArgument {
                token: String::from("--nope")
            })
        );
    }

    #[test]
    fn duplicate_nickname() {
        let mut parser = ArgParser::new("parser");
        parser.add_flag("all").nickname('a');
        parser.add_flag("any").nickname('a');

        assert_eq!(
            parser.try_parse(["app"]),
            Err(ParseError::DuplicateNickname {
                nickname: 'a',
                first: String::from("all"),
                second: String::from("any"),
            })
        );
    }

    #[test]
    fn duplicate_name_replaces() {
        let mut parser = ArgParser::new("parser");
        parser.add_int_argument("value");
        parser.add_string_argument("value");

        assert_eq!(parser.arguments().count(), 1);
        assert!(parser.parse(["app", "--value=text"]));
        assert_eq!(parser.get_value::<String>("value").as_deref(), Some("text"));
        assert_eq!(parser.get_value::<i32>("value"), None);
    }

    #[test]
    fn validation_errors() {
        let mut parser = ArgParser::new("parser");
        parser.add_int_argument("numbers").multi_value(2);

        assert_eq!(
            parser.try_parse(["app", "--numbers", "1"]),
            Err(ParseError::TooFewValues {
                name: String::from("numbers"),
                expected: 2,
                found: 1,
            })
        );

        let mut parser = ArgParser::new("parser");
        parser.add_string_argument("name");

        assert_eq!(
            parser.try_parse(["app"]),
            Err(ParseError::MissingArgument {
                name: String::from("name")
            })
        );
    }

    #[test]
    fn absent_repeated_argument_is_missing() {
        let mut parser = ArgParser::new("parser");
        parser.add_string_argument("files").multi_value(0);

        assert_eq!(
            parser.try_parse(["app"]),
            Err(ParseError::MissingArgument {
                name: String::from("files")
            })
        );
        assert!(parser.parse(["app", "--files", "a.txt"]));

        let mut parser = ArgParser::new("parser");
        parser.add_flag("verbose").nickname('v').multi_value(0);

        assert!(!parser.parse(["app"]));
        assert!(parser.parse(["app", "-vv"]));
        assert_eq!(parser.get_values::<bool>("verbose"), Some(vec![true, true]));
    }

    #[test]
    fn disabled_splitter() {
        let syntax = Syntax {
            splitter: None,
            ..Syntax::STANDARD
        };
        let mut parser = ArgParser::with_syntax("parser", syntax);
        parser.add_string_argument("rest").multi_value(0).positional();
        parser.add_flag("flag");

        assert!(parser.parse(["app", "--", "--flag"]));
        assert_eq!(parser.get_values::<String>("rest"), Some(vec![String::from("--")]));
        assert_eq!(parser.get_value::<bool>("flag"), Some(true));
    }

    #[test]
    fn help_skips_validation_but_not_token_errors() {
        let mut parser = ArgParser::new("parser");
        parser.add_help('h', "help", "Program description");
        parser.add_string_argument("required");

        assert!(!parser.help());
        assert!(parser.parse(["app", "-h"]));
        assert!(parser.help());

        let mut parser = ArgParser::new("parser");
        parser.add_help('h', "help", "Program description");
        assert!(!parser.parse(["app", "--help", "stray"]));
    }
}
