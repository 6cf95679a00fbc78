/*!
Usage messages. The message is built lazily from the parser's registry, so it
always reflects the current set of arguments.
 */

use core::fmt::{self, Display, Write as _};

use indent_write::fmt::IndentWriter;
use joinery::JoinableIterator;
use lazy_format::lazy_format;

use crate::{ArgParser, argument::Argument};

const INDENT: &str = "        ";

/// Layout settings for usage messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpStyle {
    /// Descriptions are wrapped to fit in this many columns
    pub width: usize,
}

impl Default for HelpStyle {
    fn default() -> Self {
        Self { width: 80 }
    }
}

/**
The usage message of an [`ArgParser`]: its name, the description given to
[`add_help`][ArgParser::add_help], and then an entry for every argument in
registration order, with the help flag last.

```text
My Parser
Some description of the program

-n, --number=<int>
        How many times to do it [default = 5]
    --input=<string>, <input>
        Files to read [repeated, min args = 1]
-h, --help
        Display this help and exit
```
*/
pub struct Usage<'p, 'a> {
    parser: &'p ArgParser<'a>,
    style: HelpStyle,
}

impl<'p, 'a> Usage<'p, 'a> {
    #[must_use]
    pub fn new(parser: &'p ArgParser<'a>, style: HelpStyle) -> Self {
        Self { parser, style }
    }

    fn entry(
        &self,
        out: &mut fmt::Formatter<'_>,
        argument: &dyn Argument,
        body: impl Display,
    ) -> fmt::Result {
        let syntax = self.parser.syntax();
        let short_prefix = syntax.short_prefix as char;
        let long_prefix = syntax.long_prefix;
        let placeholder = argument.placeholder();
        let metadata = argument.metadata();
        let name = metadata.full_name.as_str();

        let tags = lazy_format!(match (metadata.nickname) {
            Some(short) => "{short_prefix}{short}, {long_prefix}{name}",
            None => "    {long_prefix}{name}",
        });

        let tags = lazy_format!(match (metadata.takes_parameter) {
            true => "{tags}=<{placeholder}>",
            false => "{tags}",
        });

        let tags = lazy_format!(match (metadata.positional) {
            true => "{tags}, <{name}>",
            false => "{tags}",
        });

        writeln!(out, "{tags}")?;

        let body = self.wrap(&body.to_string(), INDENT.len());
        if body.is_empty() {
            return Ok(());
        }

        writeln!(IndentWriter::new(INDENT, out), "{body}")
    }

    fn wrap(&self, text: &str, indent: usize) -> String {
        let width = self.style.width.saturating_sub(indent).max(1);
        textwrap::fill(text, width)
    }
}

impl Display for Usage<'_, '_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "{}", self.parser.name())?;

        let help = self.parser.help_argument();

        if let Some(help) = help {
            let description = &help.metadata().description;
            if !description.is_empty() {
                writeln!(out, "{}", self.wrap(description, 0))?;
            }
        }

        writeln!(out)?;

        let is_help = |argument: &dyn Argument| {
            help.is_some_and(|help| help.metadata().full_name == argument.metadata().full_name)
        };

        for argument in self.parser.arguments().filter(|&argument| !is_help(argument)) {
            let info = argument.info();
            let body = [argument.metadata().description.as_str(), info.as_str()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .join_with(' ');

            self.entry(out, argument, body)?;
        }

        match help {
            Some(help) => self.entry(out, help, "Display this help and exit"),
            None => Ok(()),
        }
    }
}
