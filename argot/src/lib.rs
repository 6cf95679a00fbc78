/*!
A command-line argument parser built around a registry of typed arguments.

Arguments are registered on an [`ArgParser`] by name, with a type ([`Int`],
[`Str`], [`Flag`], [`Parsed<T>`][Parsed] for anything with a
[`FromStr`][core::str::FromStr] implementation, or your own [`ArgumentType`]),
and configured with a chain of calls: a short [`nickname`][Builder::nickname],
a [`default_value`][Builder::default_value], [`multi_value`][Builder::multi_value]
with a minimum count, [`positional`][Builder::positional] matching, and
[`redirect_to`][Builder::redirect_to], which makes the parser write straight into
a variable you own.

```
use argot::ArgParser;

let mut level = 0;

{
    let mut parser = ArgParser::new("archiver");
    parser.add_help('h', "help", "Pack files into an archive");
    parser.add_flag("extract").nickname('x');
    parser.add_string_argument("file").nickname('f');
    parser.add_int_argument("level").nickname('l').default_value(6).redirect_to(&mut level);
    parser.add_string_argument("inputs").multi_value(1).positional();

    assert!(parser.parse(["archiver", "-xf", "out.zip", "-l9", "a.txt", "b.txt"]));

    assert_eq!(parser.get_value::<bool>("extract"), Some(true));
    assert_eq!(parser.get_value::<String>("file").as_deref(), Some("out.zip"));
    assert_eq!(
        parser.get_values::<String>("inputs"),
        Some(vec![String::from("a.txt"), String::from("b.txt")]),
    );
}

assert_eq!(level, 9);
```

Tokens are matched against named options first (`--name value`,
`--name=value`, `-n value`, `-nvalue`, and bundles of short flags like `-xvf`),
and anything that isn't a known option is offered to the positional arguments
in registration order. After a bare `--`, every token is positional.
*/

mod argument;
pub mod build;
pub mod errors;
pub mod help;
mod impls;
mod parser;
pub mod storage;
mod util;

pub use argot_parser::{Arg, Syntax};

pub use crate::{
    argument::{Argument, ArgumentType, Cardinality, Descriptor, Metadata, ParseStatus},
    build::{Builder, Registration},
    errors::ParseError,
    help::{HelpStyle, Usage},
    impls::{Flag, Int, Parsed, ParsedValue, Str},
    parser::ArgParser,
    storage::Storage,
};
