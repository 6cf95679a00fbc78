use argot_parser::Arg;

use crate::errors::ParseError;

/// Get an argument as a `str`, or report it as invalid UTF-8
pub(crate) fn arg_as_str(arg: Arg<'_>) -> Result<&str, ParseError> {
    arg.as_str().map_err(|_| ParseError::InvalidUtf8 {
        token: String::from_utf8_lossy(arg.bytes()).into_owned(),
    })
}
