/*!
Construction of argument descriptors.

A [`Builder`] creates one [`Descriptor`], configures it with a chain of
by-value calls, and hands it over with [`Builder::build`], which consumes the
builder. The `add_*` methods on [`ArgParser`] return a [`Registration`]
instead, which offers the same calls and registers the finished descriptor
with the parser when it goes out of scope, at the end of the statement:

```
use argot::ArgParser;

let mut values = Vec::new();

{
    let mut parser = ArgParser::new("program");
    parser
        .add_int_argument("number")
        .multi_value(1)
        .positional()
        .redirect_sequence_to(&mut values);

    assert!(parser.parse(["program", "1", "2", "3"]));
}

assert_eq!(values, [1, 2, 3]);
```
*/

use crate::{
    ArgParser,
    argument::{ArgumentType, Cardinality, Descriptor, Metadata},
};

/// Creates and configures a single [`Descriptor`]. See the
/// [module docs][crate::build] for an overview.
pub struct Builder<'a, A: ArgumentType> {
    product: Descriptor<'a, A>,
}

impl<'a, A: ArgumentType + Default> Builder<'a, A> {
    #[must_use]
    pub fn new(
        full_name: impl Into<String>,
        description: impl Into<String>,
        takes_parameter: bool,
    ) -> Self {
        Self::with_type(full_name, description, takes_parameter, A::default())
    }
}

impl<'a, A: ArgumentType> Builder<'a, A> {
    /// Create a builder for an argument type that carries its own
    /// configuration.
    #[must_use]
    pub fn with_type(
        full_name: impl Into<String>,
        description: impl Into<String>,
        takes_parameter: bool,
        kind: A,
    ) -> Self {
        Self {
            product: Descriptor::new(
                Metadata::new(full_name, description, takes_parameter),
                kind,
            ),
        }
    }

    #[inline]
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.product.metadata.full_name
    }

    /// Describe the argument for usage messages
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.product.metadata.description = description.into();
        self
    }

    /// Give the argument a one-character short name, as in `-n`
    #[must_use]
    pub fn nickname(mut self, nickname: char) -> Self {
        self.product.metadata.nickname = Some(nickname);
        self
    }

    /**
    Allow the argument to appear any number of times, collecting its values
    in order. The parse is only valid if it appeared at least `min_count`
    times. Anything stored so far, including a default, is discarded, so
    call this first.
    */
    #[must_use]
    pub fn multi_value(mut self, min_count: usize) -> Self {
        self.product.storage.multivalue();
        self.product.metadata.cardinality = Cardinality::Repeated { min_count };
        self
    }

    /// Match this argument by position, against tokens that aren't claimed
    /// by any named option.
    #[must_use]
    pub fn positional(mut self) -> Self {
        self.product.metadata.positional = true;
        self
    }

    /// Give the argument a default value, which makes it optional. Repeated
    /// arguments ignore this; they're only satisfied by their minimum count.
    #[must_use]
    pub fn default_value(mut self, value: A::Value) -> Self
    where
        A::Value: Clone,
    {
        self.product.storage.set_default(value);
        self
    }

    /**
    Store the value in `external` instead of in the parser. Whatever has
    been stored so far (such as a default) is moved into `external`
    immediately, and every value parsed afterwards is written there.

    # Panics

    Panics if the argument is repeated (use
    [`redirect_sequence_to`][Self::redirect_sequence_to]) or was already
    redirected.
    */
    #[must_use]
    pub fn redirect_to(mut self, external: &'a mut A::Value) -> Self {
        self.product.storage.redirect(external);
        self
    }

    /**
    Store the values of a repeated argument in `external` instead of in the
    parser.

    # Panics

    Panics if the argument isn't repeated, or was already redirected.
    */
    #[must_use]
    pub fn redirect_sequence_to(mut self, external: &'a mut Vec<A::Value>) -> Self {
        self.product.storage.redirect_sequence(external);
        self
    }

    /// Adjust the configuration carried by the argument type itself
    #[must_use]
    pub fn configure(mut self, configure: impl FnOnce(&mut A)) -> Self {
        configure(self.product.kind_mut());
        self
    }

    /// Finish construction, handing over the descriptor.
    #[must_use]
    pub fn build(self) -> Descriptor<'a, A> {
        self.product
    }
}

/**
A pending argument registration, returned by the `add_*` methods of
[`ArgParser`]. It offers the same configuration calls as [`Builder`], and
registers the argument with the parser when dropped.
*/
pub struct Registration<'p, 'a, A: ArgumentType> {
    parser: &'p mut ArgParser<'a>,
    builder: Option<Builder<'a, A>>,
}

impl<'p, 'a, A: ArgumentType> Registration<'p, 'a, A> {
    pub(crate) fn new(parser: &'p mut ArgParser<'a>, builder: Builder<'a, A>) -> Self {
        Self {
            parser,
            builder: Some(builder),
        }
    }

    #[inline]
    fn map(mut self, update: impl FnOnce(Builder<'a, A>) -> Builder<'a, A>) -> Self {
        self.builder = self.builder.take().map(update);
        self
    }

    /// See [`Builder::description`]
    pub fn description(self, description: impl Into<String>) -> Self {
        self.map(|builder| builder.description(description))
    }

    /// See [`Builder::nickname`]
    pub fn nickname(self, nickname: char) -> Self {
        self.map(|builder| builder.nickname(nickname))
    }

    /// See [`Builder::multi_value`]
    pub fn multi_value(self, min_count: usize) -> Self {
        self.map(|builder| builder.multi_value(min_count))
    }

    /// See [`Builder::positional`]
    pub fn positional(self) -> Self {
        self.map(|builder| builder.positional())
    }

    /// See [`Builder::default_value`]
    pub fn default_value(self, value: A::Value) -> Self
    where
        A::Value: Clone,
    {
        self.map(|builder| builder.default_value(value))
    }

    /// See [`Builder::redirect_to`]
    pub fn redirect_to(self, external: &'a mut A::Value) -> Self {
        self.map(|builder| builder.redirect_to(external))
    }

    /// See [`Builder::redirect_sequence_to`]
    pub fn redirect_sequence_to(self, external: &'a mut Vec<A::Value>) -> Self {
        self.map(|builder| builder.redirect_sequence_to(external))
    }

    /// See [`Builder::configure`]
    pub fn configure(self, configure: impl FnOnce(&mut A)) -> Self {
        self.map(|builder| builder.configure(configure))
    }
}

impl<A: ArgumentType> Drop for Registration<'_, '_, A> {
    fn drop(&mut self) {
        if let Some(builder) = self.builder.take() {
            self.parser.push_argument(builder.build());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Argument, Flag, Int, Str};

    #[test]
    fn builds_configured_descriptor() {
        let descriptor = Builder::<Int>::new("count", "How many", true)
            .nickname('c')
            .positional()
            .default_value(3)
            .build();

        let metadata = descriptor.metadata();
        assert_eq!(metadata.full_name, "count");
        assert_eq!(metadata.nickname, Some('c'));
        assert_eq!(metadata.description, "How many");
        assert!(metadata.takes_parameter);
        assert!(metadata.positional);
        assert_eq!(metadata.cardinality, Cardinality::Single);
        assert!(!metadata.was_parsed);

        assert!(descriptor.validate());
        assert_eq!(descriptor.info(), "[default = 3]");
        assert_eq!(descriptor.value().and_then(|value| value.downcast_ref::<i32>()), Some(&3));
    }

    #[test]
    fn multi_value_ignores_default() {
        let descriptor = Builder::<Str>::new("input", "", true)
            .multi_value(1)
            .default_value(String::from("ignored"))
            .build();

        assert!(descriptor.value().is_none());
        assert!(descriptor.is_empty());
        assert!(!descriptor.validate());
        assert_eq!(descriptor.info(), "[repeated, min args = 1]");
    }

    #[test]
    fn unparsed_repeated_fails_validation() {
        let mut descriptor = Builder::<Str>::new("files", "", true).multi_value(0).build();
        assert!(!descriptor.validate());

        assert_eq!(descriptor.parse_and_save("a.txt"), crate::ParseStatus::Success);
        assert!(descriptor.validate());
    }

    #[test]
    fn required_single_fails_validation() {
        let descriptor = Builder::<Str>::new("name", "", true).build();
        assert!(!descriptor.validate());
        assert_eq!(descriptor.info(), "");
    }

    #[test]
    fn parse_marks_parsed() {
        let mut descriptor = Builder::<Flag>::new("verbose", "", false).build();

        assert_eq!(descriptor.parse_and_save("x"), crate::ParseStatus::NotParsed);
        assert!(!descriptor.metadata().was_parsed);

        assert_eq!(descriptor.parse_and_save(""), crate::ParseStatus::Success);
        assert!(descriptor.metadata().was_parsed);
        assert!(descriptor.validate());
    }

    #[test]
    fn redirect_seeds_external_with_default() {
        let mut external = 0;

        {
            let descriptor = Builder::<Int>::new("level", "", true)
                .default_value(7)
                .redirect_to(&mut external)
                .build();

            assert!(!descriptor.storage().owns_memory());
        }

        assert_eq!(external, 7);
    }
}
