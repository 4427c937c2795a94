//! # Argument Model
//!
//! Typed argument descriptors for prefix invocations, and the validated
//! ordered list a command or subcommand declares.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.2.0: Routing placeholders (`None` slots) for subcommand path segments
//! - 1.1.0: Tuple arguments
//! - 1.0.0: String, integer, number and user descriptors

pub mod builder;
pub mod resolver;

use std::collections::HashSet;
use std::fmt;

use crate::core::error::ConfigError;

pub use builder::ArgumentBuilder;
pub use resolver::{
    ArgumentResolver, ArgumentValue, ParsedArgument, ParsedValue, ResolvedUser, UserDirectory,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentType {
    String,
    Integer,
    Number,
    User,
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ArgumentType::String => "string",
            ArgumentType::Integer => "integer",
            ArgumentType::Number => "number",
            ArgumentType::User => "user",
        };
        f.write_str(label)
    }
}

/// Which accounts a user argument accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserAcceptance {
    #[default]
    All,
    /// Humans only
    User,
    /// Bots only
    Bot,
}

impl UserAcceptance {
    pub fn accepts(&self, bot: bool) -> bool {
        match self {
            UserAcceptance::All => true,
            UserAcceptance::User => !bot,
            UserAcceptance::Bot => bot,
        }
    }
}

/// Type-specific constraints of an argument
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentKind {
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    Integer {
        min_value: Option<i64>,
        max_value: Option<i64>,
    },
    Number {
        min_value: Option<f64>,
        max_value: Option<f64>,
    },
    User {
        acceptance: UserAcceptance,
    },
}

impl ArgumentKind {
    pub fn argument_type(&self) -> ArgumentType {
        match self {
            ArgumentKind::String { .. } => ArgumentType::String,
            ArgumentKind::Integer { .. } => ArgumentType::Integer,
            ArgumentKind::Number { .. } => ArgumentType::Number,
            ArgumentKind::User { .. } => ArgumentType::User,
        }
    }
}

/// One declared argument. Built through [`ArgumentBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    name: String,
    description: Option<String>,
    required: bool,
    tuple: bool,
    kind: ArgumentKind,
}

impl Argument {
    pub fn string(name: impl Into<String>) -> ArgumentBuilder<builder::StringConstraints> {
        ArgumentBuilder::new(name, builder::StringConstraints::default())
    }

    pub fn integer(name: impl Into<String>) -> ArgumentBuilder<builder::IntegerConstraints> {
        ArgumentBuilder::new(name, builder::IntegerConstraints::default())
    }

    pub fn number(name: impl Into<String>) -> ArgumentBuilder<builder::NumberConstraints> {
        ArgumentBuilder::new(name, builder::NumberConstraints::default())
    }

    pub fn user(name: impl Into<String>) -> ArgumentBuilder<builder::UserConstraints> {
        ArgumentBuilder::new(name, builder::UserConstraints::default())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_tuple(&self) -> bool {
        self.tuple
    }

    pub fn kind(&self) -> &ArgumentKind {
        &self.kind
    }

    pub fn argument_type(&self) -> ArgumentType {
        self.kind.argument_type()
    }

    /// Usage label, e.g. `<tag>`, `[user]`, `<content...>`
    pub fn usage_label(&self) -> String {
        let dots = if self.tuple { "..." } else { "" };
        if self.required {
            format!("<{}{dots}>", self.name)
        } else {
            format!("[{}{dots}]", self.name)
        }
    }
}

/// Ordered argument slots for one command or subcommand
///
/// A `None` slot is a routing placeholder: it consumes one token (a subcommand
/// path segment) and produces no value.
///
/// Construction checks that names are unique, that there is at most one tuple
/// argument, and that the tuple argument comes last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentList {
    slots: Vec<Option<Argument>>,
}

impl ArgumentList {
    pub fn new(slots: Vec<Option<Argument>>) -> Result<Self, ConfigError> {
        let mut names = HashSet::new();
        let mut tuple_index = None;

        for (index, slot) in slots.iter().enumerate() {
            let Some(argument) = slot else { continue };

            if !names.insert(argument.name.as_str()) {
                return Err(ConfigError::InvalidArgumentList(format!(
                    "argument \"{}\" is declared more than once",
                    argument.name
                )));
            }

            if argument.tuple {
                if tuple_index.is_some() {
                    return Err(ConfigError::InvalidArgumentList(
                        "only one tuple argument is allowed".to_string(),
                    ));
                }
                tuple_index = Some(index);
            }
        }

        if let Some(index) = tuple_index {
            if index != slots.len() - 1 {
                return Err(ConfigError::InvalidArgumentList(format!(
                    "tuple argument \"{}\" must be the last argument",
                    slots[index].as_ref().map(Argument::name).unwrap_or_default()
                )));
            }
        }

        Ok(Self { slots })
    }

    /// Shorthand for a list without routing placeholders
    pub fn of(arguments: Vec<Argument>) -> Result<Self, ConfigError> {
        Self::new(arguments.into_iter().map(Some).collect())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[Option<Argument>] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.arguments().find(|argument| argument.name == name)
    }

    /// Declared arguments, skipping placeholders
    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.slots.iter().flatten()
    }

    pub fn has_tuple(&self) -> bool {
        self.slots.last().and_then(Option::as_ref).is_some_and(Argument::is_tuple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_arg(name: &str) -> Argument {
        Argument::string(name).build().unwrap()
    }

    fn tuple_arg(name: &str) -> Argument {
        Argument::string(name).tuple().build().unwrap()
    }

    #[test]
    fn test_list_accepts_trailing_tuple() {
        let list = ArgumentList::of(vec![string_arg("tag"), tuple_arg("content")]).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.has_tuple());
        assert!(list.get("content").unwrap().is_tuple());
    }

    #[test]
    fn test_list_rejects_tuple_not_last() {
        let result = ArgumentList::of(vec![tuple_arg("content"), string_arg("tag")]);
        assert!(matches!(result, Err(ConfigError::InvalidArgumentList(_))));
    }

    #[test]
    fn test_list_rejects_two_tuples() {
        let result = ArgumentList::of(vec![tuple_arg("a"), tuple_arg("b")]);
        assert!(matches!(result, Err(ConfigError::InvalidArgumentList(_))));
    }

    #[test]
    fn test_list_rejects_duplicate_names() {
        let result = ArgumentList::of(vec![string_arg("tag"), string_arg("tag")]);
        assert!(matches!(result, Err(ConfigError::InvalidArgumentList(_))));
    }

    #[test]
    fn test_list_with_placeholders() {
        let list = ArgumentList::new(vec![Some(string_arg("character")), None, Some(tuple_arg("name"))])
            .unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.arguments().count(), 2);
        assert!(list.get("name").is_some());
        assert!(list.get("missing").is_none());
    }

    #[test]
    fn test_usage_labels() {
        let required = Argument::string("tag").required().build().unwrap();
        let optional = Argument::user("user").build().unwrap();
        let tuple = Argument::string("content").required().tuple().build().unwrap();

        assert_eq!(required.usage_label(), "<tag>");
        assert_eq!(optional.usage_label(), "[user]");
        assert_eq!(tuple.usage_label(), "<content...>");
    }

    #[test]
    fn test_user_acceptance() {
        assert!(UserAcceptance::All.accepts(true));
        assert!(UserAcceptance::All.accepts(false));
        assert!(UserAcceptance::User.accepts(false));
        assert!(!UserAcceptance::User.accepts(true));
        assert!(UserAcceptance::Bot.accepts(true));
        assert!(!UserAcceptance::Bot.accepts(false));
    }
}
