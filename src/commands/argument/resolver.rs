//! Argument resolver for prefix invocations
//!
//! Turns the whitespace-separated tokens of a text command into the same named,
//! typed values a slash interaction carries, so one handler body can read its
//! arguments the same way on both surfaces.
//!
//! Tokens are split on runs of whitespace after the prefix. Token 0 is the
//! trigger and `start_at` counts the routing tokens (trigger plus subcommand
//! path segments) that precede argument values.
//!
//! Two strategies are used:
//! - **absolute**: at least as many values as slots. Slots and values are
//!   walked in lockstep, a placeholder slot swallows one value and a trailing
//!   tuple swallows the rest. A value that does not match its slot is an
//!   error, except a user the directory could not find for an optional slot.
//! - **dynamic**: fewer values than slots. An optional argument that does not
//!   match the current value is skipped and the same value is offered to the
//!   next slot.
//!
//! - **Version**: 1.4.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.4.0: Absolute parse rejects mismatched values instead of dropping them
//! - 1.3.0: Leftover values after a dynamic parse are rejected
//! - 1.2.0: Required tuples are re-checked after a dynamic parse
//! - 1.1.0: User lookups go through `UserDirectory`
//! - 1.0.0: Initial absolute/dynamic parser

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serenity::model::id::UserId;
use serenity::model::user::User;
use serenity::prelude::Context;
use std::collections::HashMap;

use super::{Argument, ArgumentKind, ArgumentList, ArgumentType};
use crate::core::error::{AccessError, ResolutionError};
use crate::core::text::extract_id;

/// Account data a user argument resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUser {
    pub id: u64,
    pub name: String,
    pub bot: bool,
    pub avatar_url: Option<String>,
}

impl From<&User> for ResolvedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            name: user.name.clone(),
            bot: user.bot,
            avatar_url: user.avatar_url(),
        }
    }
}

/// Lookup of accounts by id, used by user arguments
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve_user(&self, id: u64) -> Result<ResolvedUser>;
}

#[async_trait]
impl UserDirectory for Context {
    async fn resolve_user(&self, id: u64) -> Result<ResolvedUser> {
        let user = UserId(id).to_user(self).await?;
        Ok(ResolvedUser::from(&user))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    String(String),
    Integer(i64),
    Number(f64),
    User(ResolvedUser),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Single(ArgumentValue),
    Tuple(Vec<ArgumentValue>),
}

/// A resolved value together with the argument that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArgument {
    pub argument: Argument,
    pub value: ParsedValue,
}

#[derive(Debug, Clone, Default)]
pub struct ArgumentResolver {
    tokens: Vec<String>,
    start_at: usize,
    arguments: ArgumentList,
    parsed: HashMap<String, ParsedArgument>,
}

impl ArgumentResolver {
    /// Tokenize a message whose content starts with `prefix`
    pub fn from_content(content: &str, prefix: &str) -> Self {
        let body = content.get(prefix.len()..).unwrap_or_default();
        Self::from_tokens(body.split_whitespace().map(str::to_string).collect())
    }

    /// Root resolver over pre-split tokens; only the trigger is a routing token
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            start_at: 1,
            arguments: ArgumentList::empty(),
            parsed: HashMap::new(),
        }
    }

    /// Resolver carrying values that already arrived typed (slash options)
    pub fn with_values(
        arguments: &ArgumentList,
        values: HashMap<String, ParsedValue>,
    ) -> Result<Self, ResolutionError> {
        let mut resolver = Self {
            arguments: arguments.clone(),
            ..Self::default()
        };

        for argument in arguments.arguments() {
            match values.get(argument.name()) {
                Some(ParsedValue::Tuple(items)) if items.is_empty() => {}
                Some(value) => {
                    resolver.insert(argument, value.clone());
                    continue;
                }
                None => {}
            }
            if argument.is_required() {
                return Err(missing(argument));
            }
        }

        Ok(resolver)
    }

    pub fn trigger(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn start_at(&self) -> usize {
        self.start_at
    }

    /// Tokens after the routing tokens
    pub fn values(&self) -> &[String] {
        self.tokens.get(self.start_at..).unwrap_or_default()
    }

    pub fn specified_amount(&self) -> usize {
        self.values().len()
    }

    pub fn arguments(&self) -> &ArgumentList {
        &self.arguments
    }

    pub fn parsed(&self) -> &HashMap<String, ParsedArgument> {
        &self.parsed
    }

    /// Resolve `arguments` against this resolver's tokens
    ///
    /// `increase_start` marks one more routing token, the first segment of a
    /// subcommand path. Deeper path segments are declared as placeholder slots.
    pub async fn resolve(
        &self,
        arguments: &ArgumentList,
        increase_start: bool,
        directory: &dyn UserDirectory,
    ) -> Result<ArgumentResolver, ResolutionError> {
        let mut child = ArgumentResolver {
            tokens: self.tokens.clone(),
            start_at: self.start_at + usize::from(increase_start),
            arguments: arguments.clone(),
            parsed: HashMap::new(),
        };

        if child.specified_amount() >= arguments.len() {
            child.absolute_parse(directory).await?;
        } else {
            child.dynamic_parse(directory).await?;
        }

        Ok(child)
    }

    /// Usage line for `arguments` as invoked through this resolver
    ///
    /// `increase_start` has the same meaning as in [`resolve`](Self::resolve).
    pub fn usage(&self, prefix: &str, arguments: &ArgumentList, increase_start: bool) -> String {
        let start_at = (self.start_at + usize::from(increase_start)).min(self.tokens.len());
        let mut parts: Vec<String> = self.tokens[..start_at].to_vec();
        let values = &self.tokens[start_at..];

        for (index, slot) in arguments.slots().iter().enumerate() {
            match slot {
                Some(argument) => parts.push(argument.usage_label()),
                None => parts.push(values.get(index).cloned().unwrap_or_else(|| "…".to_string())),
            }
        }

        format!("{prefix}{}", parts.join(" "))
    }

    async fn absolute_parse(&mut self, directory: &dyn UserDirectory) -> Result<(), ResolutionError> {
        let values = self.values().to_vec();
        let slots = self.arguments.slots().to_vec();

        if values.len() > slots.len() && !self.arguments.has_tuple() {
            return Err(ResolutionError::TooManyValues {
                expected: slots.len(),
                received: values.len(),
            });
        }

        for (index, slot) in slots.iter().enumerate() {
            let Some(value) = values.get(index) else { break };
            let Some(argument) = slot else { continue };

            if argument.is_tuple() {
                let items = resolve_tuple(argument, &values[index..], directory).await?;
                self.insert(argument, ParsedValue::Tuple(items));
                break;
            }

            // every value is bound to its slot, so only a failed lookup may leave it unset
            match match_value(argument, value, directory).await {
                Ok(matched) => self.insert(argument, ParsedValue::Single(matched)),
                Err(Rejection::Unresolved(reason)) if !argument.is_required() => {
                    debug!("Optional argument '{}' left unset: {reason}", argument.name());
                }
                Err(rejection) => return Err(invalid_value(argument, rejection.into_reason())),
            }
        }

        Ok(())
    }

    async fn dynamic_parse(&mut self, directory: &dyn UserDirectory) -> Result<(), ResolutionError> {
        let values = self.values().to_vec();
        let slots = self.arguments.slots().to_vec();

        let mut value_index = 0;
        let mut slot_index = 0;

        while value_index < values.len() && slot_index < slots.len() {
            let Some(argument) = &slots[slot_index] else {
                value_index += 1;
                slot_index += 1;
                continue;
            };

            if argument.is_tuple() {
                let items = resolve_tuple(argument, &values[value_index..], directory).await?;
                self.insert(argument, ParsedValue::Tuple(items));
                value_index = values.len();
                slot_index += 1;
                break;
            }

            match match_value(argument, &values[value_index], directory).await {
                Ok(matched) => {
                    self.insert(argument, ParsedValue::Single(matched));
                    value_index += 1;
                }
                Err(rejection) if argument.is_required() => {
                    return Err(invalid_value(argument, rejection.into_reason()));
                }
                Err(rejection) => {
                    debug!(
                        "Optional argument '{}' skipped: {}",
                        argument.name(),
                        rejection.into_reason()
                    );
                }
            }

            slot_index += 1;
        }

        for argument in slots[slot_index..].iter().flatten() {
            if argument.is_required() && !self.parsed.contains_key(argument.name()) {
                return Err(missing(argument));
            }
        }

        if let Some(leftover) = values.get(value_index) {
            return Err(ResolutionError::UnexpectedValue(leftover.clone()));
        }

        Ok(())
    }

    fn insert(&mut self, argument: &Argument, value: ParsedValue) {
        self.parsed.insert(
            argument.name().to_string(),
            ParsedArgument {
                argument: argument.clone(),
                value,
            },
        );
    }

    fn lookup(
        &self,
        name: &str,
        expected: &[ArgumentType],
        tuple: bool,
    ) -> Result<(&Argument, Option<&ParsedValue>), AccessError> {
        let argument = self
            .arguments
            .get(name)
            .ok_or_else(|| AccessError::Undeclared(name.to_string()))?;

        if !expected.contains(&argument.argument_type()) {
            return Err(AccessError::TypeMismatch {
                name: name.to_string(),
                expected: expected
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" or "),
                actual: argument.argument_type(),
            });
        }

        if argument.is_tuple() != tuple {
            return Err(AccessError::ShapeMismatch {
                name: name.to_string(),
                tuple: argument.is_tuple(),
            });
        }

        Ok((argument, self.parsed.get(name).map(|parsed| &parsed.value)))
    }

    fn single(&self, name: &str, expected: &[ArgumentType]) -> Result<Option<&ArgumentValue>, AccessError> {
        let (_, value) = self.lookup(name, expected, false)?;
        Ok(match value {
            Some(ParsedValue::Single(value)) => Some(value),
            _ => None,
        })
    }

    fn many(&self, name: &str, expected: &[ArgumentType]) -> Result<&[ArgumentValue], AccessError> {
        let (argument, value) = self.lookup(name, expected, true)?;
        match value {
            Some(ParsedValue::Tuple(values)) => Ok(values),
            _ if argument.is_required() => Err(AccessError::MissingArgument {
                name: name.to_string(),
                kind: argument.argument_type(),
            }),
            _ => Ok(&[]),
        }
    }

    fn require<T>(&self, name: &str, kind: ArgumentType, value: Option<T>) -> Result<T, AccessError> {
        value.ok_or_else(|| AccessError::MissingArgument {
            name: name.to_string(),
            kind,
        })
    }

    pub fn get_string(&self, name: &str) -> Result<Option<&str>, AccessError> {
        Ok(match self.single(name, &[ArgumentType::String])? {
            Some(ArgumentValue::String(value)) => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn get_integer(&self, name: &str) -> Result<Option<i64>, AccessError> {
        Ok(match self.single(name, &[ArgumentType::Integer])? {
            Some(ArgumentValue::Integer(value)) => Some(*value),
            _ => None,
        })
    }

    /// Number or integer argument, widened to `f64`
    pub fn get_number(&self, name: &str) -> Result<Option<f64>, AccessError> {
        Ok(
            match self.single(name, &[ArgumentType::Number, ArgumentType::Integer])? {
                Some(value) => as_number(value),
                None => None,
            },
        )
    }

    pub fn get_user(&self, name: &str) -> Result<Option<&ResolvedUser>, AccessError> {
        Ok(match self.single(name, &[ArgumentType::User])? {
            Some(ArgumentValue::User(user)) => Some(user),
            _ => None,
        })
    }

    pub fn string(&self, name: &str) -> Result<&str, AccessError> {
        let value = self.get_string(name)?;
        self.require(name, ArgumentType::String, value)
    }

    pub fn integer(&self, name: &str) -> Result<i64, AccessError> {
        let value = self.get_integer(name)?;
        self.require(name, ArgumentType::Integer, value)
    }

    pub fn number(&self, name: &str) -> Result<f64, AccessError> {
        let value = self.get_number(name)?;
        self.require(name, ArgumentType::Number, value)
    }

    pub fn user(&self, name: &str) -> Result<&ResolvedUser, AccessError> {
        let value = self.get_user(name)?;
        self.require(name, ArgumentType::User, value)
    }

    pub fn get_strings(&self, name: &str) -> Result<Vec<&str>, AccessError> {
        Ok(self
            .many(name, &[ArgumentType::String])?
            .iter()
            .filter_map(|value| match value {
                ArgumentValue::String(value) => Some(value.as_str()),
                _ => None,
            })
            .collect())
    }

    pub fn get_integers(&self, name: &str) -> Result<Vec<i64>, AccessError> {
        Ok(self
            .many(name, &[ArgumentType::Integer])?
            .iter()
            .filter_map(|value| match value {
                ArgumentValue::Integer(value) => Some(*value),
                _ => None,
            })
            .collect())
    }

    pub fn get_numbers(&self, name: &str) -> Result<Vec<f64>, AccessError> {
        Ok(self
            .many(name, &[ArgumentType::Number, ArgumentType::Integer])?
            .iter()
            .filter_map(as_number)
            .collect())
    }

    pub fn get_users(&self, name: &str) -> Result<Vec<&ResolvedUser>, AccessError> {
        Ok(self
            .many(name, &[ArgumentType::User])?
            .iter()
            .filter_map(|value| match value {
                ArgumentValue::User(user) => Some(user),
                _ => None,
            })
            .collect())
    }
}

fn as_number(value: &ArgumentValue) -> Option<f64> {
    match value {
        ArgumentValue::Number(value) => Some(*value),
        ArgumentValue::Integer(value) => Some(*value as f64),
        _ => None,
    }
}

fn missing(argument: &Argument) -> ResolutionError {
    ResolutionError::MissingRequired {
        name: argument.name().to_string(),
        kind: argument.argument_type(),
    }
}

fn invalid_value(argument: &Argument, reason: String) -> ResolutionError {
    ResolutionError::InvalidValue {
        name: argument.name().to_string(),
        kind: argument.argument_type(),
        reason,
    }
}

async fn resolve_tuple(
    argument: &Argument,
    values: &[String],
    directory: &dyn UserDirectory,
) -> Result<Vec<ArgumentValue>, ResolutionError> {
    let mut items = Vec::with_capacity(values.len());

    for value in values {
        let matched = match_value(argument, value, directory)
            .await
            .map_err(|rejection| invalid_value(argument, rejection.into_reason()))?;
        items.push(matched);
    }

    if items.is_empty() && argument.is_required() {
        return Err(missing(argument));
    }

    Ok(items)
}

/// Why a token did not match an argument
#[derive(Debug, PartialEq)]
enum Rejection {
    /// The token has the wrong shape or breaks a constraint
    Malformed(String),
    /// The token names a user the directory could not deliver
    Unresolved(String),
}

impl Rejection {
    fn into_reason(self) -> String {
        match self {
            Rejection::Malformed(reason) | Rejection::Unresolved(reason) => reason,
        }
    }
}

impl From<String> for Rejection {
    fn from(reason: String) -> Self {
        Rejection::Malformed(reason)
    }
}

/// Match one token against an argument
async fn match_value(
    argument: &Argument,
    value: &str,
    directory: &dyn UserDirectory,
) -> Result<ArgumentValue, Rejection> {
    match argument.kind() {
        ArgumentKind::String {
            min_length,
            max_length,
        } => {
            let length = value.chars().count();
            if let Some(min) = min_length.filter(|min| length < *min) {
                return Err(format!("must be at least {min} characters long").into());
            }
            if let Some(max) = max_length.filter(|max| length > *max) {
                return Err(format!("must be at most {max} characters long").into());
            }
            Ok(ArgumentValue::String(value.to_string()))
        }
        ArgumentKind::Integer {
            min_value,
            max_value,
        } => {
            let parsed: i64 = value
                .parse()
                .map_err(|_| format!("\"{value}\" is not a whole number"))?;
            check_range(parsed, *min_value, *max_value)?;
            Ok(ArgumentValue::Integer(parsed))
        }
        ArgumentKind::Number {
            min_value,
            max_value,
        } => {
            let parsed: f64 = value
                .parse()
                .ok()
                .filter(|parsed: &f64| parsed.is_finite())
                .ok_or_else(|| format!("\"{value}\" is not a number"))?;
            check_range(parsed, *min_value, *max_value)?;
            Ok(ArgumentValue::Number(parsed))
        }
        ArgumentKind::User { acceptance } => {
            let id = extract_id(value).ok_or_else(|| format!("\"{value}\" is not a user mention or id"))?;

            let user = directory.resolve_user(id).await.map_err(|e| {
                debug!("User lookup for {id} failed: {e}");
                Rejection::Unresolved(format!("could not find user {id}"))
            })?;

            if !acceptance.accepts(user.bot) {
                let reason = if user.bot {
                    "bots are not accepted here"
                } else {
                    "only bots are accepted here"
                };
                return Err(Rejection::Malformed(reason.to_string()));
            }

            Ok(ArgumentValue::User(user))
        }
    }
}

fn check_range<T>(value: T, min: Option<T>, max: Option<T>) -> Result<(), String>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if let Some(min) = min.filter(|min| value < *min) {
        return Err(format!("must be at least {min}"));
    }
    if let Some(max) = max.filter(|max| value > *max) {
        return Err(format!("must be at most {max}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::argument::UserAcceptance;
    use anyhow::anyhow;

    const HUMAN_ID: u64 = 123456789012345678;
    const BOT_ID: u64 = 223456789012345678;

    struct MockDirectory;

    #[async_trait]
    impl UserDirectory for MockDirectory {
        async fn resolve_user(&self, id: u64) -> Result<ResolvedUser> {
            match id {
                HUMAN_ID => Ok(ResolvedUser {
                    id,
                    name: "alice".to_string(),
                    bot: false,
                    avatar_url: None,
                }),
                BOT_ID => Ok(ResolvedUser {
                    id,
                    name: "zent".to_string(),
                    bot: true,
                    avatar_url: None,
                }),
                _ => Err(anyhow!("network error")),
            }
        }
    }

    fn root(content: &str) -> ArgumentResolver {
        ArgumentResolver::from_content(content, "_")
    }

    fn required_string(name: &str) -> Argument {
        Argument::string(name).required().build().unwrap()
    }

    #[test]
    fn test_tokenizes_after_prefix() {
        let resolver = root("_char   create\thero ");
        assert_eq!(resolver.trigger(), Some("char"));
        assert_eq!(resolver.tokens(), &["char", "create", "hero"]);
        assert_eq!(resolver.values(), &["create", "hero"]);
        assert_eq!(resolver.specified_amount(), 2);
    }

    #[test]
    fn test_empty_content_has_no_trigger() {
        let resolver = root("_");
        assert_eq!(resolver.trigger(), None);
        assert!(resolver.values().is_empty());
    }

    #[tokio::test]
    async fn test_exact_required_values() {
        let list = ArgumentList::of(vec![
            required_string("tag"),
            Argument::integer("age").required().build().unwrap(),
        ])
        .unwrap();

        let args = root("_set hero 42").resolve(&list, false, &MockDirectory).await.unwrap();

        assert_eq!(args.string("tag").unwrap(), "hero");
        assert_eq!(args.integer("age").unwrap(), 42);
    }

    #[tokio::test]
    async fn test_fewer_values_names_first_missing() {
        let list = ArgumentList::of(vec![
            required_string("a"),
            required_string("b"),
            required_string("c"),
        ])
        .unwrap();

        let err = root("_cmd x").resolve(&list, false, &MockDirectory).await.unwrap_err();
        assert_eq!(
            err,
            ResolutionError::MissingRequired {
                name: "b".to_string(),
                kind: ArgumentType::String
            }
        );
    }

    #[tokio::test]
    async fn test_too_many_values_without_tuple() {
        let list = ArgumentList::of(vec![required_string("tag")]).unwrap();

        let err = root("_cmd a b c").resolve(&list, false, &MockDirectory).await.unwrap_err();
        assert_eq!(
            err,
            ResolutionError::TooManyValues {
                expected: 1,
                received: 3
            }
        );
    }

    #[tokio::test]
    async fn test_required_tuple_without_values_fails() {
        let list = ArgumentList::of(vec![
            required_string("tag"),
            Argument::string("content").required().tuple().build().unwrap(),
        ])
        .unwrap();

        let err = root("_edit hero").resolve(&list, false, &MockDirectory).await.unwrap_err();
        assert!(matches!(err, ResolutionError::MissingRequired { ref name, .. } if name == "content"));
    }

    #[tokio::test]
    async fn test_tuple_absorbs_remaining_values() {
        let list = ArgumentList::of(vec![
            required_string("tag"),
            Argument::string("content").required().tuple().build().unwrap(),
        ])
        .unwrap();

        let args = root("_edit hero new-content words more words")
            .resolve(&list, false, &MockDirectory)
            .await
            .unwrap();

        assert_eq!(args.string("tag").unwrap(), "hero");
        assert_eq!(
            args.get_strings("content").unwrap(),
            vec!["new-content", "words", "more", "words"]
        );
    }

    #[tokio::test]
    async fn test_tuple_items_are_validated() {
        let list = ArgumentList::of(vec![Argument::integer("numbers")
            .required()
            .tuple()
            .max_value(10)
            .build()
            .unwrap()])
        .unwrap();

        let args = root("_sum 1 2 3").resolve(&list, false, &MockDirectory).await.unwrap();
        assert_eq!(args.get_integers("numbers").unwrap(), vec![1, 2, 3]);
        assert_eq!(args.get_numbers("numbers").unwrap(), vec![1.0, 2.0, 3.0]);

        let err = root("_sum 1 20").resolve(&list, false, &MockDirectory).await.unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidValue { .. }));
    }

    #[tokio::test]
    async fn test_dynamic_parse_skips_optional_without_consuming() {
        let list = ArgumentList::of(vec![
            required_string("a"),
            Argument::integer("b").build().unwrap(),
            required_string("c"),
        ])
        .unwrap();

        let args = root("_cmd first second").resolve(&list, false, &MockDirectory).await.unwrap();

        assert_eq!(args.string("a").unwrap(), "first");
        assert_eq!(args.get_integer("b").unwrap(), None);
        assert_eq!(args.string("c").unwrap(), "second");
    }

    #[tokio::test]
    async fn test_dynamic_parse_rejects_required_mismatch() {
        let list = ArgumentList::of(vec![
            Argument::integer("count").required().build().unwrap(),
            Argument::string("note").build().unwrap(),
        ])
        .unwrap();

        let err = root("_cmd many").resolve(&list, false, &MockDirectory).await.unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidValue { ref name, .. } if name == "count"));
    }

    #[tokio::test]
    async fn test_dynamic_parse_rejects_leftover_values() {
        let list = ArgumentList::of(vec![
            Argument::integer("a").build().unwrap(),
            Argument::integer("b").build().unwrap(),
        ])
        .unwrap();

        let err = root("_cmd word").resolve(&list, false, &MockDirectory).await.unwrap_err();
        assert_eq!(err, ResolutionError::UnexpectedValue("word".to_string()));
    }

    #[tokio::test]
    async fn test_subcommand_scenario_create() {
        let list = ArgumentList::of(vec![Argument::string("tag")
            .required()
            .min_length(1)
            .max_length(20)
            .build()
            .unwrap()])
        .unwrap();

        let root = ArgumentResolver::from_tokens(
            ["char", "create", "hero"].iter().map(|s| s.to_string()).collect(),
        );
        let args = root.resolve(&list, true, &MockDirectory).await.unwrap();

        assert_eq!(args.start_at(), 2);
        assert_eq!(args.string("tag").unwrap(), "hero");
    }

    #[tokio::test]
    async fn test_placeholder_consumes_path_segment() {
        let list = ArgumentList::new(vec![
            Some(required_string("character")),
            None,
            Some(Argument::string("name").required().tuple().build().unwrap()),
        ])
        .unwrap();

        let args = root("_char edit hero name Sir Hero")
            .resolve(&list, true, &MockDirectory)
            .await
            .unwrap();

        assert_eq!(args.string("character").unwrap(), "hero");
        assert_eq!(args.get_strings("name").unwrap(), vec!["Sir", "Hero"]);
    }

    #[tokio::test]
    async fn test_failed_user_lookup_is_absent() {
        let list = ArgumentList::of(vec![
            Argument::user("target").build().unwrap(),
            required_string("note"),
        ])
        .unwrap();

        // lockstep: the optional user slot is left unset and parsing continues
        let args = root("_cmd <@999999999999999999> hello")
            .resolve(&list, false, &MockDirectory)
            .await
            .unwrap();
        assert_eq!(args.get_user("target").unwrap(), None);
        assert_eq!(args.string("note").unwrap(), "hello");

        // fewer values: the same token is retried on the next slot
        let args = root("_cmd <@999999999999999999>")
            .resolve(&list, false, &MockDirectory)
            .await
            .unwrap();
        assert_eq!(args.get_user("target").unwrap(), None);
        assert_eq!(args.string("note").unwrap(), "<@999999999999999999>");
    }

    #[tokio::test]
    async fn test_absolute_parse_rejects_optional_mismatch() {
        let list = ArgumentList::of(vec![
            Argument::integer("count").build().unwrap(),
            Argument::string("words").required().tuple().build().unwrap(),
        ])
        .unwrap();

        let err = root("_say hello world")
            .resolve(&list, false, &MockDirectory)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidValue { ref name, .. } if name == "count"));

        let args = root("_say 3 hello world")
            .resolve(&list, false, &MockDirectory)
            .await
            .unwrap();
        assert_eq!(args.get_integer("count").unwrap(), Some(3));
        assert_eq!(args.get_strings("words").unwrap(), vec!["hello", "world"]);
    }

    #[tokio::test]
    async fn test_failed_user_lookup_rejects_required() {
        let list = ArgumentList::of(vec![Argument::user("target").required().build().unwrap()]).unwrap();

        let err = root("_cmd <@999999999999999999>")
            .resolve(&list, false, &MockDirectory)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidValue { ref reason, .. } if reason.contains("could not find")));
    }

    #[tokio::test]
    async fn test_user_acceptance_filter() {
        let humans = ArgumentList::of(vec![Argument::user("target")
            .required()
            .acceptance(UserAcceptance::User)
            .build()
            .unwrap()])
        .unwrap();

        let args = root(&format!("_cmd <@{HUMAN_ID}>"))
            .resolve(&humans, false, &MockDirectory)
            .await
            .unwrap();
        assert_eq!(args.user("target").unwrap().name, "alice");

        let err = root(&format!("_cmd <@!{BOT_ID}>"))
            .resolve(&humans, false, &MockDirectory)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidValue { .. }));
    }

    #[tokio::test]
    async fn test_string_length_counts_characters() {
        let list = ArgumentList::of(vec![Argument::string("tag")
            .required()
            .max_length(3)
            .build()
            .unwrap()])
        .unwrap();

        assert!(root("_cmd ééé").resolve(&list, false, &MockDirectory).await.is_ok());
        assert!(root("_cmd éééé").resolve(&list, false, &MockDirectory).await.is_err());
    }

    #[tokio::test]
    async fn test_number_parsing() {
        let list = ArgumentList::of(vec![Argument::number("ratio")
            .required()
            .min_value(0.0)
            .max_value(1.0)
            .build()
            .unwrap()])
        .unwrap();

        let args = root("_cmd 0.25").resolve(&list, false, &MockDirectory).await.unwrap();
        assert_eq!(args.number("ratio").unwrap(), 0.25);

        assert!(root("_cmd NaN").resolve(&list, false, &MockDirectory).await.is_err());
        assert!(root("_cmd 1.5").resolve(&list, false, &MockDirectory).await.is_err());
    }

    #[tokio::test]
    async fn test_integer_rejects_fractions() {
        let list = ArgumentList::of(vec![Argument::integer("n").required().build().unwrap()]).unwrap();
        assert!(root("_cmd 4.5").resolve(&list, false, &MockDirectory).await.is_err());
        assert!(root("_cmd 12abc").resolve(&list, false, &MockDirectory).await.is_err());
    }

    #[tokio::test]
    async fn test_accessor_shape_and_type_checks() {
        let list = ArgumentList::of(vec![
            required_string("tag"),
            Argument::string("content").tuple().build().unwrap(),
        ])
        .unwrap();
        let args = root("_cmd hero").resolve(&list, false, &MockDirectory).await.unwrap();

        assert!(matches!(args.get_strings("tag"), Err(AccessError::ShapeMismatch { tuple: false, .. })));
        assert!(matches!(args.get_string("content"), Err(AccessError::ShapeMismatch { tuple: true, .. })));
        assert!(matches!(args.get_integer("tag"), Err(AccessError::TypeMismatch { .. })));
        assert!(matches!(args.get_string("nope"), Err(AccessError::Undeclared(_))));

        // optional tuple that received nothing reads as empty
        assert!(args.get_strings("content").unwrap().is_empty());
    }

    #[test]
    fn test_missing_required_accessor() {
        let list = ArgumentList::of(vec![Argument::string("tag").build().unwrap()]).unwrap();
        let args = ArgumentResolver::with_values(&list, HashMap::new()).unwrap();

        assert_eq!(args.get_string("tag").unwrap(), None);
        assert!(matches!(args.string("tag"), Err(AccessError::MissingArgument { .. })));
    }

    #[test]
    fn test_with_values_checks_required() {
        let list = ArgumentList::of(vec![required_string("tag")]).unwrap();
        assert!(ArgumentResolver::with_values(&list, HashMap::new()).is_err());

        let mut values = HashMap::new();
        values.insert(
            "tag".to_string(),
            ParsedValue::Single(ArgumentValue::String("hero".to_string())),
        );
        let args = ArgumentResolver::with_values(&list, values).unwrap();
        assert_eq!(args.string("tag").unwrap(), "hero");
    }

    #[test]
    fn test_usage_line() {
        let list = ArgumentList::new(vec![
            Some(required_string("character")),
            None,
            Some(Argument::string("name").required().tuple().build().unwrap()),
        ])
        .unwrap();

        let resolver = root("_char edit hero name");
        assert_eq!(
            resolver.usage("_", &list, true),
            "_char edit <character> name <name...>"
        );

        let plain = ArgumentList::of(vec![required_string("tag")]).unwrap();
        assert_eq!(resolver.usage("_", &plain, false), "_char <tag>");
    }
}
