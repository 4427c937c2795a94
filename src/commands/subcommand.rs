//! Subcommand routing
//!
//! A subcommand is bound to a chat-input path (`"create"`, `"edit.name"`) and
//! to dot-joined prefix patterns matched token by token, where `*` accepts any
//! single token (`"edit.*.name"` matches `char edit hero name`).
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.4.0
//!
//! ## Changelog
//! - 1.1.0: Explicit segment matching with `*` wildcards, first match wins
//! - 1.0.0: Chat-input subcommand lookup

use std::collections::HashMap;

use super::argument::ArgumentList;
use crate::core::error::ConfigError;

/// Where a subcommand can be invoked from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubcommandIdentifier {
    /// Subcommand path of a slash invocation, group and name joined with `.`
    pub chat_input: Option<String>,
    pub prefix_triggers: Vec<String>,
}

impl SubcommandIdentifier {
    pub fn new(chat_input: &str, prefix_triggers: &[&str]) -> Self {
        Self {
            chat_input: Some(chat_input.to_string()),
            prefix_triggers: prefix_triggers.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn prefix_only(prefix_triggers: &[&str]) -> Self {
        Self {
            chat_input: None,
            prefix_triggers: prefix_triggers.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// A bare name is both the chat-input path and the prefix trigger
impl From<&str> for SubcommandIdentifier {
    fn from(name: &str) -> Self {
        Self::new(name, &[name])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Wildcard,
}

/// Compiled prefix trigger pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PrefixPattern {
    pub fn parse(pattern: &str) -> Result<Self, String> {
        let mut segments = Vec::new();

        for segment in pattern.split('.') {
            if segment.is_empty() {
                return Err(format!("pattern \"{pattern}\" has an empty segment"));
            }
            if segment.chars().any(char::is_whitespace) {
                return Err(format!("pattern \"{pattern}\" contains whitespace"));
            }
            segments.push(if segment == "*" {
                Segment::Wildcard
            } else {
                Segment::Literal(segment.to_lowercase())
            });
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match against the path tokens that follow the trigger
    ///
    /// There must be at least `depth` tokens; tokens past the pattern are
    /// argument values and are ignored.
    pub fn matches(&self, path: &[String]) -> bool {
        if path.len() < self.depth() {
            return false;
        }

        self.segments
            .iter()
            .zip(path)
            .all(|(segment, token)| match segment {
                Segment::Wildcard => true,
                Segment::Literal(literal) => token.to_lowercase() == *literal,
            })
    }
}

/// One subcommand of a command, executed by `key`
#[derive(Debug, Clone)]
pub struct Subcommand {
    pub key: &'static str,
    pub identifier: SubcommandIdentifier,
    pub arguments: Option<ArgumentList>,
}

impl Subcommand {
    pub fn new(key: &'static str, identifier: impl Into<SubcommandIdentifier>) -> Self {
        Self {
            key,
            identifier: identifier.into(),
            arguments: None,
        }
    }

    pub fn arguments(mut self, arguments: ArgumentList) -> Self {
        self.arguments = Some(arguments);
        self
    }
}

/// Per-command subcommand tables
#[derive(Debug, Clone, Default)]
pub struct SubcommandManager {
    subcommands: Vec<Subcommand>,
    chat_inputs: HashMap<String, usize>,
    prefixes: Vec<(PrefixPattern, usize)>,
}

impl SubcommandManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, subcommand: Subcommand) -> Result<(), ConfigError> {
        let index = self.subcommands.len();
        let invalid = |reason: String| ConfigError::InvalidSubcommand {
            key: subcommand.key.to_string(),
            reason,
        };

        if let Some(path) = &subcommand.identifier.chat_input {
            if self.chat_inputs.contains_key(path) {
                return Err(invalid(format!("chat input \"{path}\" is already bound")));
            }
        }

        let mut patterns = Vec::new();
        for trigger in &subcommand.identifier.prefix_triggers {
            patterns.push(PrefixPattern::parse(trigger).map_err(invalid)?);
        }

        if let Some(path) = &subcommand.identifier.chat_input {
            self.chat_inputs.insert(path.clone(), index);
        }
        self.prefixes
            .extend(patterns.into_iter().map(|pattern| (pattern, index)));
        self.subcommands.push(subcommand);

        Ok(())
    }

    /// Builder-style [`SubcommandManager::add`]
    pub fn with(mut self, subcommand: Subcommand) -> Result<Self, ConfigError> {
        self.add(subcommand)?;
        Ok(self)
    }

    /// Lookup by chat-input path
    pub fn from_chat_input(&self, path: &str) -> Option<&Subcommand> {
        self.chat_inputs
            .get(path)
            .map(|index| &self.subcommands[*index])
    }

    /// Lookup by prefix tokens, token 0 being the trigger
    pub fn from_tokens(&self, tokens: &[String]) -> Option<&Subcommand> {
        let path = tokens.get(1..)?;
        self.prefixes
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, index)| &self.subcommands[*index])
    }

    pub fn len(&self) -> usize {
        self.subcommands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subcommands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subcommand> {
        self.subcommands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<String> {
        input.split_whitespace().map(str::to_string).collect()
    }

    fn character_subcommands() -> SubcommandManager {
        SubcommandManager::new()
            .with(Subcommand::new("create", "create"))
            .unwrap()
            .with(Subcommand::new(
                "edit_name",
                SubcommandIdentifier::new("edit.name", &["edit.*.name"]),
            ))
            .unwrap()
            .with(Subcommand::new(
                "edit_tag",
                SubcommandIdentifier::new("edit.tag", &["edit.*.tag"]),
            ))
            .unwrap()
    }

    #[test]
    fn test_wildcard_pattern_matches_exact_depth() {
        let pattern = PrefixPattern::parse("edit.*.name").unwrap();
        assert_eq!(pattern.depth(), 3);
        assert!(pattern.matches(&tokens("edit hero name")));
        assert!(!pattern.matches(&tokens("edit name")));
    }

    #[test]
    fn test_pattern_ignores_trailing_values() {
        let pattern = PrefixPattern::parse("edit.*.name").unwrap();
        assert!(pattern.matches(&tokens("edit hero name Sir Hero")));
        assert!(!pattern.matches(&tokens("edit hero tag Sir")));
    }

    #[test]
    fn test_pattern_is_case_insensitive() {
        let pattern = PrefixPattern::parse("Edit.*.name").unwrap();
        assert!(pattern.matches(&tokens("EDIT hero NAME")));
    }

    #[test]
    fn test_pattern_rejects_empty_segment() {
        assert!(PrefixPattern::parse("edit..name").is_err());
        assert!(PrefixPattern::parse("").is_err());
    }

    #[test]
    fn test_bare_identifier_sets_both_surfaces() {
        let identifier = SubcommandIdentifier::from("create");
        assert_eq!(identifier.chat_input.as_deref(), Some("create"));
        assert_eq!(identifier.prefix_triggers, vec!["create".to_string()]);
    }

    #[test]
    fn test_lookup_from_tokens() {
        let subcommands = character_subcommands();

        let found = subcommands.from_tokens(&tokens("char edit hero name Bob")).unwrap();
        assert_eq!(found.key, "edit_name");

        let found = subcommands.from_tokens(&tokens("char create hero")).unwrap();
        assert_eq!(found.key, "create");

        assert!(subcommands.from_tokens(&tokens("char edit name")).is_none());
        assert!(subcommands.from_tokens(&tokens("char")).is_none());
    }

    #[test]
    fn test_lookup_from_chat_input() {
        let subcommands = character_subcommands();
        assert_eq!(subcommands.from_chat_input("edit.tag").unwrap().key, "edit_tag");
        assert!(subcommands.from_chat_input("edit").is_none());
    }

    #[test]
    fn test_first_registered_pattern_wins() {
        let subcommands = SubcommandManager::new()
            .with(Subcommand::new("wild", SubcommandIdentifier::prefix_only(&["*.name"])))
            .unwrap()
            .with(Subcommand::new("exact", SubcommandIdentifier::prefix_only(&["edit.name"])))
            .unwrap();

        let found = subcommands.from_tokens(&tokens("char edit name")).unwrap();
        assert_eq!(found.key, "wild");
    }

    #[test]
    fn test_duplicate_chat_input_rejected() {
        let result = character_subcommands().with(Subcommand::new("again", "create"));
        assert!(matches!(result, Err(ConfigError::InvalidSubcommand { .. })));
    }
}
