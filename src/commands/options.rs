//! Slash command option helpers
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.1.0: Convert options into an `ArgumentResolver` for hybrid handlers
//! - 1.0.0: Option getters and subcommand path extraction

use serenity::model::application::command::CommandOptionType;
use serenity::model::application::interaction::application_command::{
    CommandDataOption, CommandDataOptionValue,
};
use serenity::model::channel::Attachment;
use std::collections::HashMap;

use super::argument::{
    ArgumentList, ArgumentResolver, ArgumentType, ArgumentValue, ParsedValue, ResolvedUser,
};
use crate::core::error::ResolutionError;

/// Utility function to get string option from slash command
pub fn get_string_option(options: &[CommandDataOption], name: &str) -> Option<String> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

pub fn get_attachment_option<'a>(
    options: &'a [CommandDataOption],
    name: &str,
) -> Option<&'a Attachment> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| match &opt.resolved {
            Some(CommandDataOptionValue::Attachment(attachment)) => Some(attachment),
            _ => None,
        })
}

/// Subcommand path (`group.name` or `name`) and the options of the leaf
pub fn subcommand_path(options: &[CommandDataOption]) -> (Option<String>, &[CommandDataOption]) {
    let Some(first) = options.first() else {
        return (None, options);
    };

    match first.kind {
        CommandOptionType::SubCommandGroup => match first.options.first() {
            Some(sub) if sub.kind == CommandOptionType::SubCommand => {
                (Some(format!("{}.{}", first.name, sub.name)), &sub.options)
            }
            _ => (None, &first.options),
        },
        CommandOptionType::SubCommand => (Some(first.name.clone()), &first.options),
        _ => (None, options),
    }
}

/// The option currently being typed in an autocomplete request
pub fn focused_option(options: &[CommandDataOption]) -> Option<&CommandDataOption> {
    options.iter().find_map(|opt| {
        if opt.focused {
            Some(opt)
        } else {
            focused_option(&opt.options)
        }
    })
}

impl ArgumentResolver {
    /// Build a resolver from slash options so hybrid handlers read arguments one way
    ///
    /// Options whose type does not fit the declared argument are ignored. A string
    /// option feeding a tuple argument is split on whitespace.
    pub fn from_options(
        arguments: Option<&ArgumentList>,
        options: &[CommandDataOption],
    ) -> Result<ArgumentResolver, ResolutionError> {
        let Some(arguments) = arguments else {
            return Ok(ArgumentResolver::default());
        };

        let mut values = HashMap::new();

        for argument in arguments.arguments() {
            let Some(option) = options.iter().find(|opt| opt.name == argument.name()) else {
                continue;
            };
            let Some(value) = option_value(argument.argument_type(), option) else {
                continue;
            };

            let parsed = match (argument.is_tuple(), value) {
                (true, ArgumentValue::String(text)) => ParsedValue::Tuple(
                    text.split_whitespace()
                        .map(|word| ArgumentValue::String(word.to_string()))
                        .collect(),
                ),
                (true, value) => ParsedValue::Tuple(vec![value]),
                (false, value) => ParsedValue::Single(value),
            };
            values.insert(argument.name().to_string(), parsed);
        }

        ArgumentResolver::with_values(arguments, values)
    }
}

fn option_value(kind: ArgumentType, option: &CommandDataOption) -> Option<ArgumentValue> {
    match kind {
        ArgumentType::String if option.kind == CommandOptionType::String => option
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .map(|s| ArgumentValue::String(s.to_string())),
        ArgumentType::Integer if option.kind == CommandOptionType::Integer => option
            .value
            .as_ref()
            .and_then(|v| v.as_i64())
            .map(ArgumentValue::Integer),
        ArgumentType::Number
            if matches!(option.kind, CommandOptionType::Number | CommandOptionType::Integer) =>
        {
            option
                .value
                .as_ref()
                .and_then(|v| v.as_f64())
                .map(ArgumentValue::Number)
        }
        ArgumentType::User => match &option.resolved {
            Some(CommandDataOptionValue::User(user, _)) => {
                Some(ArgumentValue::User(ResolvedUser::from(user)))
            }
            _ => None,
        },
        // attachments and other option types have no argument counterpart
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::argument::Argument;
    use serde_json::json;

    fn option(value: serde_json::Value) -> CommandDataOption {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_get_string_option() {
        let options = vec![option(json!({"name": "tag", "type": 3, "value": "hero"}))];
        assert_eq!(get_string_option(&options, "tag"), Some("hero".to_string()));
        assert_eq!(get_string_option(&options, "name"), None);
    }

    #[test]
    fn test_subcommand_path_with_group() {
        let options = vec![option(json!({
            "name": "edit",
            "type": 2,
            "options": [{
                "name": "name",
                "type": 1,
                "options": [{"name": "character", "type": 3, "value": "42"}]
            }]
        }))];

        let (path, leaf) = subcommand_path(&options);
        assert_eq!(path.as_deref(), Some("edit.name"));
        assert_eq!(leaf.len(), 1);
        assert_eq!(leaf[0].name, "character");
    }

    #[test]
    fn test_subcommand_path_plain() {
        let options = vec![option(json!({"name": "list", "type": 1, "options": []}))];
        let (path, leaf) = subcommand_path(&options);
        assert_eq!(path.as_deref(), Some("list"));
        assert!(leaf.is_empty());

        let (path, _) = subcommand_path(&[]);
        assert!(path.is_none());
    }

    #[test]
    fn test_from_options_splits_tuple_strings() {
        let arguments = ArgumentList::of(vec![
            Argument::string("character").required().build().unwrap(),
            Argument::string("name").required().tuple().build().unwrap(),
        ])
        .unwrap();
        let options = vec![
            option(json!({"name": "character", "type": 3, "value": "42"})),
            option(json!({"name": "name", "type": 3, "value": "Sir  Hero"})),
        ];

        let args = ArgumentResolver::from_options(Some(&arguments), &options).unwrap();
        assert_eq!(args.string("character").unwrap(), "42");
        assert_eq!(args.get_strings("name").unwrap(), vec!["Sir", "Hero"]);
    }

    #[test]
    fn test_from_options_missing_required() {
        let arguments =
            ArgumentList::of(vec![Argument::integer("count").required().build().unwrap()]).unwrap();
        let options = vec![option(json!({"name": "count", "type": 3, "value": "many"}))];

        assert!(ArgumentResolver::from_options(Some(&arguments), &options).is_err());
        assert!(ArgumentResolver::from_options(None, &options).is_ok());
    }

    #[test]
    fn test_from_options_ignores_attachment_for_string() {
        let arguments =
            ArgumentList::of(vec![Argument::string("avatar").build().unwrap()]).unwrap();
        let options = vec![option(json!({"name": "avatar", "type": 11, "value": "123456789012345678"}))];

        let args = ArgumentResolver::from_options(Some(&arguments), &options).unwrap();
        assert_eq!(args.get_string("avatar").unwrap(), None);
    }
}
