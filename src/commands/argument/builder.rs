//! Declarative argument builder
//!
//! ```ignore
//! let tag = Argument::string("tag")
//!     .description("Character tag")
//!     .required()
//!     .min_length(1)
//!     .max_length(20)
//!     .build()?;
//! ```

use super::{Argument, ArgumentKind, UserAcceptance};
use crate::core::error::ConfigError;

/// Converts collected constraints into a validated [`ArgumentKind`]
pub trait Constraints {
    fn into_kind(self, name: &str) -> Result<ArgumentKind, ConfigError>;
}

#[derive(Debug, Clone, Default)]
pub struct StringConstraints {
    min_length: Option<usize>,
    max_length: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct IntegerConstraints {
    min_value: Option<i64>,
    max_value: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NumberConstraints {
    min_value: Option<f64>,
    max_value: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct UserConstraints {
    acceptance: UserAcceptance,
}

fn invalid(name: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidArgument {
        name: name.to_string(),
        reason: reason.into(),
    }
}

impl Constraints for StringConstraints {
    fn into_kind(self, name: &str) -> Result<ArgumentKind, ConfigError> {
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(invalid(name, format!("min length {min} exceeds max length {max}")));
            }
        }
        if self.max_length == Some(0) {
            return Err(invalid(name, "max length must be positive"));
        }
        Ok(ArgumentKind::String {
            min_length: self.min_length,
            max_length: self.max_length,
        })
    }
}

impl Constraints for IntegerConstraints {
    fn into_kind(self, name: &str) -> Result<ArgumentKind, ConfigError> {
        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err(invalid(name, format!("min value {min} exceeds max value {max}")));
            }
        }
        Ok(ArgumentKind::Integer {
            min_value: self.min_value,
            max_value: self.max_value,
        })
    }
}

impl Constraints for NumberConstraints {
    fn into_kind(self, name: &str) -> Result<ArgumentKind, ConfigError> {
        let bounds = [self.min_value, self.max_value];
        if bounds.iter().flatten().any(|bound| !bound.is_finite()) {
            return Err(invalid(name, "bounds must be finite numbers"));
        }
        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err(invalid(name, format!("min value {min} exceeds max value {max}")));
            }
        }
        Ok(ArgumentKind::Number {
            min_value: self.min_value,
            max_value: self.max_value,
        })
    }
}

impl Constraints for UserConstraints {
    fn into_kind(self, _name: &str) -> Result<ArgumentKind, ConfigError> {
        Ok(ArgumentKind::User {
            acceptance: self.acceptance,
        })
    }
}

/// Builder for [`Argument`], typed by the constraints it collects
#[derive(Debug, Clone)]
pub struct ArgumentBuilder<C> {
    name: String,
    description: Option<String>,
    required: bool,
    tuple: bool,
    constraints: C,
}

impl<C: Constraints> ArgumentBuilder<C> {
    pub(super) fn new(name: impl Into<String>, constraints: C) -> Self {
        Self {
            name: name.into(),
            description: None,
            required: false,
            tuple: false,
            constraints,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Trailing variadic argument absorbing every remaining token
    pub fn tuple(mut self) -> Self {
        self.tuple = true;
        self
    }

    pub fn build(self) -> Result<Argument, ConfigError> {
        if self.name.is_empty() {
            return Err(invalid(&self.name, "name must not be empty"));
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(invalid(&self.name, "name must not contain whitespace"));
        }

        let kind = self.constraints.into_kind(&self.name)?;

        Ok(Argument {
            name: self.name,
            description: self.description,
            required: self.required,
            tuple: self.tuple,
            kind,
        })
    }
}

impl ArgumentBuilder<StringConstraints> {
    /// Minimum length in characters
    pub fn min_length(mut self, min: usize) -> Self {
        self.constraints.min_length = Some(min);
        self
    }

    /// Maximum length in characters
    pub fn max_length(mut self, max: usize) -> Self {
        self.constraints.max_length = Some(max);
        self
    }
}

impl ArgumentBuilder<IntegerConstraints> {
    pub fn min_value(mut self, min: i64) -> Self {
        self.constraints.min_value = Some(min);
        self
    }

    pub fn max_value(mut self, max: i64) -> Self {
        self.constraints.max_value = Some(max);
        self
    }
}

impl ArgumentBuilder<NumberConstraints> {
    pub fn min_value(mut self, min: f64) -> Self {
        self.constraints.min_value = Some(min);
        self
    }

    pub fn max_value(mut self, max: f64) -> Self {
        self.constraints.max_value = Some(max);
        self
    }
}

impl ArgumentBuilder<UserConstraints> {
    pub fn acceptance(mut self, acceptance: UserAcceptance) -> Self {
        self.constraints.acceptance = acceptance;
        self
    }
}
