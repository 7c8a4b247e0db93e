//! Reusable attribute validators

use crate::schema::{Validator, ValidatorRequest, ValidatorResponse};
use crate::types::Diagnostic;

/// Accepts only one of a fixed set of strings
pub struct StringOneOf {
    allowed: Vec<String>,
}

impl StringOneOf {
    pub fn new(allowed: &[&str]) -> Self {
        Self {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Validator for StringOneOf {
    fn description(&self) -> String {
        format!("value must be one of: {}", self.allowed.join(", "))
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        if let Some(s) = request.config_value.value.as_str() {
            if !self.allowed.iter().any(|a| a == s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Invalid value for {}", request.path),
                        format!("Got \"{}\", {}", s, self.description()),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}

pub struct StringPattern {
    pattern: regex::Regex,
    description: String,
}

impl StringPattern {
    /// Fails when `pattern` is not a valid regex
    pub fn new(pattern: &str, description: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: regex::Regex::new(pattern)?,
            description: description.to_string(),
        })
    }
}

impl Validator for StringPattern {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        if let Some(s) = request.config_value.value.as_str() {
            if !self.pattern.is_match(s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must match {}", request.path, self.description),
                        format!("Value '{}' does not match pattern", s),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}

pub struct NumberRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Validator for NumberRange {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("value must be between {} and {}", min, max),
            (Some(min), None) => format!("value must be at least {}", min),
            (None, Some(max)) => format!("value must be at most {}", max),
            (None, None) => "any number".to_string(),
        }
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        if let Some(n) = request.config_value.value.as_number() {
            let too_small = self.min.is_some_and(|min| n < min);
            let too_large = self.max.is_some_and(|max| n > max);
            if too_small || too_large {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} is out of range", request.path),
                        format!("Got {}, {}", n, self.description()),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}

pub struct StringLength {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for StringLength {
    fn description(&self) -> String {
        format!(
            "length between {} and {}",
            self.min.unwrap_or(0),
            self.max.map_or("unbounded".to_string(), |m| m.to_string())
        )
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        if let Some(s) = request.config_value.value.as_str() {
            let len = s.chars().count();
            if let Some(min) = self.min {
                if len < min {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} must have minimum length of {}", request.path, min),
                            format!("Got length {}", len),
                        )
                        .with_attribute(request.path.clone()),
                    );
                }
            }
            if let Some(max) = self.max {
                if len > max {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} must have maximum length of {}", request.path, max),
                            format!("Got length {}", len),
                        )
                        .with_attribute(request.path),
                    );
                }
            }
        }
        ValidatorResponse { diagnostics }
    }
}
