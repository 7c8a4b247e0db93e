//! Schema types and builders for tfplug
//!
//! This module provides the schema system for defining resource and data source
//! schemas, including attribute types, blocks, and validation.

use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;

/// AttributeType defines the type system for Terraform attributes
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),               // Ordered, allows duplicates
    Set(Box<AttributeType>),                // Unordered, no duplicates
    Map(Box<AttributeType>),                // String keys only
    Object(HashMap<String, AttributeType>), // Fixed structure
}

/// Schema is returned by providers/resources/data sources
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub block: Block,
}

impl Schema {
    /// Checks required attributes and runs attribute validators against `config`
    pub fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.block
            .validate(config, &AttributePath::root(), &mut diagnostics);
        diagnostics
    }

    /// Attributes whose change between `prior` and `planned` forces replacement
    pub fn requires_replace(
        &self,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Vec<AttributePath> {
        let mut paths = Vec::new();
        if prior.is_null() {
            return paths;
        }
        self.block
            .requires_replace(prior, planned, &AttributePath::root(), &mut paths);
        paths
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|a| a.name == name)
    }
}

/// Block represents a configuration block
#[derive(Debug, Clone)]
pub struct Block {
    pub version: i64,
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
    pub description_kind: StringKind,
    pub deprecated: bool,
}

impl Block {
    fn empty() -> Self {
        Self {
            version: 0,
            attributes: Vec::new(),
            block_types: Vec::new(),
            description: String::new(),
            description_kind: StringKind::Plain,
            deprecated: false,
        }
    }

    fn validate(&self, config: &DynamicValue, base: &AttributePath, diags: &mut Vec<Diagnostic>) {
        for attr in &self.attributes {
            let path = join(base, &attr.name);
            let value = config.get(&path).cloned().unwrap_or(Dynamic::Null);

            if value.is_null() {
                if attr.required {
                    diags.push(
                        Diagnostic::error(
                            format!("Missing required argument \"{}\"", attr.name),
                            format!("The argument \"{}\" is required, but no definition was found.", path),
                        )
                        .with_attribute(path),
                    );
                }
                continue;
            }
            if value.is_unknown() {
                continue;
            }
            if attr.computed && !attr.optional && !attr.required {
                diags.push(
                    Diagnostic::error(
                        format!("Value for unconfigurable attribute \"{}\"", attr.name),
                        format!("Can't configure a value for \"{}\": its value will be decided automatically.", path),
                    )
                    .with_attribute(path),
                );
                continue;
            }

            for validator in &attr.validators {
                let response = validator.validate(ValidatorRequest {
                    config_value: DynamicValue::new(value.clone()),
                    path: path.clone(),
                });
                diags.extend(response.diagnostics);
            }
        }

        for nested in &self.block_types {
            let path = join(base, &nested.type_name);
            let items = match config.get(&path) {
                Some(Dynamic::List(items)) => items.len(),
                Some(Dynamic::Map(_)) => 1,
                _ => 0,
            };

            if (items as i64) < nested.min_items {
                diags.push(
                    Diagnostic::error(
                        format!("Insufficient {} blocks", nested.type_name),
                        format!("At least {} \"{}\" blocks are required.", nested.min_items, nested.type_name),
                    )
                    .with_attribute(path.clone()),
                );
            }
            if nested.max_items > 0 && (items as i64) > nested.max_items {
                diags.push(
                    Diagnostic::error(
                        format!("Too many {} blocks", nested.type_name),
                        format!("No more than {} \"{}\" blocks are allowed.", nested.max_items, nested.type_name),
                    )
                    .with_attribute(path.clone()),
                );
            }

            match config.get(&path) {
                Some(Dynamic::List(list)) => {
                    for idx in 0..list.len() {
                        nested
                            .block
                            .validate(config, &path.clone().index(idx as i64), diags);
                    }
                }
                Some(Dynamic::Map(_)) => nested.block.validate(config, &path, diags),
                _ => {}
            }
        }
    }

    fn requires_replace(
        &self,
        prior: &DynamicValue,
        planned: &DynamicValue,
        base: &AttributePath,
        paths: &mut Vec<AttributePath>,
    ) {
        for attr in &self.attributes {
            if attr.plan_modifiers.is_empty() {
                continue;
            }
            let path = join(base, &attr.name);
            let state_value = prior.get(&path).cloned().unwrap_or(Dynamic::Null);
            let plan_value = planned.get(&path).cloned().unwrap_or(Dynamic::Null);

            for modifier in &attr.plan_modifiers {
                let response = modifier.modify(PlanModifierRequest {
                    config_value: DynamicValue::new(plan_value.clone()),
                    state_value: DynamicValue::new(state_value.clone()),
                    plan_value: DynamicValue::new(plan_value.clone()),
                    path: path.clone(),
                });
                if response.requires_replace {
                    paths.push(path.clone());
                    break;
                }
            }
        }

        for nested in &self.block_types {
            let path = join(base, &nested.type_name);
            let prior_len = prior.get(&path).and_then(|v| v.as_list()).map_or(0, |l| l.len());
            let planned_len = planned.get(&path).and_then(|v| v.as_list()).map_or(0, |l| l.len());

            for idx in 0..prior_len.min(planned_len) {
                nested
                    .block
                    .requires_replace(prior, planned, &path.clone().index(idx as i64), paths);
            }
        }
    }
}

fn join(base: &AttributePath, name: &str) -> AttributePath {
    if base.steps.is_empty() {
        AttributePath::new(name)
    } else {
        base.clone().attribute(name)
    }
}

/// Attribute represents a single configuration attribute
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Box<dyn Validator>>,
    pub plan_modifiers: Vec<Box<dyn PlanModifier>>,
    pub deprecated: bool,
}

// Manual Debug implementation since validators/modifiers don't implement Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field(
                "plan_modifiers",
                &format!("{} plan modifiers", self.plan_modifiers.len()),
            )
            .field("deprecated", &self.deprecated)
            .finish()
    }
}

// Validators and modifiers are trait objects and are not carried by clones
impl Clone for Attribute {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            r#type: self.r#type.clone(),
            description: self.description.clone(),
            required: self.required,
            optional: self.optional,
            computed: self.computed,
            sensitive: self.sensitive,
            validators: vec![],
            plan_modifiers: vec![],
            deprecated: self.deprecated,
        }
    }
}

/// NestedBlock represents a nested configuration block
#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
    pub min_items: i64,
    pub max_items: i64,
}

/// NestingMode defines how nested blocks are structured
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NestingMode {
    Invalid,
    Single,
    List,
    Set,
    Map,
    Group,
}

/// StringKind represents the format of string values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StringKind {
    Plain,
    Markdown,
}

/// Validator performs validation on attribute values during planning
pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Perform validation
    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse;
}

/// Request for validators
pub struct ValidatorRequest {
    pub config_value: DynamicValue,
    pub path: AttributePath,
}

/// Response from validators
pub struct ValidatorResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// PlanModifier modifies planned values during planning
/// Common uses: RequiresReplace, UseStateForUnknown
pub trait PlanModifier: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Modify the planned value
    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse;
}

/// Request for plan modifiers
pub struct PlanModifierRequest {
    pub config_value: DynamicValue,
    pub state_value: DynamicValue,
    pub plan_value: DynamicValue,
    pub path: AttributePath,
}

/// Response from plan modifiers
pub struct PlanModifierResponse {
    pub plan_value: DynamicValue,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// AttributeBuilder provides fluent API for building attributes
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
                deprecated: false,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    /// Mark as sensitive (hidden)
    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.attribute.deprecated = true;
        self
    }

    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.attribute.validators.push(validator);
        self
    }

    pub fn plan_modifier(mut self, modifier: Box<dyn PlanModifier>) -> Self {
        self.attribute.plan_modifiers.push(modifier);
        self
    }

    /// Any change to this attribute destroys and recreates the resource
    pub fn force_new(self) -> Self {
        self.plan_modifier(Box::new(crate::plan_modifier::RequiresReplace))
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// SchemaBuilder provides fluent API for building schemas
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block::empty(),
            },
        }
    }

    /// Set schema version
    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self.schema.block.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.schema.block.block_types.push(block);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn description_kind(mut self, kind: StringKind) -> Self {
        self.schema.block.description_kind = kind;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.schema.block.deprecated = true;
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds nested blocks. Defaults to list nesting with no item limits.
pub struct NestedBlockBuilder {
    nested: NestedBlock,
}

impl NestedBlockBuilder {
    pub fn new(type_name: &str) -> Self {
        Self {
            nested: NestedBlock {
                type_name: type_name.to_string(),
                block: Block::empty(),
                nesting: NestingMode::List,
                min_items: 0,
                max_items: 0,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.nested.block.description = desc.to_string();
        self
    }

    pub fn nesting(mut self, nesting: NestingMode) -> Self {
        self.nested.nesting = nesting;
        self
    }

    pub fn min_items(mut self, min: i64) -> Self {
        self.nested.min_items = min;
        self
    }

    pub fn max_items(mut self, max: i64) -> Self {
        self.nested.max_items = max;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.nested.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.nested.block.block_types.push(block);
        self
    }

    pub fn build(self) -> NestedBlock {
        self.nested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::StringOneOf;

    fn policy_schema() -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("policy_id", AttributeType::String)
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("source", AttributeType::String)
                    .optional()
                    .validator(Box::new(StringOneOf::new(&["API", "CLOUD_MONITOR"])))
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("storage")
                    .max_items(1)
                    .attribute(
                        AttributeBuilder::new("bucket", AttributeType::String)
                            .required()
                            .force_new()
                            .build(),
                    )
                    .build(),
            )
            .build()
    }

    fn config(pairs: &[(&str, Dynamic)]) -> DynamicValue {
        let mut dv = DynamicValue::object();
        for (k, v) in pairs {
            dv.set(&AttributePath::new(k), v.clone()).unwrap();
        }
        dv
    }

    fn storage(bucket: &str) -> Dynamic {
        Dynamic::List(vec![Dynamic::Map(HashMap::from([(
            "bucket".to_string(),
            Dynamic::from(bucket),
        )]))])
    }

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::new("name", AttributeType::String)
            .description("The name of the resource")
            .required()
            .build();

        assert_eq!(attr.name, "name");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
        assert_eq!(attr.description, "The name of the resource");
    }

    #[test]
    fn validate_reports_missing_required() {
        let diags = policy_schema().validate(&config(&[]));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("policy_id"));
    }

    #[test]
    fn validate_runs_attribute_validators() {
        let diags = policy_schema().validate(&config(&[
            ("policy_id", Dynamic::from("asp-1")),
            ("source", Dynamic::from("CRON")),
        ]));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("source"));
    }

    #[test]
    fn validate_rejects_configured_computed_attribute() {
        let diags = policy_schema().validate(&config(&[
            ("policy_id", Dynamic::from("asp-1")),
            ("id", Dynamic::from("x")),
        ]));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("unconfigurable"));
    }

    #[test]
    fn validate_descends_into_blocks() {
        let mut missing_bucket = DynamicValue::object();
        missing_bucket
            .set(&AttributePath::new("policy_id"), "asp-1")
            .unwrap();
        missing_bucket
            .set(
                &AttributePath::new("storage"),
                Dynamic::List(vec![Dynamic::Map(HashMap::new())]),
            )
            .unwrap();

        let diags = policy_schema().validate(&missing_bucket);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].attribute.as_ref().map(|p| p.to_string()),
            Some("storage[0].bucket".to_string())
        );
    }

    #[test]
    fn validate_enforces_max_items() {
        let two = Dynamic::List(vec![
            Dynamic::Map(HashMap::from([("bucket".to_string(), Dynamic::from("a"))])),
            Dynamic::Map(HashMap::from([("bucket".to_string(), Dynamic::from("b"))])),
        ]);
        let diags = policy_schema().validate(&config(&[
            ("policy_id", Dynamic::from("asp-1")),
            ("storage", two),
        ]));
        assert!(diags.iter().any(|d| d.summary.contains("Too many")));
    }

    #[test]
    fn requires_replace_lists_changed_force_new_attributes() {
        let schema = policy_schema();
        let prior = config(&[
            ("policy_id", Dynamic::from("asp-1")),
            ("source", Dynamic::from("API")),
            ("storage", storage("a")),
        ]);
        let planned = config(&[
            ("policy_id", Dynamic::from("asp-2")),
            ("source", Dynamic::from("CLOUD_MONITOR")),
            ("storage", storage("b")),
        ]);

        let paths: Vec<String> = schema
            .requires_replace(&prior, &planned)
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(paths, vec!["policy_id", "storage[0].bucket"]);
    }

    #[test]
    fn requires_replace_is_empty_on_create() {
        let planned = config(&[("policy_id", Dynamic::from("asp-1"))]);
        assert!(policy_schema()
            .requires_replace(&DynamicValue::null(), &planned)
            .is_empty());
    }
}
