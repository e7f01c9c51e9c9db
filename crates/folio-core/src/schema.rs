//! Typed parameter schemas and a pure validator.
//!
//! Tools describe their arguments with a [`ParamSchema`]. The same description is
//! projected into JSON Schema for the external function-calling orchestrator and
//! used to validate incoming arguments before a tool runs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A tagged union of the constraint kinds tools can declare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamSchema {
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
        allowed: Option<Vec<String>>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
        #[serde(default)]
        integer: bool,
    },
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        items: Box<ParamSchema>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_items: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default)]
        properties: Vec<Property>,
        #[serde(default)]
        additional_properties: bool,
    },
}

/// A named member of an object schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub schema: ParamSchema,
    #[serde(default)]
    pub required: bool,
}

impl ParamSchema {
    // ── Builders ───────────────────────────────────────────────

    /// An object with no properties and additional properties rejected.
    pub fn object() -> Self {
        ParamSchema::Object {
            description: None,
            properties: Vec::new(),
            additional_properties: false,
        }
    }

    pub fn string() -> Self {
        ParamSchema::String {
            description: None,
            min_length: None,
            max_length: None,
            allowed: None,
        }
    }

    pub fn string_enum<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamSchema::String {
            description: None,
            min_length: None,
            max_length: None,
            allowed: Some(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn number() -> Self {
        ParamSchema::Number {
            description: None,
            minimum: None,
            maximum: None,
            integer: false,
        }
    }

    pub fn integer() -> Self {
        ParamSchema::Number {
            description: None,
            minimum: None,
            maximum: None,
            integer: true,
        }
    }

    pub fn boolean() -> Self {
        ParamSchema::Boolean { description: None }
    }

    pub fn array(items: ParamSchema) -> Self {
        ParamSchema::Array {
            description: None,
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match &mut self {
            ParamSchema::String { description, .. }
            | ParamSchema::Number { description, .. }
            | ParamSchema::Boolean { description }
            | ParamSchema::Array { description, .. }
            | ParamSchema::Object { description, .. } => *description = text,
        }
        self
    }

    /// Set string length bounds. No-op on other kinds.
    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        if let ParamSchema::String {
            min_length,
            max_length,
            ..
        } = &mut self
        {
            *min_length = min;
            *max_length = max;
        }
        self
    }

    /// Set numeric bounds (or item-count bounds on arrays).
    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        match &mut self {
            ParamSchema::Number {
                minimum, maximum, ..
            } => {
                *minimum = min;
                *maximum = max;
            }
            ParamSchema::Array {
                min_items,
                max_items,
                ..
            } => {
                *min_items = min.map(|v| v as usize);
                *max_items = max.map(|v| v as usize);
            }
            _ => {}
        }
        self
    }

    pub fn required(self, name: impl Into<String>, schema: ParamSchema) -> Self {
        self.with_property(name.into(), schema, true)
    }

    pub fn optional(self, name: impl Into<String>, schema: ParamSchema) -> Self {
        self.with_property(name.into(), schema, false)
    }

    fn with_property(mut self, name: String, schema: ParamSchema, required: bool) -> Self {
        if let ParamSchema::Object { properties, .. } = &mut self {
            properties.retain(|p| p.name != name);
            properties.push(Property {
                name,
                schema,
                required,
            });
        }
        self
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ParamSchema::String { .. } => "string",
            ParamSchema::Number { integer: true, .. } => "integer",
            ParamSchema::Number { .. } => "number",
            ParamSchema::Boolean { .. } => "boolean",
            ParamSchema::Array { .. } => "array",
            ParamSchema::Object { .. } => "object",
        }
    }

    // ── JSON Schema projection ─────────────────────────────────

    /// Standard JSON Schema, as function-calling APIs expect it.
    pub fn to_json_schema(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), json!(self.type_name()));
        match self {
            ParamSchema::String {
                description,
                min_length,
                max_length,
                allowed,
            } => {
                insert_opt(&mut out, "description", description.as_ref().map(|d| json!(d)));
                insert_opt(&mut out, "minLength", min_length.map(|v| json!(v)));
                insert_opt(&mut out, "maxLength", max_length.map(|v| json!(v)));
                insert_opt(&mut out, "enum", allowed.as_ref().map(|v| json!(v)));
            }
            ParamSchema::Number {
                description,
                minimum,
                maximum,
                ..
            } => {
                insert_opt(&mut out, "description", description.as_ref().map(|d| json!(d)));
                insert_opt(&mut out, "minimum", minimum.map(|v| json!(v)));
                insert_opt(&mut out, "maximum", maximum.map(|v| json!(v)));
            }
            ParamSchema::Boolean { description } => {
                insert_opt(&mut out, "description", description.as_ref().map(|d| json!(d)));
            }
            ParamSchema::Array {
                description,
                items,
                min_items,
                max_items,
            } => {
                insert_opt(&mut out, "description", description.as_ref().map(|d| json!(d)));
                out.insert("items".into(), items.to_json_schema());
                insert_opt(&mut out, "minItems", min_items.map(|v| json!(v)));
                insert_opt(&mut out, "maxItems", max_items.map(|v| json!(v)));
            }
            ParamSchema::Object {
                description,
                properties,
                additional_properties,
            } => {
                insert_opt(&mut out, "description", description.as_ref().map(|d| json!(d)));
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|p| (p.name.clone(), p.schema.to_json_schema()))
                    .collect();
                let required: Vec<&str> = properties
                    .iter()
                    .filter(|p| p.required)
                    .map(|p| p.name.as_str())
                    .collect();
                out.insert("properties".into(), Value::Object(props));
                out.insert("required".into(), json!(required));
                out.insert("additionalProperties".into(), json!(additional_properties));
            }
        }
        Value::Object(out)
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(v) = value {
        map.insert(key.to_string(), v);
    }
}

// ── Validation ─────────────────────────────────────────────────

/// What went wrong at a given location in the argument tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationErrorKind {
    MissingProperty { property: String },
    TypeMismatch { expected: String, actual: String },
    NotInEnum { allowed: Vec<String> },
    TooShort { min: usize },
    TooLong { max: usize },
    BelowMinimum { minimum: f64 },
    AboveMaximum { maximum: f64 },
    NotAnInteger,
    TooFewItems { min: usize },
    TooManyItems { max: usize },
    AdditionalProperty { property: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON-pointer style location, `""` for the root.
    pub path: String,
    #[serde(flatten)]
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    /// A remediation hint suitable for showing to the orchestrator or user.
    pub fn suggestion(&self) -> String {
        match &self.kind {
            ValidationErrorKind::MissingProperty { property } => {
                format!("Missing required property: {property}")
            }
            ValidationErrorKind::TypeMismatch { expected, actual } => {
                format!("Expected {expected} but got {actual}")
            }
            ValidationErrorKind::NotInEnum { allowed } => {
                format!("Value must be one of: {}", allowed.join(", "))
            }
            ValidationErrorKind::TooShort { min } => {
                format!("Value must be at least {min} characters long")
            }
            ValidationErrorKind::TooLong { max } => {
                format!("Value must be at most {max} characters long")
            }
            ValidationErrorKind::BelowMinimum { minimum } => format!("Value must be >= {minimum}"),
            ValidationErrorKind::AboveMaximum { maximum } => format!("Value must be <= {maximum}"),
            ValidationErrorKind::NotAnInteger => "Value must be a whole number".to_string(),
            ValidationErrorKind::TooFewItems { min } => {
                format!("Provide at least {min} items")
            }
            ValidationErrorKind::TooManyItems { max } => {
                format!("Provide at most {max} items")
            }
            ValidationErrorKind::AdditionalProperty { property } => {
                format!("Remove unknown property: {property}")
            }
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let at = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{}: {}", at, self.suggestion())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// One suggestion per error, deduplicated, in encounter order.
    pub fn suggestions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for err in &self.errors {
            let s = err.suggestion();
            if !out.contains(&s) {
                out.push(s);
            }
        }
        out
    }

    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Knobs that loosen or tighten validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// When false, numeric strings pass as numbers and `"true"`/`"false"` as booleans.
    pub strict: bool,
    /// Overrides each object schema's own `additional_properties` flag when set.
    pub allow_additional_properties: Option<bool>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            strict: true,
            allow_additional_properties: None,
        }
    }
}

/// Validates JSON values against a [`ParamSchema`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    options: ValidationOptions,
}

impl Validator {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    pub fn validate(&self, schema: &ParamSchema, value: &Value) -> ValidationReport {
        let mut errors = Vec::new();
        self.check(schema, value, "", &mut errors);
        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    fn check(&self, schema: &ParamSchema, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
        let mut push = |kind| {
            errors.push(ValidationError {
                path: path.to_string(),
                kind,
            })
        };
        match schema {
            ParamSchema::String {
                min_length,
                max_length,
                allowed,
                ..
            } => {
                let Some(s) = value.as_str() else {
                    push(mismatch(schema, value));
                    return;
                };
                let len = s.chars().count();
                if let Some(min) = min_length {
                    if len < *min {
                        push(ValidationErrorKind::TooShort { min: *min });
                    }
                }
                if let Some(max) = max_length {
                    if len > *max {
                        push(ValidationErrorKind::TooLong { max: *max });
                    }
                }
                if let Some(allowed) = allowed {
                    if !allowed.iter().any(|a| a == s) {
                        push(ValidationErrorKind::NotInEnum {
                            allowed: allowed.clone(),
                        });
                    }
                }
            }
            ParamSchema::Number {
                minimum,
                maximum,
                integer,
                ..
            } => {
                let n = match value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) if !self.options.strict => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                let Some(n) = n else {
                    push(mismatch(schema, value));
                    return;
                };
                if *integer && n.fract() != 0.0 {
                    push(ValidationErrorKind::NotAnInteger);
                }
                if let Some(min) = minimum {
                    if n < *min {
                        push(ValidationErrorKind::BelowMinimum { minimum: *min });
                    }
                }
                if let Some(max) = maximum {
                    if n > *max {
                        push(ValidationErrorKind::AboveMaximum { maximum: *max });
                    }
                }
            }
            ParamSchema::Boolean { .. } => {
                let ok = match value {
                    Value::Bool(_) => true,
                    Value::String(s) if !self.options.strict => s == "true" || s == "false",
                    _ => false,
                };
                if !ok {
                    push(mismatch(schema, value));
                }
            }
            ParamSchema::Array {
                items,
                min_items,
                max_items,
                ..
            } => {
                let Some(arr) = value.as_array() else {
                    push(mismatch(schema, value));
                    return;
                };
                if let Some(min) = min_items {
                    if arr.len() < *min {
                        push(ValidationErrorKind::TooFewItems { min: *min });
                    }
                }
                if let Some(max) = max_items {
                    if arr.len() > *max {
                        push(ValidationErrorKind::TooManyItems { max: *max });
                    }
                }
                for (i, item) in arr.iter().enumerate() {
                    self.check(items, item, &format!("{path}/{i}"), errors);
                }
            }
            ParamSchema::Object {
                properties,
                additional_properties,
                ..
            } => {
                let Some(obj) = value.as_object() else {
                    push(mismatch(schema, value));
                    return;
                };
                for prop in properties {
                    let child = format!("{path}/{}", prop.name);
                    match obj.get(&prop.name) {
                        Some(Value::Null) | None if prop.required => {
                            errors.push(ValidationError {
                                path: path.to_string(),
                                kind: ValidationErrorKind::MissingProperty {
                                    property: prop.name.clone(),
                                },
                            });
                        }
                        Some(Value::Null) | None => {}
                        Some(v) => self.check(&prop.schema, v, &child, errors),
                    }
                }
                let allow = self
                    .options
                    .allow_additional_properties
                    .unwrap_or(*additional_properties);
                if !allow {
                    for key in obj.keys() {
                        if !properties.iter().any(|p| &p.name == key) {
                            errors.push(ValidationError {
                                path: path.to_string(),
                                kind: ValidationErrorKind::AdditionalProperty {
                                    property: key.clone(),
                                },
                            });
                        }
                    }
                }
            }
        }
    }
}

/// Validate with default (strict) options.
pub fn validate(schema: &ParamSchema, value: &Value) -> ValidationReport {
    Validator::default().validate(schema, value)
}

fn mismatch(schema: &ParamSchema, value: &Value) -> ValidationErrorKind {
    ValidationErrorKind::TypeMismatch {
        expected: schema.type_name().to_string(),
        actual: json_type_name(value).to_string(),
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav_schema() -> ParamSchema {
        ParamSchema::object()
            .required("page", ParamSchema::string_enum(["home", "about"]))
            .optional("section", ParamSchema::string().length(Some(1), Some(5)))
            .optional("limit", ParamSchema::integer().range(Some(1.0), Some(20.0)))
    }

    #[test]
    fn accepts_valid_arguments() {
        let report = validate(&nav_schema(), &json!({"page": "about", "limit": 3}));
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn derives_suggestions() {
        let report = validate(&nav_schema(), &json!({"section": "x".repeat(9), "limit": 0}));
        assert!(!report.valid);
        let suggestions = report.suggestions();
        assert!(suggestions.contains(&"Missing required property: page".to_string()));
        assert!(suggestions.contains(&"Value must be at most 5 characters long".to_string()));
        assert!(suggestions.contains(&"Value must be >= 1".to_string()));
    }

    #[test]
    fn enum_and_type_errors() {
        let report = validate(&nav_schema(), &json!({"page": "blog"}));
        assert_eq!(report.suggestions(), vec!["Value must be one of: home, about"]);

        let report = validate(&nav_schema(), &json!({"page": 7}));
        assert_eq!(report.suggestions(), vec!["Expected string but got integer"]);
    }

    #[test]
    fn additional_properties_follow_options() {
        let args = json!({"page": "home", "extra": true});
        assert!(!validate(&nav_schema(), &args).valid);

        let lenient = Validator::new(ValidationOptions {
            strict: true,
            allow_additional_properties: Some(true),
        });
        assert!(lenient.validate(&nav_schema(), &args).valid);
    }

    #[test]
    fn non_strict_coerces_strings() {
        let args = json!({"page": "home", "limit": "4"});
        assert!(!validate(&nav_schema(), &args).valid);
        let loose = Validator::new(ValidationOptions {
            strict: false,
            allow_additional_properties: None,
        });
        assert!(loose.validate(&nav_schema(), &args).valid);
    }

    #[test]
    fn json_schema_projection() {
        let schema = nav_schema().to_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["page"]));
        assert_eq!(schema["properties"]["page"]["enum"], json!(["home", "about"]));
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
        assert_eq!(schema["additionalProperties"], json!(false));
    }
}
