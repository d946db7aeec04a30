//! Example payload synthesis
//!
//! Builds a representative value for a schema, and picks authored examples
//! off media types and parameters before falling back to synthesis. Never
//! fails: anything that cannot be resolved becomes `null`.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::resolver::Resolver;
use crate::types::{Example, MediaType, Parameter, RefOr, Schema, SchemaKind};

/// Recursion bound for synthesis. Self-referencing schemas bottom out as
/// `null` once this depth is exceeded.
pub const MAX_DEPTH: usize = 5;

/// Fixed literal used for `format: uuid` strings
pub const EXAMPLE_UUID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// Schema-driven example generator
#[derive(Debug, Clone, Copy)]
pub struct ExampleSynthesizer<'a> {
    resolver: Resolver<'a>,
}

impl<'a> ExampleSynthesizer<'a> {
    /// Create a synthesizer resolving references through `resolver`
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self { resolver }
    }

    /// Synthesize a value for a schema or reference, starting at depth 0
    pub fn synthesize(&self, schema: &RefOr<Schema>) -> Value {
        self.synthesize_at(schema, 0)
    }

    /// Synthesize at an explicit depth
    pub fn synthesize_at(&self, schema: &RefOr<Schema>, depth: usize) -> Value {
        match schema {
            RefOr::Reference { reference } => match self.resolver.resolve_schema(reference) {
                // A reference that lands on another reference takes one more step
                Some(target @ RefOr::Reference { .. }) if depth < MAX_DEPTH => {
                    self.synthesize_at(&target, depth + 1)
                }
                Some(RefOr::Item(target)) => self.synthesize_schema(&target, depth),
                _ => Value::Null,
            },
            RefOr::Item(schema) => self.synthesize_schema(schema, depth),
        }
    }

    fn synthesize_schema(&self, schema: &Schema, depth: usize) -> Value {
        if depth > MAX_DEPTH {
            return Value::Null;
        }

        if let Some(example) = &schema.example {
            return example.clone();
        }
        if let Some(default) = &schema.default {
            return default.clone();
        }

        match schema.kind() {
            Some(SchemaKind::Object) => Value::Object(
                schema
                    .properties
                    .iter()
                    .map(|(name, property)| {
                        (name.clone(), self.synthesize_at(property, depth + 1))
                    })
                    .collect(),
            ),
            Some(SchemaKind::Array) => match &schema.items {
                Some(items) => Value::Array(vec![self.synthesize_at(items, depth + 1)]),
                None => Value::Array(Vec::new()),
            },
            Some(SchemaKind::String) => match schema.enum_values.first() {
                Some(first) => first.clone(),
                None => Value::String(string_for_format(schema.format.as_deref()).to_string()),
            },
            Some(SchemaKind::Integer) | Some(SchemaKind::Number) => Value::from(0),
            Some(SchemaKind::Boolean) => Value::Bool(true),
            None => self.synthesize_composition(schema, depth),
        }
    }

    /// Best-effort handling of untyped `allOf`/`oneOf`/`anyOf` schemas
    fn synthesize_composition(&self, schema: &Schema, depth: usize) -> Value {
        if !schema.all_of.is_empty() {
            let mut merged = Map::new();
            for part in &schema.all_of {
                match self.synthesize_at(part, depth + 1) {
                    Value::Object(fields) => merged.extend(fields),
                    Value::Null => {}
                    // A non-object member cannot be merged; it stands for the whole
                    other => return other,
                }
            }
            return Value::Object(merged);
        }

        schema
            .one_of
            .first()
            .or_else(|| schema.any_of.first())
            .map(|variant| self.synthesize_at(variant, depth + 1))
            .unwrap_or(Value::Null)
    }

    /// Pick an authored example, falling back to schema synthesis.
    ///
    /// Order: `example`, then the first entry of `examples` (document order),
    /// then the schema. A first `examples` entry that is a reference is not
    /// followed and yields `null`. String examples holding JSON text are
    /// parsed.
    pub fn extract(
        &self,
        example: Option<&Value>,
        examples: &IndexMap<String, RefOr<Example>>,
        schema: Option<&RefOr<Schema>>,
    ) -> Value {
        if let Some(example) = example {
            return parse_embedded_json(example);
        }

        if let Some((_, first)) = examples.first() {
            match first {
                RefOr::Reference { .. } => return Value::Null,
                RefOr::Item(Example {
                    value: Some(value), ..
                }) => return parse_embedded_json(value),
                // externalValue-only examples fall through to the schema
                RefOr::Item(_) => {}
            }
        }

        schema
            .map(|schema| self.synthesize(schema))
            .unwrap_or(Value::Null)
    }

    /// Example for a request or response media type
    pub fn media_type_example(&self, media_type: &MediaType) -> Value {
        self.extract(
            media_type.example.as_ref(),
            &media_type.examples,
            media_type.schema.as_ref(),
        )
    }

    /// Example for a parameter
    pub fn parameter_example(&self, parameter: &Parameter) -> Value {
        self.extract(
            parameter.example.as_ref(),
            &parameter.examples,
            parameter.schema.as_ref(),
        )
    }
}

/// Canned string literal for a `format`
fn string_for_format(format: Option<&str>) -> &'static str {
    match format {
        Some("date") => "2024-01-01",
        Some("date-time") => "2024-01-01T12:00:00Z",
        Some("email") => "user@example.com",
        Some("uri") => "https://example.com",
        Some("uuid") => EXAMPLE_UUID,
        _ => "string",
    }
}

/// A string example that parses as JSON is replaced by the parsed value;
/// anything else, including unparseable strings, is returned as is
pub fn parse_embedded_json(value: &Value) -> Value {
    match value {
        Value::String(text) => serde_json::from_str(text).unwrap_or_else(|_| value.clone()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests;
