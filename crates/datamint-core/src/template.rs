//! Compiled template model.
//!
//! A raw JSON template is compiled once into a [`Template`] tree in which
//! every directive object has been replaced by a typed [`DirectiveNode`].
//! Compilation performs the shape checks of each directive and enforces the
//! nesting limit, so resolving a compiled template never re-inspects keys.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::DirectiveError;
use crate::validation::pointer_child;

/// Default maximum nesting depth accepted by the compiler.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default probability of a `$nullable` directive resolving to null.
pub const DEFAULT_NULL_PROBABILITY: f64 = 0.5;

/// Options for template compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The directive kinds recognized inside a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Faker,
    Array,
    OneOf,
    Nullable,
}

impl DirectiveKind {
    pub const ALL: [DirectiveKind; 4] = [
        DirectiveKind::Faker,
        DirectiveKind::Array,
        DirectiveKind::OneOf,
        DirectiveKind::Nullable,
    ];

    /// Object key that introduces the directive.
    pub fn key(self) -> &'static str {
        match self {
            DirectiveKind::Faker => "$faker",
            DirectiveKind::Array => "$array",
            DirectiveKind::OneOf => "$oneOf",
            DirectiveKind::Nullable => "$nullable",
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A compiled template node.
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// Null, boolean, number or string; resolves to itself.
    Literal(Value),
    Sequence(Vec<Template>),
    /// Plain object; keys keep their source order.
    Mapping(Vec<(String, Template)>),
    Directive(Box<DirectiveNode>),
}

/// A directive together with the JSON pointer of the object it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveNode {
    pub location: String,
    pub directive: Directive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Faker(FakerDirective),
    Array(ArrayDirective),
    OneOf(OneOfDirective),
    Nullable(NullableDirective),
}

impl Directive {
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::Faker(_) => DirectiveKind::Faker,
            Directive::Array(_) => DirectiveKind::Array,
            Directive::OneOf(_) => DirectiveKind::OneOf,
            Directive::Nullable(_) => DirectiveKind::Nullable,
        }
    }
}

/// Call into a value provider addressed by a dotted path.
#[derive(Debug, Clone, PartialEq)]
pub struct FakerDirective {
    pub path: String,
    /// Parameter object; `None` calls the provider without arguments.
    pub args: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDirective {
    pub element: Template,
    pub cardinality: Cardinality,
}

/// Number of elements produced by an `$array` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Fixed(u64),
    /// Inclusive bounds, drawn again on every resolution.
    Range { min: u64, max: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OneOfDirective {
    /// Never empty.
    pub options: Vec<Template>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullableDirective {
    pub value: Template,
    /// Within `[0, 1]`.
    pub probability: f64,
}

impl Template {
    /// Compile a raw template rooted at the empty pointer with default options.
    pub fn compile(value: &Value) -> Result<Self, DirectiveError> {
        Self::compile_with(value, "", &CompileOptions::default())
    }

    /// Compile a raw template whose root sits at `root` (a JSON pointer).
    pub fn compile_with(
        value: &Value,
        root: &str,
        options: &CompileOptions,
    ) -> Result<Self, DirectiveError> {
        Compiler {
            max_depth: options.max_depth,
        }
        .compile(value, root, 0)
    }

    /// Visit every directive node, outermost first.
    pub fn for_each_directive<F>(&self, visit: &mut F)
    where
        F: FnMut(&DirectiveNode),
    {
        match self {
            Template::Literal(_) => {}
            Template::Sequence(items) => {
                for item in items {
                    item.for_each_directive(visit);
                }
            }
            Template::Mapping(entries) => {
                for (_, item) in entries {
                    item.for_each_directive(visit);
                }
            }
            Template::Directive(node) => {
                visit(node);
                match &node.directive {
                    Directive::Faker(_) => {}
                    Directive::Array(array) => array.element.for_each_directive(visit),
                    Directive::OneOf(one_of) => {
                        for option in &one_of.options {
                            option.for_each_directive(visit);
                        }
                    }
                    Directive::Nullable(nullable) => nullable.value.for_each_directive(visit),
                }
            }
        }
    }
}

struct Compiler {
    max_depth: usize,
}

impl Compiler {
    fn compile(&self, value: &Value, location: &str, depth: usize) -> Result<Template, DirectiveError> {
        if depth > self.max_depth {
            return Err(DirectiveError::DepthExceeded {
                location: location.to_string(),
                limit: self.max_depth,
            });
        }

        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                Ok(Template::Literal(value.clone()))
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    self.compile(item, &pointer_child(location, &idx.to_string()), depth + 1)
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Template::Sequence),
            Value::Object(map) => match directive_kind(map, location)? {
                Some(kind) => {
                    let directive = self.compile_directive(kind, map, location, depth)?;
                    Ok(Template::Directive(Box::new(DirectiveNode {
                        location: location.to_string(),
                        directive,
                    })))
                }
                None => map
                    .iter()
                    .map(|(key, item)| {
                        let child = self.compile(item, &pointer_child(location, key), depth + 1)?;
                        Ok((key.clone(), child))
                    })
                    .collect::<Result<Vec<_>, DirectiveError>>()
                    .map(Template::Mapping),
            },
        }
    }

    fn compile_directive(
        &self,
        kind: DirectiveKind,
        node: &Map<String, Value>,
        location: &str,
        depth: usize,
    ) -> Result<Directive, DirectiveError> {
        let payload = &node[kind.key()];
        let payload_location = pointer_child(location, kind.key());
        let depth = depth + 1;

        match kind {
            DirectiveKind::Faker => compile_faker(node, payload, location).map(Directive::Faker),
            DirectiveKind::Array => {
                reject_unknown_keys(kind, node, &[], location)?;
                let payload = directive_object(kind, payload, location)?;
                reject_unknown_keys(kind, payload, &["element", "count", "min", "max"], location)?;
                let cardinality = array_cardinality(payload, location)?;
                let element = self.compile(
                    payload.get("element").unwrap_or(&Value::Null),
                    &pointer_child(&payload_location, "element"),
                    depth,
                )?;
                Ok(Directive::Array(ArrayDirective {
                    element,
                    cardinality,
                }))
            }
            DirectiveKind::OneOf => {
                reject_unknown_keys(kind, node, &[], location)?;
                let (options, options_location) = match payload {
                    Value::Array(options) => (options, payload_location),
                    Value::Object(map) => {
                        reject_unknown_keys(kind, map, &["options"], location)?;
                        match map.get("options") {
                            Some(Value::Array(options)) => {
                                (options, pointer_child(&payload_location, "options"))
                            }
                            _ => return Err(empty_one_of(location)),
                        }
                    }
                    _ => return Err(empty_one_of(location)),
                };
                if options.is_empty() {
                    return Err(empty_one_of(location));
                }
                let options = options
                    .iter()
                    .enumerate()
                    .map(|(idx, option)| {
                        self.compile(
                            option,
                            &pointer_child(&options_location, &idx.to_string()),
                            depth,
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Directive::OneOf(OneOfDirective { options }))
            }
            DirectiveKind::Nullable => {
                reject_unknown_keys(kind, node, &[], location)?;
                let payload = directive_object(kind, payload, location)?;
                reject_unknown_keys(kind, payload, &["value", "probability"], location)?;
                let probability = match payload.get("probability") {
                    None | Some(Value::Null) => DEFAULT_NULL_PROBABILITY,
                    Some(value) => value
                        .as_f64()
                        .filter(|p| (0.0..=1.0).contains(p))
                        .ok_or_else(|| {
                            DirectiveError::malformed(
                                location,
                                "\"$nullable\" \"probability\" must be a number between 0 and 1",
                            )
                        })?,
                };
                let value = self.compile(
                    payload.get("value").unwrap_or(&Value::Null),
                    &pointer_child(&payload_location, "value"),
                    depth,
                )?;
                Ok(Directive::Nullable(NullableDirective { value, probability }))
            }
        }
    }
}

fn directive_kind(
    map: &Map<String, Value>,
    location: &str,
) -> Result<Option<DirectiveKind>, DirectiveError> {
    let present: Vec<DirectiveKind> = DirectiveKind::ALL
        .into_iter()
        .filter(|kind| map.contains_key(kind.key()))
        .collect();
    match present.as_slice() {
        [] => Ok(None),
        [kind] => Ok(Some(*kind)),
        kinds => {
            let keys: Vec<String> = kinds.iter().map(|kind| format!("\"{kind}\"")).collect();
            Err(DirectiveError::malformed(
                location,
                format!(
                    "a directive object may contain only one directive key, found {}",
                    keys.join(", ")
                ),
            ))
        }
    }
}

fn compile_faker(
    node: &Map<String, Value>,
    payload: &Value,
    location: &str,
) -> Result<FakerDirective, DirectiveError> {
    let kind = DirectiveKind::Faker;
    let (path, args) = match payload {
        Value::String(path) => {
            reject_unknown_keys(kind, node, &["args"], location)?;
            (path.clone(), node.get("args"))
        }
        Value::Object(map) => {
            reject_unknown_keys(kind, node, &[], location)?;
            reject_unknown_keys(kind, map, &["path", "args"], location)?;
            let path = map.get("path").and_then(Value::as_str).ok_or_else(|| {
                DirectiveError::malformed(location, "\"$faker\" requires a \"path\" string")
            })?;
            (path.to_string(), map.get("args"))
        }
        _ => {
            return Err(DirectiveError::malformed(
                location,
                "\"$faker\" requires a method path string",
            ));
        }
    };

    if path.is_empty() {
        return Err(DirectiveError::malformed(
            location,
            "\"$faker\" path must not be empty",
        ));
    }

    let args = match args {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(Value::Object(map.clone())),
        Some(_) => {
            return Err(DirectiveError::malformed(
                location,
                "\"args\" for \"$faker\" must be a JSON object",
            ));
        }
    };

    Ok(FakerDirective { path, args })
}

fn array_cardinality(
    payload: &Map<String, Value>,
    location: &str,
) -> Result<Cardinality, DirectiveError> {
    let bound = |key: &str| -> Result<Option<u64>, DirectiveError> {
        match payload.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| {
                DirectiveError::malformed(
                    location,
                    format!("\"$array\" \"{key}\" must be a non-negative integer"),
                )
            }),
        }
    };

    if let Some(count) = bound("count")? {
        return Ok(Cardinality::Fixed(count));
    }

    match (bound("min")?, bound("max")?) {
        (Some(min), Some(max)) if min > max => Err(DirectiveError::malformed(
            location,
            "\"$array\" \"min\" must be <= \"max\"",
        )),
        (Some(min), Some(max)) => Ok(Cardinality::Range { min, max }),
        _ => Err(DirectiveError::malformed(
            location,
            "\"$array\" requires either \"count\" or both \"min\" and \"max\"",
        )),
    }
}

fn directive_object<'a>(
    kind: DirectiveKind,
    payload: &'a Value,
    location: &str,
) -> Result<&'a Map<String, Value>, DirectiveError> {
    payload.as_object().ok_or_else(|| {
        DirectiveError::malformed(location, format!("\"{kind}\" requires an object payload"))
    })
}

/// Reject keys of `map` that are neither the directive key nor in `allowed`.
fn reject_unknown_keys(
    kind: DirectiveKind,
    map: &Map<String, Value>,
    allowed: &[&str],
    location: &str,
) -> Result<(), DirectiveError> {
    match map
        .keys()
        .find(|key| key.as_str() != kind.key() && !allowed.contains(&key.as_str()))
    {
        Some(key) => Err(DirectiveError::malformed(
            location,
            format!("unexpected key \"{key}\" in \"{kind}\" directive"),
        )),
        None => Ok(()),
    }
}

fn empty_one_of(location: &str) -> DirectiveError {
    DirectiveError::malformed(location, "\"$oneOf\" requires a non-empty array of options")
}
