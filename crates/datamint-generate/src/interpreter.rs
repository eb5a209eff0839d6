//! Template interpreter: resolves compiled templates into JSON values.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Utc};
use datamint_core::{
    ArrayDirective, Cardinality, Directive, DirectiveError, DirectiveNode, FakerDirective,
    NullableDirective, OneOfDirective, Template,
};
use rand::{Rng, RngCore};
use serde_json::{Map, Value};

use crate::locale::LocaleKey;
use crate::providers::{PathError, Provider, ProviderContext, ProviderRegistry};

/// Number of calls per provider path.
pub type ProviderUsage = BTreeMap<String, u64>;

/// Walks a [`Template`] and resolves every directive it contains.
///
/// The interpreter holds no mutable state; randomness comes from the RNG
/// passed to each call, so one interpreter can serve every record of a run.
#[derive(Debug, Clone, Copy)]
pub struct Interpreter<'r> {
    registry: &'r ProviderRegistry,
    locale: LocaleKey,
    reference_time: NaiveDateTime,
}

impl<'r> Interpreter<'r> {
    pub fn new(registry: &'r ProviderRegistry) -> Self {
        Self {
            registry,
            locale: LocaleKey::default(),
            reference_time: Utc::now().naive_utc(),
        }
    }

    pub fn with_locale(mut self, locale: LocaleKey) -> Self {
        self.locale = locale;
        self
    }

    /// Anchor for relative date providers.
    pub fn with_reference_time(mut self, reference_time: NaiveDateTime) -> Self {
        self.reference_time = reference_time;
        self
    }

    pub fn resolve(
        &self,
        template: &Template,
        record_index: u64,
        rng: &mut dyn RngCore,
    ) -> Result<Value, DirectiveError> {
        let mut usage = ProviderUsage::new();
        self.resolve_counting(template, record_index, rng, &mut usage)
    }

    /// Resolve and add one count to `usage` per successful provider call.
    pub fn resolve_counting(
        &self,
        template: &Template,
        record_index: u64,
        rng: &mut dyn RngCore,
        usage: &mut ProviderUsage,
    ) -> Result<Value, DirectiveError> {
        let ctx = ProviderContext {
            record_index,
            locale: self.locale,
            reference_time: self.reference_time,
        };
        self.walk(template, &ctx, rng, usage)
    }

    /// Compile a raw JSON template and resolve it.
    pub fn resolve_json(
        &self,
        value: &Value,
        record_index: u64,
        rng: &mut dyn RngCore,
    ) -> Result<Value, DirectiveError> {
        let template = Template::compile(value)?;
        self.resolve(&template, record_index, rng)
    }

    /// Look up every faker path without drawing any value.
    pub fn check(&self, template: &Template) -> Vec<DirectiveError> {
        let mut errors = Vec::new();
        template.for_each_directive(&mut |node| {
            if let Directive::Faker(faker) = &node.directive {
                if let Err(err) = self.lookup(&faker.path, &node.location) {
                    errors.push(err);
                }
            }
        });
        errors
    }

    fn walk(
        &self,
        template: &Template,
        ctx: &ProviderContext,
        rng: &mut dyn RngCore,
        usage: &mut ProviderUsage,
    ) -> Result<Value, DirectiveError> {
        match template {
            Template::Literal(value) => Ok(value.clone()),
            Template::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.walk(item, ctx, rng, usage)?);
                }
                Ok(Value::Array(out))
            }
            Template::Mapping(entries) => {
                let mut out = Map::with_capacity(entries.len());
                for (key, item) in entries {
                    out.insert(key.clone(), self.walk(item, ctx, rng, usage)?);
                }
                Ok(Value::Object(out))
            }
            Template::Directive(node) => self.dispatch(node, ctx, rng, usage),
        }
    }

    fn dispatch(
        &self,
        node: &DirectiveNode,
        ctx: &ProviderContext,
        rng: &mut dyn RngCore,
        usage: &mut ProviderUsage,
    ) -> Result<Value, DirectiveError> {
        match &node.directive {
            Directive::Faker(faker) => self.call_provider(faker, &node.location, ctx, rng, usage),
            Directive::Array(array) => self.expand_array(array, ctx, rng, usage),
            Directive::OneOf(one_of) => self.choose(one_of, ctx, rng, usage),
            Directive::Nullable(nullable) => self.maybe_null(nullable, ctx, rng, usage),
        }
    }

    fn call_provider(
        &self,
        faker: &FakerDirective,
        location: &str,
        ctx: &ProviderContext,
        rng: &mut dyn RngCore,
        usage: &mut ProviderUsage,
    ) -> Result<Value, DirectiveError> {
        let provider = self.lookup(&faker.path, location)?;
        let value = provider
            .generate(ctx, faker.args.as_ref(), rng)
            .map_err(|err| DirectiveError::ProviderFailed {
                location: location.to_string(),
                path: faker.path.clone(),
                message: err.to_string(),
            })?;
        *usage.entry(faker.path.clone()).or_insert(0) += 1;
        Ok(value)
    }

    fn expand_array(
        &self,
        array: &ArrayDirective,
        ctx: &ProviderContext,
        rng: &mut dyn RngCore,
        usage: &mut ProviderUsage,
    ) -> Result<Value, DirectiveError> {
        let len = match array.cardinality {
            Cardinality::Fixed(count) => count,
            Cardinality::Range { min, max } => rng.random_range(min..=max),
        };
        let mut out = Vec::new();
        for _ in 0..len {
            out.push(self.walk(&array.element, ctx, rng, usage)?);
        }
        Ok(Value::Array(out))
    }

    fn choose(
        &self,
        one_of: &OneOfDirective,
        ctx: &ProviderContext,
        rng: &mut dyn RngCore,
        usage: &mut ProviderUsage,
    ) -> Result<Value, DirectiveError> {
        let idx = rng.random_range(0..one_of.options.len());
        self.walk(&one_of.options[idx], ctx, rng, usage)
    }

    fn maybe_null(
        &self,
        nullable: &NullableDirective,
        ctx: &ProviderContext,
        rng: &mut dyn RngCore,
        usage: &mut ProviderUsage,
    ) -> Result<Value, DirectiveError> {
        if rng.random::<f64>() < nullable.probability {
            Ok(Value::Null)
        } else {
            self.walk(&nullable.value, ctx, rng, usage)
        }
    }

    fn lookup(&self, path: &str, location: &str) -> Result<&'r dyn Provider, DirectiveError> {
        self.registry.resolve(path).map_err(|err| match err {
            PathError::Missing(segment) => DirectiveError::UnresolvableProviderPath {
                location: location.to_string(),
                path: path.to_string(),
                segment,
            },
            PathError::NotCallable => DirectiveError::NonCallableProviderPath {
                location: location.to_string(),
                path: path.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use datamint_core::DirectiveErrorKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    use super::*;
    use crate::errors::ProviderError;

    fn stub_registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::empty();
        registry.register_fn("stub.index", |ctx, _, _| Ok(json!(ctx.record_index)));
        registry.register_fn("stub.echo", |_, args, _| {
            Ok(args.cloned().unwrap_or(Value::Null))
        });
        registry.register_fn("stub.fail", |_, _, _| {
            Err(ProviderError::InvalidParams("stub.fail: always fails".to_string()))
        });
        registry
    }

    #[test]
    fn faker_values_are_returned_verbatim() {
        let registry = stub_registry();
        let interpreter = Interpreter::new(&registry);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let value = interpreter
            .resolve_json(
                &json!({"n": {"$faker": "stub.index"}, "e": {"$faker": "stub.echo", "args": {"a": [1]}}}),
                7,
                &mut rng,
            )
            .expect("resolve");
        assert_eq!(value, json!({"n": 7, "e": {"a": [1]}}));
    }

    #[test]
    fn path_errors_distinguish_missing_and_namespace() {
        let registry = stub_registry();
        let interpreter = Interpreter::new(&registry);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let err = interpreter
            .resolve_json(&json!({"$faker": "stub.nope"}), 0, &mut rng)
            .expect_err("missing");
        assert_eq!(
            err.to_string(),
            "Invalid faker method path: \"stub.nope\". \"nope\" does not exist."
        );

        let err = interpreter
            .resolve_json(&json!({"x": {"$faker": "stub"}}), 0, &mut rng)
            .expect_err("namespace");
        assert_eq!(err.kind(), DirectiveErrorKind::NonCallableProviderPath);
        assert_eq!(err.location(), "/x");
    }

    #[test]
    fn provider_failures_carry_the_path() {
        let registry = stub_registry();
        let interpreter = Interpreter::new(&registry);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = interpreter
            .resolve_json(&json!([{"$faker": "stub.fail"}]), 0, &mut rng)
            .expect_err("failure");
        assert_eq!(
            err.to_string(),
            "faker \"stub.fail\" failed: stub.fail: always fails (at /0)"
        );
    }

    #[test]
    fn usage_counts_successful_calls() {
        let registry = stub_registry();
        let interpreter = Interpreter::new(&registry);
        let template = Template::compile(&json!({
            "$array": {"count": 4, "element": {"$faker": "stub.index"}}
        }))
        .expect("compile");
        let mut usage = ProviderUsage::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        interpreter
            .resolve_counting(&template, 0, &mut rng, &mut usage)
            .expect("resolve");
        assert_eq!(usage.get("stub.index"), Some(&4));
    }

    #[test]
    fn check_reports_every_bad_path_without_resolving() {
        let registry = stub_registry();
        let interpreter = Interpreter::new(&registry);
        let template = Template::compile(&json!({
            "a": {"$faker": "stub.index"},
            "b": {"$nullable": {"value": {"$faker": "other.thing"}, "probability": 1.0}},
            "c": {"$oneOf": [{"$faker": "stub"}, 1]}
        }))
        .expect("compile");
        let kinds: Vec<_> = interpreter
            .check(&template)
            .iter()
            .map(|err| (err.kind(), err.location().to_string()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (DirectiveErrorKind::UnresolvableProviderPath, "/b/$nullable/value".to_string()),
                (DirectiveErrorKind::NonCallableProviderPath, "/c/$oneOf/0".to_string()),
            ]
        );
    }
}
