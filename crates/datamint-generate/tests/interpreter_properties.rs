use std::collections::BTreeSet;

use datamint_core::{DirectiveErrorKind, Template};
use datamint_generate::{Interpreter, ProviderError, ProviderRegistry};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{Value, json};

fn stub_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::empty();
    registry.register_fn("person.firstName", |_, _, _| Ok(json!("Ada")));
    registry.register_fn("number.int", |ctx, _, _| Ok(json!(ctx.record_index * 10)));
    registry.register_fn("strict.noArgs", |_, args, _| match args {
        None => Ok(json!("ok")),
        Some(_) => Err(ProviderError::InvalidParams(
            "strict.noArgs: unknown param".to_string(),
        )),
    });
    registry
}

fn resolve(registry: &ProviderRegistry, template: Value, seed: u64) -> Value {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Interpreter::new(registry)
        .resolve_json(&template, 0, &mut rng)
        .expect("resolve")
}

#[test]
fn primitives_resolve_to_themselves() {
    let registry = stub_registry();
    for value in [json!(null), json!(true), json!(-3), json!(2.5), json!("text")] {
        assert_eq!(resolve(&registry, value.clone(), 1), value);
    }
}

#[test]
fn plain_structures_keep_shape_and_order() {
    let registry = stub_registry();
    let template = json!({"z": [1, {"y": "a"}, [null]], "a": {}, "m": []});
    let resolved = resolve(&registry, template.clone(), 1);
    assert_eq!(resolved, template);
    let keys: Vec<_> = resolved
        .as_object()
        .expect("object")
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn array_with_fixed_count() {
    let registry = stub_registry();
    let value = resolve(
        &registry,
        json!({"$array": {"count": 5, "element": {"$faker": "person.firstName"}}}),
        1,
    );
    assert_eq!(value, json!(["Ada", "Ada", "Ada", "Ada", "Ada"]));

    let value = resolve(&registry, json!({"$array": {"count": 0, "element": 1}}), 1);
    assert_eq!(value, json!([]));
}

#[test]
fn array_with_equal_bounds() {
    let registry = stub_registry();
    for seed in 0..20 {
        let value = resolve(&registry, json!({"$array": {"min": 2, "max": 2, "element": "e"}}), seed);
        assert_eq!(value, json!(["e", "e"]));
    }
}

#[test]
fn array_lengths_stay_within_bounds() {
    let registry = stub_registry();
    let mut lengths = BTreeSet::new();
    for seed in 0..200 {
        let value = resolve(&registry, json!({"$array": {"min": 0, "max": 3, "element": 1}}), seed);
        lengths.insert(value.as_array().expect("array").len());
    }
    assert!(lengths.iter().all(|len| *len <= 3));
    assert_eq!(lengths, BTreeSet::from([0, 1, 2, 3]));
}

#[test]
fn array_elements_are_resolved_independently() {
    let registry = ProviderRegistry::new();
    let value = resolve(
        &registry,
        json!({"$array": {"count": 20, "element": {"$faker": "number.int", "args": {"max": 1000000}}}}),
        9,
    );
    let distinct: BTreeSet<_> = value
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item.as_i64().expect("int"))
        .collect();
    assert!(distinct.len() > 1);
}

#[test]
fn one_of_with_single_option_matches_that_option() {
    let registry = stub_registry();
    let option = json!({"inner": {"$faker": "person.firstName"}});
    let chosen = resolve(&registry, json!({"$oneOf": [option.clone()]}), 3);
    assert_eq!(chosen, resolve(&registry, option, 3));
}

#[test]
fn one_of_only_yields_listed_options() {
    let registry = stub_registry();
    let mut seen = BTreeSet::new();
    for seed in 0..100 {
        let value = resolve(&registry, json!({"$oneOf": {"options": ["a", "b", "c"]}}), seed);
        seen.insert(value.as_str().expect("string").to_string());
    }
    assert_eq!(
        seen,
        BTreeSet::from(["a".to_string(), "b".to_string(), "c".to_string()])
    );
}

#[test]
fn nullable_extreme_probabilities() {
    let registry = stub_registry();
    for seed in 0..50 {
        let always = json!({"$nullable": {"value": "v", "probability": 1.0}});
        let never = json!({"$nullable": {"value": {"$faker": "person.firstName"}, "probability": 0.0}});
        assert_eq!(resolve(&registry, always, seed), Value::Null);
        assert_eq!(resolve(&registry, never, seed), json!("Ada"));
    }
}

#[test]
fn nullable_default_probability_yields_both_outcomes() {
    let registry = stub_registry();
    let outcomes: BTreeSet<bool> = (0..100)
        .map(|seed| resolve(&registry, json!({"$nullable": {"value": 1}}), seed).is_null())
        .collect();
    assert_eq!(outcomes, BTreeSet::from([false, true]));
}

#[test]
fn unknown_provider_path_is_reported() {
    let registry = ProviderRegistry::new();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let err = Interpreter::new(&registry)
        .resolve_json(&json!({"a": {"$faker": "bogus.nonexistent"}}), 0, &mut rng)
        .expect_err("unknown path");
    assert_eq!(err.kind(), DirectiveErrorKind::UnresolvableProviderPath);
    assert_eq!(
        err.to_string(),
        "Invalid faker method path: \"bogus.nonexistent\". \"bogus\" does not exist. (at /a)"
    );
}

#[test]
fn namespace_path_is_not_callable() {
    let registry = ProviderRegistry::new();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let err = Interpreter::new(&registry)
        .resolve_json(&json!({"$faker": "person"}), 0, &mut rng)
        .expect_err("namespace");
    assert_eq!(err.kind(), DirectiveErrorKind::NonCallableProviderPath);
    assert_eq!(
        err.to_string(),
        "Faker path \"person\" does not resolve to a callable method."
    );
}

#[test]
fn provider_argument_errors_are_reported() {
    let registry = stub_registry();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let err = Interpreter::new(&registry)
        .resolve_json(&json!({"$faker": "strict.noArgs", "args": {"x": 1}}), 0, &mut rng)
        .expect_err("args rejected");
    assert_eq!(err.kind(), DirectiveErrorKind::ProviderFailed);
}

#[test]
fn malformed_directives_fail_before_resolution() {
    let registry = stub_registry();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let interpreter = Interpreter::new(&registry);
    for template in [
        json!({"$oneOf": []}),
        json!({"$array": {"element": 1}}),
        json!({"$array": {"min": 3, "max": 1}}),
        json!({"$nullable": {"value": 1, "probability": 1.5}}),
        json!({"$faker": "person.firstName", "args": [1]}),
        json!({"$array": {"count": 1}, "$oneOf": [1]}),
    ] {
        let err = interpreter
            .resolve_json(&template, 0, &mut rng)
            .expect_err("malformed");
        assert_eq!(err.kind(), DirectiveErrorKind::MalformedDirective, "{template}");
    }
}

#[test]
fn directives_nest_inside_directives() {
    let registry = stub_registry();
    let template = json!({
        "$array": {
            "count": 2,
            "element": {
                "$oneOf": [{"name": {"$faker": "person.firstName"}, "tags": {"$array": {"count": 1, "element": "t"}}}]
            }
        }
    });
    assert_eq!(
        resolve(&registry, template, 1),
        json!([{"name": "Ada", "tags": ["t"]}, {"name": "Ada", "tags": ["t"]}])
    );
}

#[test]
fn record_index_reaches_providers() {
    let registry = stub_registry();
    let template = Template::compile(&json!({"id": {"$faker": "number.int"}})).expect("compile");
    let interpreter = Interpreter::new(&registry);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let value = interpreter.resolve(&template, 3, &mut rng).expect("resolve");
    assert_eq!(value, json!({"id": 30}));
}

#[test]
fn same_seed_same_output() {
    let registry = ProviderRegistry::new();
    let template = json!({
        "name": {"$faker": "person.fullName"},
        "score": {"$faker": "number.float", "args": {"min": 0, "max": 1}},
        "tags": {"$array": {"min": 1, "max": 4, "element": {"$faker": "lorem.word"}}},
        "maybe": {"$nullable": {"value": {"$faker": "string.uuid"}}}
    });
    assert_eq!(
        resolve(&registry, template.clone(), 77),
        resolve(&registry, template, 77)
    );
}
