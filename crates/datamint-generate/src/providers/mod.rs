//! Value providers addressable by dotted path.
//!
//! The registry is an explicit namespace tree: `person.firstName` resolves
//! by descending into the `person` namespace and taking its `firstName`
//! provider. Only the providers registered here are reachable.

pub mod faker_rs;
pub mod lorem;
pub mod primitives;

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use rand::RngCore;
use serde_json::Value;

use crate::errors::ProviderError;
use crate::locale::LocaleKey;

/// Per-call context handed to providers.
#[derive(Debug, Clone, Copy)]
pub struct ProviderContext {
    /// 0-based index of the record being generated.
    pub record_index: u64,
    pub locale: LocaleKey,
    /// Anchor for relative date providers (`date.past`, `date.future`, ...).
    pub reference_time: NaiveDateTime,
}

/// A named random-value generator.
pub trait Provider: Send + Sync {
    /// Full dotted path, e.g. `person.firstName`.
    fn path(&self) -> &'static str;

    fn generate(
        &self,
        ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError>;
}

/// Why a dotted path did not resolve to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The named segment does not exist at its level.
    Missing(String),
    /// The path stops at a namespace.
    NotCallable,
}

enum Entry {
    Namespace(Namespace),
    Provider(Box<dyn Provider>),
}

#[derive(Default)]
struct Namespace {
    entries: BTreeMap<String, Entry>,
}

impl Namespace {
    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for (name, entry) in &self.entries {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            match entry {
                Entry::Namespace(namespace) => namespace.collect_paths(&path, out),
                Entry::Provider(_) => out.push(path),
            }
        }
    }
}

/// Registry of value providers.
pub struct ProviderRegistry {
    root: Namespace,
}

impl ProviderRegistry {
    /// Registry with every built-in provider category.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        primitives::register(&mut registry);
        lorem::register(&mut registry);
        faker_rs::register(&mut registry);
        registry
    }

    /// Registry without providers, for tests and custom catalogs.
    pub fn empty() -> Self {
        Self {
            root: Namespace::default(),
        }
    }

    /// Register a provider under its path.
    ///
    /// A provider registered at an existing path replaces the previous entry.
    pub fn register_provider(&mut self, provider: Box<dyn Provider>) {
        let path = provider.path();
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(leaf) = segments.pop() else {
            return;
        };

        let mut namespace = &mut self.root;
        for segment in segments {
            let entry = namespace
                .entries
                .entry(segment.to_string())
                .or_insert_with(|| Entry::Namespace(Namespace::default()));
            if matches!(entry, Entry::Provider(_)) {
                *entry = Entry::Namespace(Namespace::default());
            }
            let Entry::Namespace(next) = entry else {
                return;
            };
            namespace = next;
        }
        namespace
            .entries
            .insert(leaf.to_string(), Entry::Provider(provider));
    }

    /// Register a closure as the provider for `path`.
    pub fn register_fn<F>(&mut self, path: &'static str, generate: F)
    where
        F: Fn(&ProviderContext, Option<&Value>, &mut dyn RngCore) -> Result<Value, ProviderError>
            + Send
            + Sync
            + 'static,
    {
        self.register_provider(Box::new(FnProvider { path, generate }));
    }

    /// Resolve a dotted path by descending through namespaces.
    pub fn resolve(&self, path: &str) -> Result<&dyn Provider, PathError> {
        let mut current = None::<&Entry>;
        for segment in path.split('.') {
            let namespace = match current {
                None => &self.root,
                Some(Entry::Namespace(namespace)) => namespace,
                Some(Entry::Provider(_)) => return Err(PathError::Missing(segment.to_string())),
            };
            current = Some(
                namespace
                    .entries
                    .get(segment)
                    .ok_or_else(|| PathError::Missing(segment.to_string()))?,
            );
        }

        match current {
            Some(Entry::Provider(provider)) => Ok(provider.as_ref()),
            _ => Err(PathError::NotCallable),
        }
    }

    pub fn get(&self, path: &str) -> Option<&dyn Provider> {
        self.resolve(path).ok()
    }

    /// All provider paths, sorted.
    pub fn provider_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.root.collect_paths("", &mut paths);
        paths.sort();
        paths
    }

    /// Top-level namespace names.
    pub fn categories(&self) -> Vec<&str> {
        self.root.entries.keys().map(String::as_str).collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.provider_paths())
            .finish()
    }
}

pub(crate) fn invalid(path: &str, message: &str) -> ProviderError {
    ProviderError::InvalidParams(format!("{path}: {message}"))
}

struct FnProvider<F> {
    path: &'static str,
    generate: F,
}

impl<F> Provider for FnProvider<F>
where
    F: Fn(&ProviderContext, Option<&Value>, &mut dyn RngCore) -> Result<Value, ProviderError>
        + Send
        + Sync,
{
    fn path(&self) -> &'static str {
        self.path
    }

    fn generate(
        &self,
        ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        (self.generate)(ctx, args, rng)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    use super::*;

    #[test]
    fn resolves_nested_namespaces() {
        let mut registry = ProviderRegistry::empty();
        registry.register_fn("a.b.c", |_, _, _| Ok(json!("abc")));
        registry.register_fn("a.d", |_, _, _| Ok(json!("ad")));

        assert_eq!(registry.resolve("a.b.c").map(|p| p.path()).ok(), Some("a.b.c"));
        assert_eq!(registry.resolve("a.b").err(), Some(PathError::NotCallable));
        assert_eq!(registry.resolve("a").err(), Some(PathError::NotCallable));
        assert_eq!(
            registry.resolve("a.x.c").err(),
            Some(PathError::Missing("x".to_string()))
        );
        assert_eq!(
            registry.resolve("a.d.e").err(),
            Some(PathError::Missing("e".to_string()))
        );
        assert_eq!(
            registry.resolve("").err(),
            Some(PathError::Missing(String::new()))
        );
        assert_eq!(registry.provider_paths(), vec!["a.b.c", "a.d"]);
    }

    #[test]
    fn later_registration_replaces_entry() {
        let mut registry = ProviderRegistry::empty();
        registry.register_fn("x.y", |_, _, _| Ok(json!("first")));
        registry.register_fn("x.y", |_, _, _| Ok(json!("second")));
        assert_eq!(registry.provider_paths(), vec!["x.y"]);

        let ctx = ProviderContext {
            record_index: 0,
            locale: LocaleKey::EnUs,
            reference_time: NaiveDateTime::default(),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let value = registry
            .get("x.y")
            .expect("provider exists")
            .generate(&ctx, None, &mut rng)
            .expect("generate");
        assert_eq!(value, json!("second"));
    }

    #[test]
    fn builtin_categories_are_registered() {
        let registry = ProviderRegistry::new();
        let categories = registry.categories();
        for expected in [
            "company", "datatype", "date", "finance", "helpers", "internet", "location", "lorem",
            "number", "person", "phone", "string",
        ] {
            assert!(categories.contains(&expected), "missing category {expected}");
        }
    }
}
