use rand::{Rng, RngCore};
use serde_json::Value;

use crate::errors::ProviderError;
use crate::params::{ParamKind, ParamSpec, validate_params};
use crate::providers::{Provider, ProviderContext, ProviderRegistry, invalid};

const WORDS_PARAMS: &[ParamSpec] = &[ParamSpec::new("count", ParamKind::Count, false)];
const SENTENCE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("minWords", ParamKind::Count, false),
    ParamSpec::new("maxWords", ParamKind::Count, false),
];
const PARAGRAPH_PARAMS: &[ParamSpec] = &[ParamSpec::new("sentences", ParamKind::Count, false)];

const DEFAULT_MIN_WORDS: u64 = 3;
const DEFAULT_MAX_WORDS: u64 = 10;

pub fn register(registry: &mut ProviderRegistry) {
    registry.register_provider(Box::new(WordProvider));
    registry.register_provider(Box::new(WordsProvider));
    registry.register_provider(Box::new(SentenceProvider));
    registry.register_provider(Box::new(ParagraphProvider));
}

struct WordProvider;

impl Provider for WordProvider {
    fn path(&self) -> &'static str {
        "lorem.word"
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        validate_params(args, &[], self.path())?;
        Ok(Value::String(pick_word(rng).to_string()))
    }
}

struct WordsProvider;

impl Provider for WordsProvider {
    fn path(&self) -> &'static str {
        "lorem.words"
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, WORDS_PARAMS, self.path())?;
        let count = params.get_u64("count").unwrap_or(3);
        Ok(Value::String(word_run(count, rng)))
    }
}

struct SentenceProvider;

impl Provider for SentenceProvider {
    fn path(&self) -> &'static str {
        "lorem.sentence"
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, SENTENCE_PARAMS, self.path())?;
        let min_words = params.get_u64("minWords").unwrap_or(DEFAULT_MIN_WORDS);
        let max_words = params.get_u64("maxWords").unwrap_or(DEFAULT_MAX_WORDS.max(min_words));
        if min_words == 0 {
            return Err(invalid(self.path(), "minWords must be > 0"));
        }
        if min_words > max_words {
            return Err(invalid(self.path(), "minWords must be <= maxWords"));
        }
        Ok(Value::String(sentence(min_words, max_words, rng)))
    }
}

struct ParagraphProvider;

impl Provider for ParagraphProvider {
    fn path(&self) -> &'static str {
        "lorem.paragraph"
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, PARAGRAPH_PARAMS, self.path())?;
        let sentences = params.get_u64("sentences").unwrap_or(3);
        let text = (0..sentences)
            .map(|_| sentence(DEFAULT_MIN_WORDS, DEFAULT_MAX_WORDS, rng))
            .collect::<Vec<_>>()
            .join(" ");
        Ok(Value::String(text))
    }
}

pub(crate) fn pick_word(rng: &mut dyn RngCore) -> &'static str {
    LOREM_WORDS[rng.random_range(0..LOREM_WORDS.len())]
}

fn word_run(count: u64, rng: &mut dyn RngCore) -> String {
    let mut value = String::new();
    for idx in 0..count {
        if idx > 0 {
            value.push(' ');
        }
        value.push_str(pick_word(rng));
    }
    value
}

/// Capitalized word run ending in a period.
fn sentence(min_words: u64, max_words: u64, rng: &mut dyn RngCore) -> String {
    let count = rng.random_range(min_words..=max_words);
    let words = word_run(count, rng);
    let mut chars = words.chars();
    let mut value = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    value.push('.');
    value
}

const LOREM_WORDS: &[&str] = &[
    "lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
    "incididunt",
    "ut",
    "labore",
    "et",
    "dolore",
    "magna",
    "aliqua",
    "enim",
    "minim",
    "veniam",
    "quis",
    "nostrud",
    "exercitation",
    "ullamco",
    "laboris",
    "nisi",
    "aliquip",
    "commodo",
    "consequat",
    "duis",
    "aute",
    "irure",
    "voluptate",
    "velit",
    "esse",
    "cillum",
    "fugiat",
    "nulla",
    "pariatur",
];

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    use super::*;
    use crate::locale::LocaleKey;

    fn generate(path: &str, args: Option<Value>) -> Result<Value, ProviderError> {
        let registry = ProviderRegistry::new();
        let provider = registry.get(path).expect("provider exists");
        let ctx = ProviderContext {
            record_index: 0,
            locale: LocaleKey::EnUs,
            reference_time: NaiveDateTime::default(),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        provider.generate(&ctx, args.as_ref(), &mut rng)
    }

    #[test]
    fn words_have_requested_count() {
        let value = generate("lorem.words", Some(json!({"count": 5}))).expect("generate");
        let text = value.as_str().expect("string");
        assert_eq!(text.split(' ').count(), 5);
        assert!(text.split(' ').all(|word| LOREM_WORDS.contains(&word)));
    }

    #[test]
    fn sentence_is_capitalized_and_terminated() {
        let value = generate("lorem.sentence", Some(json!({"minWords": 4, "maxWords": 4})))
            .expect("generate");
        let text = value.as_str().expect("string");
        assert!(text.ends_with('.'));
        assert!(text.chars().next().is_some_and(char::is_uppercase));
        assert_eq!(text.split(' ').count(), 4);
    }

    #[test]
    fn sentence_rejects_inverted_bounds() {
        let result = generate("lorem.sentence", Some(json!({"minWords": 6, "maxWords": 2})));
        assert!(matches!(result, Err(ProviderError::InvalidParams(_))));
    }

    #[test]
    fn paragraph_joins_sentences() {
        let value = generate("lorem.paragraph", Some(json!({"sentences": 2}))).expect("generate");
        assert_eq!(value.as_str().expect("string").matches('.').count(), 2);
    }
}
