use chrono::{Duration, NaiveDateTime};
use rand::distr::{Distribution, Uniform};
use rand::{Rng, RngCore};
use rand_regex::Regex as RandRegex;
use serde_json::Value;

use crate::errors::ProviderError;
use crate::params::{ParamKind, ParamMap, ParamSpec, validate_params};
use crate::providers::{Provider, ProviderContext, ProviderRegistry, invalid};

const DEFAULT_INT_MIN: i64 = 0;
const DEFAULT_INT_MAX: i64 = 10000;
const DEFAULT_FLOAT_MIN: f64 = 0.0;
const DEFAULT_FLOAT_MAX: f64 = 10000.0;
const DEFAULT_STRING_LENGTH: u64 = 1;
const DEFAULT_MAX_REPEAT: u32 = 32;
const MAX_FRACTION_DIGITS: u64 = 15;

const ALPHA: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHANUMERIC: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const NUMERIC: &str = "0123456789";

const INT_RANGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Int, false),
    ParamSpec::new("max", ParamKind::Int, false),
];
const FLOAT_RANGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Float, false),
    ParamSpec::new("max", ParamKind::Float, false),
    ParamSpec::new("fractionDigits", ParamKind::Count, false),
];
const SEQUENCE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("start", ParamKind::Int, false),
    ParamSpec::new("step", ParamKind::Int, false),
];
const BOOLEAN_PARAMS: &[ParamSpec] = &[ParamSpec::new("probability", ParamKind::Float, false)];
const CHARSET_PARAMS: &[ParamSpec] = &[ParamSpec::new("length", ParamKind::Count, false)];
const PATTERN_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("pattern", ParamKind::String, true),
    ParamSpec::new("maxRepeat", ParamKind::Count, false),
];
const BETWEEN_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("from", ParamKind::Timestamp, true),
    ParamSpec::new("to", ParamKind::Timestamp, true),
];
const YEARS_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("years", ParamKind::Count, false),
    ParamSpec::new("refDate", ParamKind::Timestamp, false),
];
const DAYS_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("days", ParamKind::Count, false),
    ParamSpec::new("refDate", ParamKind::Timestamp, false),
];
const BIRTHDATE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("minAge", ParamKind::Count, false),
    ParamSpec::new("maxAge", ParamKind::Count, false),
    ParamSpec::new("refDate", ParamKind::Timestamp, false),
];
const AMOUNT_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Float, false),
    ParamSpec::new("max", ParamKind::Float, false),
    ParamSpec::new("dec", ParamKind::Count, false),
];
const COORDINATE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Float, false),
    ParamSpec::new("max", ParamKind::Float, false),
    ParamSpec::new("precision", ParamKind::Count, false),
];
const ARRAY_ELEMENT_PARAMS: &[ParamSpec] = &[ParamSpec::new("values", ParamKind::Array, true)];

pub fn register(registry: &mut ProviderRegistry) {
    registry.register_provider(Box::new(IntRangeProvider));
    registry.register_provider(Box::new(FloatRangeProvider));
    registry.register_provider(Box::new(SequenceProvider));
    registry.register_provider(Box::new(BooleanProvider));
    registry.register_provider(Box::new(UuidProvider));
    registry.register_provider(Box::new(CharsetProvider {
        path: "string.alpha",
        charset: ALPHA,
    }));
    registry.register_provider(Box::new(CharsetProvider {
        path: "string.alphanumeric",
        charset: ALPHANUMERIC,
    }));
    registry.register_provider(Box::new(CharsetProvider {
        path: "string.numeric",
        charset: NUMERIC,
    }));
    registry.register_provider(Box::new(PatternProvider));
    registry.register_provider(Box::new(DateBetweenProvider));
    registry.register_provider(Box::new(RelativeDateProvider {
        path: "date.past",
        direction: Direction::Past,
        unit: SpanUnit::Years,
    }));
    registry.register_provider(Box::new(RelativeDateProvider {
        path: "date.future",
        direction: Direction::Future,
        unit: SpanUnit::Years,
    }));
    registry.register_provider(Box::new(RelativeDateProvider {
        path: "date.recent",
        direction: Direction::Past,
        unit: SpanUnit::Days,
    }));
    registry.register_provider(Box::new(BirthdateProvider));
    registry.register_provider(Box::new(AmountProvider));
    registry.register_provider(Box::new(CoordinateProvider {
        path: "location.latitude",
        bound: 90.0,
    }));
    registry.register_provider(Box::new(CoordinateProvider {
        path: "location.longitude",
        bound: 180.0,
    }));
    registry.register_provider(Box::new(ArrayElementProvider));
}

struct IntRangeProvider;

impl Provider for IntRangeProvider {
    fn path(&self) -> &'static str {
        "number.int"
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, INT_RANGE_PARAMS, self.path())?;
        let min = params.get_i64("min").unwrap_or(DEFAULT_INT_MIN);
        let max = params.get_i64("max").unwrap_or(DEFAULT_INT_MAX);
        if min > max {
            return Err(invalid(self.path(), "min must be <= max"));
        }
        Ok(Value::from(rng.random_range(min..=max)))
    }
}

struct FloatRangeProvider;

impl Provider for FloatRangeProvider {
    fn path(&self) -> &'static str {
        "number.float"
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, FLOAT_RANGE_PARAMS, self.path())?;
        let min = params.get_f64("min").unwrap_or(DEFAULT_FLOAT_MIN);
        let max = params.get_f64("max").unwrap_or(DEFAULT_FLOAT_MAX);
        if min > max {
            return Err(invalid(self.path(), "min must be <= max"));
        }
        let value = float_between(self.path(), min, max, rng)?;
        let value = match params.get_u64("fractionDigits") {
            Some(digits) => round_to(value, fraction_digits(self.path(), digits)?),
            None => value,
        };
        Ok(Value::from(value))
    }
}

/// Uniform draw from `[min, max]`; ranges wider than `f64` can span are rejected.
fn float_between(
    path: &str,
    min: f64,
    max: f64,
    rng: &mut dyn RngCore,
) -> Result<f64, ProviderError> {
    let range =
        Uniform::new_inclusive(min, max).map_err(|_| invalid(path, "range is too wide"))?;
    Ok(range.sample(rng))
}

/// Derived from the record index rather than the random source.
struct SequenceProvider;

impl Provider for SequenceProvider {
    fn path(&self) -> &'static str {
        "number.sequence"
    }

    fn generate(
        &self,
        ctx: &ProviderContext,
        args: Option<&Value>,
        _rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, SEQUENCE_PARAMS, self.path())?;
        let start = params.get_i64("start").unwrap_or(1);
        let step = params.get_i64("step").unwrap_or(1);
        if step == 0 {
            return Err(invalid(self.path(), "step must be non-zero"));
        }
        let offset = i64::try_from(ctx.record_index).unwrap_or(i64::MAX);
        Ok(Value::from(start.saturating_add(offset.saturating_mul(step))))
    }
}

struct BooleanProvider;

impl Provider for BooleanProvider {
    fn path(&self) -> &'static str {
        "datatype.boolean"
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, BOOLEAN_PARAMS, self.path())?;
        let probability = params.get_f64("probability").unwrap_or(0.5);
        if !(0.0..=1.0).contains(&probability) {
            return Err(invalid(self.path(), "probability must be between 0 and 1"));
        }
        Ok(Value::Bool(rng.random_bool(probability)))
    }
}

struct UuidProvider;

impl Provider for UuidProvider {
    fn path(&self) -> &'static str {
        "string.uuid"
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        validate_params(args, &[], self.path())?;
        let mut bytes = [0_u8; 16];
        rng.fill_bytes(&mut bytes);
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;
        Ok(Value::String(uuid::Uuid::from_bytes(bytes).to_string()))
    }
}

struct CharsetProvider {
    path: &'static str,
    charset: &'static str,
}

impl Provider for CharsetProvider {
    fn path(&self) -> &'static str {
        self.path
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, CHARSET_PARAMS, self.path)?;
        let len = params.get_u64("length").unwrap_or(DEFAULT_STRING_LENGTH);
        let chars: Vec<char> = self.charset.chars().collect();
        let mut value = String::new();
        for _ in 0..len {
            let idx = rng.random_range(0..chars.len());
            value.push(chars[idx]);
        }
        Ok(Value::String(value))
    }
}

struct PatternProvider;

impl Provider for PatternProvider {
    fn path(&self) -> &'static str {
        "string.pattern"
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, PATTERN_PARAMS, self.path())?;
        let pattern = params
            .get_str("pattern")
            .ok_or_else(|| invalid(self.path(), "requires params.pattern"))?;
        let max_repeat = match params.get_u64("maxRepeat") {
            Some(0) => return Err(invalid(self.path(), "maxRepeat must be > 0")),
            Some(value) => u32::try_from(value)
                .map_err(|_| invalid(self.path(), "maxRepeat must fit u32"))?,
            None => DEFAULT_MAX_REPEAT,
        };
        let regex = RandRegex::compile(pattern, max_repeat)
            .map_err(|err| invalid(self.path(), &format!("invalid regex pattern: {err}")))?;
        let value: String = rng.sample(regex);
        Ok(Value::String(value))
    }
}

struct DateBetweenProvider;

impl Provider for DateBetweenProvider {
    fn path(&self) -> &'static str {
        "date.between"
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, BETWEEN_PARAMS, self.path())?;
        let from = params
            .get_timestamp("from")
            .ok_or_else(|| invalid(self.path(), "requires params.from"))?;
        let to = params
            .get_timestamp("to")
            .ok_or_else(|| invalid(self.path(), "requires params.to"))?;
        if from > to {
            return Err(invalid(self.path(), "from must be <= to"));
        }
        Ok(iso_timestamp(random_between(from, to, rng)))
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Past,
    Future,
}

#[derive(Clone, Copy)]
enum SpanUnit {
    Years,
    Days,
}

impl SpanUnit {
    fn key(self) -> &'static str {
        match self {
            SpanUnit::Years => "years",
            SpanUnit::Days => "days",
        }
    }

    fn duration(self, amount: u64) -> Option<Duration> {
        let amount = i64::try_from(amount).ok()?;
        match self {
            SpanUnit::Years => Duration::try_days(amount.checked_mul(365)?),
            SpanUnit::Days => Duration::try_days(amount),
        }
    }
}

/// `date.past`, `date.future` and `date.recent`: a timestamp within a span
/// before or after the reference time.
struct RelativeDateProvider {
    path: &'static str,
    direction: Direction,
    unit: SpanUnit,
}

impl Provider for RelativeDateProvider {
    fn path(&self) -> &'static str {
        self.path
    }

    fn generate(
        &self,
        ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let specs = match self.unit {
            SpanUnit::Years => YEARS_PARAMS,
            SpanUnit::Days => DAYS_PARAMS,
        };
        let params = validate_params(args, specs, self.path)?;
        let reference = reference_time(&params, ctx);
        let amount = params.get_u64(self.unit.key()).unwrap_or(1);
        let span = self
            .unit
            .duration(amount)
            .ok_or_else(|| invalid(self.path, &format!("{} is out of range", self.unit.key())))?;
        let (from, to) = match self.direction {
            Direction::Past => (reference.checked_sub_signed(span), Some(reference)),
            Direction::Future => (Some(reference), reference.checked_add_signed(span)),
        };
        let (Some(from), Some(to)) = (from, to) else {
            return Err(invalid(self.path, "date span is out of range"));
        };
        Ok(iso_timestamp(random_between(from, to, rng)))
    }
}

struct BirthdateProvider;

impl Provider for BirthdateProvider {
    fn path(&self) -> &'static str {
        "date.birthdate"
    }

    fn generate(
        &self,
        ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, BIRTHDATE_PARAMS, self.path())?;
        let reference = reference_time(&params, ctx);
        let min_age = params.get_u64("minAge").unwrap_or(18);
        let max_age = params.get_u64("maxAge").unwrap_or(80);
        if min_age > max_age {
            return Err(invalid(self.path(), "minAge must be <= maxAge"));
        }
        let years_back = |age: u64| {
            SpanUnit::Years
                .duration(age)
                .and_then(|span| reference.checked_sub_signed(span))
                .ok_or_else(|| invalid(self.path(), "age is out of range"))
        };
        let from = years_back(max_age)?;
        let to = years_back(min_age)?;
        Ok(iso_timestamp(random_between(from, to, rng)))
    }
}

struct AmountProvider;

impl Provider for AmountProvider {
    fn path(&self) -> &'static str {
        "finance.amount"
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, AMOUNT_PARAMS, self.path())?;
        let min = params.get_f64("min").unwrap_or(0.0);
        let max = params.get_f64("max").unwrap_or(1000.0);
        if min > max {
            return Err(invalid(self.path(), "min must be <= max"));
        }
        let dec = fraction_digits(self.path(), params.get_u64("dec").unwrap_or(2))?;
        let value = round_to(float_between(self.path(), min, max, rng)?, dec);
        Ok(Value::String(format!("{value:.prec$}", prec = dec as usize)))
    }
}

struct CoordinateProvider {
    path: &'static str,
    bound: f64,
}

impl Provider for CoordinateProvider {
    fn path(&self) -> &'static str {
        self.path
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, COORDINATE_PARAMS, self.path)?;
        let min = params.get_f64("min").unwrap_or(-self.bound);
        let max = params.get_f64("max").unwrap_or(self.bound);
        if min > max || min < -self.bound || max > self.bound {
            return Err(invalid(
                self.path,
                &format!("bounds must satisfy -{0} <= min <= max <= {0}", self.bound),
            ));
        }
        let precision = fraction_digits(self.path, params.get_u64("precision").unwrap_or(4))?;
        Ok(Value::from(round_to(rng.random_range(min..=max), precision)))
    }
}

struct ArrayElementProvider;

impl Provider for ArrayElementProvider {
    fn path(&self) -> &'static str {
        "helpers.arrayElement"
    }

    fn generate(
        &self,
        _ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, ARRAY_ELEMENT_PARAMS, self.path())?;
        let values = params
            .get_array("values")
            .filter(|values| !values.is_empty())
            .ok_or_else(|| invalid(self.path(), "values must be a non-empty array"))?;
        Ok(values[rng.random_range(0..values.len())].clone())
    }
}

fn fraction_digits(path: &str, digits: u64) -> Result<i32, ProviderError> {
    if digits > MAX_FRACTION_DIGITS {
        return Err(invalid(
            path,
            &format!("at most {MAX_FRACTION_DIGITS} fraction digits are supported"),
        ));
    }
    Ok(digits as i32)
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10_f64.powi(digits);
    (value * factor).round() / factor
}

fn reference_time(params: &ParamMap<'_>, ctx: &ProviderContext) -> NaiveDateTime {
    params
        .get_timestamp("refDate")
        .unwrap_or(ctx.reference_time)
}

fn random_between(from: NaiveDateTime, to: NaiveDateTime, rng: &mut dyn RngCore) -> NaiveDateTime {
    let span = (to - from).num_milliseconds().max(0);
    let offset = rng.random_range(0..=span);
    from + Duration::milliseconds(offset)
}

/// Timestamps are emitted the way `JSON.stringify` renders a `Date`.
fn iso_timestamp(value: NaiveDateTime) -> Value {
    Value::String(value.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}
