//! Locale-aware providers backed by the `fake` crate.

use fake::Fake;
use fake::faker::{address, company, currency, internet, job, name, phone_number};
use fake::locales::{EN, PT_BR};
use rand::RngCore;
use serde_json::Value;

use crate::errors::ProviderError;
use crate::locale::LocaleKey;
use crate::params::{ParamKind, ParamSpec, validate_params};
use crate::providers::{Provider, ProviderContext, ProviderRegistry, invalid, lorem};

const DEFAULT_PASSWORD_LENGTH: u64 = 15;
const PASSWORD_PARAMS: &[ParamSpec] = &[ParamSpec::new("length", ParamKind::Count, false)];

type FakeFn = fn(LocaleKey, &mut dyn RngCore) -> String;

/// Expand a raw `fake` faker for every supported locale.
macro_rules! localized {
    ($locale:expr, $rng:expr, $($faker:ident)::+ $(, $arg:expr)*) => {
        {
            let value: String = match $locale {
                LocaleKey::EnUs => $($faker)::+(EN $(, $arg)*).fake_with_rng($rng),
                LocaleKey::PtBr => $($faker)::+(PT_BR $(, $arg)*).fake_with_rng($rng),
            };
            value
        }
    };
}

const CATALOG: &[(&str, FakeFn)] = &[
    ("person.firstName", |l, rng| localized!(l, rng, name::raw::FirstName)),
    ("person.lastName", |l, rng| localized!(l, rng, name::raw::LastName)),
    ("person.fullName", |l, rng| localized!(l, rng, name::raw::Name)),
    ("person.prefix", |l, rng| localized!(l, rng, name::raw::Title)),
    ("person.suffix", |l, rng| localized!(l, rng, name::raw::Suffix)),
    ("person.jobTitle", |l, rng| localized!(l, rng, job::raw::Title)),
    ("internet.email", |l, rng| localized!(l, rng, internet::raw::FreeEmail)),
    ("internet.userName", |l, rng| localized!(l, rng, internet::raw::Username)),
    ("internet.domainName", domain_name),
    ("internet.url", |l, rng| format!("https://{}", domain_name(l, rng))),
    ("internet.ipv4", |l, rng| localized!(l, rng, internet::raw::IPv4)),
    ("internet.ipv6", |l, rng| localized!(l, rng, internet::raw::IPv6)),
    ("internet.userAgent", |l, rng| localized!(l, rng, internet::raw::UserAgent)),
    ("location.city", |l, rng| localized!(l, rng, address::raw::CityName)),
    ("location.country", |l, rng| localized!(l, rng, address::raw::CountryName)),
    ("location.state", |l, rng| localized!(l, rng, address::raw::StateName)),
    ("location.streetAddress", street_address),
    ("location.zipCode", |l, rng| localized!(l, rng, address::raw::ZipCode)),
    ("company.name", |l, rng| localized!(l, rng, company::raw::CompanyName)),
    ("company.catchPhrase", |l, rng| localized!(l, rng, company::raw::CatchPhrase)),
    ("company.buzzword", |l, rng| localized!(l, rng, company::raw::Buzzword)),
    ("phone.number", |l, rng| localized!(l, rng, phone_number::raw::PhoneNumber)),
    ("finance.currencyCode", |l, rng| localized!(l, rng, currency::raw::CurrencyCode)),
];

pub fn register(registry: &mut ProviderRegistry) {
    for (path, fake) in CATALOG {
        registry.register_provider(Box::new(FakeProvider { path, fake: *fake }));
    }
    registry.register_provider(Box::new(PasswordProvider));
}

/// Catalog entries; none of them take arguments.
struct FakeProvider {
    path: &'static str,
    fake: FakeFn,
}

impl Provider for FakeProvider {
    fn path(&self) -> &'static str {
        self.path
    }

    fn generate(
        &self,
        ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        validate_params(args, &[], self.path)?;
        Ok(Value::String((self.fake)(ctx.locale, rng)))
    }
}

struct PasswordProvider;

impl Provider for PasswordProvider {
    fn path(&self) -> &'static str {
        "internet.password"
    }

    fn generate(
        &self,
        ctx: &ProviderContext,
        args: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, ProviderError> {
        let params = validate_params(args, PASSWORD_PARAMS, self.path())?;
        let length = params.get_u64("length").unwrap_or(DEFAULT_PASSWORD_LENGTH);
        if length == 0 {
            return Err(invalid(self.path(), "length must be > 0"));
        }
        let length = usize::try_from(length)
            .map_err(|_| invalid(self.path(), "length must fit usize"))?;
        let value = localized!(ctx.locale, rng, internet::raw::Password, length..length + 1);
        Ok(Value::String(value))
    }
}

fn domain_name(locale: LocaleKey, rng: &mut dyn RngCore) -> String {
    let word = lorem::pick_word(rng);
    let suffix = localized!(locale, rng, internet::raw::DomainSuffix);
    format!("{word}.{suffix}")
}

fn street_address(locale: LocaleKey, rng: &mut dyn RngCore) -> String {
    let number = localized!(locale, rng, address::raw::BuildingNumber);
    let street = localized!(locale, rng, address::raw::StreetName);
    format!("{number} {street}")
}
