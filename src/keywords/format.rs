use std::{
    net::{Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use email_address::EmailAddress;
use fluent_uri::{Uri, UriRef};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    error::SchemaError,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
    vocabularies::Vocabulary,
    Error,
};

type FormatCheck = fn(&str) -> bool;

fn is_leap_year(year: u64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn is_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let digits = |range: std::ops::Range<usize>| -> Option<u64> {
        let part = &value[range];
        if part.bytes().all(|b| b.is_ascii_digit()) {
            part.parse().ok()
        } else {
            None
        }
    };
    let (Some(year), Some(month), Some(day)) = (digits(0..4), digits(5..7), digits(8..10)) else {
        return false;
    };
    if !(1..=12).contains(&month) {
        return false;
    }
    let max_day = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    };
    (1..=max_day).contains(&day)
}

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(?:\.\d+)?([Zz]|[+-]\d{2}:\d{2})$").expect("Valid regex")
});

fn is_time(value: &str) -> bool {
    let Some(captures) = TIME_RE.captures(value) else {
        return false;
    };
    let part = |idx: usize| -> u64 { captures[idx].parse().expect("Digits only") };
    let (hours, minutes, seconds) = (part(1), part(2), part(3));
    // 60 covers leap seconds
    if hours > 23 || minutes > 59 || seconds > 60 {
        return false;
    }
    match captures.get(4).map(|m| m.as_str()) {
        Some("Z" | "z") | None => true,
        Some(offset) => {
            let hours: u64 = offset[1..3].parse().expect("Digits only");
            let minutes: u64 = offset[4..6].parse().expect("Digits only");
            hours <= 23 && minutes <= 59
        }
    }
}

fn is_date_time(value: &str) -> bool {
    match value.split_once(['T', 't']) {
        Some((date, time)) => is_date(date) && is_time(time),
        None => false,
    }
}

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(?:\d+W|(?:\d+Y)?(?:\d+M)?(?:\d+D)?(?:T(?:\d+H)?(?:\d+M)?(?:\d+S)?)?)$")
        .expect("Valid regex")
});

fn is_duration(value: &str) -> bool {
    // The regex admits a bare `P` and a dangling `T`; rule those out
    DURATION_RE.is_match(value) && value.len() > 1 && !value.ends_with(['P', 'T'])
}

fn is_hostname(value: &str) -> bool {
    let hostname = value.strip_suffix('.').unwrap_or(value);
    if hostname.is_empty() || hostname.len() > 253 {
        return false;
    }
    hostname.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}

fn is_ipv4(value: &str) -> bool {
    // `Ipv4Addr` accepts leading zeroes that RFC 2673 forbids
    if value.split('.').any(|octet| octet.len() > 1 && octet.starts_with('0')) {
        return false;
    }
    Ipv4Addr::from_str(value).is_ok()
}

fn is_ipv6(value: &str) -> bool {
    Ipv6Addr::from_str(value).is_ok()
}

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
    )
    .expect("Valid regex")
});

fn is_uuid(value: &str) -> bool {
    UUID_RE.is_match(value)
}

fn is_email(value: &str) -> bool {
    EmailAddress::from_str(value).is_ok()
}

fn is_uri(value: &str) -> bool {
    Uri::parse(value).is_ok()
}

fn is_uri_reference(value: &str) -> bool {
    UriRef::parse(value).is_ok()
}

fn is_iri(value: &str) -> bool {
    UriRef::parse(value).map_or(false, |iri| iri.has_scheme())
}

fn is_json_pointer(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    if !value.starts_with('/') {
        return false;
    }
    let mut bytes = value.bytes();
    while let Some(byte) = bytes.next() {
        if byte == b'~' && !matches!(bytes.next(), Some(b'0' | b'1')) {
            return false;
        }
    }
    true
}

static RELATIVE_JSON_POINTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:0|[1-9][0-9]*)(?:#|(?:/.*)?)$").expect("Valid regex"));

fn is_relative_json_pointer(value: &str) -> bool {
    RELATIVE_JSON_POINTER_RE.is_match(value)
        && (!value.contains('/') || is_json_pointer(&value[value.find('/').expect("Checked")..]))
}

fn is_regex(value: &str) -> bool {
    fancy_regex::Regex::new(value).is_ok()
}

fn check_for(format: &str) -> Option<FormatCheck> {
    match format {
        "date" => Some(is_date),
        "date-time" => Some(is_date_time),
        "time" => Some(is_time),
        "duration" => Some(is_duration),
        "email" | "idn-email" => Some(is_email),
        "hostname" => Some(is_hostname),
        "ipv4" => Some(is_ipv4),
        "ipv6" => Some(is_ipv6),
        "uuid" => Some(is_uuid),
        "uri" => Some(is_uri),
        "uri-reference" => Some(is_uri_reference),
        "iri" => Some(is_iri),
        "iri-reference" => Some(is_uri_reference),
        "json-pointer" => Some(is_json_pointer),
        "relative-json-pointer" => Some(is_relative_json_pointer),
        "regex" => Some(is_regex),
        // Unknown formats are ignored even in assertion mode
        _ => None,
    }
}

/// `format` annotates by default and asserts only when format assertion is
/// active for the dialect or requested through the options.
pub(crate) struct FormatEvaluator {
    format: String,
    check: Option<FormatCheck>,
    assert: bool,
}

impl Evaluate for FormatEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if self.assert {
            if let (Value::String(item), Some(check)) = (instance, self.check) {
                if !check(item) {
                    return Err(ErrorDescription::from(format!(
                        "{instance} is not a \"{}\"",
                        self.format
                    )));
                }
            }
        }
        Ok(Some(Value::String(self.format.clone())))
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let Some(format) = value.as_str() else {
        return Some(Err(Error::invalid_schema(
            ctx.base_uri().as_str(),
            vec![SchemaError {
                location: ctx.location().join("format"),
                message: format!("{value} is not of type \"string\""),
            }],
        )));
    };
    let assert =
        ctx.validates_formats() || ctx.has_vocabulary(&Vocabulary::FormatAssertion);
    Some(Ok(Box::new(FormatEvaluator {
        format: format.to_string(),
        check: check_for(format),
        assert,
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case("date", "2024-02-29", true)]
    #[test_case("date", "2023-02-29", false)]
    #[test_case("date", "2024-13-01", false)]
    #[test_case("date-time", "2024-02-29T12:00:00Z", true)]
    #[test_case("date-time", "2024-02-29 12:00:00Z", false)]
    #[test_case("time", "23:59:60Z", true)]
    #[test_case("time", "24:00:00Z", false)]
    #[test_case("duration", "P1Y2M3DT4H5M6S", true)]
    #[test_case("duration", "P", false)]
    #[test_case("duration", "P1YT", false)]
    #[test_case("email", "user@example.com", true)]
    #[test_case("email", "not-an-email", false)]
    #[test_case("hostname", "example.com", true)]
    #[test_case("hostname", "-bad-.com", false)]
    #[test_case("ipv4", "127.0.0.1", true)]
    #[test_case("ipv4", "127.0.0.01", false)]
    #[test_case("ipv6", "2001:db8::1", true)]
    #[test_case("ipv6", "2001:0db8:85a3:0000:0000:8a2e:0370:7334:1:2", false)]
    #[test_case("uuid", "550e8400-e29b-41d4-a716-446655440000", true)]
    #[test_case("uuid", "not-a-uuid", false)]
    #[test_case("uri", "https://example.com/a?b#c", true)]
    #[test_case("uri", "relative/path", false)]
    #[test_case("uri-reference", "relative/path", true)]
    #[test_case("json-pointer", "/a/~0b", true)]
    #[test_case("json-pointer", "/a/~2", false)]
    #[test_case("relative-json-pointer", "1/a", true)]
    #[test_case("relative-json-pointer", "01", false)]
    #[test_case("regex", "^a+$", true)]
    #[test_case("regex", "(", false)]
    fn assertion_mode(format: &str, instance: &str, expected: bool) {
        let schema = json!({"format": format});
        let mut validator = crate::options()
            .should_validate_formats(true)
            .build_validator();
        let uri = validator.register_schema(&schema).expect("Invalid schema");
        assert_eq!(
            validator
                .is_valid(uri.as_str(), &json!(instance))
                .expect("Unknown URI"),
            expected
        );
    }

    #[test_case(&json!({"format": "ipv4"}), &json!("not an ip"))]
    #[test_case(&json!({"format": "no-such-format"}), &json!("anything"))]
    fn annotates_by_default(schema: &Value, instance: &Value) {
        let result = crate::validate_once(schema, instance).expect("Invalid schema");
        assert!(result.is_valid());
        assert_eq!(result.annotations()[0].value(), &json!(schema["format"]));
    }

    #[test]
    fn dialect_vocabularies_can_turn_format_into_an_assertion() {
        use crate::{Dialect, Draft, Vocabulary};

        let mut vocabularies = Draft::Draft202012.default_vocabularies();
        vocabularies.add(Vocabulary::FormatAssertion);
        let dialect = Dialect::for_draft(Draft::Draft202012).with_vocabularies(vocabularies);
        let mut validator = crate::options().with_dialect(dialect).build_validator();
        let uri = validator
            .register_schema(&json!({"format": "uuid"}))
            .expect("Invalid schema");
        assert!(!validator
            .is_valid(uri.as_str(), &json!("not a uuid"))
            .expect("Unknown URI"));
    }

    #[test]
    fn unknown_formats_pass_even_when_asserting() {
        let mut validator = crate::options()
            .should_validate_formats(true)
            .build_validator();
        let uri = validator
            .register_schema(&json!({"format": "no-such-format"}))
            .expect("Invalid schema");
        assert!(validator
            .is_valid(uri.as_str(), &json!("anything"))
            .expect("Unknown URI"));
    }
}
