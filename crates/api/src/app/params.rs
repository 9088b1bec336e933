//! Query-string parsing for the catalog endpoints.
//!
//! Malformed input never produces an error: numbers are coerced leniently and
//! free text is sanitized, so every request reaches the pipeline.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;

use catalog_core::ProductId;
use catalog_products::{FilterCriteria, PageRequest, PriceRange, QueryProfile};
use catalog_products::query::{DEFAULT_MAX_PRICE, DEFAULT_PAGE, DEFAULT_PER_PAGE};

/// Compiled patterns used to clean user-supplied text.
#[derive(Debug, Clone)]
pub struct TextSanitizer {
    script_blocks: Regex,
    tags: Regex,
    whitespace: Regex,
    octets: Regex,
    spaces: Regex,
}

impl TextSanitizer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            script_blocks: Regex::new(r"(?is)<script[^>]*?>.*?</script>|<style[^>]*?>.*?</style>")?,
            tags: Regex::new(r"(?s)<[A-Za-z/!?][^>]*(?:>|$)")?,
            whitespace: Regex::new(r"[\r\n\t ]+")?,
            octets: Regex::new(r"%[a-fA-F0-9]{2}")?,
            spaces: Regex::new(r" +")?,
        })
    }

    /// Strip markup, control characters and percent-encoded octets; collapse
    /// whitespace and trim.
    pub fn sanitize(&self, raw: &str) -> String {
        let mut text = raw.to_string();

        if text.contains('<') {
            text = self.script_blocks.replace_all(&text, "").into_owned();
            text = self.tags.replace_all(&text, "").into_owned();
            text = text.replace('<', "&lt;");
        }

        text = self.whitespace.replace_all(&text, " ").into_owned();
        text.retain(|c| !c.is_control());

        let mut stripped_octets = false;
        while self.octets.is_match(&text) {
            text = self.octets.replace_all(&text, "").into_owned();
            stripped_octets = true;
        }
        if stripped_octets {
            text = self.spaces.replace_all(&text, " ").into_owned();
        }

        text.trim().to_string()
    }

    /// Sanitize, then split a comma-separated list of names. Blank entries
    /// are dropped.
    pub fn name_list(&self, raw: &str) -> BTreeSet<String> {
        self.sanitize(raw)
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Build the filter criteria and page request from raw query pairs.
pub fn parse_catalog_request(
    params: &HashMap<String, String>,
    profile: QueryProfile,
    sanitizer: &TextSanitizer,
) -> (FilterCriteria, PageRequest) {
    let get = |key: &str| params.get(key).map(String::as_str);

    let id = if profile.include_id {
        get("id")
            .filter(|raw| !is_blank_id(raw))
            .map(|raw| ProductId::new(lenient_int(raw)))
    } else {
        None
    };

    let criteria = FilterCriteria {
        id,
        name: get("name").map(|raw| sanitizer.sanitize(raw)).unwrap_or_default(),
        categories: get("categories")
            .map(|raw| sanitizer.name_list(raw))
            .unwrap_or_default(),
        tags: get("tags").map(|raw| sanitizer.name_list(raw)).unwrap_or_default(),
        price: PriceRange::new(
            get("minprice").map(lenient_float).unwrap_or(0.0),
            get("maxprice").map(lenient_float).unwrap_or(DEFAULT_MAX_PRICE),
        ),
    };

    let request = PageRequest::new(
        get("page").map(lenient_int).unwrap_or(DEFAULT_PAGE),
        get("per_page").map(lenient_int).unwrap_or(DEFAULT_PER_PAGE),
    );

    (criteria, request)
}

/// `""` and `"0"` mean "no id filter".
fn is_blank_id(raw: &str) -> bool {
    raw.is_empty() || raw == "0"
}

/// Integer value of the longest leading numeric prefix, saturating on
/// overflow. A fraction or exponent is honored and then truncated toward
/// zero. No prefix yields 0.
pub fn lenient_int(raw: &str) -> i64 {
    let (prefix, integral) = numeric_prefix(raw);
    if !integral {
        // `as` saturates out-of-range floats.
        return prefix.parse::<f64>().map(|f| f.trunc() as i64).unwrap_or(0);
    }

    let (negative, digits) = match prefix.as_bytes().first() {
        Some(b'-') => (true, &prefix[1..]),
        Some(b'+') => (false, &prefix[1..]),
        _ => (false, prefix),
    };

    let mut value: i64 = 0;
    for b in digits.bytes() {
        let d = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }
    value
}

/// Float value of the longest leading numeric prefix (sign, digits,
/// fraction, exponent). No prefix yields 0.
pub fn lenient_float(raw: &str) -> f64 {
    numeric_prefix(raw).0.parse().unwrap_or(0.0)
}

/// Longest leading numeric prefix after leading whitespace, and whether it
/// is a plain integer (no fraction or exponent). Empty when there is none.
fn numeric_prefix(raw: &str) -> (&str, bool) {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut integral = true;

    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
            integral = false;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return ("", true);
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'-' | b'+')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
            integral = false;
        }
    }

    (&s[..end], integral)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
