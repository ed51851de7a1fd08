use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Abbreviations and their spelled-out street-name tokens.
static TOKEN_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("st", "street"),
        ("street", "street"),
        ("rd", "road"),
        ("road", "road"),
        ("ave", "avenue"),
        ("av", "avenue"),
        ("aven", "avenue"),
        ("avenue", "avenue"),
        ("blvd", "boulevard"),
        ("boulevard", "boulevard"),
        ("dr", "drive"),
        ("drive", "drive"),
        ("ln", "lane"),
        ("lane", "lane"),
        ("ct", "court"),
        ("court", "court"),
        ("pl", "place"),
        ("place", "place"),
        ("ter", "terrace"),
        ("terr", "terrace"),
        ("terrace", "terrace"),
        ("pkwy", "parkway"),
        ("parkway", "parkway"),
        ("hwy", "highway"),
        ("highway", "highway"),
        ("cir", "circle"),
        ("circle", "circle"),
        ("sq", "square"),
        ("square", "square"),
        ("way", "way"),
        ("n", "north"),
        ("north", "north"),
        ("s", "south"),
        ("south", "south"),
        ("e", "east"),
        ("east", "east"),
        ("w", "west"),
        ("west", "west"),
        ("ne", "northeast"),
        ("northeast", "northeast"),
        ("nw", "northwest"),
        ("northwest", "northwest"),
        ("se", "southeast"),
        ("southeast", "southeast"),
        ("sw", "southwest"),
        ("southwest", "southwest"),
    ]
    .into_iter()
    .collect()
});

static ORDINAL_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("1st", "first"),
        ("2nd", "second"),
        ("3rd", "third"),
        ("4th", "fourth"),
        ("5th", "fifth"),
        ("6th", "sixth"),
        ("7th", "seventh"),
        ("8th", "eighth"),
        ("9th", "ninth"),
        ("10th", "tenth"),
        ("11th", "eleventh"),
        ("12th", "twelfth"),
        ("13th", "thirteenth"),
        ("14th", "fourteenth"),
        ("15th", "fifteenth"),
        ("16th", "sixteenth"),
        ("17th", "seventeenth"),
        ("18th", "eighteenth"),
        ("19th", "nineteenth"),
        ("20th", "twentieth"),
    ]
    .into_iter()
    .collect()
});

pub const STREET_TYPES: &[&str] = &[
    "street",
    "road",
    "avenue",
    "boulevard",
    "drive",
    "lane",
    "court",
    "place",
    "terrace",
    "parkway",
    "highway",
    "circle",
    "square",
    "way",
];

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(st|nd|rd|th)$").expect("valid ordinal regex"));
static NUMBER_AND_STREET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s+(.+)$").expect("valid address regex"));
static UNIT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\b(apt|unit|suite)\b|#).*$").expect("valid unit regex"));

pub fn is_street_type(token: &str) -> bool {
    STREET_TYPES.contains(&token)
}

/// `3rd` becomes `third`; ordinals past the table keep only their digits.
fn normalize_ordinal(token: &str) -> String {
    if let Some(word) = ORDINAL_MAP.get(token) {
        return word.to_string();
    }

    match ORDINAL_SUFFIX.captures(token) {
        Some(caps) => {
            let number = &caps[1];
            ORDINAL_MAP
                .get(format!("{}th", number).as_str())
                .map(|w| w.to_string())
                .unwrap_or_else(|| number.to_string())
        }
        None => token.to_string(),
    }
}

pub fn normalize_tokens(value: &str) -> Vec<String> {
    value
        .to_lowercase()
        .replace(['.', ','], "")
        .split_whitespace()
        .map(|token| normalize_ordinal(TOKEN_MAP.get(token).copied().unwrap_or(token)))
        .collect()
}

pub fn normalize_street_name(value: &str) -> String {
    normalize_tokens(value).join(" ")
}

/// Street name without a trailing street type: `main street` becomes `main`.
pub fn base_street_name<S: AsRef<str>>(tokens: &[S]) -> String {
    match tokens.split_last() {
        None => String::new(),
        Some((last, rest)) if is_street_type(last.as_ref()) => join(rest),
        Some(_) => join(tokens),
    }
}

fn join<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub fn title_case(value: &str) -> String {
    value
        .split(' ')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A free-text address split into house number and normalised street name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub number: u64,
    pub street_raw: String,
    pub street_normalized: String,
    pub street_base: String,
    pub has_type_token: bool,
}

/// Parse `"<number> <street>[, city ...]"`, dropping apartment or unit suffixes.
pub fn parse_address(address: &str) -> Option<ParsedAddress> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return None;
    }

    let base = trimmed.split(',').next().unwrap_or_default().trim();
    let caps = NUMBER_AND_STREET.captures(base)?;
    let number = caps[1].parse::<u64>().ok()?;

    let street_raw = UNIT_SUFFIX.replace(&caps[2], "").trim().to_string();
    let tokens = normalize_tokens(&street_raw);
    let has_type_token = tokens.last().map(|t| is_street_type(t)).unwrap_or(false);

    Some(ParsedAddress {
        number,
        street_normalized: join(&tokens),
        street_base: base_street_name(&tokens),
        street_raw,
        has_type_token,
    })
}

/// Leading integer of a district or ward code, without zero padding; other text is kept.
pub fn whole_number_text(value: &str) -> String {
    let trimmed = value.trim();
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<u64>() {
        Ok(number) => number.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_street_name() {
        assert_eq!(normalize_street_name("S. Salina St"), "south salina street");
        assert_eq!(normalize_street_name("  James   Ave "), "james avenue");
        assert_eq!(normalize_street_name("3rd North St"), "third north street");
        assert_eq!(normalize_street_name("42nd St"), "42 street");
    }

    #[test]
    fn test_base_street_name() {
        let tokens = normalize_tokens("Main St");
        assert_eq!(base_street_name(&tokens), "main");
        assert_eq!(base_street_name(&["park"]), "park");
        assert_eq!(base_street_name::<&str>(&[]), "");
    }

    #[test]
    fn test_parse_address() {
        let parsed = parse_address("123 Main St Apt 4, Syracuse NY").unwrap();
        assert_eq!(parsed.number, 123);
        assert_eq!(parsed.street_raw, "Main St");
        assert_eq!(parsed.street_normalized, "main street");
        assert_eq!(parsed.street_base, "main");
        assert!(parsed.has_type_token);

        let parsed = parse_address("500 S Salina St #210").unwrap();
        assert_eq!(parsed.street_normalized, "south salina street");

        let parsed = parse_address("7 Westcott").unwrap();
        assert!(!parsed.has_type_token);
        assert_eq!(parsed.street_base, "westcott");
    }

    #[test]
    fn test_parse_address_rejects_missing_parts() {
        assert!(parse_address("").is_none());
        assert!(parse_address("Main St").is_none());
        assert!(parse_address("123").is_none());
    }

    #[test]
    fn test_title_case_and_whole_numbers() {
        assert_eq!(title_case("south salina street"), "South Salina Street");
        assert_eq!(whole_number_text("03"), "3");
        assert_eq!(whole_number_text("3.0"), "3");
        assert_eq!(whole_number_text("B"), "B");
    }
}
