use crate::error::{ProcessingError, Result};
use crate::lookup::normalize::{
    base_street_name, normalize_street_name, title_case, whole_number_text, ParsedAddress,
};
use crate::models::AddressRecord;
use crate::utils::constants::*;
use csv::StringRecord;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// One row of an address dataset: either an exact address or a house-number range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetEntry {
    pub street_number: Option<String>,
    pub num_from: Option<u64>,
    pub num_to: Option<u64>,
    pub range_type: String,
    pub street_name: String,
    pub street_base: String,
    pub council_district: String,
    pub ward: String,
}

impl StreetEntry {
    fn new(street_name: &str, council_district: &str, ward: &str) -> Self {
        let street_name = normalize_street_name(street_name);
        let tokens: Vec<&str> = street_name.split(' ').collect();
        let street_base = base_street_name(&tokens);
        Self {
            street_number: None,
            num_from: None,
            num_to: None,
            range_type: String::new(),
            street_base,
            street_name,
            council_district: council_district.to_string(),
            ward: ward.to_string(),
        }
    }

    fn matches_number(&self, number: u64) -> bool {
        match &self.street_number {
            Some(street_number) => *street_number == number.to_string(),
            None => self.in_range(number),
        }
    }

    fn in_range(&self, number: u64) -> bool {
        let (Some(from), Some(to)) = (self.num_from, self.num_to) else {
            return false;
        };
        if number < from || number > to {
            return false;
        }

        let range_type = self.range_type.to_lowercase();
        if range_type.contains("odd") {
            number % 2 == 1
        } else if range_type.contains("even") {
            number % 2 == 0
        } else {
            true
        }
    }

    fn is_exact_match(&self, parsed: &ParsedAddress) -> bool {
        self.street_number.is_some()
            && parsed.street_normalized == self.street_name
            && self.matches_number(parsed.number)
    }

    fn compare_key(&self) -> &str {
        if self.street_base.is_empty() {
            &self.street_name
        } else {
            &self.street_base
        }
    }
}

/// An address dataset loaded for lookups.
#[derive(Debug, Clone, Default)]
pub struct AddressIndex {
    entries: Vec<StreetEntry>,
}

impl AddressIndex {
    pub fn from_records(records: &[AddressRecord]) -> Self {
        let entries = records
            .iter()
            .map(|record| StreetEntry {
                street_number: Some(record.street_number.trim().to_string()),
                ..StreetEntry::new(
                    &record.street_name,
                    record.council_district.as_deref().unwrap_or_default(),
                    record.ward.as_deref().unwrap_or_default(),
                )
            })
            .filter(|entry| !entry.street_name.is_empty())
            .collect();
        Self { entries }
    }

    /// Load either the pipeline's CSV output or a house-number range CSV
    /// (`Num From,Num To,RangeType,Street Name,Ward,CityCouncilCode`).
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        let entries = if headers.iter().any(|h| h == RANGE_NUM_FROM) {
            let columns = RangeColumns::locate(&headers, path)?;
            reader
                .records()
                .map(|row| row.map(|row| columns.entry(&row)))
                .collect::<std::result::Result<Vec<_>, csv::Error>>()?
        } else {
            let records = reader
                .deserialize()
                .collect::<std::result::Result<Vec<AddressRecord>, csv::Error>>()?;
            Self::from_records(&records).entries
        };

        let index = Self {
            entries: entries
                .into_iter()
                .filter(|entry| !entry.street_name.is_empty())
                .collect(),
        };
        debug!(path = %path.display(), entries = index.len(), "loaded address dataset");
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn has_exact_data(&self) -> bool {
        self.entries.iter().any(|e| e.street_number.is_some())
    }

    /// Rows matching the parsed address, preferring exact number and name matches.
    pub fn find_candidates(&self, parsed: &ParsedAddress) -> Vec<&StreetEntry> {
        if self.has_exact_data() {
            let exact: Vec<&StreetEntry> = self
                .entries
                .iter()
                .filter(|e| e.is_exact_match(parsed))
                .collect();
            if !exact.is_empty() {
                return exact;
            }
        }

        self.entries
            .iter()
            .filter(|e| {
                let same_street = if parsed.has_type_token {
                    parsed.street_normalized == e.street_name
                } else {
                    parsed.street_base == e.street_base
                };
                same_street && e.matches_number(parsed.number)
            })
            .collect()
    }
}

struct RangeColumns {
    num_from: usize,
    num_to: usize,
    range_type: usize,
    street_name: usize,
    ward: usize,
    council: usize,
}

impl RangeColumns {
    fn locate(headers: &StringRecord, path: &Path) -> Result<Self> {
        let find = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "{}: missing column '{}'",
                    path.display(),
                    name
                ))
            })
        };

        Ok(Self {
            num_from: find(RANGE_NUM_FROM)?,
            num_to: find(RANGE_NUM_TO)?,
            range_type: find(RANGE_TYPE)?,
            street_name: find(RANGE_STREET_NAME)?,
            ward: find(RANGE_WARD)?,
            council: find(RANGE_COUNCIL_CODE)?,
        })
    }

    fn entry(&self, row: &StringRecord) -> StreetEntry {
        let field = |i: usize| row.get(i).unwrap_or_default().trim();
        StreetEntry {
            num_from: field(self.num_from).parse().ok(),
            num_to: field(self.num_to).parse().ok(),
            range_type: field(self.range_type).to_string(),
            ..StreetEntry::new(field(self.street_name), field(self.council), field(self.ward))
        }
    }
}

/// A resolved address suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub address: String,
    pub district: Option<String>,
    pub ward: Option<String>,
}

impl Candidate {
    fn from_entry(parsed: &ParsedAddress, entry: &StreetEntry) -> Self {
        let non_empty = |value: &str| {
            let text = whole_number_text(value);
            (!text.is_empty()).then_some(text)
        };
        Self {
            address: format!("{} {}", parsed.number, title_case(&entry.street_name)),
            district: non_empty(&entry.council_district),
            ward: non_empty(&entry.ward),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Match(Candidate),
    /// Several streets matched the address
    Ambiguous(Vec<Candidate>),
    /// No match; closest street names by edit distance
    Suggestions(Vec<Candidate>),
    NotFound,
}

/// Address lookup over a primary dataset with fallbacks tried in order.
pub struct AddressLookup {
    datasets: Vec<AddressIndex>,
}

impl AddressLookup {
    pub fn new(datasets: Vec<AddressIndex>) -> Self {
        Self { datasets }
    }

    pub fn lookup(&self, parsed: &ParsedAddress) -> LookupOutcome {
        let candidates = self
            .datasets
            .iter()
            .map(|dataset| dataset.find_candidates(parsed))
            .find(|candidates| !candidates.is_empty())
            .unwrap_or_default();
        let candidates = unique_by_street(candidates);

        match candidates.as_slice() {
            [] => {
                let closest = self.closest_candidates(parsed);
                if closest.is_empty() {
                    LookupOutcome::NotFound
                } else {
                    LookupOutcome::Suggestions(
                        closest
                            .into_iter()
                            .map(|e| Candidate::from_entry(parsed, e))
                            .collect(),
                    )
                }
            }
            [single] => LookupOutcome::Match(Candidate::from_entry(parsed, single)),
            many => LookupOutcome::Ambiguous(
                many.iter()
                    .map(|e| Candidate::from_entry(parsed, e))
                    .collect(),
            ),
        }
    }

    /// Streets carrying the house number whose names are within a small
    /// edit distance of the query, relative to its length.
    fn closest_candidates(&self, parsed: &ParsedAddress) -> Vec<&StreetEntry> {
        let name_key = if parsed.street_base.is_empty() {
            &parsed.street_normalized
        } else {
            &parsed.street_base
        };
        if name_key.is_empty() {
            return Vec::new();
        }

        let filtered: Vec<&StreetEntry> = self
            .datasets
            .iter()
            .flat_map(|dataset| dataset.entries.iter())
            .filter(|e| e.matches_number(parsed.number))
            .collect();

        let mut best_distance = usize::MAX;
        let mut best = Vec::new();
        for entry in unique_by_street(filtered) {
            let distance = strsim::levenshtein(name_key, entry.compare_key());
            if distance < best_distance {
                best_distance = distance;
                best.clear();
                best.push(entry);
            } else if distance == best_distance {
                best.push(entry);
            }
        }

        let max_len = name_key.chars().count().max(1);
        let threshold = ((max_len as f64 * 0.3).round() as usize).max(2);
        if best_distance > threshold {
            return Vec::new();
        }
        best
    }
}

fn unique_by_street(entries: Vec<&StreetEntry>) -> Vec<&StreetEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.street_name.as_str()))
        .collect()
}
