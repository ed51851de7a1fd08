use crate::error::{ProcessingError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A coordinate reference system, either an EPSG code or a raw PROJ.4 definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Crs {
    Epsg(u16),
    Proj4(String),
}

/// EPSG codes with a built-in PROJ.4 definition.
const KNOWN_EPSG: &[(u16, &str)] = &[
    (4326, "+proj=longlat +datum=WGS84 +no_defs"),
    (4269, "+proj=longlat +datum=NAD83 +no_defs"),
    (
        3857,
        "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs",
    ),
    // NAD83 / New York East (ftUS)
    (
        2260,
        "+proj=tmerc +lat_0=38.8333333333333 +lon_0=-74.5 +k=0.9999 +x_0=150000 +y_0=0 +datum=NAD83 +units=us-ft +no_defs",
    ),
    // NAD83 / New York Central (ftUS)
    (
        2261,
        "+proj=tmerc +lat_0=40 +lon_0=-76.5833333333333 +k=0.9999375 +x_0=249999.9998984 +y_0=0 +datum=NAD83 +units=us-ft +no_defs",
    ),
    // NAD83 / New York West (ftUS)
    (
        2262,
        "+proj=tmerc +lat_0=40 +lon_0=-78.5833333333333 +k=0.9999375 +x_0=350000.0001016 +y_0=0 +datum=NAD83 +units=us-ft +no_defs",
    ),
    // NAD83 / New York Long Island (ftUS)
    (
        2263,
        "+proj=lcc +lat_0=40.1666666666667 +lon_0=-74 +lat_1=41.0333333333333 +lat_2=40.6666666666667 +x_0=300000 +y_0=0 +datum=NAD83 +units=us-ft +no_defs",
    ),
    (26918, "+proj=utm +zone=18 +datum=NAD83 +units=m +no_defs"),
    (32618, "+proj=utm +zone=18 +datum=WGS84 +units=m +no_defs"),
];

/// ESRI `.prj` files usually carry no EPSG authority, only a root node name.
const ESRI_NAMES: &[(&str, u16)] = &[
    ("GCS_WGS_1984", 4326),
    ("WGS 84", 4326),
    ("GCS_North_American_1983", 4269),
    ("NAD83", 4269),
    ("WGS_1984_Web_Mercator_Auxiliary_Sphere", 3857),
    ("NAD_1983_StatePlane_New_York_East_FIPS_3101_Feet", 2260),
    ("NAD_1983_StatePlane_New_York_Central_FIPS_3102_Feet", 2261),
    ("NAD_1983_StatePlane_New_York_West_FIPS_3103_Feet", 2262),
    ("NAD_1983_StatePlane_New_York_Long_Island_FIPS_3104_Feet", 2263),
    ("NAD_1983_UTM_Zone_18N", 26918),
    ("WGS_1984_UTM_Zone_18N", 32618),
];

impl Crs {
    /// CRS assumed for GeoJSON without a `crs` member (RFC 7946).
    pub const WGS84: Crs = Crs::Epsg(4326);

    /// Parse `EPSG:2262`, OGC URNs such as `urn:ogc:def:crs:EPSG::2262` or
    /// `urn:ogc:def:crs:OGC:1.3:CRS84`, or a `+proj=` definition.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.starts_with('+') {
            return Ok(Crs::Proj4(
                trimmed.split_whitespace().collect::<Vec<_>>().join(" "),
            ));
        }

        let upper = trimmed.to_ascii_uppercase();
        if upper.ends_with("CRS84") {
            return Ok(Crs::WGS84);
        }

        if upper.starts_with("EPSG:") || upper.starts_with("URN:OGC:DEF:CRS:EPSG:") {
            let code = upper.rsplit(':').next().unwrap_or_default();
            return code
                .parse::<u16>()
                .map(Crs::Epsg)
                .map_err(|_| ProcessingError::UnsupportedCrs(input.to_string()));
        }

        Err(ProcessingError::UnsupportedCrs(input.to_string()))
    }

    /// Identify the CRS described by a WKT string, as found in shapefile `.prj` files.
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        if let Some(code) = root_epsg_authority(wkt) {
            return Ok(Crs::Epsg(code));
        }

        let name = wkt_root_name(wkt)
            .ok_or_else(|| ProcessingError::UnsupportedCrs(truncate(wkt)))?;
        ESRI_NAMES
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, code)| Crs::Epsg(*code))
            .ok_or_else(|| ProcessingError::UnsupportedCrs(name.to_string()))
    }

    /// The PROJ.4 definition used to build a projection.
    pub fn proj4_definition(&self) -> Result<&str> {
        match self {
            Crs::Proj4(definition) => Ok(definition),
            Crs::Epsg(code) => KNOWN_EPSG
                .iter()
                .find(|(known, _)| known == code)
                .map(|(_, definition)| *definition)
                .ok_or_else(|| ProcessingError::UnsupportedCrs(self.to_string())),
        }
    }

    /// Whether coordinates are angular (longitude/latitude in degrees).
    pub fn is_geographic(&self) -> bool {
        self.proj4_definition()
            .map(|d| {
                d.contains("+proj=longlat") || d.contains("+proj=latlong") || d.contains("+proj=lonlat")
            })
            .unwrap_or(false)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Proj4(definition) => write!(f, "{}", definition),
        }
    }
}

impl FromStr for Crs {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        Crs::parse(s)
    }
}

impl TryFrom<String> for Crs {
    type Error = ProcessingError;

    fn try_from(value: String) -> Result<Self> {
        Crs::parse(&value)
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.to_string()
    }
}

/// EPSG code of an `AUTHORITY` node that is a direct child of the root node.
///
/// Nested authorities describe components (the base `GEOGCS`, datum, units)
/// and do not identify the CRS itself.
fn root_epsg_authority(wkt: &str) -> Option<u16> {
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut code = None;

    for (i, c) in wkt.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '[' | '(' if !in_quotes => {
                if depth == 1 && keyword_before(wkt, i).eq_ignore_ascii_case("AUTHORITY") {
                    code = epsg_code_in(&wkt[i + 1..]).or(code);
                }
                depth += 1;
            }
            ']' | ')' if !in_quotes => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    code
}

fn keyword_before(wkt: &str, bracket: usize) -> &str {
    let head = wkt[..bracket].trim_end();
    let start = head
        .rfind(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .map(|i| i + 1)
        .unwrap_or(0);
    &head[start..]
}

/// `"EPSG","2262"]` or `"EPSG",2262]` as a code.
fn epsg_code_in(body: &str) -> Option<u16> {
    let end = body.find([']', ')'])?;
    let mut parts = body[..end].split(',').map(|p| p.trim().trim_matches('"'));
    if !parts.next()?.eq_ignore_ascii_case("EPSG") {
        return None;
    }
    parts.next()?.parse().ok()
}

fn wkt_root_name(wkt: &str) -> Option<&str> {
    let open = wkt.find('[')?;
    let rest = &wkt[open + 1..];
    let first_quote = rest.find('"')?;
    let rest = &rest[first_quote + 1..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

fn truncate(text: &str) -> String {
    text.chars().take(60).collect()
}
