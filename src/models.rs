//! Core data types shared by the loader, the parser, and storage.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use strum_macros::{Display, EnumIter, EnumString};

/// The three reference datasets the loader maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum DatasetKind {
    Country,
    Asn,
    City,
}

impl DatasetKind {
    /// Storage table holding rows of this dataset.
    pub fn table(&self) -> &'static str {
        match self {
            DatasetKind::Country => "ip_country",
            DatasetKind::Asn => "ip_asn",
            DatasetKind::City => "ip_city",
        }
    }
}

impl<'de> Deserialize<'de> for DatasetKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("unknown dataset kind '{name}'")))
    }
}

/// Address family. IPv4 and IPv6 rows are versioned independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    /// Numeric form stored in the `ip_version` column.
    pub fn as_i64(&self) -> i64 {
        match self {
            IpFamily::V4 => 4,
            IpFamily::V6 => 6,
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ipv{}", self.as_i64())
    }
}

impl FromStr for IpFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "4" | "v4" | "ipv4" => Ok(IpFamily::V4),
            "6" | "v6" | "ipv6" => Ok(IpFamily::V6),
            other => Err(format!("unknown IP family '{other}' (expected 4 or 6)")),
        }
    }
}

impl<'de> Deserialize<'de> for IpFamily {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u8),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n.to_string().parse().map_err(serde::de::Error::custom),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Version counter of one (dataset, family) lineage.
///
/// Generations start at 1 and only move forward. Every row written by a
/// single load carries the same generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    pub const FIRST: Generation = Generation(1);

    pub fn new(value: u32) -> Self {
        Generation(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// The following generation, or `None` once the counter is exhausted.
    pub fn next(&self) -> Option<Generation> {
        self.0.checked_add(1).map(Generation)
    }

    pub(crate) fn as_i64(&self) -> i64 {
        i64::from(self.0)
    }

    /// Converts a stored column value; negative or oversized values are clamped.
    pub(crate) fn from_i64(value: i64) -> Self {
        Generation(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One snapshot file to load into one (dataset, family) lineage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoadRequest {
    pub kind: DatasetKind,
    pub path: PathBuf,
    pub family: IpFamily,
}

impl LoadRequest {
    pub fn new(kind: DatasetKind, family: IpFamily, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            family,
        }
    }
}

impl fmt::Display for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} from {}",
            self.kind.table(),
            self.family,
            self.path.display()
        )
    }
}

/// Fields every stored range row carries.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeKey {
    pub start: String,
    pub end: String,
    pub family: IpFamily,
    pub generation: Generation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    pub range: RangeKey,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AsnRecord {
    pub range: RangeKey,
    pub asn_number: i64,
    pub asn_organization: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityRecord {
    pub range: RangeKey,
    pub country_code: String,
    pub country_name: String,
    pub region_name: String,
    pub city_name: String,
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

/// A transformed snapshot row, ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub enum IpRangeRecord {
    Country(CountryRecord),
    Asn(AsnRecord),
    City(CityRecord),
}

impl IpRangeRecord {
    pub fn kind(&self) -> DatasetKind {
        match self {
            IpRangeRecord::Country(_) => DatasetKind::Country,
            IpRangeRecord::Asn(_) => DatasetKind::Asn,
            IpRangeRecord::City(_) => DatasetKind::City,
        }
    }

    pub fn range(&self) -> &RangeKey {
        match self {
            IpRangeRecord::Country(r) => &r.range,
            IpRangeRecord::Asn(r) => &r.range,
            IpRangeRecord::City(r) => &r.range,
        }
    }
}

/// Marker for the last generation of a lineage that finished loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedGeneration {
    pub kind: DatasetKind,
    pub family: IpFamily,
    pub generation: Generation,
    pub row_count: u64,
    pub published_at_ms: i64,
}
