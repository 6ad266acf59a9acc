//! Per-dataset column layouts and the mapping from raw columns to records.

use csv::StringRecord;

use crate::error_handling::LoadError;
use crate::models::{
    AsnRecord, CityRecord, CountryRecord, DatasetKind, Generation, IpFamily, IpRangeRecord,
    RangeKey,
};

type BuildFn = fn(&StringRecord, RangeKey) -> IpRangeRecord;

/// Everything the load pipeline needs to know about one dataset kind.
pub struct DatasetDescriptor {
    pub kind: DatasetKind,
    /// Minimum number of columns a row must have
    pub columns: usize,
    build: BuildFn,
}

static COUNTRY: DatasetDescriptor = DatasetDescriptor {
    kind: DatasetKind::Country,
    columns: 3,
    build: build_country,
};

static ASN: DatasetDescriptor = DatasetDescriptor {
    kind: DatasetKind::Asn,
    columns: 4,
    build: build_asn,
};

static CITY: DatasetDescriptor = DatasetDescriptor {
    kind: DatasetKind::City,
    columns: 10,
    build: build_city,
};

/// Descriptor for `kind`.
pub fn descriptor(kind: DatasetKind) -> &'static DatasetDescriptor {
    match kind {
        DatasetKind::Country => &COUNTRY,
        DatasetKind::Asn => &ASN,
        DatasetKind::City => &CITY,
    }
}

impl DatasetDescriptor {
    /// Storage table of this dataset.
    pub fn table(&self) -> &'static str {
        self.kind.table()
    }

    /// Maps one raw row to a record of this dataset.
    ///
    /// Extra trailing columns are ignored. Numeric columns that fail to
    /// parse are stored as zero.
    pub fn transform(
        &self,
        line: u64,
        columns: &StringRecord,
        family: IpFamily,
        generation: Generation,
    ) -> Result<IpRangeRecord, LoadError> {
        if columns.len() < self.columns {
            return Err(LoadError::ShortRow {
                line,
                expected: self.columns,
                found: columns.len(),
            });
        }

        let range = RangeKey {
            start: columns[0].to_string(),
            end: columns[1].to_string(),
            family,
            generation,
        };
        Ok((self.build)(columns, range))
    }
}

fn build_country(columns: &StringRecord, range: RangeKey) -> IpRangeRecord {
    IpRangeRecord::Country(CountryRecord {
        range,
        country_code: columns[2].to_string(),
    })
}

fn build_asn(columns: &StringRecord, range: RangeKey) -> IpRangeRecord {
    IpRangeRecord::Asn(AsnRecord {
        range,
        asn_number: columns[2].parse().unwrap_or(0),
        asn_organization: columns[3].to_string(),
    })
}

/// NaN and infinities parse as `f64` but cannot be stored in a REAL NOT NULL
/// column, so they fall back to zero like unparseable text.
fn coordinate(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn build_city(columns: &StringRecord, range: RangeKey) -> IpRangeRecord {
    IpRangeRecord::City(CityRecord {
        range,
        country_code: columns[2].to_string(),
        country_name: columns[3].to_string(),
        region_name: columns[4].to_string(),
        city_name: columns[5].to_string(),
        postal_code: columns[6].to_string(),
        latitude: coordinate(&columns[7]),
        longitude: coordinate(&columns[8]),
        timezone: columns[9].to_string(),
    })
}
