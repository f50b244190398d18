//! Flat-file table loaders.
//!
//! ZIP keys arrive from mixed numeric/string sources, so every key column is
//! read as a string and whitespace-trimmed before any join or membership
//! test. Missing numeric values are filled at load time per
//! [`FillPolicy`](crate::fill::FillPolicy); rows never leave this module
//! with nulls.

use crate::error::{Error, Result};
use crate::fill::FillPolicy;
use ahash::{AHashMap, AHashSet};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};
use zipscope_core::record::{CityLink, ZipRecord};

const CENSUS_TABLE: &str = "census";
const ENROLLMENT_TABLE: &str = "enrollment";
const CITY_IMAGES_TABLE: &str = "city-images";
const ZIP_COUNTS_TABLE: &str = "zip-counts";

const CENSUS_COLUMNS: [&str; 12] = [
    "Zip_Code",
    "Population",
    "Median_Income",
    "Bachelor_Degree",
    "Graduate_Professional_Degree",
    "White_Alone",
    "Black_Alone",
    "Hispanic_Latino",
    "Unemployment",
    "Median_Home_Value",
    "Median_Age",
    "Median_Gross_Rent",
];

#[derive(Debug, Deserialize)]
struct RawCensusRow {
    #[serde(rename = "Zip_Code")]
    zip: String,
    #[serde(rename = "Population")]
    population: Option<f64>,
    #[serde(rename = "Median_Income")]
    median_income: Option<f64>,
    #[serde(rename = "Bachelor_Degree")]
    bachelor_degree: Option<f64>,
    #[serde(rename = "Graduate_Professional_Degree")]
    graduate_degree: Option<f64>,
    #[serde(rename = "White_Alone")]
    white_alone: Option<f64>,
    #[serde(rename = "Black_Alone")]
    black_alone: Option<f64>,
    #[serde(rename = "Hispanic_Latino")]
    hispanic_latino: Option<f64>,
    #[serde(rename = "Unemployment")]
    unemployment: Option<f64>,
    #[serde(rename = "Median_Home_Value")]
    median_home_value: Option<f64>,
    #[serde(rename = "Median_Age")]
    median_age: Option<f64>,
    #[serde(rename = "Median_Gross_Rent")]
    median_gross_rent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawEnrollmentRow {
    #[serde(rename = "Mailing Zip/Postal Code")]
    zip: String,
    #[serde(rename = "Mailing City")]
    city: Option<String>,
    #[serde(rename = "Mailing State/Province")]
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCityImageRow {
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Image_URL")]
    image_url: String,
}

#[derive(Debug, Deserialize)]
struct RawZipCountRow {
    #[serde(rename = "Zip_Code")]
    zip: String,
    #[serde(rename = "Count")]
    count: u64,
}

fn open_reader(path: &Path, table: &'static str) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| Error::Csv { table, source })
}

fn require_columns(
    reader: &mut csv::Reader<std::fs::File>,
    table: &'static str,
    required: &[&'static str],
) -> Result<()> {
    let headers = reader
        .headers()
        .map_err(|source| Error::Csv { table, source })?;
    for &column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::MissingColumn { table, column });
        }
    }
    Ok(())
}

/// Load the demographic table: one filled record per unique ZIP code.
///
/// Median income and unemployment use median fill; every other numeric
/// column fills with zero. Duplicate ZIP codes keep the first row.
pub fn load_census<P: AsRef<Path>>(path: P) -> Result<Vec<ZipRecord>> {
    let mut reader = open_reader(path.as_ref(), CENSUS_TABLE)?;
    require_columns(&mut reader, CENSUS_TABLE, &CENSUS_COLUMNS)?;

    let mut raws: Vec<(String, RawCensusRow)> = Vec::new();
    for row in reader.deserialize::<RawCensusRow>() {
        let row = row.map_err(|source| Error::Csv {
            table: CENSUS_TABLE,
            source,
        })?;
        let zip = row.zip.trim().to_string();
        if zip.is_empty() {
            continue;
        }
        raws.push((zip, row));
    }

    let observed = |pick: fn(&RawCensusRow) -> Option<f64>| -> Vec<f64> {
        raws.iter().filter_map(|(_, r)| pick(r)).collect()
    };
    let income_fill = FillPolicy::Median.fill_value(&observed(|r| r.median_income));
    let unemployment_fill = FillPolicy::Median.fill_value(&observed(|r| r.unemployment));

    let mut seen: AHashSet<String> = AHashSet::with_capacity(raws.len());
    let mut records = Vec::with_capacity(raws.len());
    let mut filled = 0usize;
    let mut duplicates = 0usize;

    for (zip, row) in raws {
        if !seen.insert(zip.clone()) {
            duplicates += 1;
            continue;
        }
        let mut take = |value: Option<f64>, fill: f64| -> f64 {
            match value {
                Some(v) => v,
                None => {
                    filled += 1;
                    fill
                }
            }
        };
        records.push(ZipRecord {
            zip,
            population: take(row.population, 0.0),
            median_income: take(row.median_income, income_fill),
            bachelor_degree: take(row.bachelor_degree, 0.0),
            graduate_degree: take(row.graduate_degree, 0.0),
            white_alone: take(row.white_alone, 0.0),
            black_alone: take(row.black_alone, 0.0),
            hispanic_latino: take(row.hispanic_latino, 0.0),
            unemployment: take(row.unemployment, unemployment_fill),
            median_home_value: take(row.median_home_value, 0.0),
            median_age: take(row.median_age, 0.0),
            median_gross_rent: take(row.median_gross_rent, 0.0),
        });
    }

    if filled > 0 {
        warn!(filled, "filled missing census values");
    }
    if duplicates > 0 {
        warn!(duplicates, "dropped duplicate census ZIP rows");
    }
    debug!(records = records.len(), "loaded census table");
    Ok(records)
}

/// Load ZIP-to-city linkage from the enrollment table.
///
/// The enrollment term column is carried by the table but takes no part in
/// the join, so rows deserialize without it.
pub fn load_city_links<P: AsRef<Path>>(path: P) -> Result<Vec<CityLink>> {
    let mut reader = open_reader(path.as_ref(), ENROLLMENT_TABLE)?;
    require_columns(
        &mut reader,
        ENROLLMENT_TABLE,
        &[
            "Mailing Zip/Postal Code",
            "Mailing City",
            "Mailing State/Province",
        ],
    )?;

    let mut links = Vec::new();
    for row in reader.deserialize::<RawEnrollmentRow>() {
        let row = row.map_err(|source| Error::Csv {
            table: ENROLLMENT_TABLE,
            source,
        })?;
        let zip = row.zip.trim().to_string();
        if zip.is_empty() {
            continue;
        }
        links.push(CityLink {
            zip,
            city: row.city,
            state: row.state,
        });
    }
    debug!(links = links.len(), "loaded enrollment table");
    Ok(links)
}

/// Load the optional city-image lookup.
pub fn load_city_images<P: AsRef<Path>>(path: P) -> Result<Vec<(String, String)>> {
    let mut reader = open_reader(path.as_ref(), CITY_IMAGES_TABLE)?;
    require_columns(&mut reader, CITY_IMAGES_TABLE, &["City", "Image_URL"])?;

    let mut images = Vec::new();
    for row in reader.deserialize::<RawCityImageRow>() {
        let row = row.map_err(|source| Error::Csv {
            table: CITY_IMAGES_TABLE,
            source,
        })?;
        images.push((row.city, row.image_url));
    }
    debug!(images = images.len(), "loaded city-image table");
    Ok(images)
}

/// Load the optional ZIP-occurrence counts; duplicate ZIP rows accumulate.
pub fn load_zip_counts<P: AsRef<Path>>(path: P) -> Result<AHashMap<String, u64>> {
    let mut reader = open_reader(path.as_ref(), ZIP_COUNTS_TABLE)?;
    require_columns(&mut reader, ZIP_COUNTS_TABLE, &["Zip_Code", "Count"])?;

    let mut counts: AHashMap<String, u64> = AHashMap::new();
    for row in reader.deserialize::<RawZipCountRow>() {
        let row = row.map_err(|source| Error::Csv {
            table: ZIP_COUNTS_TABLE,
            source,
        })?;
        let zip = row.zip.trim().to_string();
        if zip.is_empty() {
            continue;
        }
        *counts.entry(zip).or_insert(0) += row.count;
    }
    debug!(zips = counts.len(), "loaded zip-count table");
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CENSUS_HEADER: &str = "Zip_Code,Population,Median_Income,Bachelor_Degree,\
Graduate_Professional_Degree,White_Alone,Black_Alone,Hispanic_Latino,Unemployment,\
Median_Home_Value,Median_Age,Median_Gross_Rent";

    fn write_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_census_median_and_zero_fill() {
        let file = write_file(&[
            CENSUS_HEADER,
            "92503,100,40000,0.2,0.1,0.5,0.1,0.3,0.04,400000,35,1500",
            "92504,200,60000,0.2,0.1,0.5,0.1,0.3,0.06,410000,36,1600",
            "90001,,,0.2,0.1,0.5,0.1,0.3,0.05,420000,37,1700",
        ]);
        let records = load_census(file.path()).unwrap();
        assert_eq!(records.len(), 3);

        let gap = records.iter().find(|r| r.zip == "90001").unwrap();
        // Missing income takes the column median, missing population zero.
        assert_eq!(gap.median_income, 50_000.0);
        assert_eq!(gap.population, 0.0);
    }

    #[test]
    fn test_census_unemployment_median_fill() {
        let file = write_file(&[
            CENSUS_HEADER,
            "92503,100,40000,0.2,0.1,0.5,0.1,0.3,0.04,400000,35,1500",
            "92504,200,60000,0.2,0.1,0.5,0.1,0.3,0.08,410000,36,1600",
            "90001,300,50000,0.2,0.1,0.5,0.1,0.3,,420000,37,1700",
        ]);
        let records = load_census(file.path()).unwrap();
        let gap = records.iter().find(|r| r.zip == "90001").unwrap();
        assert!((gap.unemployment - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_census_trims_and_deduplicates_keys() {
        let file = write_file(&[
            CENSUS_HEADER,
            " 92503 ,100,40000,0.2,0.1,0.5,0.1,0.3,0.04,400000,35,1500",
            "92503,999,1,0.2,0.1,0.5,0.1,0.3,0.04,1,1,1",
        ]);
        let records = load_census(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].zip, "92503");
        assert_eq!(records[0].population, 100.0);
    }

    #[test]
    fn test_census_missing_column_fails_fast() {
        let file = write_file(&["Zip_Code,Population", "92503,100"]);
        let err = load_census(file.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingColumn {
                table: "census",
                column: "Median_Income"
            }
        ));
    }

    #[test]
    fn test_city_links_empty_fields_become_none() {
        let file = write_file(&[
            "Mailing Zip/Postal Code,Mailing City,Mailing State/Province,Term",
            "92503,Riverside,CA,Fall 2022",
            "90001,,,Fall 2022",
        ]);
        let links = load_city_links(file.path()).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].city.as_deref(), Some("Riverside"));
        assert_eq!(links[1].city, None);
        assert_eq!(links[1].state, None);
    }

    #[test]
    fn test_city_images() {
        let file = write_file(&[
            "City,Image_URL",
            "Riverside,https://img.example/riverside.jpg",
        ]);
        let images = load_city_images(file.path()).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].0, "Riverside");
    }

    #[test]
    fn test_zip_counts_accumulate() {
        let file = write_file(&["Zip_Code,Count", "92503,3", "92503,2", "90001,1"]);
        let counts = load_zip_counts(file.path()).unwrap();
        assert_eq!(counts.get("92503"), Some(&5));
        assert_eq!(counts.get("90001"), Some(&1));
    }
}
