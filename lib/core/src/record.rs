use crate::feature::Feature;
use serde::{Deserialize, Serialize};

/// One deduplicated demographic record, keyed by 5-digit ZIP code.
///
/// All numeric fields are post-fill: loaders replace missing values before a
/// record is constructed, so every field here is present and finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZipRecord {
    pub zip: String,
    pub population: f64,
    pub median_income: f64,
    pub bachelor_degree: f64,
    pub graduate_degree: f64,
    pub white_alone: f64,
    pub black_alone: f64,
    pub hispanic_latino: f64,
    pub unemployment: f64,
    pub median_home_value: f64,
    pub median_age: f64,
    pub median_gross_rent: f64,
}

impl ZipRecord {
    /// Value of a single similarity feature.
    #[inline]
    pub fn feature(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Population => self.population,
            Feature::MedianIncome => self.median_income,
            Feature::BachelorDegree => self.bachelor_degree,
            Feature::GraduateDegree => self.graduate_degree,
            Feature::WhiteAlone => self.white_alone,
            Feature::BlackAlone => self.black_alone,
            Feature::HispanicLatino => self.hispanic_latino,
            Feature::Unemployment => self.unemployment,
            Feature::MedianHomeValue => self.median_home_value,
        }
    }

    /// Raw (unscaled) feature values in the given column order.
    pub fn feature_row(&self, features: &[Feature]) -> Vec<f64> {
        features.iter().map(|&f| self.feature(f)).collect()
    }
}

/// ZIP-to-city linkage extracted from the enrollment table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityLink {
    pub zip: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[cfg(test)]
pub(crate) fn test_record(zip: &str, population: f64, median_income: f64) -> ZipRecord {
    ZipRecord {
        zip: zip.to_string(),
        population,
        median_income,
        bachelor_degree: 0.2,
        graduate_degree: 0.1,
        white_alone: 0.5,
        black_alone: 0.1,
        hispanic_latino: 0.3,
        unemployment: 0.05,
        median_home_value: 400_000.0,
        median_age: 35.0,
        median_gross_rent: 1_500.0,
    }
}
