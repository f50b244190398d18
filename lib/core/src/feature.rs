//! Feature vocabulary for the demographic similarity space.
//!
//! The nine similarity features are listed in [`Feature::ALL`] in the order
//! they appear in the feature matrix. Scaler statistics, centroid distances
//! and projection inputs all use this fixed order.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One column of the demographic feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    #[serde(rename = "Population")]
    Population,
    #[serde(rename = "Median_Income")]
    MedianIncome,
    #[serde(rename = "Bachelor_Degree")]
    BachelorDegree,
    #[serde(rename = "Graduate_Professional_Degree")]
    GraduateDegree,
    #[serde(rename = "White_Alone")]
    WhiteAlone,
    #[serde(rename = "Black_Alone")]
    BlackAlone,
    #[serde(rename = "Hispanic_Latino")]
    HispanicLatino,
    #[serde(rename = "Unemployment")]
    Unemployment,
    #[serde(rename = "Median_Home_Value")]
    MedianHomeValue,
}

impl Feature {
    /// All similarity features, in matrix column order.
    pub const ALL: [Feature; 9] = [
        Feature::Population,
        Feature::MedianIncome,
        Feature::BachelorDegree,
        Feature::GraduateDegree,
        Feature::WhiteAlone,
        Feature::BlackAlone,
        Feature::HispanicLatino,
        Feature::Unemployment,
        Feature::MedianHomeValue,
    ];

    /// Source-table column header for this feature.
    pub fn column(&self) -> &'static str {
        match self {
            Feature::Population => "Population",
            Feature::MedianIncome => "Median_Income",
            Feature::BachelorDegree => "Bachelor_Degree",
            Feature::GraduateDegree => "Graduate_Professional_Degree",
            Feature::WhiteAlone => "White_Alone",
            Feature::BlackAlone => "Black_Alone",
            Feature::HispanicLatino => "Hispanic_Latino",
            Feature::Unemployment => "Unemployment",
            Feature::MedianHomeValue => "Median_Home_Value",
        }
    }

    /// Human-readable axis/legend label.
    pub fn label(&self) -> &'static str {
        match self {
            Feature::Population => "Population",
            Feature::MedianIncome => "Median Income",
            Feature::BachelorDegree => "Education (Bachelors)",
            Feature::GraduateDegree => "Education (Graduate/Professional)",
            Feature::WhiteAlone => "Percentage White Alone",
            Feature::BlackAlone => "Percentage Black or African American",
            Feature::HispanicLatino => "Percentage Hispanic or Latino",
            Feature::Unemployment => "Unemployment",
            Feature::MedianHomeValue => "Median Home Value",
        }
    }

    /// True for fraction-valued features whose natural domain is [0, 1].
    pub fn is_share(&self) -> bool {
        matches!(
            self,
            Feature::BachelorDegree
                | Feature::GraduateDegree
                | Feature::WhiteAlone
                | Feature::BlackAlone
                | Feature::HispanicLatino
                | Feature::Unemployment
        )
    }

    /// True for dollar/count features usually abbreviated in thousands.
    pub fn in_thousands(&self) -> bool {
        matches!(
            self,
            Feature::Population | Feature::MedianIncome | Feature::MedianHomeValue
        )
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Feature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.column().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::UnknownFeature(s.to_string()))
    }
}

/// Named axis presets for the scatter view.
///
/// `Generalized` plots the t-SNE components; every other dimension maps to a
/// fixed pair of raw feature axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Generalized,
    EconomicProsperity,
    EducationalAttainment,
    PopulationDensity,
    EthnicDiversity,
}

impl Dimension {
    /// Raw feature axes for this dimension, or `None` for the t-SNE view.
    pub fn axes(&self) -> Option<(Feature, Feature)> {
        match self {
            Dimension::Generalized => None,
            Dimension::EconomicProsperity => {
                Some((Feature::MedianIncome, Feature::MedianHomeValue))
            }
            Dimension::EducationalAttainment => {
                Some((Feature::BachelorDegree, Feature::GraduateDegree))
            }
            Dimension::PopulationDensity => Some((Feature::Population, Feature::Unemployment)),
            Dimension::EthnicDiversity => Some((Feature::HispanicLatino, Feature::BlackAlone)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Generalized => "generalized",
            Dimension::EconomicProsperity => "economic_prosperity",
            Dimension::EducationalAttainment => "educational_attainment",
            Dimension::PopulationDensity => "population_density",
            Dimension::EthnicDiversity => "ethnic_diversity",
        }
    }
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "generalized" => Ok(Dimension::Generalized),
            "economic_prosperity" => Ok(Dimension::EconomicProsperity),
            "educational_attainment" => Ok(Dimension::EducationalAttainment),
            "population_density" => Ok(Dimension::PopulationDensity),
            "ethnic_diversity" => Ok(Dimension::EthnicDiversity),
            other => Err(Error::UnknownDimension(other.to_string())),
        }
    }
}
