//! Defines the `AnalysisConfig` struct, which declares the fixed enumerations the analysis relies on.
//!
//! Every field has a default, so the analysis runs without a configuration file. A file can be
//! supplied to override any of them.
use crate::ecm::{EcmID, FuelType};
use crate::input::{check_non_empty_and_unique, input_err_msg, read_toml};
use crate::state::BuildingTypeID;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::ops::RangeInclusive;
use std::path::Path;

const DEFAULT_FILE_HEADER: &str = "# Analysis configuration for ecm-summary
# All fields are optional. Omitted fields take the values shown here.
";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

/// Convert a list of string literals into a list of IDs
fn ids<T: From<&'static str>>(names: &[&'static str]) -> Vec<T> {
    names.iter().map(|&name| T::from(name)).collect()
}

define_param_default!(default_scenario, String, "Max adoption potential".into());
define_param_default!(default_excluded_ecms, Vec<EcmID>, ids(&["On-site Generation"]));
define_param_default!(default_start_year, u32, 2025);
define_param_default!(default_end_year, u32, 2050);
define_param_default!(default_end_use, String, "Heating (Equip.)".into());
define_param_default!(
    default_state_reference_ecm,
    EcmID,
    "(R) ESTAR GSHP (NG Furnace)".into()
);
define_param_default!(
    default_building_types,
    Vec<BuildingTypeID>,
    ids(&[
        "Single Family Homes (New)",
        "Multi Family Homes (New)",
        "Manufactured Homes (New)",
        "Single Family Homes (Existing)",
        "Multi Family Homes (Existing)",
        "Manufactured Homes (Existing)",
    ])
);
define_param_default!(
    default_share_ecms,
    Vec<EcmID>,
    ids(&[
        "(R) ESTAR GSHP (NG Furnace)",
        "(R) ESTAR HP FS (NG Furnace)",
        "(R) Ref. Case NG Heat, No Cooling",
        "(R) Ref. Case NG Furnace & AC",
        "(R) ESTAR HP FS (NG Heat, No Cool)",
    ])
);
define_param_default!(
    default_fuel_types,
    IndexMap<EcmID, FuelType>,
    [
        (
            EcmID::from("(R) Ref. Case NG Heat, No Cooling"),
            FuelType::NaturalGas
        ),
        (
            EcmID::from("(R) Ref. Case NG Furnace & AC"),
            FuelType::NaturalGas
        ),
    ]
    .into_iter()
    .collect()
);
define_param_default!(
    default_summary_ecm,
    EcmID,
    "(R) ESTAR HP FS (NG Furnace)".into()
);
define_param_default!(default_summary_year, u32, 2050);
define_param_default!(default_summary_label, String, "ASHP_FS".into());

/// Which ECMs contribute to the total that shares are calculated against
#[derive(
    DeserializeLabeledStringEnum, SerializeLabeledStringEnum, Debug, PartialEq, Clone, Copy, Default,
)]
pub enum ShareTotal {
    /// The total over every ECM in the results file
    #[default]
    #[string = "all_ecms"]
    AllEcms,
    /// The total over the share ECMs only, so that shares sum to one
    #[string = "share_ecms"]
    ShareEcms,
}

/// What to do when a penetration or share calculation would divide by zero
#[derive(
    DeserializeLabeledStringEnum, SerializeLabeledStringEnum, Debug, PartialEq, Clone, Copy, Default,
)]
pub enum ZeroDenominatorPolicy {
    /// Fail with an error identifying the offending value
    #[default]
    #[string = "error"]
    Error,
    /// Treat the measure as not applicable, giving a result of zero
    #[string = "zero"]
    Zero,
}

/// The configuration for an analysis run
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// The adoption scenario to read results for
    #[serde(default = "default_scenario")]
    pub scenario: String,
    /// ECMs which are ignored entirely
    #[serde(default = "default_excluded_ecms")]
    pub excluded_ecms: Vec<EcmID>,
    /// First year of the analysis
    #[serde(default = "default_start_year")]
    pub start_year: u32,
    /// Last year of the analysis (inclusive)
    #[serde(default = "default_end_year")]
    pub end_year: u32,
    /// The end use under which state-level stock is read
    #[serde(default = "default_end_use")]
    pub end_use: String,
    /// The ECM whose by-category data defines the list of states
    #[serde(default = "default_state_reference_ecm")]
    pub state_reference_ecm: EcmID,
    /// Building types summed over for state-level stock
    #[serde(default = "default_building_types")]
    pub building_types: Vec<BuildingTypeID>,
    /// ECMs for which shares of total measure stock are calculated
    #[serde(default = "default_share_ecms")]
    pub share_ecms: Vec<EcmID>,
    /// Which ECMs make up the total that shares are calculated against
    #[serde(default)]
    pub share_total: ShareTotal,
    /// What to do when dividing by a zero baseline or total
    #[serde(default)]
    pub zero_denominator: ZeroDenominatorPolicy,
    /// The ECM summarised for each state
    #[serde(default = "default_summary_ecm")]
    pub summary_ecm: EcmID,
    /// The year summarised for each state
    #[serde(default = "default_summary_year")]
    pub summary_year: u32,
    /// Prefix for the names of summary output files
    #[serde(default = "default_summary_label")]
    pub summary_label: String,
    /// The fuel type for ECMs not listed in `fuel_types`
    #[serde(default)]
    pub default_fuel_type: FuelType,
    /// ECMs whose state-level stock is read from a fuel other than the default
    #[serde(default = "default_fuel_types")]
    pub fuel_types: IndexMap<EcmID, FuelType>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            scenario: default_scenario(),
            excluded_ecms: default_excluded_ecms(),
            start_year: default_start_year(),
            end_year: default_end_year(),
            end_use: default_end_use(),
            state_reference_ecm: default_state_reference_ecm(),
            building_types: default_building_types(),
            share_ecms: default_share_ecms(),
            share_total: ShareTotal::default(),
            zero_denominator: ZeroDenominatorPolicy::default(),
            summary_ecm: default_summary_ecm(),
            summary_year: default_summary_year(),
            summary_label: default_summary_label(),
            default_fuel_type: FuelType::default(),
            fuel_types: default_fuel_types(),
        }
    }
}

/// Check that the year range is valid
fn check_years(start_year: u32, end_year: u32) -> Result<()> {
    ensure!(
        start_year <= end_year,
        "start_year ({start_year}) must not be after end_year ({end_year})"
    );

    Ok(())
}

impl AnalysisConfig {
    /// Load the configuration from the given file, or use the defaults if no file is given
    pub fn load(file_path: Option<&Path>) -> Result<Self> {
        match file_path {
            Some(file_path) => Self::from_path(file_path),
            None => Ok(Self::default()),
        }
    }

    /// Read a configuration file.
    ///
    /// # Returns
    ///
    /// The file contents as an [`AnalysisConfig`] struct or an error if the file is invalid
    pub fn from_path(file_path: &Path) -> Result<Self> {
        let config: AnalysisConfig = read_toml(file_path)?;
        config
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(config)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_years(self.start_year, self.end_year)?;
        check_non_empty_and_unique(&self.building_types, "building_types")?;
        check_non_empty_and_unique(&self.share_ecms, "share_ecms")?;

        ensure!(
            self.years().contains(&self.summary_year),
            "summary_year ({}) must be between {} and {}",
            self.summary_year,
            self.start_year,
            self.end_year
        );
        ensure!(
            self.share_ecms.contains(&self.summary_ecm),
            "summary_ecm ({}) must be one of the share_ecms",
            self.summary_ecm
        );
        ensure!(
            !self.summary_label.is_empty(),
            "summary_label cannot be empty"
        );

        let required = self
            .share_ecms
            .iter()
            .chain([&self.state_reference_ecm, &self.summary_ecm]);
        for ecm_id in required {
            ensure!(
                !self.is_excluded(&ecm_id.0),
                "ECM {ecm_id} is required for the analysis but is also in excluded_ecms"
            );
        }

        Ok(())
    }

    /// The years covered by the analysis
    pub fn years(&self) -> RangeInclusive<u32> {
        self.start_year..=self.end_year
    }

    /// Whether the named ECM is left out of the analysis
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_ecms.iter().any(|id| &*id.0 == name)
    }

    /// The fuel field from which the given ECM's state-level stock is read
    pub fn fuel_type_for(&self, ecm_id: &EcmID) -> FuelType {
        self.fuel_types
            .get(ecm_id)
            .copied()
            .unwrap_or(self.default_fuel_type)
    }

    /// The contents of a configuration file containing the default values
    pub fn default_file_contents() -> Result<String> {
        let body = toml::to_string(&Self::default())?;
        Ok(format!("{DEFAULT_FILE_HEADER}\n{body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_is_valid() {
        AnalysisConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_fuel_types() {
        let config = AnalysisConfig::default();
        assert_eq!(
            config.fuel_type_for(&"(R) Ref. Case NG Heat, No Cooling".into()),
            FuelType::NaturalGas
        );
        assert_eq!(
            config.fuel_type_for(&"(R) Ref. Case NG Furnace & AC".into()),
            FuelType::NaturalGas
        );
        assert_eq!(
            config.fuel_type_for(&"(R) ESTAR HP FS (NG Furnace)".into()),
            FuelType::Electric
        );
    }

    #[test]
    fn test_is_excluded() {
        let config = AnalysisConfig::default();
        assert!(config.is_excluded("On-site Generation"));
        assert!(!config.is_excluded("(R) ESTAR HP FS (NG Furnace)"));
    }

    #[test]
    fn test_load_no_file() {
        assert_eq!(AnalysisConfig::load(None).unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn test_from_path_partial() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("analysis.toml");
        fs::write(
            &file_path,
            "end_year = 2030\nsummary_year = 2030\nzero_denominator = \"zero\"\n\n\
            [fuel_types]\n\"(R) ESTAR GSHP (NG Furnace)\" = \"natural_gas\"\n",
        )
        .unwrap();

        let config = AnalysisConfig::from_path(&file_path).unwrap();
        assert_eq!(config.years(), 2025..=2030);
        assert_eq!(config.zero_denominator, ZeroDenominatorPolicy::Zero);
        assert_eq!(config.share_total, ShareTotal::AllEcms);
        assert_eq!(
            config.fuel_type_for(&"(R) ESTAR GSHP (NG Furnace)".into()),
            FuelType::NaturalGas
        );

        // The fuel_types table replaces the default one
        assert_eq!(
            config.fuel_type_for(&"(R) Ref. Case NG Furnace & AC".into()),
            FuelType::Electric
        );
    }

    #[test]
    fn test_from_path_invalid() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("analysis.toml");
        fs::write(&file_path, "end_year = 2030\n").unwrap();

        assert_error!(
            AnalysisConfig::from_path(&file_path),
            input_err_msg(&file_path)
        );
    }

    #[test]
    fn test_from_path_unknown_field() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("analysis.toml");
        fs::write(&file_path, "scenaro = \"Technical potential\"\n").unwrap();

        assert!(AnalysisConfig::from_path(&file_path).is_err());
    }

    #[rstest]
    #[case(2025, 2050, true)]
    #[case(2030, 2030, true)]
    #[case(2031, 2030, false)]
    fn test_check_years(#[case] start: u32, #[case] end: u32, #[case] valid: bool) {
        assert_eq!(check_years(start, end).is_ok(), valid);
    }

    #[test]
    fn test_validate_summary_year_out_of_range() {
        let config = AnalysisConfig {
            summary_year: 2051,
            ..AnalysisConfig::default()
        };
        assert_error!(
            config.validate(),
            "summary_year (2051) must be between 2025 and 2050"
        );
    }

    #[test]
    fn test_validate_summary_ecm_not_share_ecm() {
        let config = AnalysisConfig {
            summary_ecm: "Other".into(),
            ..AnalysisConfig::default()
        };
        assert_error!(
            config.validate(),
            "summary_ecm (Other) must be one of the share_ecms"
        );
    }

    #[test]
    fn test_validate_required_ecm_excluded() {
        let config = AnalysisConfig {
            excluded_ecms: vec!["(R) ESTAR GSHP (NG Furnace)".into()],
            ..AnalysisConfig::default()
        };
        assert_error!(
            config.validate(),
            "ECM (R) ESTAR GSHP (NG Furnace) is required for the analysis but is also in \
            excluded_ecms"
        );
    }

    #[test]
    fn test_validate_duplicate_building_type() {
        let mut config = AnalysisConfig::default();
        config.building_types.push("Manufactured Homes (New)".into());
        assert_error!(
            config.validate(),
            "Duplicate entry in building_types: Manufactured Homes (New)"
        );
    }

    #[test]
    fn test_default_file_contents_round_trip() {
        let contents = AnalysisConfig::default_file_contents().unwrap();
        let config: AnalysisConfig = toml::from_str(&contents).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }
}
