//! Stage-indexed fallback values.
//!
//! Used only when the caller did not supply the number: an explicit strike price,
//! burn or valuation always wins. The built-in figures are illustrative market
//! midpoints and may be recalibrated through `STAGE_DEFAULTS_PATH`.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compensation::benchmarks::TableLoadError;
use crate::compensation::models::CompanyStage;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDefault {
    /// Per-share strike (≈ 409A common price).
    pub strike_price: f64,
    pub monthly_burn: f64,
    pub post_money_valuation: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageDefaults {
    entries: HashMap<CompanyStage, StageDefault>,
}

fn builtin(stage: CompanyStage) -> StageDefault {
    match stage {
        CompanyStage::PreSeed => StageDefault {
            strike_price: 0.05,
            monthly_burn: 60_000.0,
            post_money_valuation: 8_000_000.0,
        },
        CompanyStage::Seed => StageDefault {
            strike_price: 0.25,
            monthly_burn: 150_000.0,
            post_money_valuation: 20_000_000.0,
        },
        CompanyStage::SeriesA => StageDefault {
            strike_price: 1.00,
            monthly_burn: 400_000.0,
            post_money_valuation: 60_000_000.0,
        },
        CompanyStage::SeriesB => StageDefault {
            strike_price: 3.00,
            monthly_burn: 900_000.0,
            post_money_valuation: 200_000_000.0,
        },
        CompanyStage::SeriesCPlus => StageDefault {
            strike_price: 8.00,
            monthly_burn: 2_000_000.0,
            post_money_valuation: 600_000_000.0,
        },
    }
}

impl Default for StageDefaults {
    fn default() -> Self {
        Self {
            entries: CompanyStage::ALL
                .iter()
                .map(|stage| (*stage, builtin(*stage)))
                .collect(),
        }
    }
}

impl StageDefaults {
    pub fn for_stage(&self, stage: CompanyStage) -> StageDefault {
        self.entries
            .get(&stage)
            .copied()
            .unwrap_or_else(|| builtin(stage))
    }

    /// Parses a JSON object keyed by stage (`{"seed": {...}}`). Stages not present
    /// keep their built-in values.
    pub fn from_json(json: &str) -> Result<Self, TableLoadError> {
        let overrides: HashMap<CompanyStage, StageDefault> = serde_json::from_str(json)?;
        let mut defaults = Self::default();
        for (stage, value) in overrides {
            let finite = [value.strike_price, value.monthly_burn, value.post_money_valuation]
                .iter()
                .all(|v| v.is_finite() && *v >= 0.0);
            if !finite {
                return Err(TableLoadError::InvalidRow(format!(
                    "stage default for {} must be finite and non-negative",
                    stage.label()
                )));
            }
            defaults.entries.insert(stage, value);
        }
        Ok(defaults)
    }

    pub fn from_path(path: &Path) -> Result<Self, TableLoadError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_stage_has_a_default() {
        let defaults = StageDefaults::default();
        for stage in CompanyStage::ALL {
            let d = defaults.for_stage(stage);
            assert!(d.strike_price > 0.0);
            assert!(d.monthly_burn > 0.0);
            assert!(d.post_money_valuation > 0.0);
        }
    }

    #[test]
    fn test_later_stages_have_higher_strike() {
        let defaults = StageDefaults::default();
        let strikes: Vec<f64> = CompanyStage::ALL
            .iter()
            .map(|s| defaults.for_stage(*s).strike_price)
            .collect();
        assert!(strikes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_partial_override_keeps_other_stages() {
        let json = r#"{"seed": {"strikePrice": 0.4, "monthlyBurn": 200000, "postMoneyValuation": 25000000}}"#;
        let defaults = StageDefaults::from_json(json).unwrap();
        assert_eq!(defaults.for_stage(CompanyStage::Seed).strike_price, 0.4);
        assert_eq!(
            defaults.for_stage(CompanyStage::SeriesA),
            StageDefaults::default().for_stage(CompanyStage::SeriesA)
        );
    }

    #[test]
    fn test_negative_override_rejected() {
        let json = r#"{"seed": {"strikePrice": -1, "monthlyBurn": 1, "postMoneyValuation": 1}}"#;
        assert!(matches!(
            StageDefaults::from_json(json),
            Err(TableLoadError::InvalidRow(_))
        ));
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stages.json");
        std::fs::write(
            &path,
            r#"{"series-c+": {"strikePrice": 12, "monthlyBurn": 3000000, "postMoneyValuation": 1000000000}}"#,
        )
        .unwrap();
        let defaults = StageDefaults::from_path(&path).unwrap();
        assert_eq!(defaults.for_stage(CompanyStage::SeriesCPlus).strike_price, 12.0);
    }
}
