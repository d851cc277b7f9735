use serde::{Deserialize, Serialize};

use super::timevalue::{MAX_YEARS_TO_TARGET, round_whole};
use super::types::{InputError, require_non_negative, require_rate};

pub const DEFAULT_MEDICARE_AGE: u32 = 65;
pub const DEFAULT_MONTHLY_PREMIUM: f64 = 600.0;
pub const DEFAULT_ANNUAL_DEDUCTIBLE: f64 = 2_500.0;
pub const DEFAULT_ANNUAL_OUT_OF_POCKET: f64 = 2_000.0;
pub const MAX_GAP_YEARS: u32 = MAX_YEARS_TO_TARGET;

/// Income ceilings (exclusive) and the share of the annual cost subsidised
/// below each. Incomes at or above the last ceiling get nothing.
const SUBSIDY_BANDS: [(f64, f64); 4] = [
    (30_000.0, 0.70),
    (50_000.0, 0.50),
    (75_000.0, 0.30),
    (100_000.0, 0.15),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthcareParams {
    pub current_age: u32,
    pub early_retirement_age: u32,
    pub medicare_age: u32,
    pub monthly_premium: f64,
    pub annual_deductible: f64,
    pub annual_out_of_pocket: f64,
    pub inflation_rate: f64,
    pub start_year: i32,
}

impl HealthcareParams {
    pub fn validate(&self) -> Result<(), InputError> {
        require_non_negative(self.monthly_premium, "monthly-premium")?;
        require_non_negative(self.annual_deductible, "annual-deductible")?;
        require_non_negative(self.annual_out_of_pocket, "annual-out-of-pocket")?;
        require_rate(self.inflation_rate, "inflation-rate")?;
        if self.gap_years() > MAX_GAP_YEARS {
            return Err(InputError::TooLarge {
                field: "medicare-age",
                max: f64::from(self.early_retirement_age.saturating_add(MAX_GAP_YEARS)),
            });
        }
        Ok(())
    }

    /// Years between early retirement and Medicare eligibility, zero when
    /// retiring at or after it.
    pub fn gap_years(&self) -> u32 {
        self.medicare_age.saturating_sub(self.early_retirement_age)
    }

    /// `12 · premium + deductible + out_of_pocket`, in today's money.
    pub fn annual_cost(&self) -> f64 {
        self.monthly_premium * 12.0 + self.annual_deductible + self.annual_out_of_pocket
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthcareYear {
    pub age: u32,
    pub year: i32,
    pub cost: f64,
    pub premium: f64,
    pub deductible: f64,
    pub out_of_pocket: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthcareGapResult {
    pub gap_years: u32,
    pub annual_cost: f64,
    pub total_cost: f64,
    pub avg_annual_cost: f64,
    pub yearly_breakdown: Vec<HealthcareYear>,
    pub estimated_subsidy_30k: f64,
    pub estimated_subsidy_50k: f64,
    pub estimated_subsidy_75k: f64,
}

/// Share of `annual_cost` a household at `income` could expect back.
pub fn estimated_subsidy(annual_cost: f64, income: f64) -> f64 {
    SUBSIDY_BANDS
        .iter()
        .find(|(ceiling, _)| income < *ceiling)
        .map_or(0.0, |(_, share)| annual_cost * share)
}

pub fn calculate_healthcare_gap(params: &HealthcareParams) -> HealthcareGapResult {
    let gap_years = params.gap_years().min(MAX_GAP_YEARS);
    let annual_cost = params.annual_cost();
    let first_year = params.start_year
        + (i64::from(params.early_retirement_age) - i64::from(params.current_age)) as i32;

    let mut total_cost = 0.0;
    let mut yearly_breakdown = Vec::with_capacity(gap_years as usize);
    for i in 0..gap_years {
        let growth = (1.0 + params.inflation_rate).powi(i as i32);
        let cost = annual_cost * growth;
        total_cost += cost;
        yearly_breakdown.push(HealthcareYear {
            age: params.early_retirement_age + i,
            year: first_year + i as i32,
            cost: round_whole(cost),
            premium: round_whole(params.monthly_premium * 12.0 * growth),
            deductible: round_whole(params.annual_deductible * growth),
            out_of_pocket: round_whole(params.annual_out_of_pocket * growth),
        });
    }

    let avg_annual_cost = if gap_years > 0 {
        round_whole(total_cost / gap_years as f64)
    } else {
        0.0
    };

    HealthcareGapResult {
        gap_years,
        annual_cost,
        total_cost: round_whole(total_cost),
        avg_annual_cost,
        yearly_breakdown,
        estimated_subsidy_30k: round_whole(estimated_subsidy(annual_cost, 30_000.0)),
        estimated_subsidy_50k: round_whole(estimated_subsidy(annual_cost, 50_000.0)),
        estimated_subsidy_75k: round_whole(estimated_subsidy(annual_cost, 75_000.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> HealthcareParams {
        HealthcareParams {
            current_age: 30,
            early_retirement_age: 55,
            medicare_age: DEFAULT_MEDICARE_AGE,
            monthly_premium: DEFAULT_MONTHLY_PREMIUM,
            annual_deductible: DEFAULT_ANNUAL_DEDUCTIBLE,
            annual_out_of_pocket: DEFAULT_ANNUAL_OUT_OF_POCKET,
            inflation_rate: 0.03,
            start_year: 2025,
        }
    }

    #[test]
    fn ten_year_gap_with_default_plan() {
        let result = calculate_healthcare_gap(&params());
        assert_eq!(result.gap_years, 10);
        assert_eq!(result.annual_cost, 11_700.0);
        assert_eq!(result.yearly_breakdown.len(), 10);

        let first = result.yearly_breakdown[0];
        assert_eq!(first.age, 55);
        assert_eq!(first.year, 2050);
        assert_eq!(first.cost, 11_700.0);
        assert_eq!(first.premium, 7_200.0);

        let expected_total: f64 = (0..10).map(|i| 11_700.0 * 1.03f64.powi(i)).sum();
        assert_eq!(result.total_cost, round_whole(expected_total));
        assert_eq!(result.avg_annual_cost, round_whole(expected_total / 10.0));
    }

    #[test]
    fn no_gap_when_retiring_at_medicare_age() {
        let mut p = params();
        p.early_retirement_age = 67;
        let result = calculate_healthcare_gap(&p);
        assert_eq!(result.gap_years, 0);
        assert_eq!(result.total_cost, 0.0);
        assert_eq!(result.avg_annual_cost, 0.0);
        assert!(result.yearly_breakdown.is_empty());
    }

    #[test]
    fn subsidy_bands_use_exclusive_ceilings() {
        assert_eq!(estimated_subsidy(10_000.0, 29_999.0), 7_000.0);
        assert_eq!(estimated_subsidy(10_000.0, 30_000.0), 5_000.0);
        assert_eq!(estimated_subsidy(10_000.0, 74_999.0), 3_000.0);
        assert_eq!(estimated_subsidy(10_000.0, 99_999.0), 1_500.0);
        assert_eq!(estimated_subsidy(10_000.0, 100_000.0), 0.0);
    }

    #[test]
    fn reported_subsidies_match_bands() {
        let result = calculate_healthcare_gap(&params());
        assert_eq!(result.estimated_subsidy_30k, 5_850.0);
        assert_eq!(result.estimated_subsidy_50k, 3_510.0);
        assert_eq!(result.estimated_subsidy_75k, 1_755.0);
    }

    #[test]
    fn gap_years_are_labelled_from_the_retirement_year() {
        let mut p = params();
        p.current_age = 60;
        p.early_retirement_age = 58;
        let result = calculate_healthcare_gap(&p);
        assert_eq!(result.yearly_breakdown[0].year, 2023);
        assert_eq!(result.gap_years, 7);
    }

    #[test]
    fn gap_longer_than_cap_is_rejected_and_clamped() {
        let mut p = params();
        p.early_retirement_age = 0;
        p.medicare_age = u32::MAX;
        assert_eq!(
            p.validate(),
            Err(InputError::TooLarge {
                field: "medicare-age",
                max: 100.0
            })
        );
        let result = calculate_healthcare_gap(&p);
        assert_eq!(result.gap_years, MAX_GAP_YEARS);
        assert_eq!(result.yearly_breakdown.len(), MAX_GAP_YEARS as usize);

        p.medicare_age = MAX_GAP_YEARS;
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_negative_costs() {
        let mut p = params();
        p.annual_deductible = -1.0;
        assert_eq!(
            p.validate(),
            Err(InputError::Negative {
                field: "annual-deductible"
            })
        );
    }
}
