use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::timevalue::real_return;

pub const LEAN_FIRE_THRESHOLD: f64 = 40_000.0;
pub const FAT_FIRE_THRESHOLD: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("--{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("--{field} must be > 0")]
    NotPositive { field: &'static str },
    #[error("--{field} must be >= 0")]
    Negative { field: &'static str },
    #[error("--{field} must be greater than -100%")]
    TotalLoss { field: &'static str },
    #[error("--{field} must be <= {max}")]
    TooLarge { field: &'static str, max: f64 },
    #[error("at least one debt is required")]
    NoDebts,
    #[error("debt `{name}` must have a positive balance")]
    EmptyDebt { name: String },
    #[error("monthly budget {budget:.2} is below the total minimum payments {minimums:.2}")]
    BudgetBelowMinimums { budget: f64, minimums: f64 },
}

pub(crate) fn require_finite(value: f64, field: &'static str) -> Result<(), InputError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InputError::NotFinite { field })
    }
}

pub(crate) fn require_non_negative(value: f64, field: &'static str) -> Result<(), InputError> {
    require_finite(value, field)?;
    if value < 0.0 {
        return Err(InputError::Negative { field });
    }
    Ok(())
}

pub(crate) fn require_positive(value: f64, field: &'static str) -> Result<(), InputError> {
    require_finite(value, field)?;
    if value <= 0.0 {
        return Err(InputError::NotPositive { field });
    }
    Ok(())
}

pub(crate) fn require_rate(value: f64, field: &'static str) -> Result<(), InputError> {
    require_finite(value, field)?;
    if value <= -1.0 {
        return Err(InputError::TotalLoss { field });
    }
    Ok(())
}

/// The flat parameter set shared by the accumulation-phase calculators.
///
/// Rates are decimals (`0.07` for 7%). `start_year` labels projection index 0
/// and is supplied by the caller so every model stays a pure function of its
/// inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_savings: f64,
    pub annual_contribution: f64,
    pub expected_return: f64,
    pub inflation_rate: f64,
    pub withdrawal_rate: f64,
    pub annual_expenses: f64,
    pub start_year: i32,
}

impl ScenarioInputs {
    pub fn validate(&self) -> Result<(), InputError> {
        require_non_negative(self.current_savings, "current-savings")?;
        require_non_negative(self.annual_contribution, "annual-contribution")?;
        require_non_negative(self.annual_expenses, "annual-expenses")?;
        require_rate(self.expected_return, "expected-return")?;
        require_rate(self.inflation_rate, "inflation-rate")?;
        require_positive(self.withdrawal_rate, "withdrawal-rate")?;
        Ok(())
    }

    pub fn real_return(&self) -> f64 {
        real_return(self.expected_return, self.inflation_rate)
    }

    pub fn fire_number(&self) -> f64 {
        self.annual_expenses / self.withdrawal_rate
    }

    pub fn years_to_retirement(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }
}

/// Serializes an unreachable horizon (`+inf`) as JSON `null`.
pub(crate) mod years_or_never {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub age: u32,
    pub year: i32,
    pub portfolio: f64,
    pub contributions: f64,
    pub total_contributions: f64,
    pub inflation_adjusted: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardFireResult {
    pub fire_number: f64,
    #[serde(with = "years_or_never")]
    pub years_to_fire: f64,
    #[serde(with = "years_or_never")]
    pub fire_age: f64,
    pub projections: Vec<ProjectionPoint>,
    pub savings_rate: f64,
    pub monthly_contribution: f64,
    pub coast_fire_number: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoastFireResult {
    pub coast_number: f64,
    #[serde(with = "years_or_never")]
    pub years_to_coast: f64,
    pub already_coasting: bool,
    pub fire_number: f64,
    pub projections: Vec<ProjectionPoint>,
    pub projections_with_contributions: Vec<ProjectionPoint>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseTier {
    Lean,
    Standard,
    Fat,
}

impl ExpenseTier {
    pub fn classify(annual_expenses: f64) -> Self {
        if annual_expenses <= LEAN_FIRE_THRESHOLD {
            ExpenseTier::Lean
        } else if annual_expenses >= FAT_FIRE_THRESHOLD {
            ExpenseTier::Fat
        } else {
            ExpenseTier::Standard
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeanFireResult {
    #[serde(flatten)]
    pub standard: StandardFireResult,
    pub is_lean: bool,
    pub lean_threshold: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FatFireResult {
    #[serde(flatten)]
    pub standard: StandardFireResult,
    pub is_fat: bool,
    pub fat_threshold: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaristaFireResult {
    pub barista_number: f64,
    pub full_fire_number: f64,
    #[serde(with = "years_or_never")]
    pub years_to_barista_fire: f64,
    pub part_time_income: f64,
    pub savings_from_part_time: f64,
    pub portfolio_reduction_percent: f64,
    pub projections: Vec<ProjectionPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseFireResult {
    pub fire_number: f64,
    pub years_to_fire: u32,
    pub required_annual_savings: f64,
    pub required_monthly_savings: f64,
    pub already_achievable: bool,
    pub current_will_grow_to: f64,
    pub projections: Vec<ProjectionPoint>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributionFrequency {
    Weekly,
    #[serde(alias = "biweekly")]
    BiWeekly,
    Monthly,
    Quarterly,
    Annually,
}

impl ContributionFrequency {
    pub fn periods_per_year(self) -> f64 {
        match self {
            ContributionFrequency::Weekly => 52.0,
            ContributionFrequency::BiWeekly => 26.0,
            ContributionFrequency::Monthly => 12.0,
            ContributionFrequency::Quarterly => 4.0,
            ContributionFrequency::Annually => 1.0,
        }
    }
}

/// Where the yearly savings figure for the savings-rate model comes from.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum SavingsSource {
    IncomeMinusExpenses,
    Explicit {
        amount: f64,
        frequency: ContributionFrequency,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsRateParams {
    pub current_age: u32,
    pub annual_income: f64,
    pub annual_expenses: f64,
    pub current_savings: f64,
    pub expected_return: f64,
    pub inflation_rate: f64,
    pub withdrawal_rate: f64,
    pub savings: SavingsSource,
    pub horizon_years: Option<u32>,
    pub start_year: i32,
}

impl SavingsRateParams {
    pub fn validate(&self) -> Result<(), InputError> {
        require_non_negative(self.annual_income, "annual-income")?;
        require_non_negative(self.annual_expenses, "annual-expenses")?;
        require_non_negative(self.current_savings, "current-savings")?;
        require_rate(self.expected_return, "expected-return")?;
        require_rate(self.inflation_rate, "inflation-rate")?;
        require_positive(self.withdrawal_rate, "withdrawal-rate")?;
        if let SavingsSource::Explicit { amount, .. } = self.savings {
            require_non_negative(amount, "contribution-amount")?;
        }
        Ok(())
    }
}

/// Display guidance bands for a savings rate. The 10/20/30/50% cut-offs are
/// fixed policy.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SavingsBand {
    BelowAverage,
    Average,
    Good,
    Aggressive,
    Extreme,
}

impl SavingsBand {
    pub fn classify(savings_rate: f64) -> Self {
        if savings_rate >= 0.5 {
            SavingsBand::Extreme
        } else if savings_rate >= 0.3 {
            SavingsBand::Aggressive
        } else if savings_rate >= 0.2 {
            SavingsBand::Good
        } else if savings_rate >= 0.1 {
            SavingsBand::Average
        } else {
            SavingsBand::BelowAverage
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SavingsBand::BelowAverage => "Below Average",
            SavingsBand::Average => "Average Saver",
            SavingsBand::Good => "Good Saver",
            SavingsBand::Aggressive => "Aggressive Saver",
            SavingsBand::Extreme => "Extreme Saver",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsRateResult {
    pub savings_rate: f64,
    pub annual_savings: f64,
    pub monthly_savings: f64,
    pub fire_number: f64,
    #[serde(with = "years_or_never")]
    pub years_to_fire: f64,
    pub band: SavingsBand,
    pub band_label: &'static str,
    pub final_nominal_value: f64,
    pub final_inflation_adjusted_value: f64,
    pub projections: Vec<ProjectionPoint>,
}
