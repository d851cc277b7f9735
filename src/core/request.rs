use serde::Serialize;

use super::debt::{
    DebtAccount, DebtPayoffResult, DebtStrategy, ExtraPaymentSavings, MAX_PAYOFF_MONTHS,
    StrategyComparison, calculate_debt_payoff, compare_strategies, extra_payment_savings,
    validate_budget, validate_debts,
};
use super::healthcare::{HealthcareGapResult, HealthcareParams, calculate_healthcare_gap};
use super::quiz::{QuizAnswers, Recommendation, recommend_path};
use super::scenarios::{
    calculate_barista_fire, calculate_coast_fire, calculate_fat_fire, calculate_lean_fire,
    calculate_reverse_fire, calculate_savings_rate, calculate_standard_fire,
};
use super::solver::{TimelineSolveResult, calculate_debt_payoff_by_timeline};
use super::types::{
    BaristaFireResult, CoastFireResult, FatFireResult, InputError, LeanFireResult,
    ReverseFireResult, SavingsRateParams, SavingsRateResult, ScenarioInputs, StandardFireResult,
    require_non_negative, require_rate,
};
use super::withdrawal::{MAX_RETIREMENT_YEARS, WithdrawalResult, calculate_withdrawal};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalParams {
    pub portfolio_value: f64,
    pub withdrawal_rate: f64,
    pub expected_return: f64,
    pub inflation_rate: f64,
    pub retirement_years: u32,
}

impl WithdrawalParams {
    pub fn validate(&self) -> Result<(), InputError> {
        require_non_negative(self.portfolio_value, "portfolio-value")?;
        require_non_negative(self.withdrawal_rate, "withdrawal-rate")?;
        require_rate(self.expected_return, "expected-return")?;
        require_rate(self.inflation_rate, "inflation-rate")?;
        if self.retirement_years > MAX_RETIREMENT_YEARS {
            return Err(InputError::TooLarge {
                field: "retirement-years",
                max: f64::from(MAX_RETIREMENT_YEARS),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPlan {
    pub debts: Vec<DebtAccount>,
    pub strategy: DebtStrategy,
    pub monthly_budget: f64,
    pub extra_payment: f64,
}

impl DebtPlan {
    pub fn validate(&self) -> Result<(), InputError> {
        validate_debts(&self.debts)?;
        require_non_negative(self.extra_payment, "extra-payment")?;
        validate_budget(&self.debts, self.monthly_budget)
    }
}

/// Payoff plan that solves for the budget from a deadline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePlan {
    pub debts: Vec<DebtAccount>,
    pub strategy: DebtStrategy,
    pub target_months: u32,
    pub extra_payment: f64,
}

impl TimelinePlan {
    pub fn validate(&self) -> Result<(), InputError> {
        validate_debts(&self.debts)?;
        require_non_negative(self.extra_payment, "extra-payment")?;
        if self.target_months > MAX_PAYOFF_MONTHS {
            return Err(InputError::TooLarge {
                field: "target-months",
                max: f64::from(MAX_PAYOFF_MONTHS),
            });
        }
        Ok(())
    }
}

/// One calculator invocation with exactly the parameters it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioRequest {
    Standard(ScenarioInputs),
    Coast(ScenarioInputs),
    Lean(ScenarioInputs),
    Fat(ScenarioInputs),
    Barista {
        inputs: ScenarioInputs,
        part_time_income: f64,
    },
    Reverse(ScenarioInputs),
    SavingsRate(SavingsRateParams),
    Withdrawal(WithdrawalParams),
    Healthcare(HealthcareParams),
    Debt(DebtPlan),
    DebtTimeline(TimelinePlan),
    CompareDebt(DebtPlan),
    Quiz(QuizAnswers),
}

impl ScenarioRequest {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioRequest::Standard(_) => "standard",
            ScenarioRequest::Coast(_) => "coast",
            ScenarioRequest::Lean(_) => "lean",
            ScenarioRequest::Fat(_) => "fat",
            ScenarioRequest::Barista { .. } => "barista",
            ScenarioRequest::Reverse(_) => "reverse",
            ScenarioRequest::SavingsRate(_) => "savings-rate",
            ScenarioRequest::Withdrawal(_) => "withdrawal",
            ScenarioRequest::Healthcare(_) => "healthcare",
            ScenarioRequest::Debt(_) => "debt",
            ScenarioRequest::DebtTimeline(_) => "debt-timeline",
            ScenarioRequest::CompareDebt(_) => "compare-debt",
            ScenarioRequest::Quiz(_) => "quiz",
        }
    }

    pub fn validate(&self) -> Result<(), InputError> {
        match self {
            ScenarioRequest::Standard(inputs)
            | ScenarioRequest::Coast(inputs)
            | ScenarioRequest::Lean(inputs)
            | ScenarioRequest::Fat(inputs)
            | ScenarioRequest::Reverse(inputs) => inputs.validate(),
            ScenarioRequest::Barista {
                inputs,
                part_time_income,
            } => {
                inputs.validate()?;
                require_non_negative(*part_time_income, "part-time-income")
            }
            ScenarioRequest::SavingsRate(params) => params.validate(),
            ScenarioRequest::Withdrawal(params) => params.validate(),
            ScenarioRequest::Healthcare(params) => params.validate(),
            ScenarioRequest::Debt(plan) | ScenarioRequest::CompareDebt(plan) => plan.validate(),
            ScenarioRequest::DebtTimeline(plan) => plan.validate(),
            ScenarioRequest::Quiz(_) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtOutcome {
    #[serde(flatten)]
    pub result: DebtPayoffResult,
    pub extra_payment_savings: Option<ExtraPaymentSavings>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "scenario", content = "result", rename_all = "kebab-case")]
pub enum ScenarioOutcome {
    Standard(StandardFireResult),
    Coast(CoastFireResult),
    Lean(LeanFireResult),
    Fat(FatFireResult),
    Barista(BaristaFireResult),
    Reverse(ReverseFireResult),
    SavingsRate(SavingsRateResult),
    Withdrawal(WithdrawalResult),
    Healthcare(HealthcareGapResult),
    Debt(DebtOutcome),
    /// `None` when no payment within the search bracket meets the deadline.
    DebtTimeline(Option<TimelineSolveResult>),
    CompareDebt(StrategyComparison),
    Quiz(Recommendation),
}

pub fn run_scenario(request: &ScenarioRequest) -> Result<ScenarioOutcome, InputError> {
    request.validate()?;
    let outcome = match request {
        ScenarioRequest::Standard(inputs) => {
            ScenarioOutcome::Standard(calculate_standard_fire(inputs))
        }
        ScenarioRequest::Coast(inputs) => ScenarioOutcome::Coast(calculate_coast_fire(inputs)),
        ScenarioRequest::Lean(inputs) => ScenarioOutcome::Lean(calculate_lean_fire(inputs)),
        ScenarioRequest::Fat(inputs) => ScenarioOutcome::Fat(calculate_fat_fire(inputs)),
        ScenarioRequest::Barista {
            inputs,
            part_time_income,
        } => ScenarioOutcome::Barista(calculate_barista_fire(inputs, *part_time_income)),
        ScenarioRequest::Reverse(inputs) => {
            ScenarioOutcome::Reverse(calculate_reverse_fire(inputs))
        }
        ScenarioRequest::SavingsRate(params) => {
            ScenarioOutcome::SavingsRate(calculate_savings_rate(params))
        }
        ScenarioRequest::Withdrawal(p) => ScenarioOutcome::Withdrawal(calculate_withdrawal(
            p.portfolio_value,
            p.withdrawal_rate,
            p.expected_return,
            p.inflation_rate,
            p.retirement_years,
        )),
        ScenarioRequest::Healthcare(params) => {
            ScenarioOutcome::Healthcare(calculate_healthcare_gap(params))
        }
        ScenarioRequest::Debt(plan) => ScenarioOutcome::Debt(DebtOutcome {
            result: calculate_debt_payoff(
                &plan.debts,
                plan.strategy,
                plan.monthly_budget,
                plan.extra_payment,
            ),
            extra_payment_savings: extra_payment_savings(
                &plan.debts,
                plan.strategy,
                plan.monthly_budget,
                plan.extra_payment,
            ),
        }),
        ScenarioRequest::DebtTimeline(plan) => {
            ScenarioOutcome::DebtTimeline(calculate_debt_payoff_by_timeline(
                &plan.debts,
                plan.target_months,
                plan.strategy,
                plan.extra_payment,
            ))
        }
        ScenarioRequest::CompareDebt(plan) => ScenarioOutcome::CompareDebt(compare_strategies(
            &plan.debts,
            plan.monthly_budget,
            plan.extra_payment,
        )),
        ScenarioRequest::Quiz(answers) => ScenarioOutcome::Quiz(recommend_path(answers)),
    };
    Ok(outcome)
}
