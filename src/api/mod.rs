use std::fs;
use std::io::{self, Read};

use chrono::Datelike;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use serde::Deserialize;
use thiserror::Error;

use crate::core::{
    ContributionFrequency, DEFAULT_ANNUAL_DEDUCTIBLE, DEFAULT_ANNUAL_OUT_OF_POCKET,
    DEFAULT_MEDICARE_AGE, DEFAULT_MONTHLY_PREMIUM, DebtAccount, DebtPayoffResult, DebtPlan,
    DebtStrategy, HealthcareParams, InputError, Lifestyle, PrimaryGoal, QuizAnswers,
    SavingsRateParams, SavingsSource, ScenarioInputs, ScenarioOutcome, ScenarioRequest,
    TimelinePlan, WithdrawalParams, WorkPreference, format_currency, format_months,
    format_percent, format_years, run_scenario,
};

const DEFAULT_CURRENT_AGE: u32 = 30;
const DEFAULT_RETIREMENT_AGE: u32 = 55;
const DEFAULT_CURRENT_SAVINGS: f64 = 100_000.0;
const DEFAULT_ANNUAL_CONTRIBUTION: f64 = 24_000.0;
const DEFAULT_EXPECTED_RETURN_PCT: f64 = 7.0;
const DEFAULT_INFLATION_PCT: f64 = 3.0;
const DEFAULT_WITHDRAWAL_RATE_PCT: f64 = 4.0;
const DEFAULT_ANNUAL_EXPENSES: f64 = 48_000.0;
const DEFAULT_PART_TIME_INCOME: f64 = 20_000.0;
const DEFAULT_PORTFOLIO_VALUE: f64 = 1_000_000.0;
const DEFAULT_RETIREMENT_YEARS: u32 = 30;
const DEFAULT_MONTHLY_BUDGET: f64 = 1_000.0;
const DEFAULT_TARGET_MONTHS: u32 = 36;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("Invalid request JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read request {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("request JSON must name a \"scenario\"")]
    MissingScenario,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStrategy {
    Snowball,
    Avalanche,
}

impl From<CliStrategy> for DebtStrategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Snowball => DebtStrategy::Snowball,
            CliStrategy::Avalanche => DebtStrategy::Avalanche,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFrequency {
    Weekly,
    BiWeekly,
    Monthly,
    Quarterly,
    Annually,
}

impl From<CliFrequency> for ContributionFrequency {
    fn from(value: CliFrequency) -> Self {
        match value {
            CliFrequency::Weekly => ContributionFrequency::Weekly,
            CliFrequency::BiWeekly => ContributionFrequency::BiWeekly,
            CliFrequency::Monthly => ContributionFrequency::Monthly,
            CliFrequency::Quarterly => ContributionFrequency::Quarterly,
            CliFrequency::Annually => ContributionFrequency::Annually,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliLifestyle {
    Minimal,
    Moderate,
    Comfortable,
    Luxury,
}

impl From<CliLifestyle> for Lifestyle {
    fn from(value: CliLifestyle) -> Self {
        match value {
            CliLifestyle::Minimal => Lifestyle::Minimal,
            CliLifestyle::Moderate => Lifestyle::Moderate,
            CliLifestyle::Comfortable => Lifestyle::Comfortable,
            CliLifestyle::Luxury => Lifestyle::Luxury,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliWorkPreference {
    QuitCompletely,
    PartTime,
    Flexible,
    Coast,
}

impl From<CliWorkPreference> for WorkPreference {
    fn from(value: CliWorkPreference) -> Self {
        match value {
            CliWorkPreference::QuitCompletely => WorkPreference::QuitCompletely,
            CliWorkPreference::PartTime => WorkPreference::PartTime,
            CliWorkPreference::Flexible => WorkPreference::Flexible,
            CliWorkPreference::Coast => WorkPreference::Coast,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliGoal {
    RetireEarly,
    FinancialSecurity,
    MaintainLifestyle,
    Flexibility,
}

impl From<CliGoal> for PrimaryGoal {
    fn from(value: CliGoal) -> Self {
        match value {
            CliGoal::RetireEarly => PrimaryGoal::RetireEarly,
            CliGoal::FinancialSecurity => PrimaryGoal::FinancialSecurity,
            CliGoal::MaintainLifestyle => PrimaryGoal::MaintainLifestyle,
            CliGoal::Flexibility => PrimaryGoal::Flexibility,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "firecalc",
    about = "FIRE projections, withdrawal longevity and debt payoff planning"
)]
pub struct Cli {
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    #[arg(
        long,
        global = true,
        help = "Calendar year of the first projection point; defaults to the current year"
    )]
    start_year: Option<i32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Classic FIRE: expenses divided by the withdrawal rate
    Standard(ScenarioArgs),
    /// Savings needed today to coast to FIRE without contributing
    Coast(ScenarioArgs),
    /// Standard FIRE flagged against the lean expense ceiling
    Lean(ScenarioArgs),
    /// Standard FIRE flagged against the fat expense floor
    Fat(ScenarioArgs),
    /// FIRE number with part-time income covering some expenses
    Barista(BaristaArgs),
    /// Contribution required to hit FIRE at the retirement age
    Reverse(ScenarioArgs),
    /// Savings rate and what it buys
    SavingsRate(SavingsRateArgs),
    /// How long a portfolio lasts under inflation-adjusted withdrawals
    Withdrawal(WithdrawalArgs),
    /// Insurance costs between early retirement and Medicare
    Healthcare(HealthcareArgs),
    /// Month-by-month payoff with a fixed budget
    Debt(DebtArgs),
    /// Monthly payment needed to be debt free by a deadline
    DebtTimeline(TimelineArgs),
    /// Snowball and Avalanche side by side
    CompareDebt(DebtArgs),
    /// Suggest a calculator from a few lifestyle answers
    Quiz(QuizArgs),
    /// Run a JSON request (`-` reads stdin)
    Run {
        #[arg(long)]
        request: String,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
struct ScenarioArgs {
    #[arg(long, default_value_t = DEFAULT_CURRENT_AGE)]
    current_age: u32,
    #[arg(long, default_value_t = DEFAULT_RETIREMENT_AGE)]
    retirement_age: u32,
    #[arg(long, default_value_t = DEFAULT_CURRENT_SAVINGS)]
    current_savings: f64,
    #[arg(long, default_value_t = DEFAULT_ANNUAL_CONTRIBUTION)]
    annual_contribution: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_EXPECTED_RETURN_PCT,
        help = "Expected nominal annual return in percent"
    )]
    expected_return: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_INFLATION_PCT,
        help = "Expected annual inflation in percent"
    )]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_WITHDRAWAL_RATE_PCT,
        help = "Safe withdrawal rate in percent"
    )]
    withdrawal_rate: f64,
    #[arg(long, default_value_t = DEFAULT_ANNUAL_EXPENSES)]
    annual_expenses: f64,
}

impl Default for ScenarioArgs {
    fn default() -> Self {
        Self {
            current_age: DEFAULT_CURRENT_AGE,
            retirement_age: DEFAULT_RETIREMENT_AGE,
            current_savings: DEFAULT_CURRENT_SAVINGS,
            annual_contribution: DEFAULT_ANNUAL_CONTRIBUTION,
            expected_return: DEFAULT_EXPECTED_RETURN_PCT,
            inflation_rate: DEFAULT_INFLATION_PCT,
            withdrawal_rate: DEFAULT_WITHDRAWAL_RATE_PCT,
            annual_expenses: DEFAULT_ANNUAL_EXPENSES,
        }
    }
}

impl ScenarioArgs {
    fn to_inputs(&self, start_year: i32) -> ScenarioInputs {
        ScenarioInputs {
            current_age: self.current_age,
            retirement_age: self.retirement_age,
            current_savings: self.current_savings,
            annual_contribution: self.annual_contribution,
            expected_return: self.expected_return / 100.0,
            inflation_rate: self.inflation_rate / 100.0,
            withdrawal_rate: self.withdrawal_rate / 100.0,
            annual_expenses: self.annual_expenses,
            start_year,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
struct BaristaArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,
    #[arg(long, default_value_t = DEFAULT_PART_TIME_INCOME)]
    part_time_income: f64,
}

#[derive(Args, Debug, Clone, PartialEq)]
struct SavingsRateArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,
    #[arg(long, help = "Gross annual income; defaults to contribution plus expenses")]
    annual_income: Option<f64>,
    #[arg(
        long,
        help = "Contribution per period; savings default to income minus expenses when omitted"
    )]
    contribution_amount: Option<f64>,
    #[arg(long, value_enum, default_value_t = CliFrequency::Monthly)]
    frequency: CliFrequency,
    #[arg(long, help = "Projection length in years (at most 60)")]
    horizon_years: Option<u32>,
}

#[derive(Args, Debug, Clone, PartialEq)]
struct WithdrawalArgs {
    #[arg(long, default_value_t = DEFAULT_PORTFOLIO_VALUE)]
    portfolio_value: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_WITHDRAWAL_RATE_PCT,
        help = "Initial withdrawal rate in percent"
    )]
    withdrawal_rate: f64,
    #[arg(long, default_value_t = DEFAULT_EXPECTED_RETURN_PCT)]
    expected_return: f64,
    #[arg(long, default_value_t = DEFAULT_INFLATION_PCT)]
    inflation_rate: f64,
    #[arg(long, default_value_t = DEFAULT_RETIREMENT_YEARS)]
    retirement_years: u32,
}

#[derive(Args, Debug, Clone, PartialEq)]
struct HealthcareArgs {
    #[arg(long, default_value_t = DEFAULT_CURRENT_AGE)]
    current_age: u32,
    #[arg(long, default_value_t = DEFAULT_RETIREMENT_AGE)]
    early_retirement_age: u32,
    #[arg(long, default_value_t = DEFAULT_MEDICARE_AGE)]
    medicare_age: u32,
    #[arg(long, default_value_t = DEFAULT_MONTHLY_PREMIUM)]
    monthly_premium: f64,
    #[arg(long, default_value_t = DEFAULT_ANNUAL_DEDUCTIBLE)]
    annual_deductible: f64,
    #[arg(long, default_value_t = DEFAULT_ANNUAL_OUT_OF_POCKET)]
    annual_out_of_pocket: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_INFLATION_PCT,
        help = "Healthcare cost inflation in percent"
    )]
    inflation_rate: f64,
}

#[derive(Args, Debug, Clone, PartialEq)]
struct DebtArgs {
    #[arg(
        long = "debt",
        required = true,
        value_parser = parse_debt_spec,
        help = "Debt as name:balance:rate%:min-payment, e.g. card:5000:19.9%:150 (repeatable)"
    )]
    debts: Vec<DebtAccount>,
    #[arg(long, value_enum, default_value_t = CliStrategy::Snowball)]
    strategy: CliStrategy,
    #[arg(long, default_value_t = DEFAULT_MONTHLY_BUDGET)]
    budget: f64,
    #[arg(long, default_value_t = 0.0)]
    extra_payment: f64,
}

#[derive(Args, Debug, Clone, PartialEq)]
struct TimelineArgs {
    #[arg(long = "debt", required = true, value_parser = parse_debt_spec)]
    debts: Vec<DebtAccount>,
    #[arg(long, value_enum, default_value_t = CliStrategy::Snowball)]
    strategy: CliStrategy,
    #[arg(long, default_value_t = DEFAULT_TARGET_MONTHS)]
    target_months: u32,
    #[arg(long, default_value_t = 0.0)]
    extra_payment: f64,
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
struct QuizArgs {
    #[arg(long)]
    current_age: Option<u32>,
    #[arg(long)]
    retirement_age: Option<u32>,
    #[arg(long)]
    annual_expenses: Option<f64>,
    #[arg(long, value_enum)]
    lifestyle: Option<CliLifestyle>,
    #[arg(long, value_enum)]
    work_preference: Option<CliWorkPreference>,
    #[arg(long, value_enum)]
    primary_goal: Option<CliGoal>,
}

/// Parses `name:balance:rate%:min-payment`; the `%` is optional.
fn parse_debt_spec(value: &str) -> Result<DebtAccount, String> {
    let parts: Vec<&str> = value.split(':').map(str::trim).collect();
    let [name, balance, rate, min_payment] = parts.as_slice() else {
        return Err(format!(
            "expected name:balance:rate%:min-payment, got `{value}`"
        ));
    };
    let number = |field: &str, raw: &str| {
        raw.parse::<f64>()
            .map_err(|_| format!("{field} `{raw}` is not a number"))
    };
    let rate = rate.strip_suffix('%').unwrap_or(*rate);
    Ok(DebtAccount {
        id: String::new(),
        name: (*name).to_string(),
        balance: number("balance", *balance)?,
        rate: number("rate", rate)? / 100.0,
        min_payment: number("min-payment", *min_payment)?,
    })
}

fn with_positional_ids(mut debts: Vec<DebtAccount>) -> Vec<DebtAccount> {
    for (i, debt) in debts.iter_mut().enumerate() {
        if debt.id.is_empty() {
            debt.id = format!("debt-{}", i + 1);
        }
    }
    debts
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ScenarioKind {
    Standard,
    Coast,
    Lean,
    Fat,
    Barista,
    Reverse,
    SavingsRate,
    Withdrawal,
    Healthcare,
    Debt,
    DebtTimeline,
    CompareDebt,
    Quiz,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebtPayload {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    balance: f64,
    /// Annual rate in percent.
    rate: f64,
    min_payment: f64,
}

impl From<DebtPayload> for DebtAccount {
    fn from(value: DebtPayload) -> Self {
        DebtAccount {
            id: value.id,
            name: value.name,
            balance: value.balance,
            rate: value.rate / 100.0,
            min_payment: value.min_payment,
        }
    }
}

/// JSON request body. Rates are percentages, as on the command line; any
/// omitted field keeps its command-line default.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RequestPayload {
    scenario: Option<ScenarioKind>,
    start_year: Option<i32>,

    current_age: Option<u32>,
    retirement_age: Option<u32>,
    current_savings: Option<f64>,
    annual_contribution: Option<f64>,
    expected_return: Option<f64>,
    inflation_rate: Option<f64>,
    withdrawal_rate: Option<f64>,
    annual_expenses: Option<f64>,

    part_time_income: Option<f64>,

    annual_income: Option<f64>,
    contribution_amount: Option<f64>,
    contribution_frequency: Option<ContributionFrequency>,
    horizon_years: Option<u32>,

    portfolio_value: Option<f64>,
    retirement_years: Option<u32>,

    early_retirement_age: Option<u32>,
    medicare_age: Option<u32>,
    monthly_premium: Option<f64>,
    annual_deductible: Option<f64>,
    annual_out_of_pocket: Option<f64>,

    debts: Option<Vec<DebtPayload>>,
    strategy: Option<DebtStrategy>,
    monthly_budget: Option<f64>,
    extra_payment: Option<f64>,
    target_months: Option<u32>,

    lifestyle: Option<Lifestyle>,
    work_preference: Option<WorkPreference>,
    primary_goal: Option<PrimaryGoal>,
}

fn scenario_args_from_payload(payload: &RequestPayload) -> ScenarioArgs {
    let mut args = ScenarioArgs::default();
    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = payload.current_savings {
        args.current_savings = v;
    }
    if let Some(v) = payload.annual_contribution {
        args.annual_contribution = v;
    }
    if let Some(v) = payload.expected_return {
        args.expected_return = v;
    }
    if let Some(v) = payload.inflation_rate {
        args.inflation_rate = v;
    }
    if let Some(v) = payload.withdrawal_rate {
        args.withdrawal_rate = v;
    }
    if let Some(v) = payload.annual_expenses {
        args.annual_expenses = v;
    }
    args
}

fn debts_from_payload(payload: &mut RequestPayload) -> Vec<DebtAccount> {
    payload
        .debts
        .take()
        .unwrap_or_default()
        .into_iter()
        .map(DebtAccount::from)
        .collect()
}

fn cli_strategy(strategy: Option<DebtStrategy>) -> CliStrategy {
    match strategy {
        Some(DebtStrategy::Avalanche) => CliStrategy::Avalanche,
        Some(DebtStrategy::Snowball) | None => CliStrategy::Snowball,
    }
}

fn cli_frequency(frequency: ContributionFrequency) -> CliFrequency {
    match frequency {
        ContributionFrequency::Weekly => CliFrequency::Weekly,
        ContributionFrequency::BiWeekly => CliFrequency::BiWeekly,
        ContributionFrequency::Monthly => CliFrequency::Monthly,
        ContributionFrequency::Quarterly => CliFrequency::Quarterly,
        ContributionFrequency::Annually => CliFrequency::Annually,
    }
}

fn cli_lifestyle(lifestyle: Lifestyle) -> CliLifestyle {
    match lifestyle {
        Lifestyle::Minimal => CliLifestyle::Minimal,
        Lifestyle::Moderate => CliLifestyle::Moderate,
        Lifestyle::Comfortable => CliLifestyle::Comfortable,
        Lifestyle::Luxury => CliLifestyle::Luxury,
    }
}

fn cli_work_preference(work: WorkPreference) -> CliWorkPreference {
    match work {
        WorkPreference::QuitCompletely => CliWorkPreference::QuitCompletely,
        WorkPreference::PartTime => CliWorkPreference::PartTime,
        WorkPreference::Flexible => CliWorkPreference::Flexible,
        WorkPreference::Coast => CliWorkPreference::Coast,
    }
}

fn cli_goal(goal: PrimaryGoal) -> CliGoal {
    match goal {
        PrimaryGoal::RetireEarly => CliGoal::RetireEarly,
        PrimaryGoal::FinancialSecurity => CliGoal::FinancialSecurity,
        PrimaryGoal::MaintainLifestyle => CliGoal::MaintainLifestyle,
        PrimaryGoal::Flexibility => CliGoal::Flexibility,
    }
}

fn command_from_payload(mut payload: RequestPayload) -> Result<Command, ApiError> {
    let kind = payload.scenario.ok_or(ApiError::MissingScenario)?;
    let scenario = scenario_args_from_payload(&payload);

    let command = match kind {
        ScenarioKind::Standard => Command::Standard(scenario),
        ScenarioKind::Coast => Command::Coast(scenario),
        ScenarioKind::Lean => Command::Lean(scenario),
        ScenarioKind::Fat => Command::Fat(scenario),
        ScenarioKind::Reverse => Command::Reverse(scenario),
        ScenarioKind::Barista => Command::Barista(BaristaArgs {
            scenario,
            part_time_income: payload
                .part_time_income
                .unwrap_or(DEFAULT_PART_TIME_INCOME),
        }),
        ScenarioKind::SavingsRate => Command::SavingsRate(SavingsRateArgs {
            scenario,
            annual_income: payload.annual_income,
            contribution_amount: payload.contribution_amount,
            frequency: payload
                .contribution_frequency
                .map_or(CliFrequency::Monthly, cli_frequency),
            horizon_years: payload.horizon_years,
        }),
        ScenarioKind::Withdrawal => Command::Withdrawal(WithdrawalArgs {
            portfolio_value: payload.portfolio_value.unwrap_or(DEFAULT_PORTFOLIO_VALUE),
            withdrawal_rate: scenario.withdrawal_rate,
            expected_return: scenario.expected_return,
            inflation_rate: scenario.inflation_rate,
            retirement_years: payload.retirement_years.unwrap_or(DEFAULT_RETIREMENT_YEARS),
        }),
        ScenarioKind::Healthcare => Command::Healthcare(HealthcareArgs {
            current_age: scenario.current_age,
            early_retirement_age: payload
                .early_retirement_age
                .unwrap_or(scenario.retirement_age),
            medicare_age: payload.medicare_age.unwrap_or(DEFAULT_MEDICARE_AGE),
            monthly_premium: payload.monthly_premium.unwrap_or(DEFAULT_MONTHLY_PREMIUM),
            annual_deductible: payload
                .annual_deductible
                .unwrap_or(DEFAULT_ANNUAL_DEDUCTIBLE),
            annual_out_of_pocket: payload
                .annual_out_of_pocket
                .unwrap_or(DEFAULT_ANNUAL_OUT_OF_POCKET),
            inflation_rate: scenario.inflation_rate,
        }),
        ScenarioKind::Debt | ScenarioKind::CompareDebt => {
            let args = DebtArgs {
                debts: debts_from_payload(&mut payload),
                strategy: cli_strategy(payload.strategy),
                budget: payload.monthly_budget.unwrap_or(DEFAULT_MONTHLY_BUDGET),
                extra_payment: payload.extra_payment.unwrap_or(0.0),
            };
            if kind == ScenarioKind::Debt {
                Command::Debt(args)
            } else {
                Command::CompareDebt(args)
            }
        }
        ScenarioKind::DebtTimeline => Command::DebtTimeline(TimelineArgs {
            debts: debts_from_payload(&mut payload),
            strategy: cli_strategy(payload.strategy),
            target_months: payload.target_months.unwrap_or(DEFAULT_TARGET_MONTHS),
            extra_payment: payload.extra_payment.unwrap_or(0.0),
        }),
        // Quiz answers stay unset when omitted; the recommender has its own
        // fallbacks.
        ScenarioKind::Quiz => Command::Quiz(QuizArgs {
            current_age: payload.current_age,
            retirement_age: payload.retirement_age,
            annual_expenses: payload.annual_expenses,
            lifestyle: payload.lifestyle.map(cli_lifestyle),
            work_preference: payload.work_preference.map(cli_work_preference),
            primary_goal: payload.primary_goal.map(cli_goal),
        }),
    };
    Ok(command)
}

fn build_request(command: Command, start_year: i32) -> Result<ScenarioRequest, ApiError> {
    let request = match command {
        Command::Standard(args) => ScenarioRequest::Standard(args.to_inputs(start_year)),
        Command::Coast(args) => ScenarioRequest::Coast(args.to_inputs(start_year)),
        Command::Lean(args) => ScenarioRequest::Lean(args.to_inputs(start_year)),
        Command::Fat(args) => ScenarioRequest::Fat(args.to_inputs(start_year)),
        Command::Reverse(args) => ScenarioRequest::Reverse(args.to_inputs(start_year)),
        Command::Barista(args) => ScenarioRequest::Barista {
            inputs: args.scenario.to_inputs(start_year),
            part_time_income: args.part_time_income,
        },
        Command::SavingsRate(args) => {
            let s = &args.scenario;
            let savings = match args.contribution_amount {
                Some(amount) => SavingsSource::Explicit {
                    amount,
                    frequency: args.frequency.into(),
                },
                None => SavingsSource::IncomeMinusExpenses,
            };
            ScenarioRequest::SavingsRate(SavingsRateParams {
                current_age: s.current_age,
                annual_income: args
                    .annual_income
                    .unwrap_or(s.annual_contribution + s.annual_expenses),
                annual_expenses: s.annual_expenses,
                current_savings: s.current_savings,
                expected_return: s.expected_return / 100.0,
                inflation_rate: s.inflation_rate / 100.0,
                withdrawal_rate: s.withdrawal_rate / 100.0,
                savings,
                horizon_years: args.horizon_years,
                start_year,
            })
        }
        Command::Withdrawal(args) => ScenarioRequest::Withdrawal(WithdrawalParams {
            portfolio_value: args.portfolio_value,
            withdrawal_rate: args.withdrawal_rate / 100.0,
            expected_return: args.expected_return / 100.0,
            inflation_rate: args.inflation_rate / 100.0,
            retirement_years: args.retirement_years,
        }),
        Command::Healthcare(args) => ScenarioRequest::Healthcare(HealthcareParams {
            current_age: args.current_age,
            early_retirement_age: args.early_retirement_age,
            medicare_age: args.medicare_age,
            monthly_premium: args.monthly_premium,
            annual_deductible: args.annual_deductible,
            annual_out_of_pocket: args.annual_out_of_pocket,
            inflation_rate: args.inflation_rate / 100.0,
            start_year,
        }),
        Command::Debt(args) => ScenarioRequest::Debt(debt_plan(args)),
        Command::CompareDebt(args) => ScenarioRequest::CompareDebt(debt_plan(args)),
        Command::DebtTimeline(args) => ScenarioRequest::DebtTimeline(TimelinePlan {
            debts: with_positional_ids(args.debts),
            strategy: args.strategy.into(),
            target_months: args.target_months,
            extra_payment: args.extra_payment,
        }),
        Command::Quiz(args) => ScenarioRequest::Quiz(QuizAnswers {
            current_age: args.current_age,
            retirement_age: args.retirement_age,
            annual_expenses: args.annual_expenses,
            lifestyle: args.lifestyle.map(Into::into),
            work_preference: args.work_preference.map(Into::into),
            primary_goal: args.primary_goal.map(Into::into),
        }),
        Command::Run { request } => {
            let json = read_request(&request)?;
            return request_from_json(&json, start_year);
        }
    };
    Ok(request)
}

fn debt_plan(args: DebtArgs) -> DebtPlan {
    DebtPlan {
        debts: with_positional_ids(args.debts),
        strategy: args.strategy.into(),
        monthly_budget: args.budget,
        extra_payment: args.extra_payment,
    }
}

fn read_request(path: &str) -> Result<String, ApiError> {
    let io_err = |source| ApiError::Io {
        path: path.to_string(),
        source,
    };
    if path == "-" {
        let mut json = String::new();
        io::stdin().read_to_string(&mut json).map_err(io_err)?;
        Ok(json)
    } else {
        fs::read_to_string(path).map_err(io_err)
    }
}

/// Parses a JSON request body into a scenario request. `start_year` is used
/// unless the body names its own.
pub fn request_from_json(json: &str, start_year: i32) -> Result<ScenarioRequest, ApiError> {
    let payload = serde_json::from_str::<RequestPayload>(json)?;
    let start_year = payload.start_year.unwrap_or(start_year);
    let command = command_from_payload(payload)?;
    build_request(command, start_year)
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

pub fn run(cli: Cli) -> Result<String, ApiError> {
    let start_year = cli.start_year.unwrap_or_else(current_year);
    let request = build_request(cli.command, start_year)?;
    info!("running {} scenario", request.name());
    let outcome = run_scenario(&request)?;
    render(&outcome, cli.format)
}

pub fn render(outcome: &ScenarioOutcome, format: OutputFormat) -> Result<String, ApiError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        OutputFormat::Text => Ok(render_text(outcome)),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn format_age(age: f64) -> String {
    if age.is_finite() {
        format!("{age:.1}")
    } else {
        "Never".to_string()
    }
}

fn debt_lines(lines: &mut Vec<String>, result: &DebtPayoffResult) {
    lines.push(format!("Strategy: {:?}", result.strategy));
    lines.push(format!(
        "Monthly payment: {}",
        format_currency(result.monthly_payment)
    ));
    if result.paid_off {
        lines.push(format!("Debt free in: {}", format_months(result.total_months)));
    } else {
        lines.push(format!(
            "Not paid off within {}",
            format_months(result.total_months)
        ));
    }
    lines.push(format!(
        "Total interest: {}",
        format_currency(result.total_interest)
    ));
    lines.push(format!(
        "Total principal: {}",
        format_currency(result.total_principal)
    ));
    for milestone in &result.debt_milestones {
        lines.push(format!(
            "  month {:>3}: {} paid off",
            milestone.month, milestone.debt_name
        ));
    }
}

fn render_text(outcome: &ScenarioOutcome) -> String {
    let mut lines = Vec::new();
    match outcome {
        ScenarioOutcome::Standard(r) => standard_lines(&mut lines, r),
        ScenarioOutcome::Lean(r) => {
            standard_lines(&mut lines, &r.standard);
            lines.push(format!(
                "Lean FIRE (expenses <= {}): {}",
                format_currency(r.lean_threshold),
                yes_no(r.is_lean)
            ));
        }
        ScenarioOutcome::Fat(r) => {
            standard_lines(&mut lines, &r.standard);
            lines.push(format!(
                "Fat FIRE (expenses >= {}): {}",
                format_currency(r.fat_threshold),
                yes_no(r.is_fat)
            ));
        }
        ScenarioOutcome::Coast(r) => {
            lines.push(format!("Coast FIRE number: {}", format_currency(r.coast_number)));
            lines.push(format!("Already coasting: {}", yes_no(r.already_coasting)));
            lines.push(format!("Years to coast: {}", format_years(r.years_to_coast)));
            lines.push(format!("FIRE number: {}", format_currency(r.fire_number)));
        }
        ScenarioOutcome::Barista(r) => {
            lines.push(format!("Barista FIRE number: {}", format_currency(r.barista_number)));
            lines.push(format!("Full FIRE number: {}", format_currency(r.full_fire_number)));
            lines.push(format!(
                "Part-time income: {} (portfolio {} smaller)",
                format_currency(r.part_time_income),
                format_percent(r.portfolio_reduction_percent / 100.0)
            ));
            lines.push(format!(
                "Years to Barista FIRE: {}",
                format_years(r.years_to_barista_fire)
            ));
        }
        ScenarioOutcome::Reverse(r) => {
            lines.push(format!("FIRE number: {}", format_currency(r.fire_number)));
            lines.push(format!("Years to target: {}", r.years_to_fire));
            if r.already_achievable {
                lines.push(format!(
                    "Already on track: current savings grow to {}",
                    format_currency(r.current_will_grow_to)
                ));
            } else {
                lines.push(format!(
                    "Required savings: {} per year ({} per month)",
                    format_currency(r.required_annual_savings),
                    format_currency(r.required_monthly_savings)
                ));
            }
        }
        ScenarioOutcome::SavingsRate(r) => {
            lines.push(format!(
                "Savings rate: {} ({})",
                format_percent(r.savings_rate),
                r.band_label
            ));
            lines.push(format!(
                "Annual savings: {} ({} per month)",
                format_currency(r.annual_savings),
                format_currency(r.monthly_savings)
            ));
            lines.push(format!("FIRE number: {}", format_currency(r.fire_number)));
            lines.push(format!("Years to FIRE: {}", format_years(r.years_to_fire)));
            lines.push(format!(
                "Final portfolio: {} ({} in today's money)",
                format_currency(r.final_nominal_value),
                format_currency(r.final_inflation_adjusted_value)
            ));
        }
        ScenarioOutcome::Withdrawal(r) => {
            lines.push(format!(
                "Initial withdrawal: {} per year ({} per month)",
                format_currency(r.annual_withdrawal),
                format_currency(r.monthly_withdrawal)
            ));
            lines.push(format!("Portfolio lasts: {} years", r.portfolio_longevity));
            lines.push(format!("Success rate: {}", format_percent(r.success_rate)));
            lines.push(format!("Ending balance: {}", format_currency(r.ending_balance)));
            for row in &r.rate_analysis {
                lines.push(format!(
                    "  at {:>5}: {:>2} years, ends at {}",
                    format_percent(row.rate),
                    row.years,
                    format_currency(row.end_balance)
                ));
            }
        }
        ScenarioOutcome::Healthcare(r) => {
            lines.push(format!("Gap years: {}", r.gap_years));
            lines.push(format!("Annual cost today: {}", format_currency(r.annual_cost)));
            lines.push(format!("Total gap cost: {}", format_currency(r.total_cost)));
            lines.push(format!("Average per year: {}", format_currency(r.avg_annual_cost)));
            lines.push(format!(
                "Estimated subsidy at $30k / $50k / $75k income: {} / {} / {}",
                format_currency(r.estimated_subsidy_30k),
                format_currency(r.estimated_subsidy_50k),
                format_currency(r.estimated_subsidy_75k)
            ));
        }
        ScenarioOutcome::Debt(outcome) => {
            debt_lines(&mut lines, &outcome.result);
            if let Some(savings) = &outcome.extra_payment_savings {
                lines.push(format!(
                    "Extra {} per month saves {} months and {} interest",
                    format_currency(savings.extra_payment),
                    savings.months_saved,
                    format_currency(savings.interest_saved)
                ));
            }
        }
        ScenarioOutcome::DebtTimeline(None) => {
            lines.push("No payment within the search range meets the target timeline".to_string());
        }
        ScenarioOutcome::DebtTimeline(Some(solved)) => {
            lines.push(format!(
                "Required payment: {} per month to finish within {}",
                format_currency(solved.required_payment),
                format_months(solved.target_months)
            ));
            if !solved.converged {
                lines.push("Search stopped at the iteration limit; payment is approximate".to_string());
            }
            debt_lines(&mut lines, &solved.result);
        }
        ScenarioOutcome::CompareDebt(c) => {
            lines.push("Snowball".to_string());
            debt_lines(&mut lines, &c.snowball);
            lines.push("Avalanche".to_string());
            debt_lines(&mut lines, &c.avalanche);
            lines.push(format!(
                "Cheaper: {:?} (saves {} and {} months)",
                c.cheaper,
                format_currency(c.interest_difference.abs()),
                c.months_difference.abs()
            ));
        }
        ScenarioOutcome::Quiz(rec) => {
            lines.push(format!("Recommended: {}", rec.title));
            lines.push(rec.reason.to_string());
            lines.push(format!("Try: firecalc {}", rec.calculator.subcommand()));
        }
    }
    lines.join("\n")
}

fn standard_lines(lines: &mut Vec<String>, r: &crate::core::StandardFireResult) {
    lines.push(format!("FIRE number: {}", format_currency(r.fire_number)));
    lines.push(format!("Years to FIRE: {}", format_years(r.years_to_fire)));
    lines.push(format!("FIRE age: {}", format_age(r.fire_age)));
    lines.push(format!(
        "Coast FIRE number: {}",
        format_currency(r.coast_fire_number)
    ));
    lines.push(format!("Savings rate: {}", format_percent(r.savings_rate)));
    lines.push(format!(
        "Monthly contribution: {}",
        format_currency(r.monthly_contribution)
    ));
}
