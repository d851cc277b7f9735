use serde::{Deserialize, Serialize};

use super::types::{FAT_FIRE_THRESHOLD, LEAN_FIRE_THRESHOLD};

const DEFAULT_AGE: u32 = 30;
const DEFAULT_RETIREMENT_AGE: u32 = 65;
const DEFAULT_EXPENSES: f64 = 50_000.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lifestyle {
    Minimal,
    Moderate,
    Comfortable,
    Luxury,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkPreference {
    QuitCompletely,
    PartTime,
    Flexible,
    Coast,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimaryGoal {
    RetireEarly,
    FinancialSecurity,
    MaintainLifestyle,
    Flexibility,
}

/// Quiz answers; anything left out falls back to a typical profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizAnswers {
    pub current_age: Option<u32>,
    pub retirement_age: Option<u32>,
    pub annual_expenses: Option<f64>,
    pub lifestyle: Option<Lifestyle>,
    pub work_preference: Option<WorkPreference>,
    pub primary_goal: Option<PrimaryGoal>,
}

/// Calculator a recommendation points at; the value is the CLI subcommand.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Calculator {
    Standard,
    Coast,
    Lean,
    Fat,
    Barista,
    Reverse,
    SavingsRate,
}

impl Calculator {
    pub fn subcommand(self) -> &'static str {
        match self {
            Calculator::Standard => "standard",
            Calculator::Coast => "coast",
            Calculator::Lean => "lean",
            Calculator::Fat => "fat",
            Calculator::Barista => "barista",
            Calculator::Reverse => "reverse",
            Calculator::SavingsRate => "savings-rate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub calculator: Calculator,
    pub title: &'static str,
    pub reason: &'static str,
}

impl Recommendation {
    fn new(calculator: Calculator, title: &'static str, reason: &'static str) -> Self {
        Self {
            calculator,
            title,
            reason,
        }
    }
}

/// First matching rule wins: Lean, Fat, Barista, Coast, Reverse,
/// Savings Rate, then Standard.
pub fn recommend_path(answers: &QuizAnswers) -> Recommendation {
    let age = answers.current_age.unwrap_or(DEFAULT_AGE);
    let retirement_age = answers.retirement_age.unwrap_or(DEFAULT_RETIREMENT_AGE);
    let years_to_fire = i64::from(retirement_age) - i64::from(age);
    let expenses = answers.annual_expenses.unwrap_or(DEFAULT_EXPENSES);
    let goal = answers.primary_goal;
    let work = answers.work_preference;

    if answers.lifestyle == Some(Lifestyle::Minimal)
        || (expenses < LEAN_FIRE_THRESHOLD && goal == Some(PrimaryGoal::RetireEarly))
    {
        return Recommendation::new(
            Calculator::Lean,
            "Lean FIRE",
            "A frugal lifestyle and low expenses put Lean FIRE within reach",
        );
    }
    if answers.lifestyle == Some(Lifestyle::Luxury)
        || (expenses >= FAT_FIRE_THRESHOLD && goal == Some(PrimaryGoal::MaintainLifestyle))
    {
        return Recommendation::new(
            Calculator::Fat,
            "Fat FIRE",
            "Keeping a comfortable lifestyle without cutbacks calls for Fat FIRE",
        );
    }
    if work == Some(WorkPreference::PartTime)
        || (years_to_fire < 10 && goal == Some(PrimaryGoal::Flexibility))
    {
        return Recommendation::new(
            Calculator::Barista,
            "Barista FIRE",
            "Part-time income lets you leave full-time work on a smaller portfolio",
        );
    }
    if work == Some(WorkPreference::Coast) || (age < 35 && years_to_fire > 20) {
        return Recommendation::new(
            Calculator::Coast,
            "Coast FIRE",
            "A long runway lets compound growth finish the job after early saving",
        );
    }
    if goal == Some(PrimaryGoal::RetireEarly) && years_to_fire < 15 {
        return Recommendation::new(
            Calculator::Reverse,
            "Reverse FIRE",
            "A fixed target date is best planned backwards from the savings it needs",
        );
    }
    if goal == Some(PrimaryGoal::FinancialSecurity) {
        return Recommendation::new(
            Calculator::SavingsRate,
            "Savings Rate Calculator",
            "Your savings rate drives every FIRE timeline",
        );
    }
    Recommendation::new(
        Calculator::Standard,
        "Standard FIRE",
        "The classic 25x-expenses plan suits balanced goals and timelines",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers() -> QuizAnswers {
        QuizAnswers {
            current_age: Some(40),
            retirement_age: Some(60),
            annual_expenses: Some(60_000.0),
            ..QuizAnswers::default()
        }
    }

    #[test]
    fn balanced_profile_gets_standard() {
        assert_eq!(recommend_path(&answers()).calculator, Calculator::Standard);
    }

    #[test]
    fn minimal_lifestyle_wins_over_everything() {
        let a = QuizAnswers {
            lifestyle: Some(Lifestyle::Minimal),
            work_preference: Some(WorkPreference::PartTime),
            primary_goal: Some(PrimaryGoal::FinancialSecurity),
            ..answers()
        };
        assert_eq!(recommend_path(&a).calculator, Calculator::Lean);
    }

    #[test]
    fn low_expenses_only_count_with_early_retirement_goal() {
        let mut a = answers();
        a.annual_expenses = Some(35_000.0);
        assert_eq!(recommend_path(&a).calculator, Calculator::Standard);
        a.primary_goal = Some(PrimaryGoal::RetireEarly);
        assert_eq!(recommend_path(&a).calculator, Calculator::Lean);
    }

    #[test]
    fn high_expenses_with_lifestyle_goal_is_fat() {
        let mut a = answers();
        a.annual_expenses = Some(100_000.0);
        a.primary_goal = Some(PrimaryGoal::MaintainLifestyle);
        assert_eq!(recommend_path(&a).calculator, Calculator::Fat);
        a.primary_goal = None;
        a.lifestyle = Some(Lifestyle::Luxury);
        assert_eq!(recommend_path(&a).calculator, Calculator::Fat);
    }

    #[test]
    fn part_time_or_short_flexible_timeline_is_barista() {
        let mut a = answers();
        a.work_preference = Some(WorkPreference::PartTime);
        assert_eq!(recommend_path(&a).calculator, Calculator::Barista);

        let mut a = answers();
        a.retirement_age = Some(48);
        a.primary_goal = Some(PrimaryGoal::Flexibility);
        assert_eq!(recommend_path(&a).calculator, Calculator::Barista);
    }

    #[test]
    fn young_with_long_runway_is_coast() {
        let a = QuizAnswers::default();
        // Defaults: age 30, retiring at 65.
        assert_eq!(recommend_path(&a).calculator, Calculator::Coast);

        let mut a = answers();
        a.work_preference = Some(WorkPreference::Coast);
        assert_eq!(recommend_path(&a).calculator, Calculator::Coast);
    }

    #[test]
    fn near_term_early_retirement_is_reverse() {
        let mut a = answers();
        a.retirement_age = Some(50);
        a.primary_goal = Some(PrimaryGoal::RetireEarly);
        assert_eq!(recommend_path(&a).calculator, Calculator::Reverse);
    }

    #[test]
    fn security_goal_points_at_savings_rate() {
        let mut a = answers();
        a.primary_goal = Some(PrimaryGoal::FinancialSecurity);
        let rec = recommend_path(&a);
        assert_eq!(rec.calculator, Calculator::SavingsRate);
        assert_eq!(rec.title, "Savings Rate Calculator");
        assert_eq!(rec.calculator.subcommand(), "savings-rate");
        let json = serde_json::to_value(rec).expect("serializable");
        assert_eq!(json["calculator"], "savings-rate");
    }

    #[test]
    fn answers_parse_from_kebab_case_json() {
        let a: QuizAnswers = serde_json::from_str(
            r#"{"currentAge":28,"workPreference":"part-time","primaryGoal":"retire-early"}"#,
        )
        .expect("valid answers");
        assert_eq!(a.current_age, Some(28));
        assert_eq!(a.work_preference, Some(WorkPreference::PartTime));
        assert_eq!(a.retirement_age, None);
    }
}
