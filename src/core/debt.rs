use log::warn;
use serde::{Deserialize, Serialize};

use super::timevalue::round_whole;
use super::types::{InputError, require_non_negative, require_positive, require_rate};

/// Hard stop for a simulation whose payments never clear the balances.
pub const MAX_PAYOFF_MONTHS: u32 = 600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtAccount {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub balance: f64,
    pub rate: f64,
    pub min_payment: f64,
}

impl DebtAccount {
    pub fn validate(&self) -> Result<(), InputError> {
        require_non_negative(self.balance, "debt-balance")?;
        if self.balance == 0.0 {
            return Err(InputError::EmptyDebt {
                name: self.label().to_string(),
            });
        }
        require_rate(self.rate, "debt-rate")?;
        require_non_negative(self.min_payment, "debt-min-payment")?;
        Ok(())
    }

    /// Name for display, falling back to the id when unnamed.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

pub fn validate_debts(debts: &[DebtAccount]) -> Result<(), InputError> {
    if debts.is_empty() {
        return Err(InputError::NoDebts);
    }
    debts.iter().try_for_each(DebtAccount::validate)
}

pub fn validate_budget(debts: &[DebtAccount], monthly_budget: f64) -> Result<(), InputError> {
    require_positive(monthly_budget, "budget")?;
    let minimums = total_minimum_payment(debts);
    if monthly_budget < minimums {
        return Err(InputError::BudgetBelowMinimums {
            budget: monthly_budget,
            minimums,
        });
    }
    Ok(())
}

pub fn total_minimum_payment(debts: &[DebtAccount]) -> f64 {
    debts.iter().map(|debt| debt.min_payment).sum()
}

pub fn total_balance(debts: &[DebtAccount]) -> f64 {
    debts.iter().map(|debt| debt.balance).sum()
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtStrategy {
    Snowball,
    Avalanche,
}

impl DebtStrategy {
    /// Stable sort: ties keep their input order.
    pub fn order(self, debts: &[DebtAccount]) -> Vec<DebtAccount> {
        let mut sorted = debts.to_vec();
        match self {
            DebtStrategy::Snowball => sorted.sort_by(|a, b| a.balance.total_cmp(&b.balance)),
            DebtStrategy::Avalanche => sorted.sort_by(|a, b| b.rate.total_cmp(&a.rate)),
        }
        sorted
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingDebt {
    pub name: String,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayoffMonth {
    pub month: u32,
    pub total_balance: f64,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub cumulative_principal: f64,
    pub cumulative_interest: f64,
    pub debts_paid_off: Vec<String>,
    pub debts_remaining: Vec<RemainingDebt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtMilestone {
    pub month: u32,
    pub debt_id: String,
    pub debt_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayoffResult {
    pub strategy: DebtStrategy,
    pub total_months: u32,
    pub total_interest: f64,
    pub total_principal: f64,
    pub monthly_payment: f64,
    pub projections: Vec<DebtPayoffMonth>,
    pub payoff_order: Vec<String>,
    pub debt_milestones: Vec<DebtMilestone>,
    /// False when the month cap ended the run with balances outstanding.
    pub paid_off: bool,
}

#[derive(Debug, Clone)]
struct AccountState {
    debt: DebtAccount,
    current_balance: f64,
}

impl AccountState {
    fn is_active(&self) -> bool {
        self.current_balance > 0.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Payoff {
    month: u32,
    slot: usize,
}

/// Balances of every account in payment-priority order, plus running totals.
#[derive(Debug, Clone)]
pub struct LedgerState {
    month: u32,
    accounts: Vec<AccountState>,
    cumulative_principal: f64,
    cumulative_interest: f64,
    payoffs: Vec<Payoff>,
}

impl LedgerState {
    /// `ordered` must already be in payment-priority order.
    pub fn new(ordered: Vec<DebtAccount>) -> Self {
        let accounts = ordered
            .into_iter()
            .map(|debt| AccountState {
                current_balance: debt.balance,
                debt,
            })
            .collect();
        Self {
            month: 0,
            accounts,
            cumulative_principal: 0.0,
            cumulative_interest: 0.0,
            payoffs: Vec::new(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn total_balance(&self) -> f64 {
        self.accounts.iter().map(|a| a.current_balance).sum()
    }

    pub fn has_open_balance(&self) -> bool {
        self.accounts.iter().any(AccountState::is_active)
    }

    pub fn cumulative_interest(&self) -> f64 {
        self.cumulative_interest
    }

    pub fn cumulative_principal(&self) -> f64 {
        self.cumulative_principal
    }

    fn clear(&mut self, slot: usize, cleared: &mut Vec<String>) {
        let account = &mut self.accounts[slot];
        account.current_balance = 0.0;
        cleared.push(account.debt.name.clone());
        self.payoffs.push(Payoff {
            month: self.month,
            slot,
        });
    }
}

/// Advances the ledger by one month.
///
/// Every open account first receives its minimum payment (capped at payoff
/// amount); whatever budget is left goes entirely to the first open account
/// in priority order. Interest accrues once per account per month.
pub fn step_month(mut state: LedgerState, monthly_budget: f64) -> (LedgerState, DebtPayoffMonth) {
    state.month += 1;
    let mut budget = monthly_budget;
    let mut month_principal = 0.0;
    let mut month_interest = 0.0;
    let mut cleared = Vec::new();

    for slot in 0..state.accounts.len() {
        let account = &mut state.accounts[slot];
        if !account.is_active() {
            continue;
        }
        let interest = account.current_balance * account.debt.rate / 12.0;
        let payoff_amount = account.current_balance + interest;
        let payment = account.debt.min_payment.min(payoff_amount);
        let principal = if payment >= payoff_amount {
            account.current_balance
        } else {
            (payment - interest).max(0.0)
        };

        account.current_balance -= principal;
        budget -= payment;
        month_principal += principal;
        month_interest += interest;

        if !account.is_active() {
            state.clear(slot, &mut cleared);
        }
    }

    if budget > 0.0 {
        if let Some(slot) = state.accounts.iter().position(AccountState::is_active) {
            let account = &mut state.accounts[slot];
            let principal = budget.min(account.current_balance);
            account.current_balance -= principal;
            month_principal += principal;
            if !account.is_active() {
                state.clear(slot, &mut cleared);
            }
        }
    }

    state.cumulative_principal += month_principal;
    state.cumulative_interest += month_interest;

    let record = DebtPayoffMonth {
        month: state.month,
        total_balance: round_whole(state.total_balance()),
        principal_paid: round_whole(month_principal),
        interest_paid: round_whole(month_interest),
        cumulative_principal: round_whole(state.cumulative_principal),
        cumulative_interest: round_whole(state.cumulative_interest),
        debts_paid_off: cleared,
        debts_remaining: state
            .accounts
            .iter()
            .filter(|a| a.is_active())
            .map(|a| RemainingDebt {
                name: a.debt.name.clone(),
                balance: round_whole(a.current_balance),
            })
            .collect(),
    };
    (state, record)
}

/// Runs the month-by-month simulation until every balance is cleared or
/// [`MAX_PAYOFF_MONTHS`] is reached.
///
/// `monthly_budget` is assumed to cover the minimum payments; callers check
/// that with [`validate_budget`].
pub fn calculate_debt_payoff(
    debts: &[DebtAccount],
    strategy: DebtStrategy,
    monthly_budget: f64,
    extra_payment: f64,
) -> DebtPayoffResult {
    let available = monthly_budget + extra_payment;
    let mut state = LedgerState::new(strategy.order(debts));
    let mut projections = Vec::new();

    while state.has_open_balance() && state.month() < MAX_PAYOFF_MONTHS {
        let (next, record) = step_month(state, available);
        state = next;
        projections.push(record);
        if state.total_balance() <= 0.0 {
            break;
        }
    }

    let paid_off = !state.has_open_balance();
    if !paid_off {
        warn!(
            "{strategy:?} payoff stopped at {MAX_PAYOFF_MONTHS} months with {:.2} outstanding",
            state.total_balance()
        );
    }

    let payoff_order = state
        .payoffs
        .iter()
        .map(|p| state.accounts[p.slot].debt.name.clone())
        .collect();
    let debt_milestones = state
        .payoffs
        .iter()
        .map(|p| {
            let debt = &state.accounts[p.slot].debt;
            DebtMilestone {
                month: p.month,
                debt_id: debt.id.clone(),
                debt_name: debt.name.clone(),
            }
        })
        .collect();

    DebtPayoffResult {
        strategy,
        total_months: state.month(),
        total_interest: round_whole(state.cumulative_interest()),
        total_principal: round_whole(total_balance(debts)),
        monthly_payment: available,
        projections,
        payoff_order,
        debt_milestones,
        paid_off,
    }
}

pub fn calculate_snowball_payoff(
    debts: &[DebtAccount],
    monthly_budget: f64,
    extra_payment: f64,
) -> DebtPayoffResult {
    calculate_debt_payoff(debts, DebtStrategy::Snowball, monthly_budget, extra_payment)
}

pub fn calculate_avalanche_payoff(
    debts: &[DebtAccount],
    monthly_budget: f64,
    extra_payment: f64,
) -> DebtPayoffResult {
    calculate_debt_payoff(debts, DebtStrategy::Avalanche, monthly_budget, extra_payment)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub snowball: DebtPayoffResult,
    pub avalanche: DebtPayoffResult,
    /// Snowball interest minus Avalanche interest.
    pub interest_difference: f64,
    /// Snowball months minus Avalanche months.
    pub months_difference: i64,
    /// Cheaper strategy; Snowball on a tie.
    pub cheaper: DebtStrategy,
}

pub fn compare_strategies(
    debts: &[DebtAccount],
    monthly_budget: f64,
    extra_payment: f64,
) -> StrategyComparison {
    let snowball = calculate_snowball_payoff(debts, monthly_budget, extra_payment);
    let avalanche = calculate_avalanche_payoff(debts, monthly_budget, extra_payment);
    let interest_difference = snowball.total_interest - avalanche.total_interest;
    let months_difference = i64::from(snowball.total_months) - i64::from(avalanche.total_months);
    let cheaper = if avalanche.total_interest < snowball.total_interest {
        DebtStrategy::Avalanche
    } else {
        DebtStrategy::Snowball
    };
    StrategyComparison {
        snowball,
        avalanche,
        interest_difference,
        months_difference,
        cheaper,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraPaymentSavings {
    pub extra_payment: f64,
    pub base_months: u32,
    pub months_with_extra: u32,
    pub months_saved: i64,
    pub interest_saved: f64,
}

/// What a recurring extra payment buys over the plain budget, or `None` when
/// there is no extra payment.
pub fn extra_payment_savings(
    debts: &[DebtAccount],
    strategy: DebtStrategy,
    monthly_budget: f64,
    extra_payment: f64,
) -> Option<ExtraPaymentSavings> {
    if extra_payment <= 0.0 {
        return None;
    }
    let base = calculate_debt_payoff(debts, strategy, monthly_budget, 0.0);
    let with_extra = calculate_debt_payoff(debts, strategy, monthly_budget, extra_payment);
    Some(ExtraPaymentSavings {
        extra_payment,
        base_months: base.total_months,
        months_with_extra: with_extra.total_months,
        months_saved: i64::from(base.total_months) - i64::from(with_extra.total_months),
        interest_saved: base.total_interest - with_extra.total_interest,
    })
}
