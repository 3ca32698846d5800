//! Month-by-month loan amortization with optional prepayments.
//!
//! A level EMI is computed once from the nominal tenure. The simulation then
//! walks the balance forward month by month, adding any fixed extra monthly
//! payment and a one-time lump sum, until the balance reaches zero. All math
//! in `rust_decimal::Decimal`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinBuddyError;
use crate::time_value::{annual_percent_to_monthly_rate, level_payment, monthly_percent_to_rate};
use crate::types::{format_money, round_money, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::FinBuddyResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Balances below this threshold are snapped to zero (fully repaid).
const BALANCE_EPSILON: Decimal = dec!(0.01);

/// Upper bound on simulated months (1,000 years).
pub const MAX_SCHEDULE_MONTHS: u32 = 12_000;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Unit of the `tenure` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenureType {
    #[default]
    Years,
    Months,
}

impl TenureType {
    /// Nominal number of monthly installments for `tenure`, rounded half
    /// away from zero. `None` if the value does not fit a month counter.
    pub fn to_months(self, tenure: Decimal) -> Option<u32> {
        let months = match self {
            TenureType::Years => tenure.checked_mul(dec!(12))?,
            TenureType::Months => tenure,
        };
        months
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
    }
}

/// How the entered interest rate is quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    #[default]
    Annual,
    Monthly,
}

impl RateType {
    /// Effective monthly rate as a decimal fraction.
    pub fn monthly_rate(self, rate: Percent) -> Rate {
        match self {
            RateType::Annual => annual_percent_to_monthly_rate(rate),
            RateType::Monthly => monthly_percent_to_rate(rate),
        }
    }
}

/// Loan parameters for one calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    /// Principal borrowed.
    pub loan_amount: Money,
    /// Interest rate in percent (8.5 = 8.5%), annual or monthly per `rate_type`.
    pub annual_rate: Percent,
    /// Loan duration, in years or months per `tenure_type`.
    pub tenure: Decimal,
    #[serde(default)]
    pub tenure_type: TenureType,
    #[serde(default)]
    pub rate_type: RateType,
    /// Paid on top of the EMI every month.
    #[serde(default)]
    pub extra_monthly: Money,
    /// One-time prepayment applied in `lump_sum_month`.
    #[serde(default)]
    pub lump_sum: Money,
    /// 1-based month of the lump sum. `0` means no lump sum month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lump_sum_month: Option<u32>,
}

impl LoanInput {
    /// A plain loan quoted with an annual rate and a tenure in years.
    pub fn new(loan_amount: Money, annual_rate: Percent, tenure_years: Decimal) -> Self {
        LoanInput {
            loan_amount,
            annual_rate,
            tenure: tenure_years,
            ..LoanInput::default()
        }
    }

    pub fn monthly_rate(&self) -> Rate {
        self.rate_type.monthly_rate(self.annual_rate)
    }

    pub fn nominal_months(&self) -> Option<u32> {
        self.tenure_type.to_months(self.tenure)
    }

    pub fn effective_lump_sum_month(&self) -> Option<u32> {
        self.lump_sum_month.filter(|m| *m > 0)
    }

    /// True when extra monthly or a lump-sum month is configured, which
    /// lets the schedule run past (or finish before) the nominal tenure.
    pub fn has_acceleration(&self) -> bool {
        self.extra_monthly > Decimal::ZERO || self.effective_lump_sum_month().is_some()
    }

    /// Same loan with every prepayment stripped.
    pub fn without_acceleration(&self) -> LoanInput {
        LoanInput {
            extra_monthly: Decimal::ZERO,
            lump_sum: Decimal::ZERO,
            lump_sum_month: None,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One month of the schedule. Values are kept at full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: u32,
    pub interest: Money,
    /// Principal part of the EMI, before any extra payment.
    pub base_principal: Money,
    /// Extra monthly plus lump sum, after the overpayment guard.
    pub extra_payment: Money,
    /// Total principal reduction: `base_principal + extra_payment`.
    pub principal: Money,
    pub total_payment: Money,
    pub balance: Money,
}

/// Aggregate result of an amortization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    pub principal: Money,
    pub monthly_rate: Rate,
    pub nominal_months: u32,
    pub emi: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub months_taken: u32,
    pub schedule: Vec<ScheduleRow>,
}

impl LoanResult {
    pub fn final_balance(&self) -> Money {
        self.schedule
            .last()
            .map(|row| row.balance)
            .unwrap_or(self.principal)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Run the amortization simulation.
///
/// Returns `None` when the loan is not ready to compute: non-positive amount
/// or tenure, negative rate, or a tenure that rounds to zero months. A zero
/// rate is valid and produces a straight-line schedule. Loans whose amounts
/// leave the Decimal range also yield `None`; use [`try_compute`] to tell
/// the two apart.
pub fn compute(input: &LoanInput) -> Option<LoanResult> {
    try_compute(input).ok().flatten()
}

/// Same as [`compute`], but reports arithmetic overflow as an error instead
/// of folding it into "not ready".
pub fn try_compute(input: &LoanInput) -> FinBuddyResult<Option<LoanResult>> {
    if input.loan_amount <= Decimal::ZERO
        || input.tenure <= Decimal::ZERO
        || input.annual_rate < Decimal::ZERO
    {
        return Ok(None);
    }

    let Some(months) = input.nominal_months().filter(|m| *m > 0) else {
        return Ok(None);
    };
    let rate = input.monthly_rate();
    let emi = level_payment(input.loan_amount, rate, months).ok_or_else(|| overflow("EMI"))?;

    let extra_monthly = input.extra_monthly.max(Decimal::ZERO);
    let lump_sum = input.lump_sum.max(Decimal::ZERO);
    let lump_sum_month = input.effective_lump_sum_month();
    let accelerated = input.has_acceleration();

    let mut balance = input.loan_amount;
    let mut schedule = Vec::with_capacity(months.min(MAX_SCHEDULE_MONTHS) as usize);
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut month: u32 = 0;

    while balance > Decimal::ZERO && month < MAX_SCHEDULE_MONTHS {
        month += 1;

        let interest = balance.checked_mul(rate).ok_or_else(|| overflow("interest"))?;
        let mut base_principal = emi
            .checked_sub(interest)
            .ok_or_else(|| overflow("scheduled principal"))?;

        let mut extra = extra_monthly;
        if lump_sum_month == Some(month) {
            extra = extra
                .checked_add(lump_sum)
                .ok_or_else(|| overflow("extra payment"))?;
        }

        // Overpayment guard: drain the extra before the scheduled principal.
        let planned = base_principal
            .checked_add(extra)
            .ok_or_else(|| overflow("planned principal"))?;
        if planned > balance {
            let excess = planned - balance;
            if extra >= excess {
                extra -= excess;
            } else {
                base_principal -= excess - extra;
                extra = Decimal::ZERO;
            }
        }

        let principal = base_principal + extra;
        let total_payment = principal
            .checked_add(interest)
            .ok_or_else(|| overflow("monthly payment"))?;
        balance = balance
            .checked_sub(principal)
            .ok_or_else(|| overflow("balance"))?;
        if balance < BALANCE_EPSILON {
            balance = Decimal::ZERO;
        }

        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(|| overflow("total interest"))?;
        total_paid = total_paid
            .checked_add(total_payment)
            .ok_or_else(|| overflow("total payment"))?;

        schedule.push(ScheduleRow {
            month,
            interest,
            base_principal,
            extra_payment: extra,
            principal,
            total_payment,
            balance,
        });

        if balance.is_zero() {
            break;
        }
        if month >= months && !accelerated {
            break;
        }
    }

    Ok(Some(LoanResult {
        principal: input.loan_amount,
        monthly_rate: rate,
        nominal_months: months,
        emi: round_money(emi),
        total_interest: round_money(total_interest),
        total_payment: round_money(total_paid),
        months_taken: month,
        schedule,
    }))
}

fn overflow(what: &str) -> FinBuddyError {
    FinBuddyError::FinancialImpossibility(format!(
        "{what} exceeds the representable decimal range"
    ))
}

/// Field checks applied before any checked computation.
pub fn validate_loan_input(input: &LoanInput) -> FinBuddyResult<()> {
    if input.loan_amount <= Decimal::ZERO {
        return Err(FinBuddyError::InvalidInput {
            field: "loan_amount".into(),
            reason: "Loan amount must be positive".into(),
        });
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(FinBuddyError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    if input.tenure <= Decimal::ZERO {
        return Err(FinBuddyError::InvalidInput {
            field: "tenure".into(),
            reason: "Tenure must be positive".into(),
        });
    }
    match input.nominal_months() {
        Some(0) => {
            return Err(FinBuddyError::InvalidInput {
                field: "tenure".into(),
                reason: "Tenure rounds to zero months".into(),
            })
        }
        None => {
            return Err(FinBuddyError::InvalidInput {
                field: "tenure".into(),
                reason: "Tenure is too large".into(),
            })
        }
        Some(_) => {}
    }
    if input.extra_monthly < Decimal::ZERO {
        return Err(FinBuddyError::InvalidInput {
            field: "extra_monthly".into(),
            reason: "Extra monthly payment cannot be negative".into(),
        });
    }
    if input.lump_sum < Decimal::ZERO {
        return Err(FinBuddyError::InvalidInput {
            field: "lump_sum".into(),
            reason: "Lump sum cannot be negative".into(),
        });
    }
    Ok(())
}

/// Build the amortization schedule for a loan, with validation, warnings
/// and the standard metadata envelope.
pub fn build_amortization_schedule(
    input: &LoanInput,
) -> FinBuddyResult<ComputationOutput<LoanResult>> {
    let start = Instant::now();
    validate_loan_input(input)?;

    let result = try_compute(input)?.ok_or_else(|| {
        FinBuddyError::InsufficientData("loan amount, rate and tenure are required".into())
    })?;
    let warnings = schedule_warnings(input, &result);

    let methodology = if input.has_acceleration() {
        "Level EMI Amortization with Prepayments"
    } else {
        "Level EMI Amortization"
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, result))
}

fn schedule_warnings(input: &LoanInput, result: &LoanResult) -> Vec<String> {
    let mut warnings = Vec::new();

    if input.lump_sum > Decimal::ZERO {
        match input.effective_lump_sum_month() {
            None => warnings.push(format!(
                "Lump sum of {} supplied without lump_sum_month; ignored",
                format_money(input.lump_sum)
            )),
            Some(m) if m > result.months_taken => warnings.push(format!(
                "Lump sum month {m} falls after payoff in month {}; lump sum not applied",
                result.months_taken
            )),
            Some(_) => {}
        }
    }

    if input.has_acceleration() && result.months_taken < result.nominal_months {
        warnings.push(format!(
            "Prepayments shorten the loan by {} months ({} instead of {})",
            result.nominal_months - result.months_taken,
            result.months_taken,
            result.nominal_months
        ));
    }

    let outstanding = result.final_balance();
    if result.months_taken >= MAX_SCHEDULE_MONTHS && outstanding > Decimal::ZERO {
        warnings.push(format!(
            "Schedule stopped at the {MAX_SCHEDULE_MONTHS}-month limit with {} outstanding",
            format_money(outstanding)
        ));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
