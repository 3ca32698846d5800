//! Side-by-side loan comparison and prepayment savings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinBuddyError;
use crate::loan::amortization::{try_compute, validate_loan_input, LoanInput, LoanResult};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::FinBuddyResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanComparisonInput {
    pub primary: LoanInput,
    /// Always evaluated as a plain schedule; prepayments are dropped.
    pub comparison: LoanInput,
}

/// Which of two loans costs less over its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheaperLoan {
    Primary,
    Comparison,
    Equal,
}

/// Deltas are `comparison − primary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanComparisonOutput {
    pub primary: LoanResult,
    pub comparison: LoanResult,
    pub emi_difference: Money,
    pub total_interest_difference: Money,
    pub total_payment_difference: Money,
    pub months_difference: i64,
    pub cheaper: CheaperLoan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOptionsOutput {
    pub results: Vec<LoanResult>,
    /// Index into `results` of the lowest total payment (first on ties).
    pub cheapest_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentSavings {
    pub with_prepayments: LoanResult,
    pub without_prepayments: LoanResult,
    pub interest_saved: Money,
    pub months_saved: i64,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare a loan against a plain alternative.
pub fn compare_loans(
    input: &LoanComparisonInput,
) -> FinBuddyResult<ComputationOutput<LoanComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan_input(&input.primary)?;
    validate_loan_input(&input.comparison).map_err(|e| match e {
        FinBuddyError::InvalidInput { field, reason } => FinBuddyError::InvalidInput {
            field: format!("comparison.{field}"),
            reason,
        },
        other => other,
    })?;

    if input.comparison.extra_monthly > Decimal::ZERO
        || input.comparison.lump_sum > Decimal::ZERO
        || input.comparison.effective_lump_sum_month().is_some()
    {
        warnings.push("Comparison loan prepayments ignored; comparisons use plain schedules".into());
    }

    let primary = run(&input.primary, "primary")?;
    let comparison = run(&input.comparison.without_acceleration(), "comparison")?;

    let total_payment_difference = comparison.total_payment - primary.total_payment;
    let cheaper = if total_payment_difference > Decimal::ZERO {
        CheaperLoan::Primary
    } else if total_payment_difference < Decimal::ZERO {
        CheaperLoan::Comparison
    } else {
        CheaperLoan::Equal
    };

    let output = LoanComparisonOutput {
        emi_difference: comparison.emi - primary.emi,
        total_interest_difference: comparison.total_interest - primary.total_interest,
        total_payment_difference,
        months_difference: i64::from(comparison.months_taken) - i64::from(primary.months_taken),
        cheaper,
        primary,
        comparison,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan Comparison (plain schedule for comparison loan)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Evaluate several loan configurations as given, prepayments included.
pub fn compare_loan_options(
    options: &[LoanInput],
) -> FinBuddyResult<ComputationOutput<LoanOptionsOutput>> {
    let start = Instant::now();

    if options.is_empty() {
        return Err(FinBuddyError::InsufficientData(
            "At least one loan option is required".into(),
        ));
    }

    let mut results = Vec::with_capacity(options.len());
    for (i, option) in options.iter().enumerate() {
        validate_loan_input(option).map_err(|e| match e {
            FinBuddyError::InvalidInput { field, reason } => FinBuddyError::InvalidInput {
                field: format!("options[{i}].{field}"),
                reason,
            },
            other => other,
        })?;
        results.push(run(option, "option")?);
    }

    let mut cheapest_index = 0;
    for (i, r) in results.iter().enumerate() {
        if r.total_payment < results[cheapest_index].total_payment {
            cheapest_index = i;
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan Options Comparison",
        &options,
        Vec::new(),
        elapsed,
        LoanOptionsOutput {
            results,
            cheapest_index,
        },
    ))
}

/// Interest and time saved by the loan's prepayments versus its plain
/// schedule.
pub fn prepayment_savings(input: &LoanInput) -> FinBuddyResult<ComputationOutput<PrepaymentSavings>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan_input(input)?;
    if !input.has_acceleration() {
        warnings.push("No extra monthly payment or lump sum configured; savings are zero".into());
    }

    let with_prepayments = run(input, "loan")?;
    let without_prepayments = run(&input.without_acceleration(), "loan")?;

    let output = PrepaymentSavings {
        interest_saved: without_prepayments.total_interest - with_prepayments.total_interest,
        months_saved: i64::from(without_prepayments.months_taken)
            - i64::from(with_prepayments.months_taken),
        with_prepayments,
        without_prepayments,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Prepayment Savings vs Plain Schedule",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn run(input: &LoanInput, label: &str) -> FinBuddyResult<LoanResult> {
    try_compute(input)?.ok_or_else(|| {
        FinBuddyError::InsufficientData(format!("{label} loan could not be computed"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn home_loan() -> LoanInput {
        LoanInput::new(dec!(500000), dec!(8.5), dec!(20))
    }

    #[test]
    fn test_comparison_forces_plain_schedule() {
        let mut comparison = LoanInput::new(dec!(500000), dec!(8.5), dec!(20));
        comparison.extra_monthly = dec!(2000);

        let out = compare_loans(&LoanComparisonInput {
            primary: home_loan(),
            comparison,
        })
        .unwrap();

        assert_eq!(out.result.comparison.months_taken, 240);
        assert_eq!(out.result.total_payment_difference, Decimal::ZERO);
        assert_eq!(out.result.cheaper, CheaperLoan::Equal);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_comparison_lump_sum_month_zero_is_not_a_prepayment() {
        let comparison = LoanInput {
            lump_sum_month: Some(0),
            ..LoanInput::new(dec!(500000), dec!(8.5), dec!(15))
        };

        let out = compare_loans(&LoanComparisonInput {
            primary: home_loan(),
            comparison,
        })
        .unwrap();

        assert!(out.warnings.is_empty(), "warnings: {:?}", out.warnings);
        assert_eq!(out.result.comparison.months_taken, 180);
    }

    #[test]
    fn test_shorter_tenure_is_cheaper() {
        let out = compare_loans(&LoanComparisonInput {
            primary: home_loan(),
            comparison: LoanInput::new(dec!(500000), dec!(8.5), dec!(10)),
        })
        .unwrap();

        let r = &out.result;
        assert_eq!(r.months_difference, -120);
        assert!(r.emi_difference > Decimal::ZERO);
        assert!(r.total_interest_difference < Decimal::ZERO);
        assert_eq!(r.cheaper, CheaperLoan::Comparison);
    }

    #[test]
    fn test_invalid_comparison_field_is_prefixed() {
        let err = compare_loans(&LoanComparisonInput {
            primary: home_loan(),
            comparison: LoanInput::new(Decimal::ZERO, dec!(8.5), dec!(10)),
        })
        .unwrap_err();
        assert!(matches!(err, FinBuddyError::InvalidInput { ref field, .. } if field == "comparison.loan_amount"));
    }

    #[test]
    fn test_options_pick_cheapest() {
        let mut prepaid = home_loan();
        prepaid.extra_monthly = dec!(2000);
        let options = vec![home_loan(), prepaid, LoanInput::new(dec!(500000), dec!(9.5), dec!(20))];

        let out = compare_loan_options(&options).unwrap();
        assert_eq!(out.result.results.len(), 3);
        assert_eq!(out.result.cheapest_index, 1);
        assert!(out.result.results[1].months_taken < 240);
    }

    #[test]
    fn test_options_require_at_least_one() {
        assert!(compare_loan_options(&[]).is_err());
    }

    #[test]
    fn test_prepayment_savings() {
        let mut input = home_loan();
        input.extra_monthly = dec!(2000);
        let out = prepayment_savings(&input).unwrap();
        assert!(out.result.interest_saved > Decimal::ZERO);
        assert!(out.result.months_saved > 0);
        assert_eq!(out.result.without_prepayments.months_taken, 240);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_prepayment_savings_plain_loan_is_zero() {
        let out = prepayment_savings(&home_loan()).unwrap();
        assert_eq!(out.result.interest_saved, Decimal::ZERO);
        assert_eq!(out.result.months_saved, 0);
        assert_eq!(out.warnings.len(), 1);
    }
}
