//! Validation of raw loan-form entries.
//!
//! Form fields arrive as the strings the user typed. Every failing field is
//! reported together so the caller can show each message inline; the
//! engine is only invoked once the whole form is clean.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FinBuddyError};
use crate::loan::amortization::{try_compute, LoanInput, LoanResult, RateType, TenureType};
use crate::types::Money;
use crate::FinBuddyResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Loan calculator form as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanForm {
    #[serde(default)]
    pub loan_amount: String,
    #[serde(default)]
    pub interest_rate: String,
    #[serde(default)]
    pub tenure: String,
    #[serde(default)]
    pub tenure_type: TenureType,
    #[serde(default)]
    pub rate_type: RateType,
    #[serde(default)]
    pub extra_monthly: String,
    #[serde(default)]
    pub lump_sum: String,
    #[serde(default)]
    pub lump_sum_month: String,
    /// Present when comparison with a second loan is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonForm>,
}

/// Second loan on the form. Its rate type follows the primary loan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonForm {
    #[serde(default)]
    pub loan_amount: String,
    #[serde(default)]
    pub interest_rate: String,
    #[serde(default)]
    pub tenure: String,
    #[serde(default)]
    pub tenure_type: TenureType,
}

/// Engine inputs built from a clean form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedForm {
    pub primary: LoanInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<LoanInput>,
}

/// Result of pressing "Calculate": replaces any previous calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calculation {
    pub result: LoanResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<LoanResult>,
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<Decimal>().ok()
}

fn required_positive(
    raw: &str,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Decimal> {
    match parse_decimal(raw) {
        Some(v) if v > Decimal::ZERO => Some(v),
        _ => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

fn required_non_negative(
    raw: &str,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Decimal> {
    match parse_decimal(raw) {
        Some(v) if v >= Decimal::ZERO => Some(v),
        _ => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

/// Blank means zero.
fn optional_amount(
    raw: &str,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Money> {
    if raw.trim().is_empty() {
        return Some(Decimal::ZERO);
    }
    required_non_negative(raw, field, message, errors)
}

/// Blank means no lump-sum month.
fn optional_month(raw: &str, errors: &mut Vec<FieldError>) -> Option<Option<u32>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(None);
    }
    match trimmed.parse::<u32>() {
        Ok(m) if m > 0 => Some(Some(m)),
        _ => {
            errors.push(FieldError::new(
                "lump_sum_month",
                "Enter a valid lump sum month",
            ));
            None
        }
    }
}

/// Tenure must also survive rounding to a whole number of months.
fn tenure_months(
    raw: &str,
    tenure_type: TenureType,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Decimal> {
    let tenure = required_positive(raw, field, message, errors)?;
    match tenure_type.to_months(tenure) {
        Some(m) if m > 0 => Some(tenure),
        _ => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate the whole form, collecting every failing field.
pub fn validate_form(form: &LoanForm) -> Result<ValidatedForm, Vec<FieldError>> {
    let mut errors = Vec::new();

    let loan_amount = required_positive(
        &form.loan_amount,
        "loan_amount",
        "Enter a valid loan amount",
        &mut errors,
    );
    let rate = required_non_negative(
        &form.interest_rate,
        "interest_rate",
        "Enter a valid interest rate",
        &mut errors,
    );
    let tenure = tenure_months(
        &form.tenure,
        form.tenure_type,
        "tenure",
        "Enter a valid tenure",
        &mut errors,
    );
    let extra_monthly = optional_amount(
        &form.extra_monthly,
        "extra_monthly",
        "Enter a valid extra monthly payment",
        &mut errors,
    );
    let lump_sum = optional_amount(
        &form.lump_sum,
        "lump_sum",
        "Enter a valid lump sum amount",
        &mut errors,
    );
    let lump_sum_month = optional_month(&form.lump_sum_month, &mut errors);

    let comparison = form.comparison.as_ref().map(|comp| {
        let amount = required_positive(
            &comp.loan_amount,
            "comp_loan_amount",
            "Enter a valid comparison loan amount",
            &mut errors,
        );
        let rate = required_non_negative(
            &comp.interest_rate,
            "comp_interest_rate",
            "Enter a valid comparison interest rate",
            &mut errors,
        );
        let tenure = tenure_months(
            &comp.tenure,
            comp.tenure_type,
            "comp_tenure",
            "Enter a valid comparison tenure",
            &mut errors,
        );
        (amount, rate, tenure, comp.tenure_type)
    });

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every Option below is Some once the error list is empty.
    let primary = match (loan_amount, rate, tenure, extra_monthly, lump_sum, lump_sum_month) {
        (Some(loan_amount), Some(annual_rate), Some(tenure), Some(extra), Some(lump), Some(month)) => {
            LoanInput {
                loan_amount,
                annual_rate,
                tenure,
                tenure_type: form.tenure_type,
                rate_type: form.rate_type,
                extra_monthly: extra,
                lump_sum: lump,
                lump_sum_month: month,
            }
        }
        _ => return Err(vec![FieldError::new("form", "Incomplete loan details")]),
    };

    let comparison = match comparison {
        None => None,
        Some((Some(loan_amount), Some(annual_rate), Some(tenure), tenure_type)) => {
            Some(LoanInput {
                loan_amount,
                annual_rate,
                tenure,
                tenure_type,
                rate_type: form.rate_type,
                ..LoanInput::default()
            })
        }
        Some(_) => {
            return Err(vec![FieldError::new(
                "comparison",
                "Incomplete comparison loan details",
            )])
        }
    };

    Ok(ValidatedForm {
        primary,
        comparison,
    })
}

/// Validate the form and run the engine for the primary loan and, when
/// enabled, the comparison loan.
pub fn calculate_from_form(form: &LoanForm) -> FinBuddyResult<Calculation> {
    let validated = validate_form(form).map_err(FinBuddyError::ValidationFailed)?;

    let result = try_compute(&validated.primary)?.ok_or_else(|| {
        FinBuddyError::InsufficientData("primary loan could not be computed".into())
    })?;
    let comparison = match &validated.comparison {
        Some(input) => Some(try_compute(input)?.ok_or_else(|| {
            FinBuddyError::InsufficientData("comparison loan could not be computed".into())
        })?),
        None => None,
    };

    Ok(Calculation { result, comparison })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn filled_form() -> LoanForm {
        LoanForm {
            loan_amount: "500000".into(),
            interest_rate: "8.5".into(),
            tenure: "20".into(),
            ..LoanForm::default()
        }
    }

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_clean_form_builds_input() {
        let validated = validate_form(&filled_form()).unwrap();
        assert_eq!(validated.primary.loan_amount, dec!(500000));
        assert_eq!(validated.primary.annual_rate, dec!(8.5));
        assert_eq!(validated.primary.tenure, dec!(20));
        assert_eq!(validated.primary.extra_monthly, Decimal::ZERO);
        assert_eq!(validated.primary.lump_sum_month, None);
        assert!(validated.comparison.is_none());
    }

    #[test]
    fn test_empty_form_reports_every_required_field() {
        let errors = validate_form(&LoanForm::default()).unwrap_err();
        assert_eq!(fields(&errors), vec!["loan_amount", "interest_rate", "tenure"]);
        assert_eq!(errors[0].message, "Enter a valid loan amount");
    }

    #[test]
    fn test_zero_rate_is_accepted() {
        let mut form = filled_form();
        form.interest_rate = "0".into();
        assert!(validate_form(&form).is_ok());
    }

    #[test]
    fn test_negative_and_garbage_values_rejected() {
        let mut form = filled_form();
        form.loan_amount = "-10".into();
        form.interest_rate = "abc".into();
        form.extra_monthly = "-1".into();
        form.lump_sum_month = "0".into();
        let errors = validate_form(&form).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["loan_amount", "interest_rate", "extra_monthly", "lump_sum_month"]
        );
    }

    #[test]
    fn test_tenure_rounding_to_zero_months_rejected() {
        let mut form = filled_form();
        form.tenure = "0.01".into();
        let errors = validate_form(&form).unwrap_err();
        assert_eq!(fields(&errors), vec!["tenure"]);
    }

    #[test]
    fn test_comparison_fields_validated() {
        let mut form = filled_form();
        form.comparison = Some(ComparisonForm {
            loan_amount: "".into(),
            interest_rate: "9".into(),
            tenure: "x".into(),
            tenure_type: TenureType::Years,
        });
        let errors = validate_form(&form).unwrap_err();
        assert_eq!(fields(&errors), vec!["comp_loan_amount", "comp_tenure"]);
        assert_eq!(errors[0].message, "Enter a valid comparison loan amount");
    }

    #[test]
    fn test_comparison_inherits_rate_type_and_drops_extras() {
        let mut form = filled_form();
        form.rate_type = RateType::Monthly;
        form.interest_rate = "0.7".into();
        form.extra_monthly = "2000".into();
        form.lump_sum = "50000".into();
        form.lump_sum_month = "12".into();
        form.comparison = Some(ComparisonForm {
            loan_amount: "400000".into(),
            interest_rate: "0.8".into(),
            tenure: "180".into(),
            tenure_type: TenureType::Months,
        });

        let validated = validate_form(&form).unwrap();
        assert_eq!(validated.primary.lump_sum_month, Some(12));
        let comp = validated.comparison.unwrap();
        assert_eq!(comp.rate_type, RateType::Monthly);
        assert_eq!(comp.tenure_type, TenureType::Months);
        assert!(!comp.has_acceleration());
    }

    #[test]
    fn test_calculate_from_form() {
        let mut form = filled_form();
        form.comparison = Some(ComparisonForm {
            loan_amount: "500000".into(),
            interest_rate: "9".into(),
            tenure: "15".into(),
            tenure_type: TenureType::Years,
        });
        let calc = calculate_from_form(&form).unwrap();
        assert_eq!(calc.result.months_taken, 240);
        assert_eq!(calc.comparison.unwrap().months_taken, 180);
    }

    #[test]
    fn test_calculate_from_invalid_form_is_validation_error() {
        let err = calculate_from_form(&LoanForm::default()).unwrap_err();
        match err {
            FinBuddyError::ValidationFailed(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation failure, got {other}"),
        }
    }
}
