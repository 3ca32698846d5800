use napi::Result as NapiResult;
use napi_derive::napi;

use finbuddy_core::loan::amortization::{self, LoanInput};
use finbuddy_core::loan::{charts, comparison, export, validation};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_loan(input_json: &str) -> NapiResult<LoanInput> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_loan(input_json: String) -> NapiResult<String> {
    let input = parse_loan(&input_json)?;
    let output = amortization::build_amortization_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn loan_breakdown(input_json: String) -> NapiResult<String> {
    let input = parse_loan(&input_json)?;
    let output = amortization::build_amortization_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&charts::loan_charts(&output.result)).map_err(to_napi_error)
}

#[napi]
pub fn export_schedule_csv(input_json: String) -> NapiResult<String> {
    let input = parse_loan(&input_json)?;
    let output = amortization::build_amortization_schedule(&input).map_err(to_napi_error)?;
    export::export_schedule_csv(&output.result).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_loans(input_json: String) -> NapiResult<String> {
    let input: comparison::LoanComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = comparison::compare_loans(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_loan_options(input_json: String) -> NapiResult<String> {
    let options: Vec<LoanInput> = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = comparison::compare_loan_options(&options).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn prepayment_savings(input_json: String) -> NapiResult<String> {
    let input = parse_loan(&input_json)?;
    let output = comparison::prepayment_savings(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// Field errors are returned as JSON (`{"errors": [...]}`) rather than
/// thrown, so the form can show each message inline.
#[napi]
pub fn calculate_from_form(form_json: String) -> NapiResult<String> {
    let form: validation::LoanForm = serde_json::from_str(&form_json).map_err(to_napi_error)?;
    match validation::calculate_from_form(&form) {
        Ok(calc) => serde_json::to_string(&calc).map_err(to_napi_error),
        Err(finbuddy_core::FinBuddyError::ValidationFailed(errors)) => {
            serde_json::to_string(&serde_json::json!({ "errors": errors })).map_err(to_napi_error)
        }
        Err(e) => Err(to_napi_error(e)),
    }
}
