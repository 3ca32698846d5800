use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fs::File;
use std::io;

use finbuddy_core::loan::amortization::{self, LoanInput, RateType, TenureType};
use finbuddy_core::loan::charts;
use finbuddy_core::loan::comparison::{self, LoanComparisonInput};
use finbuddy_core::loan::export::{self, DEFAULT_FILENAME};
use finbuddy_core::loan::validation::{self, LoanForm};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TenureUnit {
    Years,
    Months,
}

impl From<TenureUnit> for TenureType {
    fn from(unit: TenureUnit) -> Self {
        match unit {
            TenureUnit::Years => TenureType::Years,
            TenureUnit::Months => TenureType::Months,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RateQuote {
    Annual,
    Monthly,
}

impl From<RateQuote> for RateType {
    fn from(quote: RateQuote) -> Self {
        match quote {
            RateQuote::Annual => RateType::Annual,
            RateQuote::Monthly => RateType::Monthly,
        }
    }
}

/// Loan parameters, from flags or an input document
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Principal borrowed
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Interest rate in percent (e.g. 8.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan tenure, in --tenure-type units
    #[arg(long)]
    pub tenure: Option<Decimal>,

    #[arg(long, value_enum, default_value = "years")]
    pub tenure_type: TenureUnit,

    #[arg(long, value_enum, default_value = "annual")]
    pub rate_type: RateQuote,

    /// Extra principal paid every month
    #[arg(long)]
    pub extra_monthly: Option<Decimal>,

    /// One-time prepayment amount
    #[arg(long)]
    pub lump_sum: Option<Decimal>,

    /// Month (1-based) in which the lump sum is paid
    #[arg(long)]
    pub lump_sum_month: Option<u32>,
}

impl LoanArgs {
    fn to_input(&self) -> Result<LoanInput, Box<dyn std::error::Error>> {
        let loan_amount = self
            .loan_amount
            .ok_or("--loan-amount is required (or provide --input)")?;
        let annual_rate = self.rate.ok_or("--rate is required (or provide --input)")?;
        let tenure = self
            .tenure
            .ok_or("--tenure is required (or provide --input)")?;

        Ok(LoanInput {
            loan_amount,
            annual_rate,
            tenure,
            tenure_type: self.tenure_type.into(),
            rate_type: self.rate_type.into(),
            extra_monthly: self.extra_monthly.unwrap_or_default(),
            lump_sum: self.lump_sum.unwrap_or_default(),
            lump_sum_month: self.lump_sum_month,
        })
    }
}

/// Arguments for a two-loan comparison
#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Comparison loan principal
    #[arg(long)]
    pub compare_loan_amount: Option<Decimal>,

    /// Comparison loan rate in percent (quoted like --rate-type)
    #[arg(long)]
    pub compare_rate: Option<Decimal>,

    /// Comparison loan tenure
    #[arg(long)]
    pub compare_tenure: Option<Decimal>,

    #[arg(long, value_enum, default_value = "years")]
    pub compare_tenure_type: TenureUnit,
}

/// Arguments for commands that only take an input document
#[derive(Args)]
pub struct DocumentArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for CSV export
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Destination file, or "-" for stdout
    #[arg(long, default_value = DEFAULT_FILENAME)]
    pub out: String,
}

fn read_document<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(input::file::read_input(path)?));
    }
    match input::stdin::read_stdin()? {
        Some(data) => Ok(Some(
            serde_json::from_value(data).map_err(|e| format!("Invalid {what} on stdin: {e}"))?,
        )),
        None => Ok(None),
    }
}

fn resolve_loan(args: &LoanArgs) -> Result<LoanInput, Box<dyn std::error::Error>> {
    match read_document(args.input.as_deref(), "loan input")? {
        Some(loan) => Ok(loan),
        None => args.to_input(),
    }
}

pub fn run_schedule(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(&args)?;
    let result = amortization::build_amortization_schedule(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let compare_input: LoanComparisonInput =
        match read_document(args.loan.input.as_deref(), "comparison input")? {
            Some(doc) => doc,
            None => {
                let primary = args.loan.to_input()?;
                let comparison = LoanInput {
                    loan_amount: args
                        .compare_loan_amount
                        .ok_or("--compare-loan-amount is required (or provide --input)")?,
                    annual_rate: args
                        .compare_rate
                        .ok_or("--compare-rate is required (or provide --input)")?,
                    tenure: args
                        .compare_tenure
                        .ok_or("--compare-tenure is required (or provide --input)")?,
                    tenure_type: args.compare_tenure_type.into(),
                    rate_type: primary.rate_type,
                    ..LoanInput::default()
                };
                LoanComparisonInput {
                    primary,
                    comparison,
                }
            }
        };

    let result = comparison::compare_loans(&compare_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_options(args: DocumentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let options: Vec<LoanInput> = read_document(args.input.as_deref(), "loan options")?
        .ok_or("--input <file.json|file.yaml> or stdin required for loan options")?;
    let result = comparison::compare_loan_options(&options)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_savings(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(&args)?;
    let result = comparison::prepayment_savings(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_breakdown(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(&args)?;
    let output = amortization::build_amortization_schedule(&loan)?;
    let bundle = charts::loan_charts(&output.result);
    Ok(json!({
        "result": bundle,
        "methodology": output.methodology,
        "warnings": output.warnings,
    }))
}

/// Writes the CSV. Returns `Value::Null` when the CSV itself went to stdout.
pub fn run_export(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(&args.loan)?;
    let output = amortization::build_amortization_schedule(&loan)?;

    if args.out == "-" {
        export::write_schedule_csv(&output.result, io::stdout().lock())?;
        return Ok(Value::Null);
    }

    let file = File::create(&args.out)
        .map_err(|e| format!("Failed to create '{}': {}", args.out, e))?;
    export::write_schedule_csv(&output.result, file)?;

    Ok(json!({
        "result": {
            "file": args.out,
            "rows": output.result.schedule.len(),
            "emi": output.result.emi,
            "total_payment": output.result.total_payment,
        },
        "warnings": output.warnings,
    }))
}

pub fn run_validate(args: DocumentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let form: LoanForm = read_document(args.input.as_deref(), "loan form")?
        .ok_or("--input <file.json|file.yaml> or stdin required for form validation")?;

    let value = match validation::validate_form(&form) {
        Ok(validated) => json!({ "result": { "valid": true, "inputs": validated } }),
        Err(errors) => json!({ "result": { "valid": false, "errors": errors } }),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flags() -> LoanArgs {
        LoanArgs {
            input: None,
            loan_amount: Some(dec!(500000)),
            rate: Some(dec!(8.5)),
            tenure: Some(dec!(240)),
            tenure_type: TenureUnit::Months,
            rate_type: RateQuote::Annual,
            extra_monthly: None,
            lump_sum: Some(dec!(50000)),
            lump_sum_month: Some(12),
        }
    }

    #[test]
    fn test_flags_build_loan_input() {
        let input = flags().to_input().unwrap();
        assert_eq!(input.tenure_type, TenureType::Months);
        assert_eq!(input.extra_monthly, Decimal::ZERO);
        assert_eq!(input.lump_sum_month, Some(12));
        assert_eq!(input.nominal_months(), Some(240));
    }

    #[test]
    fn test_missing_required_flag() {
        let mut args = flags();
        args.rate = None;
        let err = args.to_input().unwrap_err();
        assert!(err.to_string().contains("--rate"));
    }
}
