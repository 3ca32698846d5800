//! CSV export of an amortization schedule, and the reader for that format.
//!
//! Layout:
//!
//! ```text
//! Summary
//! Loan Amount,500000.00
//! EMI,4339.12
//! Total Interest,541387.88
//! Total Payment,1041387.88
//!
//! Month,Interest,Principal,Extra Payment,Total Payment,Balance
//! 1,3541.67,797.45,0.00,4339.12,499202.55
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::FinBuddyError;
use crate::loan::amortization::LoanResult;
use crate::types::{format_money, Money};
use crate::FinBuddyResult;

pub const SCHEDULE_HEADER: [&str; 6] = [
    "Month",
    "Interest",
    "Principal",
    "Extra Payment",
    "Total Payment",
    "Balance",
];

/// Default download name.
pub const DEFAULT_FILENAME: &str = "loan_schedule.csv";

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Write the summary block and schedule table to `writer`.
pub fn write_schedule_csv<W: Write>(result: &LoanResult, mut writer: W) -> FinBuddyResult<()> {
    let mut wtr = csv_writer(&mut writer);
    wtr.write_record(["Summary"])?;
    wtr.write_record(["Loan Amount", &format_money(result.principal)])?;
    wtr.write_record(["EMI", &format_money(result.emi)])?;
    wtr.write_record(["Total Interest", &format_money(result.total_interest)])?;
    wtr.write_record(["Total Payment", &format_money(result.total_payment)])?;
    wtr.flush()?;
    drop(wtr);

    // A one-field empty record would be written as `""`.
    writer.write_all(b"\n")?;

    let mut wtr = csv_writer(&mut writer);
    wtr.write_record(SCHEDULE_HEADER)?;
    for row in &result.schedule {
        wtr.write_record([
            row.month.to_string(),
            format_money(row.interest),
            format_money(row.principal),
            format_money(row.extra_payment),
            format_money(row.total_payment),
            format_money(row.balance),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer)
}

/// Render the export as a string.
pub fn export_schedule_csv(result: &LoanResult) -> FinBuddyResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    write_schedule_csv(result, &mut buf)?;
    String::from_utf8(buf).map_err(|e| FinBuddyError::Export(e.to_string()))
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedSummary {
    pub loan_amount: Money,
    pub emi: Money,
    pub total_interest: Money,
    pub total_payment: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedRow {
    pub month: u32,
    pub interest: Money,
    pub principal: Money,
    pub extra_payment: Money,
    pub total_payment: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedSchedule {
    pub summary: ExportedSummary,
    pub rows: Vec<ExportedRow>,
}

fn parse_amount(raw: &str, what: &str) -> FinBuddyResult<Money> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| FinBuddyError::Export(format!("invalid {what} '{raw}': {e}")))
}

/// Parse text produced by [`export_schedule_csv`].
pub fn parse_schedule_csv(text: &str) -> FinBuddyResult<ExportedSchedule> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut loan_amount = None;
    let mut emi = None;
    let mut total_interest = None;
    let mut total_payment = None;
    let mut in_table = false;
    let mut rows = Vec::new();

    for record in rdr.records() {
        let record = record?;
        let label = record.get(0).unwrap_or("").trim();
        if label.is_empty() {
            continue;
        }

        if in_table {
            if record.len() != SCHEDULE_HEADER.len() {
                return Err(FinBuddyError::Export(format!(
                    "schedule row has {} fields, expected {}",
                    record.len(),
                    SCHEDULE_HEADER.len()
                )));
            }
            let month = label
                .parse::<u32>()
                .map_err(|e| FinBuddyError::Export(format!("invalid month '{label}': {e}")))?;
            rows.push(ExportedRow {
                month,
                interest: parse_amount(&record[1], "interest")?,
                principal: parse_amount(&record[2], "principal")?,
                extra_payment: parse_amount(&record[3], "extra payment")?,
                total_payment: parse_amount(&record[4], "total payment")?,
                balance: parse_amount(&record[5], "balance")?,
            });
            continue;
        }

        let value = record.get(1).unwrap_or("");
        match label {
            "Summary" => {}
            "Loan Amount" => loan_amount = Some(parse_amount(value, "loan amount")?),
            "EMI" => emi = Some(parse_amount(value, "EMI")?),
            "Total Interest" => total_interest = Some(parse_amount(value, "total interest")?),
            "Total Payment" => total_payment = Some(parse_amount(value, "total payment")?),
            "Month" => in_table = true,
            other => {
                return Err(FinBuddyError::Export(format!(
                    "unexpected summary line '{other}'"
                )))
            }
        }
    }

    let missing = |what: &str| FinBuddyError::Export(format!("missing '{what}' in summary"));
    Ok(ExportedSchedule {
        summary: ExportedSummary {
            loan_amount: loan_amount.ok_or_else(|| missing("Loan Amount"))?,
            emi: emi.ok_or_else(|| missing("EMI"))?,
            total_interest: total_interest.ok_or_else(|| missing("Total Interest"))?,
            total_payment: total_payment.ok_or_else(|| missing("Total Payment"))?,
        },
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::amortization::{compute, LoanInput, TenureType};
    use rust_decimal_macros::dec;

    fn zero_rate_result() -> LoanResult {
        compute(&LoanInput {
            loan_amount: dec!(100000),
            annual_rate: Decimal::ZERO,
            tenure: dec!(10),
            tenure_type: TenureType::Months,
            ..LoanInput::default()
        })
        .unwrap()
    }

    #[test]
    fn test_export_layout() {
        let text = export_schedule_csv(&zero_rate_result()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Summary");
        assert_eq!(lines[1], "Loan Amount,100000.00");
        assert_eq!(lines[2], "EMI,10000.00");
        assert_eq!(lines[3], "Total Interest,0.00");
        assert_eq!(lines[4], "Total Payment,100000.00");
        assert_eq!(lines[5], "");
        assert_eq!(
            lines[6],
            "Month,Interest,Principal,Extra Payment,Total Payment,Balance"
        );
        assert_eq!(lines[7], "1,0.00,10000.00,0.00,10000.00,90000.00");
        assert_eq!(lines[16], "10,0.00,10000.00,0.00,10000.00,0.00");
        assert_eq!(lines.len(), 17);
    }

    #[test]
    fn test_write_to_io_writer_separates_blocks_with_bare_newline() {
        let mut buf: Vec<u8> = Vec::new();
        write_schedule_csv(&zero_rate_result(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Total Payment,100000.00\n\nMonth,Interest,"));
        assert!(!text.contains("\"\""));
        assert_eq!(text.matches("Summary").count(), 1);
        assert!(text.ends_with("10,0.00,10000.00,0.00,10000.00,0.00\n"));
    }

    #[test]
    fn test_parse_reads_back_export() {
        let result = zero_rate_result();
        let parsed = parse_schedule_csv(&export_schedule_csv(&result).unwrap()).unwrap();
        assert_eq!(parsed.summary.loan_amount, dec!(100000));
        assert_eq!(parsed.summary.emi, dec!(10000));
        assert_eq!(parsed.rows.len(), 10);
        assert_eq!(parsed.rows[9].month, 10);
        assert_eq!(parsed.rows[9].balance, Decimal::ZERO);
    }

    #[test]
    fn test_parse_rejects_missing_summary() {
        let text = "Month,Interest,Principal,Extra Payment,Total Payment,Balance\n1,0,1,0,1,0\n";
        assert!(parse_schedule_csv(text).is_err());
    }

    #[test]
    fn test_parse_rejects_short_row() {
        let text = "Summary\nLoan Amount,1.00\nEMI,1.00\nTotal Interest,0.00\nTotal Payment,1.00\n\nMonth,Interest,Principal,Extra Payment,Total Payment,Balance\n1,0.00\n";
        assert!(parse_schedule_csv(text).is_err());
    }
}
