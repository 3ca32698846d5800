use finbuddy_core::loan::amortization::{compute, LoanInput, LoanResult};
use finbuddy_core::loan::charts;
use finbuddy_core::loan::export::{export_schedule_csv, parse_schedule_csv, write_schedule_csv};
use finbuddy_core::round_money;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn prepaid_home_loan() -> LoanResult {
    let mut input = LoanInput::new(dec!(500000), dec!(8.5), dec!(20));
    input.extra_monthly = dec!(2000);
    input.lump_sum = dec!(50000);
    input.lump_sum_month = Some(24);
    compute(&input).unwrap()
}

// ===========================================================================
// CSV round trip
// ===========================================================================

#[test]
fn test_every_exported_field_reads_back_at_two_places() {
    let result = prepaid_home_loan();
    let text = export_schedule_csv(&result).unwrap();
    let parsed = parse_schedule_csv(&text).unwrap();

    assert_eq!(parsed.summary.loan_amount, round_money(result.principal));
    assert_eq!(parsed.summary.emi, result.emi);
    assert_eq!(parsed.summary.total_interest, result.total_interest);
    assert_eq!(parsed.summary.total_payment, result.total_payment);

    assert_eq!(parsed.rows.len(), result.schedule.len());
    for (exported, row) in parsed.rows.iter().zip(&result.schedule) {
        assert_eq!(exported.month, row.month);
        assert_eq!(exported.interest, round_money(row.interest));
        assert_eq!(exported.principal, round_money(row.principal));
        assert_eq!(exported.extra_payment, round_money(row.extra_payment));
        assert_eq!(exported.total_payment, round_money(row.total_payment));
        assert_eq!(exported.balance, round_money(row.balance));
    }
}

#[test]
fn test_lump_sum_month_visible_in_export() {
    let result = prepaid_home_loan();
    let parsed = parse_schedule_csv(&export_schedule_csv(&result).unwrap()).unwrap();
    assert_eq!(parsed.rows[23].extra_payment, dec!(52000.00));
    assert_eq!(parsed.rows[22].extra_payment, dec!(2000.00));
}

#[test]
fn test_every_data_line_has_two_decimal_places() {
    let text = export_schedule_csv(&prepaid_home_loan()).unwrap();
    let data_lines = text
        .lines()
        .skip_while(|l| !l.starts_with("Month,"))
        .skip(1);
    for line in data_lines {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 6, "line {line}");
        for money in &fields[1..] {
            let decimals = money.split('.').nth(1).unwrap_or("");
            assert_eq!(decimals.len(), 2, "field {money} in line {line}");
        }
    }
}

#[test]
fn test_writer_and_string_export_agree() {
    let result = prepaid_home_loan();
    let mut buf: Vec<u8> = Vec::new();
    write_schedule_csv(&result, &mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), export_schedule_csv(&result).unwrap());
}

// ===========================================================================
// Chart series
// ===========================================================================

#[test]
fn test_balance_series_matches_schedule() {
    let result = prepaid_home_loan();
    let series = charts::balance_series(&result);
    assert_eq!(series.len(), result.months_taken as usize);
    assert_eq!(series.last().unwrap().balance, dec!(0));
    assert!(series.windows(2).all(|w| w[1].balance <= w[0].balance));
}

#[test]
fn test_chart_bundle() {
    let result = prepaid_home_loan();
    let bundle = charts::loan_charts(&result);
    assert_eq!(bundle.breakdown.slices[0].value, dec!(500000));
    assert_eq!(bundle.breakdown.slices[1].value, result.total_interest);
    assert_eq!(bundle.balance_series.len(), result.schedule.len());
}
