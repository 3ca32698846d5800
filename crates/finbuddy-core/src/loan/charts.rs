//! Chart series derived from a computed schedule: the principal vs
//! interest split and the outstanding balance over time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::loan::amortization::LoanResult;
use crate::types::{round_money, Money, Rate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// "Principal" then "Total Interest".
    pub slices: Vec<ChartSlice>,
    /// Interest as a fraction of principal + interest.
    pub interest_share: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub month: u32,
    pub balance: Money,
}

/// Data for the chart views of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanCharts {
    pub breakdown: CostBreakdown,
    pub balance_series: Vec<BalancePoint>,
}

pub fn cost_breakdown(result: &LoanResult) -> CostBreakdown {
    let total = result.principal + result.total_interest;
    let interest_share = if total.is_zero() {
        Decimal::ZERO
    } else {
        result.total_interest / total
    };

    CostBreakdown {
        slices: vec![
            ChartSlice {
                name: "Principal".into(),
                value: result.principal,
            },
            ChartSlice {
                name: "Total Interest".into(),
                value: result.total_interest,
            },
        ],
        interest_share,
    }
}

pub fn balance_series(result: &LoanResult) -> Vec<BalancePoint> {
    result
        .schedule
        .iter()
        .map(|row| BalancePoint {
            month: row.month,
            balance: round_money(row.balance),
        })
        .collect()
}

pub fn loan_charts(result: &LoanResult) -> LoanCharts {
    LoanCharts {
        breakdown: cost_breakdown(result),
        balance_series: balance_series(result),
    }
}
