//! Loan calculator: EMI, month-by-month amortization with prepayments,
//! form validation, and the views built on a computed schedule.

pub mod amortization;
pub mod validation;

#[cfg(feature = "comparison")]
pub mod comparison;

#[cfg(feature = "charts")]
pub mod charts;

#[cfg(feature = "export")]
pub mod export;

pub use amortization::{
    build_amortization_schedule, compute, try_compute, LoanInput, LoanResult, RateType,
    ScheduleRow, TenureType,
};
