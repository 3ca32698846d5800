pub mod error;
pub mod loan;
pub mod time_value;
pub mod types;

pub use error::{FieldError, FinBuddyError};
pub use types::*;

/// Standard result type for all finbuddy operations
pub type FinBuddyResult<T> = Result<T, FinBuddyError>;
