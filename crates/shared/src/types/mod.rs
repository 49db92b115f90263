//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{is_valid_currency_code, round_money, sum_rounded, MONEY_SCALE};
