//! Money and rate aliases plus shared rounding rules.
//!
//! All monetary values are `rust_decimal::Decimal`. Floating point is never
//! used for money anywhere in the crate.

use rust_decimal::Decimal;

/// A monetary amount in some currency.
pub type Amount = Decimal;

/// An exchange rate (buy units per sell unit).
pub type Rate = Decimal;

/// Number of fractional digits carried by derived monetary amounts.
pub const AMOUNT_SCALE: u32 = 2;

/// Derive the buy-side amount from a sell amount and an exchange rate.
///
/// This is the single place the `buy_amount == round(sell_amount * rate)`
/// invariant is computed, so offer creation and validation cannot drift.
#[must_use]
pub fn derive_buy_amount(sell_amount: Amount, rate: Rate) -> Amount {
    (sell_amount * rate).round_dp(AMOUNT_SCALE)
}
