//! Overflow-safe fixed-point helpers.
//!
//! Unit conversions multiply by up to `10^36` before dividing, which does not
//! fit an `i128` intermediate, so `mul_div_floor` widens through the host
//! `I256` type. All helpers return `None` instead of trapping.

use soroban_sdk::{Env, I256};

/// `10^exp` as `i128`. `None` above `10^38`.
pub fn pow10(exp: u32) -> Option<i128> {
    let mut value: i128 = 1;
    for _ in 0..exp {
        value = value.checked_mul(10)?;
    }
    Some(value)
}

/// `a * b / denom` with a 256-bit intermediate, truncated toward zero.
/// `None` when `denom` is zero or the result overflows `i128`.
pub fn mul_div_floor(env: &Env, a: i128, b: i128, denom: i128) -> Option<i128> {
    if denom == 0 {
        return None;
    }
    let product = I256::from_i128(env, a).mul(&I256::from_i128(env, b));
    product.div(&I256::from_i128(env, denom)).to_i128()
}
