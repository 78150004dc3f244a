//! Core derivation: one raw market bundle plus resolved prices in, one
//! fully-derived record out. Pure apart from the ledger clock passed in.

use crate::duration::prettify_seconds;
use crate::math::{mul_div_floor, pow10};
use crate::oracle::ResolvedPrice;
use crate::storage::{
    BondMarket, BondMetadata, BondTerms, DerivedBond, QuoteAsset, QuoteKind, BASE_DECIMALS, ONE,
};
use soroban_sdk::{Env, String};

/// One-directional buyer protection: when depository tuning lags the oracle
/// the displayed price drops to the reference; it is never raised to match
/// a higher reference.
pub fn clamp_price(clearing: i128, reference: i128, oracle_integrated: bool) -> i128 {
    if oracle_integrated && reference < clearing {
        reference
    } else {
        clearing
    }
}

/// `(reference - price) / reference` as a signed 18-decimal fraction.
/// Negative when the bond is priced above reference, zero at par.
pub fn discount_fraction(env: &Env, reference: i128, price: i128) -> Option<i128> {
    let edge = reference.checked_sub(price)?;
    mul_div_floor(env, edge, ONE, reference)
}

/// `10^(2 * 18 - quote_decimals)`, the scaling constant between raw quote
/// amounts and raw base amounts at a 1e18-scaled clearing price.
fn unit_factor(quote_decimals: u32) -> Option<i128> {
    pow10((2 * BASE_DECIMALS).checked_sub(quote_decimals)?)
}

/// Convert a quote-denominated raw amount to base units at `price`.
pub fn quote_to_base(env: &Env, amount: i128, price: i128, quote_decimals: u32) -> Option<i128> {
    mul_div_floor(env, amount, unit_factor(quote_decimals)?, price)
}

/// Convert a base-denominated raw amount to quote units at `price`.
pub fn base_to_quote(env: &Env, amount: i128, price: i128, quote_decimals: u32) -> Option<i128> {
    mul_div_floor(env, amount, price, unit_factor(quote_decimals)?)
}

/// Build the derived record for one market. `None` when a price input is
/// non-positive or the unit conversions overflow; the caller skips the
/// market and the batch continues.
#[allow(clippy::too_many_arguments)]
pub fn derive_bond(
    env: &Env,
    market: &BondMarket,
    metadata: &BondMetadata,
    terms: &BondTerms,
    quote: &QuoteAsset,
    clearing_price: i128,
    resolved: &ResolvedPrice,
    oracle_integrated: bool,
    now: u64,
) -> Option<DerivedBond> {
    if clearing_price <= 0 || resolved.reference <= 0 {
        return None;
    }

    let price = clamp_price(clearing_price, resolved.reference, oracle_integrated);
    let discount = discount_fraction(env, resolved.reference, price)?;

    let quote_decimals = metadata.quote_decimals;
    let (capacity_in_base, capacity_in_quote_units) = if market.capacity_in_quote {
        (
            quote_to_base(env, market.capacity, price, quote_decimals)?,
            market.capacity,
        )
    } else {
        (
            market.capacity,
            base_to_quote(env, market.capacity, price, quote_decimals)?,
        )
    };
    // Max payout is base-denominated on-chain.
    let max_payout_in_base = market.max_payout;
    let max_payout_in_quote = base_to_quote(env, market.max_payout, price, quote_decimals)?;

    let sold_out = capacity_in_base < ONE || max_payout_in_base < ONE;

    let (remaining, expiration) = if terms.fixed_term {
        // Markets report vesting as a duration from query time; purchase
        // notes carry an absolute maturity instead.
        (terms.vesting, now.checked_add(terms.vesting)?)
    } else {
        (terms.conclusion.saturating_sub(now), terms.conclusion)
    };

    let price_usd = mul_div_floor(env, price, resolved.quote_usd, ONE)?;

    let (display_name, is_lp, known_quote) = match quote {
        QuoteAsset::Known(info) => (
            info.display_name.clone(),
            matches!(info.kind, QuoteKind::Lp(_)),
            true,
        ),
        QuoteAsset::Unknown => (String::from_str(env, "unknown"), false, false),
    };

    Some(DerivedBond {
        market: market.clone(),
        metadata: metadata.clone(),
        terms: terms.clone(),
        display_name,
        is_lp,
        known_quote,
        price_in_quote: price,
        price_usd,
        market_price_in_quote: resolved.reference,
        discount,
        capacity_in_base,
        capacity_in_quote_units,
        max_payout_in_base,
        max_payout_in_quote,
        payout_or_capacity_in_base: capacity_in_base.min(max_payout_in_base),
        payout_or_capacity_in_quote: capacity_in_quote_units.min(max_payout_in_quote),
        sold_out,
        duration: prettify_seconds(env, remaining),
        expiration,
        fetched_at: now,
    })
}
