//! Reference-price resolution per quote token.
//!
//! Oracle-integrated networks take the depository's oracle view. Otherwise
//! LP shares are fair-valued from pool reserves and stable assets from the
//! USD feed (defaulting to par when the feed is down). Any other failure
//! propagates as an error; a reference price is never silently zero.

use crate::error::Error;
use crate::fetch;
use crate::math::{mul_div_floor, pow10};
use crate::storage::{QuoteAssetInfo, QuoteKind, ONE};
use soroban_sdk::{vec, Address, Env, Symbol};

/// Resolver output, both values at 18 decimals: the base token's fair value
/// in quote tokens, and the quote token's USD value.
pub struct ResolvedPrice {
    pub reference: i128,
    pub quote_usd: i128,
}

/// Network-level pricing inputs shared across one refresh pass. `base_usd`
/// is fetched once per pass and reused for every market.
pub struct PriceContext<'a> {
    pub depository: &'a Address,
    pub feed: &'a Address,
    pub base_token: &'a Address,
    pub base_usd: i128,
    pub oracle_integrated: bool,
}

pub fn resolve(
    env: &Env,
    ctx: &PriceContext,
    index: u32,
    info: &QuoteAssetInfo,
    quote_decimals: u32,
) -> Result<ResolvedPrice, Error> {
    if ctx.oracle_integrated {
        return resolve_from_oracle(env, ctx, index);
    }
    match &info.kind {
        QuoteKind::Lp(pool) => resolve_from_pool(env, ctx, pool, quote_decimals),
        QuoteKind::Stable(feed_id) => resolve_stable(env, ctx, feed_id),
    }
}

fn resolve_from_oracle(env: &Env, ctx: &PriceContext, index: u32) -> Result<ResolvedPrice, Error> {
    let reference =
        fetch::oracle_price(env, ctx.depository, index).ok_or(Error::OracleUnavailable)?;
    if reference <= 0 {
        return Err(Error::OracleUnavailable);
    }
    let quote_usd =
        mul_div_floor(env, ctx.base_usd, ONE, reference).ok_or(Error::AmountOverflow)?;
    Ok(ResolvedPrice {
        reference,
        quote_usd,
    })
}

fn resolve_from_pool(
    env: &Env,
    ctx: &PriceContext,
    pool: &Address,
    quote_decimals: u32,
) -> Result<ResolvedPrice, Error> {
    let token_0: Address =
        fetch::try_view(env, pool, "token_0", vec![env]).ok_or(Error::PoolUnavailable)?;
    let token_1: Address =
        fetch::try_view(env, pool, "token_1", vec![env]).ok_or(Error::PoolUnavailable)?;
    let (reserve_0, reserve_1): (i128, i128) =
        fetch::try_view(env, pool, "get_reserves", vec![env]).ok_or(Error::PoolUnavailable)?;
    let total_shares: i128 =
        fetch::try_view(env, pool, "total_shares", vec![env]).ok_or(Error::PoolUnavailable)?;

    let base_reserve = if token_0 == *ctx.base_token {
        reserve_0
    } else if token_1 == *ctx.base_token {
        reserve_1
    } else {
        return Err(Error::PoolMismatch);
    };
    if base_reserve <= 0 || total_shares <= 0 {
        return Err(Error::PoolUnavailable);
    }

    // Fair value of one LP share under the 50/50 reserve split:
    // 2 * base_reserve / total_shares, carried at 18 decimals.
    let doubled = base_reserve.checked_mul(2).ok_or(Error::AmountOverflow)?;
    let share_scale = pow10(quote_decimals).ok_or(Error::AmountOverflow)?;
    let base_per_share =
        mul_div_floor(env, doubled, share_scale, total_shares).ok_or(Error::AmountOverflow)?;
    if base_per_share <= 0 {
        return Err(Error::PoolUnavailable);
    }

    let reference = mul_div_floor(env, ONE, ONE, base_per_share).ok_or(Error::AmountOverflow)?;
    if reference <= 0 {
        return Err(Error::PoolUnavailable);
    }
    let quote_usd =
        mul_div_floor(env, base_per_share, ctx.base_usd, ONE).ok_or(Error::AmountOverflow)?;
    Ok(ResolvedPrice {
        reference,
        quote_usd,
    })
}

fn resolve_stable(env: &Env, ctx: &PriceContext, feed_id: &Symbol) -> Result<ResolvedPrice, Error> {
    // A dead feed prices the stable at par instead of failing the market.
    let quote_usd = match fetch::feed_price(env, ctx.feed, feed_id) {
        Some(price) if price > 0 => price,
        _ => ONE,
    };
    let reference = mul_div_floor(env, ctx.base_usd, ONE, quote_usd).ok_or(Error::AmountOverflow)?;
    Ok(ResolvedPrice {
        reference,
        quote_usd,
    })
}
