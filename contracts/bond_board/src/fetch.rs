//! Read-side plumbing: fallible view calls against the depository, AMM
//! pools, and the USD price feed.

use crate::storage::{
    BondMarket, BondMetadata, BondTerms, CachedPrice, DataKey, RawNote, FEED_CACHE_TTL,
};
use soroban_sdk::{vec, Address, Env, IntoVal, Symbol, TryFromVal, Val, Vec};

/// Cross-contract view call that reports failure instead of trapping.
/// `None` covers both a failed invocation and a result that does not decode.
pub fn try_view<T: TryFromVal<Env, Val>>(
    env: &Env,
    target: &Address,
    func: &str,
    args: Vec<Val>,
) -> Option<T> {
    env.try_invoke_contract::<T, soroban_sdk::Error>(target, &Symbol::new(env, func), args)
        .ok()
        .and_then(|decoded| decoded.ok())
}

pub fn live_markets(env: &Env, depository: &Address) -> Option<Vec<u32>> {
    try_view(env, depository, "live_markets", vec![env])
}

pub fn market(env: &Env, depository: &Address, index: u32) -> Option<BondMarket> {
    try_view(env, depository, "markets", vec![env, index.into_val(env)])
}

pub fn metadata(env: &Env, depository: &Address, index: u32) -> Option<BondMetadata> {
    try_view(env, depository, "metadata", vec![env, index.into_val(env)])
}

pub fn terms(env: &Env, depository: &Address, index: u32) -> Option<BondTerms> {
    try_view(env, depository, "terms", vec![env, index.into_val(env)])
}

pub fn clearing_price(env: &Env, depository: &Address, index: u32) -> Option<i128> {
    try_view(env, depository, "market_price", vec![env, index.into_val(env)])
}

pub fn oracle_price(env: &Env, depository: &Address, index: u32) -> Option<i128> {
    try_view(env, depository, "oracle_price", vec![env, index.into_val(env)])
}

pub fn notes_for(env: &Env, depository: &Address, owner: &Address) -> Option<Vec<RawNote>> {
    try_view(env, depository, "notes_for", vec![env, owner.into_val(env)])
}

/// USD quote for a feed id, reused for `FEED_CACHE_TTL` seconds per id.
/// When the feed cannot be reached the stale cached value is better than
/// nothing; a feed id with no cache at all resolves to `None`.
pub fn feed_price(env: &Env, feed: &Address, id: &Symbol) -> Option<i128> {
    let key = DataKey::FeedCache(id.clone());
    let now = env.ledger().timestamp();

    if let Some(cached) = env.storage().temporary().get::<DataKey, CachedPrice>(&key) {
        if now.saturating_sub(cached.fetched_at) < FEED_CACHE_TTL {
            return Some(cached.price);
        }
    }

    match try_view::<i128>(env, feed, "usd_price", vec![env, id.into_val(env)]) {
        Some(price) if price > 0 => {
            env.storage()
                .temporary()
                .set(&key, &CachedPrice { price, fetched_at: now });
            Some(price)
        }
        _ => env
            .storage()
            .temporary()
            .get::<DataKey, CachedPrice>(&key)
            .map(|cached| cached.price),
    }
}
