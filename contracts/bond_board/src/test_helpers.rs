//! Shared test helpers: mock depository, AMM pair, and price feed
//! contracts, plus board setup.

#![cfg(test)]

use crate::storage::{BondMarket, BondMetadata, BondTerms, RawNote, ONE, SECONDS_PER_DAY};
use crate::{BondBoard, BondBoardClient};
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::{contract, contractimpl, contracttype, vec, Address, Env, Symbol, Vec};

/// Fixed test clock.
pub const NOW: u64 = 1_700_000_000;
/// Base token USD price served by the mock feed.
pub const BASE_USD: i128 = 10 * ONE;

pub fn base_feed_id(e: &Env) -> Symbol {
    Symbol::new(e, "base")
}

// ─── Mock depository ───────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone)]
enum DepKey {
    Live,
    Market(u32),
    Meta(u32),
    Terms(u32),
    Price(u32),
    Oracle(u32),
    Notes(Address),
    FailPrice(u32),
}

#[contract]
pub struct MockDepository;

#[contractimpl]
impl MockDepository {
    pub fn set_live(env: Env, indexes: Vec<u32>) {
        env.storage().instance().set(&DepKey::Live, &indexes);
    }

    pub fn set_market(
        env: Env,
        market: BondMarket,
        metadata: BondMetadata,
        terms: BondTerms,
        price: i128,
        oracle: i128,
    ) {
        let index = market.index;
        env.storage().instance().set(&DepKey::Market(index), &market);
        env.storage().instance().set(&DepKey::Meta(index), &metadata);
        env.storage().instance().set(&DepKey::Terms(index), &terms);
        env.storage().instance().set(&DepKey::Price(index), &price);
        env.storage().instance().set(&DepKey::Oracle(index), &oracle);
    }

    pub fn set_notes(env: Env, owner: Address, notes: Vec<RawNote>) {
        env.storage().instance().set(&DepKey::Notes(owner), &notes);
    }

    /// Make `market_price(index)` trap, simulating a failed call.
    pub fn fail_price(env: Env, index: u32) {
        env.storage().instance().set(&DepKey::FailPrice(index), &true);
    }

    pub fn live_markets(env: Env) -> Vec<u32> {
        env.storage()
            .instance()
            .get(&DepKey::Live)
            .unwrap_or(vec![&env])
    }

    pub fn markets(env: Env, index: u32) -> BondMarket {
        env.storage().instance().get(&DepKey::Market(index)).unwrap()
    }

    pub fn metadata(env: Env, index: u32) -> BondMetadata {
        env.storage().instance().get(&DepKey::Meta(index)).unwrap()
    }

    pub fn terms(env: Env, index: u32) -> BondTerms {
        env.storage().instance().get(&DepKey::Terms(index)).unwrap()
    }

    pub fn market_price(env: Env, index: u32) -> i128 {
        let fail = env
            .storage()
            .instance()
            .get::<DepKey, bool>(&DepKey::FailPrice(index))
            .unwrap_or(false);
        if fail {
            panic!("market_price unavailable");
        }
        env.storage().instance().get(&DepKey::Price(index)).unwrap()
    }

    pub fn oracle_price(env: Env, index: u32) -> i128 {
        env.storage().instance().get(&DepKey::Oracle(index)).unwrap()
    }

    pub fn notes_for(env: Env, owner: Address) -> Vec<RawNote> {
        env.storage()
            .instance()
            .get(&DepKey::Notes(owner))
            .unwrap_or(vec![&env])
    }
}

// ─── Mock AMM pair ─────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone)]
enum PairKey {
    Token0,
    Token1,
    Reserves,
    Shares,
}

#[contract]
pub struct MockPair;

#[contractimpl]
impl MockPair {
    pub fn setup(
        env: Env,
        token_0: Address,
        token_1: Address,
        reserve_0: i128,
        reserve_1: i128,
        shares: i128,
    ) {
        env.storage().instance().set(&PairKey::Token0, &token_0);
        env.storage().instance().set(&PairKey::Token1, &token_1);
        env.storage()
            .instance()
            .set(&PairKey::Reserves, &(reserve_0, reserve_1));
        env.storage().instance().set(&PairKey::Shares, &shares);
    }

    pub fn token_0(env: Env) -> Address {
        env.storage().instance().get(&PairKey::Token0).unwrap()
    }

    pub fn token_1(env: Env) -> Address {
        env.storage().instance().get(&PairKey::Token1).unwrap()
    }

    pub fn get_reserves(env: Env) -> (i128, i128) {
        env.storage().instance().get(&PairKey::Reserves).unwrap()
    }

    pub fn total_shares(env: Env) -> i128 {
        env.storage().instance().get(&PairKey::Shares).unwrap()
    }
}

// ─── Mock USD price feed ───────────────────────────────────────────────────

#[contracttype]
#[derive(Clone)]
enum FeedKey {
    Price(Symbol),
}

#[contract]
pub struct MockFeed;

#[contractimpl]
impl MockFeed {
    pub fn set_price(env: Env, id: Symbol, price: i128) {
        env.storage().instance().set(&FeedKey::Price(id), &price);
    }

    pub fn clear_price(env: Env, id: Symbol) {
        env.storage().instance().remove(&FeedKey::Price(id));
    }

    /// Traps on an id with no quote, like a feed with no such entry.
    pub fn usd_price(env: Env, id: Symbol) -> i128 {
        env.storage().instance().get(&FeedKey::Price(id)).unwrap()
    }
}

// ─── Setup ─────────────────────────────────────────────────────────────────

pub struct Setup<'a> {
    pub board: BondBoardClient<'a>,
    pub depository: MockDepositoryClient<'a>,
    pub feed: MockFeedClient<'a>,
    pub admin: Address,
    pub base_token: Address,
    pub depository_id: Address,
    pub feed_id: Address,
}

/// Deploys the board plus mock collaborators, initializes, and prices the
/// base token at `BASE_USD`.
pub fn setup(e: &Env, oracle_integrated: bool) -> Setup<'_> {
    e.mock_all_auths();
    e.ledger().with_mut(|li| li.timestamp = NOW);

    let admin = Address::generate(e);
    let base_token = Address::generate(e);
    let depository_id = e.register(MockDepository, ());
    let feed_id = e.register(MockFeed, ());
    let board_id = e.register(BondBoard, ());

    let board = BondBoardClient::new(e, &board_id);
    board.initialize(
        &admin,
        &depository_id,
        &base_token,
        &feed_id,
        &base_feed_id(e),
        &oracle_integrated,
    );

    let feed = MockFeedClient::new(e, &feed_id);
    feed.set_price(&base_feed_id(e), &BASE_USD);

    Setup {
        board,
        depository: MockDepositoryClient::new(e, &depository_id),
        feed,
        admin,
        base_token,
        depository_id,
        feed_id,
    }
}

/// A plain market bundle: 500 base capacity, 2 base max payout, 6-decimal
/// quote token, 3-day fixed vesting.
pub fn default_bundle(
    e: &Env,
    index: u32,
    quote_token: &Address,
) -> (BondMarket, BondMetadata, BondTerms) {
    (
        BondMarket {
            index,
            quote_token: quote_token.clone(),
            capacity: 500 * ONE,
            capacity_in_quote: false,
            total_debt: 100 * ONE,
            max_payout: 2 * ONE,
            purchased: 0,
            sold: 0,
        },
        BondMetadata {
            quote_decimals: 6,
            last_tune: NOW - 600,
            last_decay: NOW - 600,
            length: 30 * SECONDS_PER_DAY,
            deposit_interval: 14_400,
            tune_interval: 14_400,
        },
        BondTerms {
            fixed_term: true,
            vesting: 3 * SECONDS_PER_DAY,
            conclusion: 0,
            control_variable: ONE,
            max_debt: 1_000 * ONE,
        },
    )
}
