#![no_std]

mod derive;
mod duration;
mod error;
mod events;
mod fetch;
mod math;
mod oracle;
mod storage;

use error::Error;
use events::*;
use oracle::{PriceContext, ResolvedPrice};
use storage::{
    BalanceRecord, DataKey, DerivedBond, FetchCategory, FetchState, FetchStatus, QuoteAsset,
    QuoteAssetInfo, QuoteKind, RefreshSummary, UserNote, DEFAULT_REFRESH_INTERVAL, ONE,
};

use soroban_sdk::{contract, contractimpl, token, vec, Address, Env, String, Symbol, Vec};

#[cfg(test)]
mod test_helpers;


#[contract]
pub struct BondBoard;

#[contractimpl]
impl BondBoard {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the board against a depository, base token, and USD feed.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        env: Env,
        admin: Address,
        depository: Address,
        base_token: Address,
        price_feed: Address,
        base_feed_id: Symbol,
        oracle_integrated: bool,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Depository, &depository);
        env.storage().instance().set(&DataKey::BaseToken, &base_token);
        env.storage().instance().set(&DataKey::PriceFeed, &price_feed);
        env.storage().instance().set(&DataKey::BaseFeedId, &base_feed_id);
        env.storage()
            .instance()
            .set(&DataKey::OracleIntegrated, &oracle_integrated);
        env.storage()
            .instance()
            .set(&DataKey::RefreshInterval, &DEFAULT_REFRESH_INTERVAL);
        env.storage().instance().set(&DataKey::Paused, &false);

        Ok(())
    }

    /// Pause refresh operations (emergency).
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn pause(env: Env) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage().instance().set(&DataKey::Paused, &true);
        Ok(())
    }

    /// Unpause refresh operations.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn unpause(env: Env) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage().instance().set(&DataKey::Paused, &false);
        Ok(())
    }

    /// Set how long a market snapshot stays fresh, in seconds.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidInterval`: Interval must be positive
    pub fn set_refresh_interval(env: Env, seconds: u64) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        if seconds == 0 {
            return Err(Error::InvalidInterval);
        }
        env.storage()
            .instance()
            .set(&DataKey::RefreshInterval, &seconds);
        Ok(())
    }

    /// Point old-note refreshes at a previous-generation depository.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn set_legacy_depository(env: Env, depository: Address) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage()
            .instance()
            .set(&DataKey::LegacyDepository, &depository);
        Ok(())
    }

    /// Register pricing/display metadata for a quote token. Markets quoting
    /// an unregistered token derive as degraded "unknown" placeholders.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn register_quote_asset(
        env: Env,
        token: Address,
        display_name: String,
        kind: QuoteKind,
    ) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        let is_lp = matches!(kind, QuoteKind::Lp(_));
        let info = QuoteAssetInfo { display_name, kind };
        env.storage()
            .instance()
            .set(&DataKey::QuoteAsset(token.clone()), &info);

        env.events().publish(
            (Symbol::new(&env, "quote_asset_registered"), token.clone()),
            QuoteAssetRegisteredEvent { token, is_lp },
        );

        Ok(())
    }

    // ============================================
    // REFRESH: ALL MARKETS
    // ============================================

    /// Fetch, derive, and store every live market. Replace-all semantics:
    /// indices missing from the new snapshot are dropped, never merged.
    /// A market that fails to fetch or derive is skipped (with an event)
    /// and the batch continues. An unreachable depository or feed marks
    /// the category rejected without storing fabricated data.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `ContractPaused`: Contract is paused
    pub fn refresh_all(env: Env) -> Result<RefreshSummary, Error> {
        Self::check_not_paused(&env)?;
        let depository = Self::depository(&env)?;
        let now = env.ledger().timestamp();

        let base_usd = match Self::base_usd(&env) {
            Some(price) => price,
            None => return Ok(Self::reject_markets(&env, "feed")),
        };
        let indexes = match fetch::live_markets(&env, &depository) {
            Some(list) => list,
            None => return Ok(Self::reject_markets(&env, "depository")),
        };

        let feed = Self::price_feed(&env)?;
        let base_token = Self::base_token(&env)?;
        let ctx = PriceContext {
            depository: &depository,
            feed: &feed,
            base_token: &base_token,
            base_usd,
            oracle_integrated: Self::oracle_integrated(&env),
        };

        let mut records: Vec<DerivedBond> = vec![&env];
        let mut skipped: u32 = 0;
        for index in indexes.iter() {
            match Self::fetch_and_derive(&env, &ctx, index, now) {
                Some(record) => records.push_back(record),
                None => {
                    skipped += 1;
                    env.events().publish(
                        (Symbol::new(&env, "market_skipped"), index),
                        MarketSkippedEvent { index },
                    );
                }
            }
        }

        let previous: Vec<u32> = env
            .storage()
            .instance()
            .get(&DataKey::BondIndexes)
            .unwrap_or(vec![&env]);
        let mut kept: Vec<u32> = vec![&env];
        for record in records.iter() {
            kept.push_back(record.market.index);
            env.storage()
                .instance()
                .set(&DataKey::Bond(record.market.index), &record);
        }
        for index in previous.iter() {
            if !kept.contains(&index) {
                env.storage().instance().remove(&DataKey::Bond(index));
            }
        }
        env.storage().instance().set(&DataKey::BondIndexes, &kept);

        Self::set_status(&env, FetchCategory::Markets, FetchState::Fulfilled);

        let summary = RefreshSummary {
            refreshed: kept.len(),
            skipped,
        };
        env.events().publish(
            (Symbol::new(&env, "bonds_refreshed"),),
            BondsRefreshedEvent {
                refreshed: summary.refreshed,
                skipped: summary.skipped,
            },
        );

        Ok(summary)
    }

    // ============================================
    // REFRESH: SINGLE MARKET
    // ============================================

    /// Fetch and upsert one market, the post-purchase path. Unlike the
    /// batch, a fetch failure here is a hard error.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `ContractPaused`: Contract is paused
    /// - `PriceFeedUnavailable`: No base-token USD quote
    /// - `MarketUnavailable`: Depository fetch or derivation failed
    pub fn refresh_one(env: Env, index: u32) -> Result<DerivedBond, Error> {
        Self::check_not_paused(&env)?;
        let depository = Self::depository(&env)?;
        let now = env.ledger().timestamp();

        let base_usd = Self::base_usd(&env).ok_or(Error::PriceFeedUnavailable)?;
        let feed = Self::price_feed(&env)?;
        let base_token = Self::base_token(&env)?;
        let ctx = PriceContext {
            depository: &depository,
            feed: &feed,
            base_token: &base_token,
            base_usd,
            oracle_integrated: Self::oracle_integrated(&env),
        };

        let record =
            Self::fetch_and_derive(&env, &ctx, index, now).ok_or(Error::MarketUnavailable)?;

        let mut indexes: Vec<u32> = env
            .storage()
            .instance()
            .get(&DataKey::BondIndexes)
            .unwrap_or(vec![&env]);
        if !indexes.contains(&index) {
            indexes.push_back(index);
            env.storage().instance().set(&DataKey::BondIndexes, &indexes);
        }
        env.storage().instance().set(&DataKey::Bond(index), &record);

        env.events().publish(
            (Symbol::new(&env, "bond_refreshed"), index),
            BondRefreshedEvent {
                index,
                price_in_quote: record.price_in_quote,
                discount: record.discount,
                sold_out: record.sold_out,
            },
        );

        Ok(record)
    }

    // ============================================
    // REFRESH: BALANCES & NOTES
    // ============================================

    /// Fetch one holder's balance of `token` and allowance toward the
    /// depository. Failed token calls default to zero rather than erroring.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `ContractPaused`: Contract is paused
    pub fn refresh_balance(env: Env, token: Address, owner: Address) -> Result<BalanceRecord, Error> {
        Self::check_not_paused(&env)?;
        let depository = Self::depository(&env)?;
        let now = env.ledger().timestamp();

        let client = token::Client::new(&env, &token);
        let balance = client
            .try_balance(&owner)
            .ok()
            .and_then(|decoded| decoded.ok())
            .unwrap_or(0);
        let allowance = client
            .try_allowance(&owner, &depository)
            .ok()
            .and_then(|decoded| decoded.ok())
            .unwrap_or(0);

        let record = BalanceRecord {
            balance,
            allowance,
            updated_at: now,
        };
        env.storage()
            .instance()
            .set(&DataKey::Balance(token.clone(), owner.clone()), &record);
        Self::set_status(&env, FetchCategory::Balances, FetchState::Fulfilled);

        env.events().publish(
            (Symbol::new(&env, "balance_refreshed"), token.clone(), owner.clone()),
            BalanceRefreshedEvent {
                token,
                owner,
                balance,
                allowance,
            },
        );

        Ok(record)
    }

    /// Fetch one holder's purchase notes from the active depository.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `ContractPaused`: Contract is paused
    pub fn refresh_notes(env: Env, owner: Address) -> Result<u32, Error> {
        Self::check_not_paused(&env)?;
        let depository = Self::depository(&env)?;
        Self::load_notes(
            &env,
            &depository,
            &owner,
            FetchCategory::Notes,
            DataKey::Notes(owner.clone()),
        )
    }

    /// Fetch one holder's purchase notes from the legacy depository. When
    /// no legacy depository is configured this fulfills with an empty set.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `ContractPaused`: Contract is paused
    pub fn refresh_old_notes(env: Env, owner: Address) -> Result<u32, Error> {
        Self::check_not_paused(&env)?;
        Self::depository(&env)?;

        match env
            .storage()
            .instance()
            .get::<DataKey, Address>(&DataKey::LegacyDepository)
        {
            Some(legacy) => Self::load_notes(
                &env,
                &legacy,
                &owner,
                FetchCategory::OldNotes,
                DataKey::OldNotes(owner.clone()),
            ),
            None => {
                let empty: Vec<UserNote> = vec![&env];
                env.storage()
                    .instance()
                    .set(&DataKey::OldNotes(owner.clone()), &empty);
                Self::set_status(&env, FetchCategory::OldNotes, FetchState::Fulfilled);
                Ok(0)
            }
        }
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// Get the derived record for one market.
    pub fn bond(env: Env, index: u32) -> Result<DerivedBond, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Bond(index))
            .ok_or(Error::BondNotFound)
    }

    /// Get the full derived snapshot.
    pub fn bonds(env: Env) -> Vec<DerivedBond> {
        let indexes: Vec<u32> = env
            .storage()
            .instance()
            .get(&DataKey::BondIndexes)
            .unwrap_or(vec![&env]);
        let mut out: Vec<DerivedBond> = vec![&env];
        for index in indexes.iter() {
            if let Some(record) = env
                .storage()
                .instance()
                .get::<DataKey, DerivedBond>(&DataKey::Bond(index))
            {
                out.push_back(record);
            }
        }
        out
    }

    /// Market indices in the current snapshot.
    pub fn bond_indexes(env: Env) -> Vec<u32> {
        env.storage()
            .instance()
            .get(&DataKey::BondIndexes)
            .unwrap_or(vec![&env])
    }

    /// Last fetched balance record; zeros when never fetched.
    pub fn balance_of(env: Env, token: Address, owner: Address) -> BalanceRecord {
        env.storage()
            .instance()
            .get(&DataKey::Balance(token, owner))
            .unwrap_or(BalanceRecord {
                balance: 0,
                allowance: 0,
                updated_at: 0,
            })
    }

    /// Last fetched purchase notes for a holder.
    pub fn notes_of(env: Env, owner: Address) -> Vec<UserNote> {
        env.storage()
            .instance()
            .get(&DataKey::Notes(owner))
            .unwrap_or(vec![&env])
    }

    /// Last fetched legacy purchase notes for a holder.
    pub fn old_notes_of(env: Env, owner: Address) -> Vec<UserNote> {
        env.storage()
            .instance()
            .get(&DataKey::OldNotes(owner))
            .unwrap_or(vec![&env])
    }

    /// Registry lookup for a quote token.
    pub fn quote_asset(env: Env, token: Address) -> QuoteAsset {
        Self::quote_lookup(&env, &token)
    }

    /// Status of one fetch category. Categories are tracked independently.
    pub fn fetch_status(env: Env, category: FetchCategory) -> FetchStatus {
        env.storage()
            .instance()
            .get(&DataKey::Status(category))
            .unwrap_or(FetchStatus {
                state: FetchState::Never,
                updated_at: 0,
            })
    }

    /// Whether the market snapshot is due for a refresh.
    pub fn needs_refresh(env: Env) -> bool {
        let status = Self::fetch_status(env.clone(), FetchCategory::Markets);
        if status.state == FetchState::Never {
            return true;
        }
        let interval: u64 = env
            .storage()
            .instance()
            .get(&DataKey::RefreshInterval)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL);
        env.ledger().timestamp().saturating_sub(status.updated_at) >= interval
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn check_not_paused(env: &Env) -> Result<(), Error> {
        let paused = env
            .storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Paused)
            .unwrap_or(false);

        if paused {
            return Err(Error::ContractPaused);
        }
        Ok(())
    }

    fn depository(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Depository)
            .ok_or(Error::NotInitialized)
    }

    fn price_feed(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::PriceFeed)
            .ok_or(Error::NotInitialized)
    }

    fn base_token(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::BaseToken)
            .ok_or(Error::NotInitialized)
    }

    fn oracle_integrated(env: &Env) -> bool {
        env.storage()
            .instance()
            .get(&DataKey::OracleIntegrated)
            .unwrap_or(false)
    }

    /// Base token USD price, served through the per-id feed cache so one
    /// quote covers a whole refresh pass.
    fn base_usd(env: &Env) -> Option<i128> {
        let feed: Address = env.storage().instance().get(&DataKey::PriceFeed)?;
        let id: Symbol = env.storage().instance().get(&DataKey::BaseFeedId)?;
        fetch::feed_price(env, &feed, &id)
    }

    fn quote_lookup(env: &Env, token: &Address) -> QuoteAsset {
        match env
            .storage()
            .instance()
            .get::<DataKey, QuoteAssetInfo>(&DataKey::QuoteAsset(token.clone()))
        {
            Some(info) => QuoteAsset::Known(info),
            None => QuoteAsset::Unknown,
        }
    }

    fn set_status(env: &Env, category: FetchCategory, state: FetchState) {
        let status = FetchStatus {
            state,
            updated_at: env.ledger().timestamp(),
        };
        env.storage()
            .instance()
            .set(&DataKey::Status(category), &status);
    }

    fn reject_markets(env: &Env, reason: &str) -> RefreshSummary {
        Self::set_status(env, FetchCategory::Markets, FetchState::Rejected);
        env.events().publish(
            (Symbol::new(env, "refresh_failed"),),
            RefreshFailedEvent {
                category: FetchCategory::Markets,
                reason: Symbol::new(env, reason),
            },
        );
        RefreshSummary {
            refreshed: 0,
            skipped: 0,
        }
    }

    /// Fetch one market's bundle and derive its record. `None` skips the
    /// market: fetch failure, resolver failure, or derivation overflow.
    fn fetch_and_derive(
        env: &Env,
        ctx: &PriceContext,
        index: u32,
        now: u64,
    ) -> Option<DerivedBond> {
        let market = fetch::market(env, ctx.depository, index)?;
        let metadata = fetch::metadata(env, ctx.depository, index)?;
        let terms = fetch::terms(env, ctx.depository, index)?;
        let clearing = fetch::clearing_price(env, ctx.depository, index)?;

        let quote = Self::quote_lookup(env, &market.quote_token);
        let resolved = match &quote {
            QuoteAsset::Known(info) => {
                oracle::resolve(env, ctx, index, info, metadata.quote_decimals).ok()?
            }
            // Unregistered quote token: degraded placeholder pricing.
            QuoteAsset::Unknown => ResolvedPrice {
                reference: ONE,
                quote_usd: ONE,
            },
        };

        derive::derive_bond(
            env,
            &market,
            &metadata,
            &terms,
            &quote,
            clearing,
            &resolved,
            ctx.oracle_integrated,
            now,
        )
    }

    fn load_notes(
        env: &Env,
        depository: &Address,
        owner: &Address,
        category: FetchCategory,
        key: DataKey,
    ) -> Result<u32, Error> {
        let now = env.ledger().timestamp();

        let raw = match fetch::notes_for(env, depository, owner) {
            Some(list) => list,
            None => {
                Self::set_status(env, category.clone(), FetchState::Rejected);
                env.events().publish(
                    (Symbol::new(env, "refresh_failed"),),
                    RefreshFailedEvent {
                        category,
                        reason: Symbol::new(env, "depository"),
                    },
                );
                return Ok(0);
            }
        };

        let mut notes: Vec<UserNote> = vec![env];
        for note in raw.iter() {
            notes.push_back(UserNote {
                market_id: note.market_id,
                payout: note.payout,
                created: note.created,
                matured: note.matured,
                fully_matured: note.matured <= now,
                // Notes mature at an absolute timestamp.
                time_left: duration::prettify_seconds(env, note.matured.saturating_sub(now)),
            });
        }
        let count = notes.len();
        env.storage().instance().set(&key, &notes);
        Self::set_status(env, category, FetchState::Fulfilled);

        env.events().publish(
            (Symbol::new(env, "notes_refreshed"), owner.clone()),
            NotesRefreshedEvent {
                owner: owner.clone(),
                count,
            },
        );

        Ok(count)
    }
}
