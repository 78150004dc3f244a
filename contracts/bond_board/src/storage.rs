use soroban_sdk::{contracttype, Address, String, Symbol};

// Constants
pub const BASE_DECIMALS: u32 = 18;
pub const ONE: i128 = 1_000_000_000_000_000_000; // 1.0 at 18 decimals
pub const SECONDS_PER_DAY: u64 = 86_400;
/// Markets older than this are considered stale and due for a refresh.
pub const DEFAULT_REFRESH_INTERVAL: u64 = 60;
/// Off-chain feed quotes are reused for 15 minutes per feed id.
pub const FEED_CACHE_TTL: u64 = 900;

/// Raw market state as read from the depository. One record per live market.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BondMarket {
    /// Market identifier, unique per depository.
    pub index: u32,
    /// Token the market accepts as payment.
    pub quote_token: Address,
    /// Remaining sale volume, in base or quote units (see `capacity_in_quote`).
    pub capacity: i128,
    /// Whether `capacity` is denominated in quote-token units.
    pub capacity_in_quote: bool,
    pub total_debt: i128,
    /// Largest single payout, always base-denominated.
    pub max_payout: i128,
    pub purchased: i128,
    pub sold: i128,
}

/// Depository bookkeeping for a market.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BondMetadata {
    pub quote_decimals: u32,
    pub last_tune: u64,
    pub last_decay: u64,
    pub length: u64,
    pub deposit_interval: u64,
    pub tune_interval: u64,
}

/// Sale terms for a market.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BondTerms {
    /// Fixed-term markets vest `vesting` seconds after purchase; the others
    /// run until the absolute `conclusion` timestamp.
    pub fixed_term: bool,
    pub vesting: u64,
    pub conclusion: u64,
    pub control_variable: i128,
    pub max_debt: i128,
}

/// How a registered quote token is priced.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QuoteKind {
    /// Stable asset priced by the feed entry with this id.
    Stable(Symbol),
    /// LP share priced from this pool's reserves.
    Lp(Address),
}

/// Registry entry for a quote token.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuoteAssetInfo {
    pub display_name: String,
    pub kind: QuoteKind,
}

/// Registry lookup result. An unregistered quote token degrades the market
/// to a placeholder record instead of failing the batch.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QuoteAsset {
    Known(QuoteAssetInfo),
    Unknown,
}

/// Fully-derived view of one market. Produced fresh on every refresh; never
/// partially updated.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DerivedBond {
    pub market: BondMarket,
    pub metadata: BondMetadata,
    pub terms: BondTerms,
    /// Display name of the quote token, "unknown" when unregistered.
    pub display_name: String,
    pub is_lp: bool,
    pub known_quote: bool,
    /// Clearing price after the oracle clamp, quote per base, 18 decimals.
    pub price_in_quote: i128,
    pub price_usd: i128,
    /// Reference fair value used for the discount, quote per base.
    pub market_price_in_quote: i128,
    /// Signed fraction at 18 decimals; negative when priced above reference.
    pub discount: i128,
    pub capacity_in_base: i128,
    pub capacity_in_quote_units: i128,
    pub max_payout_in_base: i128,
    pub max_payout_in_quote: i128,
    /// The binding constraint: min(capacity, max payout) per unit.
    pub payout_or_capacity_in_base: i128,
    pub payout_or_capacity_in_quote: i128,
    pub sold_out: bool,
    /// Remaining time, human readable ("3 days", "5h, 10min").
    pub duration: String,
    /// Absolute maturity timestamp.
    pub expiration: u64,
    pub fetched_at: u64,
}

/// Token balance and depository allowance for one holder.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BalanceRecord {
    pub balance: i128,
    pub allowance: i128,
    pub updated_at: u64,
}

/// A purchase note as the depository reports it.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawNote {
    pub market_id: u32,
    pub payout: i128,
    pub created: u64,
    pub matured: u64,
}

/// A purchase note with its derived display fields.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserNote {
    pub market_id: u32,
    pub payout: i128,
    pub created: u64,
    pub matured: u64,
    pub fully_matured: bool,
    /// Counts down to the note's absolute maturity timestamp.
    pub time_left: String,
}

/// Logical fetch categories with independent status tracking.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FetchCategory {
    Markets = 0,
    Balances = 1,
    Notes = 2,
    OldNotes = 3,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FetchState {
    /// Category never refreshed.
    Never = 0,
    Fulfilled = 1,
    Rejected = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FetchStatus {
    pub state: FetchState,
    pub updated_at: u64,
}

/// Result of a batch refresh.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefreshSummary {
    pub refreshed: u32,
    pub skipped: u32,
}

/// Cached feed quote, kept in temporary storage.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CachedPrice {
    pub price: i128,
    pub fetched_at: u64,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Admin,
    /// Bond depository contract address.
    Depository,
    /// Previous-generation depository, for old purchase notes.
    LegacyDepository,
    /// The protocol's base token.
    BaseToken,
    /// Off-chain USD price feed contract.
    PriceFeed,
    /// Feed id for the base token's USD price.
    BaseFeedId,
    /// Whether the depository exposes an integrated price oracle.
    OracleIntegrated,
    RefreshInterval,
    Paused,
    /// Pricing/display registry entry per quote token.
    QuoteAsset(Address),
    /// Indices of the current market snapshot.
    BondIndexes,
    /// Derived record per market index.
    Bond(u32),
    /// (token, holder) balance/allowance record.
    Balance(Address, Address),
    Notes(Address),
    OldNotes(Address),
    Status(FetchCategory),
    /// Temporary-storage feed cache, keyed by feed id.
    FeedCache(Symbol),
}
