use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-5)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // FETCH ERRORS (20-29)
    // ============================================
    /// No derived record stored for this market index
    BondNotFound = 20,
    /// Single-market fetch failed against the depository
    MarketUnavailable = 21,
    /// Oracle view call failed or returned a non-positive price
    OracleUnavailable = 22,
    /// Pool reserve/supply read failed or pool is empty
    PoolUnavailable = 23,
    /// Neither pool reserve matches the protocol base token
    PoolMismatch = 24,
    /// Base-token USD quote unavailable and no cached value
    PriceFeedUnavailable = 25,

    // ============================================
    // AMOUNT/CONFIG ERRORS (40-49)
    // ============================================
    /// Derivation arithmetic overflowed
    AmountOverflow = 40,
    /// Clearing or reference price must be positive
    InvalidPrice = 41,
    /// Refresh interval must be positive
    InvalidInterval = 42,

    // ============================================
    // OPERATIONAL ERRORS (60-69)
    // ============================================
    /// Contract is paused
    ContractPaused = 60,
}
