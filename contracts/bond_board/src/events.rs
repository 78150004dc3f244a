use crate::storage::FetchCategory;
use soroban_sdk::{contracttype, Address, Symbol};

#[contracttype]
#[derive(Clone, Debug)]
pub struct BondsRefreshedEvent {
    pub refreshed: u32,
    pub skipped: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct BondRefreshedEvent {
    pub index: u32,
    pub price_in_quote: i128,
    pub discount: i128,
    pub sold_out: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct MarketSkippedEvent {
    pub index: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RefreshFailedEvent {
    pub category: FetchCategory,
    pub reason: Symbol,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct BalanceRefreshedEvent {
    pub token: Address,
    pub owner: Address,
    pub balance: i128,
    pub allowance: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct NotesRefreshedEvent {
    pub owner: Address,
    pub count: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct QuoteAssetRegisteredEvent {
    pub token: Address,
    pub is_lp: bool,
}
