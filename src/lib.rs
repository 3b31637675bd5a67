use solana_program::declare_id;

pub mod entrypoint;
pub mod error;
pub mod instruction;
pub mod state;

pub mod authority;
pub mod distributor;
pub mod events;
pub mod ledger;
pub mod query;
pub mod registry;
pub mod schedule;

pub(crate) mod processor;
pub mod utils;

pub mod cpi;

declare_id!("4ksiMqV5i5NRnZx2hQhsqM5Kun6KBgHs43psyGFbtfYD");
