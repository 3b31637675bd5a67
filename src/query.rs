//! Read-only views over registry accounts
//!
//! Readers take a `fetch` closure returning the raw data of an account, so
//! they run the same against an RPC client, a banks client or a test map.
use borsh::BorshDeserialize;
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::state::{Holder, Position, PositionToken, Registry, Role, Tag};

/// One position of a staker
#[derive(Debug, PartialEq, Clone)]
pub struct AssetData {
    pub token_id: u64,
    pub creation_stage: i8,
    pub role: Role,
    pub locked_amount: u64,
}

fn decode<T: BorshDeserialize>(data: &[u8], tag: Tag) -> Option<T> {
    match data.first() {
        Some(t) if *t == tag as u8 => T::deserialize(&mut &data[..]).ok(),
        _ => None,
    }
}

pub fn load_registry(data: &[u8]) -> Result<Registry, ProgramError> {
    decode(data, Tag::Registry).ok_or(ProgramError::InvalidAccountData)
}

fn load_token<F>(token_id: u64, program_id: &Pubkey, fetch: &mut F) -> Option<PositionToken>
where
    F: FnMut(&Pubkey) -> Option<Vec<u8>>,
{
    let (key, _) = PositionToken::find_key(token_id, program_id);
    decode(&fetch(&key)?, Tag::PositionToken)
}

/// Current holder of a live position token
pub fn owner_of<F>(token_id: u64, program_id: &Pubkey, mut fetch: F) -> Option<Pubkey>
where
    F: FnMut(&Pubkey) -> Option<Vec<u8>>,
{
    load_token(token_id, program_id, &mut fetch).map(|t| t.holder)
}

/// Number of position tokens held by `owner`
pub fn balance_of<F>(owner: &Pubkey, program_id: &Pubkey, mut fetch: F) -> u64
where
    F: FnMut(&Pubkey) -> Option<Vec<u8>>,
{
    let (key, _) = Holder::find_key(owner, program_id);
    fetch(&key)
        .and_then(|data| decode::<Holder>(&data, Tag::Holder))
        .map(|h| h.balance)
        .unwrap_or_default()
}

/// Every live position whose token is currently held by `staker`, in token
/// id order.
///
/// Scans all issued token ids, burned tokens are skipped.
pub fn get_assets_data<F>(
    registry: &Registry,
    staker: &Pubkey,
    program_id: &Pubkey,
    mut fetch: F,
) -> Vec<AssetData>
where
    F: FnMut(&Pubkey) -> Option<Vec<u8>>,
{
    let mut assets = Vec::new();
    for token_id in 1..=registry.tokens_issued {
        let token = match load_token(token_id, program_id, &mut fetch) {
            Some(t) if t.holder == *staker => t,
            _ => continue,
        };
        let (position_key, _) = Position::find_key(&token.position_key(), program_id);
        let position = match fetch(&position_key).and_then(|d| decode::<Position>(&d, Tag::Position)) {
            Some(p) if p.token_id == token_id => p,
            _ => continue,
        };
        assets.push(AssetData {
            token_id,
            creation_stage: token.creation_stage,
            role: token.role,
            locked_amount: position.locked_amount,
        });
    }
    assets
}
