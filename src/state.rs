use bonfida_utils::BorshSize;
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::account_info::AccountInfo;
use solana_program::entrypoint::ProgramResult;
use solana_program::program_error::ProgramError;
use solana_program::pubkey::Pubkey;

use crate::error::EmissionError;

pub const TOKEN_DECIMALS: u8 = 6;
pub const TOKEN_DECIMALS_MULTIPLIER: u64 = 1_000_000;

/// Stage value before genesis
pub const UNINITIALIZED_STAGE: i8 = -1;
/// Terminal stage, no advance goes past it
pub const MAX_STAGE: i8 = 10;

/// Number of stages a position stays locked
pub const REDEMPTION_COOLDOWN: i8 = 2;

pub const MINIMUM_STAKE_AMOUNT: u64 = 10 * TOKEN_DECIMALS_MULTIPLIER;

#[derive(BorshSerialize, BorshDeserialize, BorshSize, PartialEq, Debug, Clone, Copy)]
pub enum Tag {
    Uninitialized,
    Distributor,
    Registry,
    Position,
    PositionToken,
    Holder,
    Deleted,
}

/// Role category recorded on a position
#[derive(BorshSerialize, BorshDeserialize, BorshSize, PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[repr(u8)]
pub enum Role {
    /// Reserved, forced whenever the caller stakes for itself
    SelfStaker,
    User,
    Creator,
}

fn load<T: BorshDeserialize>(a: &AccountInfo, tag: Tag) -> Result<T, ProgramError> {
    let data = a.data.borrow();
    if data.is_empty() || data[0] != tag as u8 {
        return Err(EmissionError::DataTypeMismatch.into());
    }
    T::deserialize(&mut &data[..]).map_err(|_| ProgramError::InvalidAccountData)
}

fn store<T: BorshSerialize>(state: &T, mut dst: &mut [u8]) -> ProgramResult {
    state
        .serialize(&mut dst)
        .map_err(|_| ProgramError::AccountDataTooSmall)
}

#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq, Clone, Copy, Default)]
pub struct Recipients {
    // Token account of the Content recipient
    pub content: Pubkey,

    // Token account of the Development-Infrastructure recipient
    pub dev_infra: Pubkey,

    // Token account of the Treasury
    pub treasury: Pubkey,
}

impl Recipients {
    pub fn is_configured(&self) -> bool {
        let null = Pubkey::default();
        self.content != null && self.dev_infra != null && self.treasury != null
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq, Clone)]
pub struct Distributor {
    // Tag
    pub tag: Tag,

    // Distributor signer nonce
    pub signer_nonce: u8,

    // The key allowed to run privileged operations
    pub authority: Pubkey,

    // Mint of the distributed token, the distributor is its mint authority
    pub token_mint: Pubkey,

    // Token account holding minted but undistributed funds
    pub custody: Pubkey,

    // Current stage, from -1 to MAX_STAGE
    pub current_stage: i8,

    // Last stage whose scheduled mint happened
    pub last_minted_stage: i8,

    // Bit `stage + 1` is set once the reward of `stage` was sent
    pub rewards_sent: u16,

    pub recipients: Recipients,

    pub paused: bool,

    // Set while an external ledger call is in flight
    pub entered: bool,
}

impl Distributor {
    pub const LEN: usize = 1 + 1 + 32 + 32 + 32 + 1 + 1 + 2 + 3 * 32 + 1 + 1;

    pub fn new(signer_nonce: u8, authority: Pubkey, token_mint: Pubkey, custody: Pubkey) -> Self {
        Self {
            tag: Tag::Distributor,
            signer_nonce,
            authority,
            token_mint,
            custody,
            current_stage: UNINITIALIZED_STAGE,
            last_minted_stage: UNINITIALIZED_STAGE,
            // Nothing to pay before genesis
            rewards_sent: 1,
            recipients: Recipients::default(),
            paused: false,
            entered: false,
        }
    }

    pub fn find_key(program_id: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[&program_id.to_bytes()], program_id)
    }

    pub fn save(&self, dst: &mut [u8]) -> ProgramResult {
        store(self, dst)
    }

    pub fn from_account_info(a: &AccountInfo) -> Result<Distributor, ProgramError> {
        load(a, Tag::Distributor)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq, Clone)]
pub struct Registry {
    // Tag
    pub tag: Tag,

    // Registry signer nonce
    pub signer_nonce: u8,

    // The key allowed to run privileged operations
    pub authority: Pubkey,

    // The distributor whose stage is used as the time base
    pub distributor: Pubkey,

    pub token_mint: Pubkey,

    // Token account holding the locked funds
    pub vault: Pubkey,

    // Number of position tokens ever issued, ids go from 1 to `tokens_issued`
    pub tokens_issued: u64,

    pub paused: bool,

    pub entered: bool,
}

impl Registry {
    pub const SEED: &'static [u8] = b"registry";
    pub const LEN: usize = 1 + 1 + 32 + 32 + 32 + 32 + 8 + 1 + 1;

    pub fn new(
        signer_nonce: u8,
        authority: Pubkey,
        distributor: Pubkey,
        token_mint: Pubkey,
        vault: Pubkey,
    ) -> Self {
        Self {
            tag: Tag::Registry,
            signer_nonce,
            authority,
            distributor,
            token_mint,
            vault,
            tokens_issued: 0,
            paused: false,
            entered: false,
        }
    }

    pub fn find_key(program_id: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[Registry::SEED], program_id)
    }

    pub fn save(&self, dst: &mut [u8]) -> ProgramResult {
        store(self, dst)
    }

    pub fn from_account_info(a: &AccountInfo) -> Result<Registry, ProgramError> {
        load(a, Tag::Registry)
    }
}

/// Locked funds aggregated under one position key
#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq, Clone)]
pub struct Position {
    pub tag: Tag,

    // Token authorizing redemption
    pub token_id: u64,

    // Sum of every deposit made under the key
    pub locked_amount: u64,
}

impl Position {
    pub const SEED: &'static [u8] = b"position";
    pub const LEN: usize = 1 + 8 + 8;

    pub fn new(token_id: u64, locked_amount: u64) -> Self {
        Self {
            tag: Tag::Position,
            token_id,
            locked_amount,
        }
    }

    pub fn find_key(position_key: &[u8; 32], program_id: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[Position::SEED, position_key], program_id)
    }

    pub fn deposit(&mut self, amount: u64) -> ProgramResult {
        self.locked_amount = self
            .locked_amount
            .checked_add(amount)
            .ok_or(EmissionError::Overflow)?;
        Ok(())
    }

    pub fn close(&mut self) {
        self.tag = Tag::Deleted
    }

    pub fn save(&self, dst: &mut [u8]) -> ProgramResult {
        store(self, dst)
    }

    pub fn from_account_info(a: &AccountInfo) -> Result<Position, ProgramError> {
        load(a, Tag::Position)
    }
}

/// Ownership record of a position
#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq, Clone)]
pub struct PositionToken {
    pub tag: Tag,

    pub token_id: u64,

    // Current holder, the only key allowed to redeem or transfer
    pub holder: Pubkey,

    // Staker the position was opened for
    pub staker: Pubkey,

    pub role: Role,

    pub creation_stage: i8,
}

impl PositionToken {
    pub const SEED: &'static [u8] = b"position_token";
    pub const LEN: usize = 1 + 8 + 32 + 32 + 1 + 1;

    pub fn new(token_id: u64, staker: Pubkey, role: Role, creation_stage: i8) -> Self {
        Self {
            tag: Tag::PositionToken,
            token_id,
            holder: staker,
            staker,
            role,
            creation_stage,
        }
    }

    pub fn find_key(token_id: u64, program_id: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[PositionToken::SEED, &token_id.to_le_bytes()],
            program_id,
        )
    }

    pub fn close(&mut self) {
        self.tag = Tag::Deleted
    }

    pub fn save(&self, dst: &mut [u8]) -> ProgramResult {
        store(self, dst)
    }

    pub fn from_account_info(a: &AccountInfo) -> Result<PositionToken, ProgramError> {
        load(a, Tag::PositionToken)
    }
}

/// Number of position tokens held by a key
#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq, Clone)]
pub struct Holder {
    pub tag: Tag,
    pub owner: Pubkey,
    pub balance: u64,
}

impl Holder {
    pub const SEED: &'static [u8] = b"holder";
    pub const LEN: usize = 1 + 32 + 8;

    pub fn new(owner: Pubkey) -> Self {
        Self {
            tag: Tag::Holder,
            owner,
            balance: 0,
        }
    }

    pub fn find_key(owner: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[Holder::SEED, &owner.to_bytes()], program_id)
    }

    pub fn receive(&mut self) -> ProgramResult {
        self.balance = self
            .balance
            .checked_add(1)
            .ok_or(EmissionError::Overflow)?;
        Ok(())
    }

    pub fn release(&mut self) -> ProgramResult {
        self.balance = self
            .balance
            .checked_sub(1)
            .ok_or(EmissionError::HolderBalanceUnderflow)?;
        Ok(())
    }

    pub fn save(&self, dst: &mut [u8]) -> ProgramResult {
        store(self, dst)
    }

    pub fn from_account_info(a: &AccountInfo) -> Result<Holder, ProgramError> {
        load(a, Tag::Holder)
    }
}
