//! Fungible token ledger used by the distributor and the registry
use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, program::invoke_signed,
    program_error::ProgramError, program_option::COption, program_pack::Pack, pubkey::Pubkey,
};
use spl_token::instruction::{mint_to, transfer};
use spl_token::state::Account;

use crate::error::EmissionError;

/// Balances and transfers of the distributed token.
///
/// Accounts are token accounts identified by key. Outgoing transfers are
/// authorized by the component owning the ledger handle: `transfer` moves
/// funds out of an account the component owns, `transfer_from` spends an
/// allowance granted to the component.
pub trait FungibleLedger {
    fn mint(&mut self, to: &Pubkey, amount: u64) -> ProgramResult;

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> ProgramResult;

    fn transfer_from(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> ProgramResult;

    fn balance_of(&self, account: &Pubkey) -> Result<u64, ProgramError>;

    /// Amount of `account` the component is allowed to spend
    fn allowance(&self, account: &Pubkey) -> Result<u64, ProgramError>;
}

/// SPL token implementation, every call is a CPI signed by a program address
pub struct SplLedger<'a, 'b: 'a> {
    spl_token_program: &'a AccountInfo<'b>,
    mint: Option<&'a AccountInfo<'b>>,
    authority: &'a AccountInfo<'b>,
    signer_seeds: &'a [&'a [u8]],
    accounts: Vec<&'a AccountInfo<'b>>,
}

impl<'a, 'b: 'a> SplLedger<'a, 'b> {
    pub fn new(
        spl_token_program: &'a AccountInfo<'b>,
        authority: &'a AccountInfo<'b>,
        signer_seeds: &'a [&'a [u8]],
        accounts: Vec<&'a AccountInfo<'b>>,
    ) -> Self {
        Self {
            spl_token_program,
            mint: None,
            authority,
            signer_seeds,
            accounts,
        }
    }

    pub fn with_mint(mut self, mint: &'a AccountInfo<'b>) -> Self {
        self.mint = Some(mint);
        self
    }

    fn account(&self, key: &Pubkey) -> Result<&'a AccountInfo<'b>, ProgramError> {
        self.accounts
            .iter()
            .find(|a| a.key == key)
            .copied()
            .ok_or_else(|| EmissionError::MissingLedgerAccount.into())
    }

    fn unpack(&self, key: &Pubkey) -> Result<Account, ProgramError> {
        let account = self.account(key)?;
        Account::unpack(&account.data.borrow())
    }

    fn signed_transfer(&self, from: &Pubkey, to: &Pubkey, amount: u64) -> ProgramResult {
        let from = self.account(from)?;
        let to = self.account(to)?;
        let transfer_instruction = transfer(
            &spl_token::ID,
            from.key,
            to.key,
            self.authority.key,
            &[],
            amount,
        )?;
        invoke_signed(
            &transfer_instruction,
            &[
                self.spl_token_program.clone(),
                from.clone(),
                to.clone(),
                self.authority.clone(),
            ],
            &[self.signer_seeds],
        )
    }
}

impl<'a, 'b: 'a> FungibleLedger for SplLedger<'a, 'b> {
    fn mint(&mut self, to: &Pubkey, amount: u64) -> ProgramResult {
        let mint = self.mint.ok_or(EmissionError::MissingLedgerAccount)?;
        let to = self.account(to)?;
        let mint_instruction = mint_to(
            &spl_token::ID,
            mint.key,
            to.key,
            self.authority.key,
            &[],
            amount,
        )?;
        invoke_signed(
            &mint_instruction,
            &[
                self.spl_token_program.clone(),
                mint.clone(),
                to.clone(),
                self.authority.clone(),
            ],
            &[self.signer_seeds],
        )
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> ProgramResult {
        self.signed_transfer(from, to, amount)
    }

    // The authority is the SPL delegate of `from`
    fn transfer_from(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> ProgramResult {
        self.signed_transfer(from, to, amount)
    }

    fn balance_of(&self, account: &Pubkey) -> Result<u64, ProgramError> {
        Ok(self.unpack(account)?.amount)
    }

    fn allowance(&self, account: &Pubkey) -> Result<u64, ProgramError> {
        let acc = self.unpack(account)?;
        match acc.delegate {
            COption::Some(delegate) if delegate == *self.authority.key => Ok(acc.delegated_amount),
            _ => Ok(0),
        }
    }
}
