//! Create the position registry
use bonfida_utils::{BorshSize, InstructionsAccount};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::cpi::Cpi;
use crate::error::EmissionError;
use crate::state::{Distributor, Registry};
use crate::utils::{
    assert_no_close_or_delegate, assert_uninitialized, check_account_key, check_account_owner,
    check_token_account,
};

#[derive(BorshDeserialize, BorshSerialize, BorshSize)]
/// The required parameters for the `create_registry` instruction
pub struct Params {
    // Key allowed to pause the registry
    pub authority: Pubkey,
}

#[derive(InstructionsAccount)]
/// The required accounts for the `create_registry` instruction
pub struct Accounts<'a, T> {
    /// The registry account
    #[cons(writable)]
    pub registry: &'a T,

    /// The distributor account
    pub distributor: &'a T,

    /// The system program account
    pub system_program: &'a T,

    /// The fee payer account
    #[cons(writable, signer)]
    pub fee_payer: &'a T,

    /// The token account holding locked funds
    pub vault: &'a T,
}

impl<'a, 'b: 'a> Accounts<'a, AccountInfo<'b>> {
    pub fn parse(
        accounts: &'a [AccountInfo<'b>],
        program_id: &Pubkey,
    ) -> Result<Self, ProgramError> {
        let accounts_iter = &mut accounts.iter();
        let accounts = Accounts {
            registry: next_account_info(accounts_iter)?,
            distributor: next_account_info(accounts_iter)?,
            system_program: next_account_info(accounts_iter)?,
            fee_payer: next_account_info(accounts_iter)?,
            vault: next_account_info(accounts_iter)?,
        };

        // Check keys
        check_account_key(
            accounts.system_program,
            &system_program::ID,
            EmissionError::WrongSystemProgram,
        )?;

        // Check ownership
        check_account_owner(
            accounts.registry,
            &system_program::ID,
            EmissionError::WrongOwner,
        )?;
        check_account_owner(accounts.distributor, program_id, EmissionError::WrongOwner)?;

        Ok(accounts)
    }
}

pub fn process_create_registry(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    params: Params,
) -> ProgramResult {
    let accounts = Accounts::parse(accounts, program_id)?;
    let (derived_key, nonce) = Registry::find_key(program_id);

    check_account_key(
        accounts.registry,
        &derived_key,
        EmissionError::AccountNotDeterministic,
    )?;
    check_account_key(
        accounts.distributor,
        &Distributor::find_key(program_id).0,
        EmissionError::WrongDistributor,
    )?;
    assert_uninitialized(accounts.registry)?;

    let distributor = Distributor::from_account_info(accounts.distributor)?;
    let vault = check_token_account(accounts.vault, &distributor.token_mint, &derived_key)?;
    assert_no_close_or_delegate(&vault)?;

    let state = Registry::new(
        nonce,
        params.authority,
        *accounts.distributor.key,
        distributor.token_mint,
        *accounts.vault.key,
    );

    msg!("+ Creating registry");
    Cpi::create_account(
        program_id,
        accounts.system_program,
        accounts.fee_payer,
        accounts.registry,
        &[Registry::SEED, &[nonce]],
        Registry::LEN,
    )?;

    state.save(&mut accounts.registry.data.borrow_mut())?;

    Ok(())
}
