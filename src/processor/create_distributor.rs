//! Create the distributor
use bonfida_utils::{BorshSize, InstructionsAccount};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    program_option::COption,
    program_pack::Pack,
    pubkey::Pubkey,
    system_program,
};
use spl_token::state::Mint;

use crate::cpi::Cpi;
use crate::error::EmissionError;
use crate::schedule::validate_schedule;
use crate::state::{Distributor, TOKEN_DECIMALS};
use crate::utils::{
    assert_no_close_or_delegate, assert_uninitialized, check_account_key, check_account_owner,
    check_token_account,
};

#[derive(BorshDeserialize, BorshSerialize, BorshSize)]
/// The required parameters for the `create_distributor` instruction
pub struct Params {
    // Key allowed to run the privileged distributor operations
    pub authority: Pubkey,
}

#[derive(InstructionsAccount)]
/// The required accounts for the `create_distributor` instruction
pub struct Accounts<'a, T> {
    /// The distributor account
    #[cons(writable)]
    pub distributor: &'a T,

    /// The system program account
    pub system_program: &'a T,

    /// The fee payer account
    #[cons(writable, signer)]
    pub fee_payer: &'a T,

    /// The mint of the distributed token
    pub mint: &'a T,

    /// The token account receiving the scheduled mints
    pub custody: &'a T,
}

impl<'a, 'b: 'a> Accounts<'a, AccountInfo<'b>> {
    pub fn parse(accounts: &'a [AccountInfo<'b>]) -> Result<Self, ProgramError> {
        let accounts_iter = &mut accounts.iter();
        let accounts = Accounts {
            distributor: next_account_info(accounts_iter)?,
            system_program: next_account_info(accounts_iter)?,
            fee_payer: next_account_info(accounts_iter)?,
            mint: next_account_info(accounts_iter)?,
            custody: next_account_info(accounts_iter)?,
        };

        // Check keys
        check_account_key(
            accounts.system_program,
            &system_program::ID,
            EmissionError::WrongSystemProgram,
        )?;

        // Check ownership
        check_account_owner(
            accounts.distributor,
            &system_program::ID,
            EmissionError::WrongOwner,
        )?;
        check_account_owner(accounts.mint, &spl_token::ID, EmissionError::WrongMint)?;

        Ok(accounts)
    }
}

pub fn process_create_distributor(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    params: Params,
) -> ProgramResult {
    let accounts = Accounts::parse(accounts)?;
    let (derived_key, nonce) = Distributor::find_key(program_id);

    check_account_key(
        accounts.distributor,
        &derived_key,
        EmissionError::AccountNotDeterministic,
    )?;
    assert_uninitialized(accounts.distributor)?;
    validate_schedule()?;

    let mint = Mint::unpack(&accounts.mint.data.borrow())?;
    if mint.mint_authority != COption::Some(derived_key) || mint.decimals != TOKEN_DECIMALS {
        msg!("The distributor must be the mint authority of a {} decimals mint", TOKEN_DECIMALS);
        return Err(EmissionError::WrongMint.into());
    }
    let custody = check_token_account(accounts.custody, accounts.mint.key, &derived_key)?;
    assert_no_close_or_delegate(&custody)?;

    let state = Distributor::new(
        nonce,
        params.authority,
        *accounts.mint.key,
        *accounts.custody.key,
    );

    msg!("+ Creating distributor");
    Cpi::create_account(
        program_id,
        accounts.system_program,
        accounts.fee_payer,
        accounts.distributor,
        &[&program_id.to_bytes(), &[nonce]],
        Distributor::LEN,
    )?;

    state.save(&mut accounts.distributor.data.borrow_mut())?;

    Ok(())
}
