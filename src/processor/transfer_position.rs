//! Hand a position token over to another key
use bonfida_utils::{BorshSize, InstructionsAccount};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::error::EmissionError;
use crate::registry::transfer_position;
use crate::state::{PositionToken, Registry};
use crate::utils::{check_account_key, check_account_owner, check_signer, credit_holder, debit_holder};

#[derive(BorshDeserialize, BorshSerialize, BorshSize)]
/// The required parameters for the `transfer_position` instruction
pub struct Params {
    pub token_id: u64,
    pub new_holder: Pubkey,
}

#[derive(InstructionsAccount)]
/// The required accounts for the `transfer_position` instruction
pub struct Accounts<'a, T> {
    /// The registry account
    pub registry: &'a T,

    /// The position token account
    #[cons(writable)]
    pub position_token: &'a T,

    /// The current holder of the position token
    #[cons(writable, signer)]
    pub caller: &'a T,

    /// The holder account of the caller
    #[cons(writable)]
    pub caller_holder: &'a T,

    /// The holder account of the new holder
    #[cons(writable)]
    pub new_holder_holder: &'a T,

    /// The system program account
    pub system_program: &'a T,
}

impl<'a, 'b: 'a> Accounts<'a, AccountInfo<'b>> {
    pub fn parse(
        accounts: &'a [AccountInfo<'b>],
        program_id: &Pubkey,
    ) -> Result<Self, ProgramError> {
        let accounts_iter = &mut accounts.iter();
        let accounts = Accounts {
            registry: next_account_info(accounts_iter)?,
            position_token: next_account_info(accounts_iter)?,
            caller: next_account_info(accounts_iter)?,
            caller_holder: next_account_info(accounts_iter)?,
            new_holder_holder: next_account_info(accounts_iter)?,
            system_program: next_account_info(accounts_iter)?,
        };

        // Check keys
        check_account_key(
            accounts.system_program,
            &system_program::ID,
            EmissionError::WrongSystemProgram,
        )?;

        // Check ownership
        check_account_owner(accounts.registry, program_id, EmissionError::WrongOwner)?;

        // Check signer
        check_signer(accounts.caller, EmissionError::CallerMustSign)?;

        Ok(accounts)
    }
}

pub fn process_transfer_position(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    params: Params,
) -> ProgramResult {
    let accounts = Accounts::parse(accounts, program_id)?;
    let Params {
        token_id,
        new_holder,
    } = params;

    let registry = Registry::from_account_info(accounts.registry)?;
    let (token_address, _) = PositionToken::find_key(token_id, program_id);
    check_account_key(
        accounts.position_token,
        &token_address,
        EmissionError::AccountNotDeterministic,
    )?;
    if accounts.position_token.data_is_empty() {
        return Err(EmissionError::PositionNotFound.into());
    }
    check_account_owner(accounts.position_token, program_id, EmissionError::WrongOwner)?;
    let mut token = PositionToken::from_account_info(accounts.position_token)?;

    let event = transfer_position(&registry, &mut token, accounts.caller.key, &new_holder)?;

    if new_holder != *accounts.caller.key {
        debit_holder(program_id, accounts.caller_holder, accounts.caller.key)?;
        credit_holder(
            program_id,
            accounts.system_program,
            accounts.caller,
            accounts.new_holder_holder,
            &new_holder,
        )?;
    }
    token.save(&mut accounts.position_token.data.borrow_mut())?;

    event.emit()
}
