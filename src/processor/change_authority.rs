//! Change the authority of the distributor or the registry
use bonfida_utils::{BorshSize, InstructionsAccount};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::authority::{assert_authorized, Component, Operation, SignerAuthority};
use crate::error::EmissionError;
use crate::state::{Distributor, Registry, Tag};
use crate::utils::{check_account_owner, check_signer};

#[derive(BorshDeserialize, BorshSerialize, BorshSize)]
/// The required parameters for the `change_authority` instruction
pub struct Params {
    // The new authority
    pub new_authority: Pubkey,
}

#[derive(InstructionsAccount)]
/// The required accounts for the `change_authority` instruction
pub struct Accounts<'a, T> {
    /// The distributor or registry account
    #[cons(writable)]
    pub component: &'a T,

    /// The current authority
    #[cons(signer)]
    pub authority: &'a T,
}

impl<'a, 'b: 'a> Accounts<'a, AccountInfo<'b>> {
    pub fn parse(
        accounts: &'a [AccountInfo<'b>],
        program_id: &Pubkey,
    ) -> Result<Self, ProgramError> {
        let accounts_iter = &mut accounts.iter();
        let accounts = Accounts {
            component: next_account_info(accounts_iter)?,
            authority: next_account_info(accounts_iter)?,
        };

        // Check ownership
        check_account_owner(accounts.component, program_id, EmissionError::WrongOwner)?;

        // Check signer
        check_signer(accounts.authority, EmissionError::AuthorityMustSign)?;

        Ok(accounts)
    }
}

pub fn process_change_authority(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    params: Params,
) -> ProgramResult {
    let accounts = Accounts::parse(accounts, program_id)?;
    let caller = accounts.authority.key;

    let tag = accounts.component.data.borrow().first().copied();
    match tag {
        Some(t) if t == Tag::Distributor as u8 => {
            let mut state = Distributor::from_account_info(accounts.component)?;
            let authority = SignerAuthority::new(state.authority, Component::Distributor);
            assert_authorized(
                &authority,
                caller,
                Component::Distributor,
                Operation::ChangeAuthority,
            )?;
            state.authority = params.new_authority;
            state.save(&mut accounts.component.data.borrow_mut())?;
        }
        Some(t) if t == Tag::Registry as u8 => {
            let mut state = Registry::from_account_info(accounts.component)?;
            let authority = SignerAuthority::new(state.authority, Component::Registry);
            assert_authorized(
                &authority,
                caller,
                Component::Registry,
                Operation::ChangeAuthority,
            )?;
            state.authority = params.new_authority;
            state.save(&mut accounts.component.data.borrow_mut())?;
        }
        _ => return Err(EmissionError::DataTypeMismatch.into()),
    }
    msg!("+ Authority changed to {}", params.new_authority);

    Ok(())
}
