//! Pause or unpause the distributor or the registry
use bonfida_utils::{BorshSize, InstructionsAccount};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::authority::{Component, SignerAuthority};
use crate::error::EmissionError;
use crate::state::{Distributor, Registry, Tag};
use crate::utils::{check_account_owner, check_signer};
use crate::{distributor, registry};

#[derive(BorshDeserialize, BorshSerialize, BorshSize)]
pub struct Params {
    pub paused: bool,
}

#[derive(InstructionsAccount)]
pub struct Accounts<'a, T> {
    /// The authority of the component
    #[cons(signer)]
    pub authority: &'a T,

    /// The distributor or registry account
    #[cons(writable)]
    pub component: &'a T,
}

impl<'a, 'b: 'a> Accounts<'a, AccountInfo<'b>> {
    pub fn parse(
        accounts: &'a [AccountInfo<'b>],
        program_id: &Pubkey,
    ) -> Result<Self, ProgramError> {
        let accounts_iter = &mut accounts.iter();
        let accounts = Accounts {
            authority: next_account_info(accounts_iter)?,
            component: next_account_info(accounts_iter)?,
        };

        // Check ownership
        check_account_owner(accounts.component, program_id, EmissionError::WrongOwner)?;

        // Check signer
        check_signer(accounts.authority, EmissionError::AuthorityMustSign)?;

        Ok(accounts)
    }
}

pub fn process_admin_pause(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    params: Params,
) -> ProgramResult {
    let accounts = Accounts::parse(accounts, program_id)?;
    let caller = accounts.authority.key;
    let key = accounts.component.key;

    let tag = accounts.component.data.borrow().first().copied();
    let event = match tag {
        Some(t) if t == Tag::Distributor as u8 => {
            let mut state = Distributor::from_account_info(accounts.component)?;
            let authority = SignerAuthority::new(state.authority, Component::Distributor);
            let event = distributor::set_paused(&mut state, &authority, caller, key, params.paused)?;
            state.save(&mut accounts.component.data.borrow_mut())?;
            event
        }
        Some(t) if t == Tag::Registry as u8 => {
            let mut state = Registry::from_account_info(accounts.component)?;
            let authority = SignerAuthority::new(state.authority, Component::Registry);
            let event = registry::set_paused(&mut state, &authority, caller, key, params.paused)?;
            state.save(&mut accounts.component.data.borrow_mut())?;
            event
        }
        _ => return Err(EmissionError::DataTypeMismatch.into()),
    };

    event.emit()
}
