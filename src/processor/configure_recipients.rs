//! Set the three reward recipients
use bonfida_utils::{BorshSize, InstructionsAccount};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::authority::{Component, SignerAuthority};
use crate::distributor::configure_recipients;
use crate::error::EmissionError;
use crate::state::{Distributor, Recipients};
use crate::utils::{check_account_owner, check_signer};

#[derive(BorshDeserialize, BorshSerialize, BorshSize)]
/// The required parameters for the `configure_recipients` instruction
pub struct Params {
    // Token account of the Content recipient
    pub content: Pubkey,
    // Token account of the DevInfra recipient
    pub dev_infra: Pubkey,
    // Token account of the Treasury recipient
    pub treasury: Pubkey,
}

#[derive(InstructionsAccount)]
/// The required accounts for the `configure_recipients` instruction
pub struct Accounts<'a, T> {
    /// The distributor account
    #[cons(writable)]
    pub distributor: &'a T,

    /// The distributor authority
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
            distributor: next_account_info(accounts_iter)?,
            authority: next_account_info(accounts_iter)?,
        };

        // Check ownership
        check_account_owner(accounts.distributor, program_id, EmissionError::WrongOwner)?;

        // Check signer
        check_signer(accounts.authority, EmissionError::AuthorityMustSign)?;

        Ok(accounts)
    }
}

pub fn process_configure_recipients(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    params: Params,
) -> ProgramResult {
    let accounts = Accounts::parse(accounts, program_id)?;
    let mut distributor = Distributor::from_account_info(accounts.distributor)?;
    let authority = SignerAuthority::new(distributor.authority, Component::Distributor);

    let Params {
        content,
        dev_infra,
        treasury,
    } = params;
    let event = configure_recipients(
        &mut distributor,
        &authority,
        accounts.authority.key,
        Recipients {
            content,
            dev_infra,
            treasury,
        },
    )?;

    distributor.save(&mut accounts.distributor.data.borrow_mut())?;
    event.emit()
}
