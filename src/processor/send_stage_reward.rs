//! Pay the reward of the current stage
use bonfida_utils::{BorshSize, InstructionsAccount};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::authority::{Component, SignerAuthority};
use crate::distributor::send_stage_reward;
use crate::error::EmissionError;
use crate::events::emit_all;
use crate::ledger::SplLedger;
use crate::state::Distributor;
use crate::utils::{check_account_key, check_account_owner, check_signer};

#[derive(BorshDeserialize, BorshSerialize, BorshSize)]
/// The required parameters for the `send_stage_reward` instruction
pub struct Params {}

#[derive(InstructionsAccount)]
/// The required accounts for the `send_stage_reward` instruction
pub struct Accounts<'a, T> {
    /// The distributor account
    #[cons(writable)]
    pub distributor: &'a T,

    /// The distributor authority
    #[cons(signer)]
    pub authority: &'a T,

    /// The custody token account
    #[cons(writable)]
    pub custody: &'a T,

    /// The Content recipient token account
    #[cons(writable)]
    pub content: &'a T,

    /// The DevInfra recipient token account
    #[cons(writable)]
    pub dev_infra: &'a T,

    /// The Treasury recipient token account
    #[cons(writable)]
    pub treasury: &'a T,

    /// The SPL token program account
    pub spl_token_program: &'a T,
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
            custody: next_account_info(accounts_iter)?,
            content: next_account_info(accounts_iter)?,
            dev_infra: next_account_info(accounts_iter)?,
            treasury: next_account_info(accounts_iter)?,
            spl_token_program: next_account_info(accounts_iter)?,
        };

        // Check keys
        check_account_key(
            accounts.spl_token_program,
            &spl_token::ID,
            EmissionError::WrongSplTokenProgramId,
        )?;

        // Check ownership
        check_account_owner(accounts.distributor, program_id, EmissionError::WrongOwner)?;
        check_account_owner(
            accounts.custody,
            &spl_token::ID,
            EmissionError::WrongTokenAccountOwner,
        )?;

        // Check signer
        check_signer(accounts.authority, EmissionError::AuthorityMustSign)?;

        Ok(accounts)
    }
}

pub fn process_send_stage_reward(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    _params: Params,
) -> ProgramResult {
    let accounts = Accounts::parse(accounts, program_id)?;
    let mut distributor = Distributor::from_account_info(accounts.distributor)?;

    check_account_key(
        accounts.custody,
        &distributor.custody,
        EmissionError::WrongCustody,
    )?;
    if distributor.recipients.is_configured() {
        let recipients = distributor.recipients;
        check_account_key(accounts.content, &recipients.content, EmissionError::WrongRecipient)?;
        check_account_key(
            accounts.dev_infra,
            &recipients.dev_infra,
            EmissionError::WrongRecipient,
        )?;
        check_account_key(
            accounts.treasury,
            &recipients.treasury,
            EmissionError::WrongRecipient,
        )?;
    }

    let authority = SignerAuthority::new(distributor.authority, Component::Distributor);
    let program_key = program_id.to_bytes();
    let nonce = [distributor.signer_nonce];
    let signer_seeds: &[&[u8]] = &[&program_key, &nonce];
    let mut ledger = SplLedger::new(
        accounts.spl_token_program,
        accounts.distributor,
        signer_seeds,
        vec![
            accounts.custody,
            accounts.content,
            accounts.dev_infra,
            accounts.treasury,
        ],
    );

    msg!("+ Sending reward of stage {}", distributor.current_stage);
    let events = send_stage_reward(
        &mut distributor,
        &authority,
        accounts.authority.key,
        &mut ledger,
        |d| d.save(&mut accounts.distributor.data.borrow_mut()),
    )?;

    distributor.save(&mut accounts.distributor.data.borrow_mut())?;
    emit_all(&events)
}
