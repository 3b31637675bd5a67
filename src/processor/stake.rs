//! Lock tokens into a position
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
use crate::ledger::SplLedger;
use crate::registry::{derive_position_key, effective_role, stake, StakeOutcome, StakeRequest};
use crate::state::{Distributor, Position, PositionToken, Registry, Role};
use crate::utils::{
    check_account_key, check_account_owner, check_signer, check_token_account, credit_holder,
};

#[derive(BorshDeserialize, BorshSerialize, BorshSize)]
/// The required parameters for the `stake` instruction
pub struct Params {
    // Key the position is opened for
    pub staker: Pubkey,
    // Ignored when staking for oneself
    pub role: Role,
    // Amount to lock
    pub amount: u64,
}

#[derive(InstructionsAccount)]
/// The required accounts for the `stake` instruction
pub struct Accounts<'a, T> {
    /// The registry account
    #[cons(writable)]
    pub registry: &'a T,

    /// The distributor account
    pub distributor: &'a T,

    /// The position account of the (stage, role, staker) key
    #[cons(writable)]
    pub position: &'a T,

    /// The position token issued if the position is new
    #[cons(writable)]
    pub position_token: &'a T,

    /// The holder account of the staker
    #[cons(writable)]
    pub holder: &'a T,

    /// The caller, owner of the source account
    #[cons(writable, signer)]
    pub caller: &'a T,

    /// The source token account, delegated to the registry
    #[cons(writable)]
    pub source: &'a T,

    /// The registry vault
    #[cons(writable)]
    pub vault: &'a T,

    /// The system program account
    pub system_program: &'a T,

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
            registry: next_account_info(accounts_iter)?,
            distributor: next_account_info(accounts_iter)?,
            position: next_account_info(accounts_iter)?,
            position_token: next_account_info(accounts_iter)?,
            holder: next_account_info(accounts_iter)?,
            caller: next_account_info(accounts_iter)?,
            source: next_account_info(accounts_iter)?,
            vault: next_account_info(accounts_iter)?,
            system_program: next_account_info(accounts_iter)?,
            spl_token_program: next_account_info(accounts_iter)?,
        };

        // Check keys
        check_account_key(
            accounts.system_program,
            &system_program::ID,
            EmissionError::WrongSystemProgram,
        )?;
        check_account_key(
            accounts.spl_token_program,
            &spl_token::ID,
            EmissionError::WrongSplTokenProgramId,
        )?;

        // Check ownership
        check_account_owner(accounts.registry, program_id, EmissionError::WrongOwner)?;
        check_account_owner(accounts.distributor, program_id, EmissionError::WrongOwner)?;
        check_account_owner(
            accounts.vault,
            &spl_token::ID,
            EmissionError::WrongTokenAccountOwner,
        )?;

        // Check signer
        check_signer(accounts.caller, EmissionError::CallerMustSign)?;

        Ok(accounts)
    }
}

pub fn process_stake(program_id: &Pubkey, accounts: &[AccountInfo], params: Params) -> ProgramResult {
    let accounts = Accounts::parse(accounts, program_id)?;
    let Params {
        staker,
        role,
        amount,
    } = params;

    let mut registry = Registry::from_account_info(accounts.registry)?;
    let distributor = Distributor::from_account_info(accounts.distributor)?;

    check_account_key(
        accounts.distributor,
        &registry.distributor,
        EmissionError::WrongDistributor,
    )?;
    check_account_key(accounts.vault, &registry.vault, EmissionError::WrongCustody)?;
    check_token_account(accounts.source, &registry.token_mint, accounts.caller.key)?;

    let stage = distributor.current_stage;
    let position_key = derive_position_key(
        stage,
        effective_role(accounts.caller.key, &staker, role),
        &staker,
    );
    let (position_address, position_nonce) = Position::find_key(&position_key, program_id);
    check_account_key(
        accounts.position,
        &position_address,
        EmissionError::AccountNotDeterministic,
    )?;
    let existing = if accounts.position.data_is_empty() {
        None
    } else {
        check_account_owner(accounts.position, program_id, EmissionError::WrongOwner)?;
        Some(Position::from_account_info(accounts.position)?)
    };

    let nonce = [registry.signer_nonce];
    let signer_seeds: &[&[u8]] = &[Registry::SEED, &nonce];
    let mut ledger = SplLedger::new(
        accounts.spl_token_program,
        accounts.registry,
        signer_seeds,
        vec![accounts.source, accounts.vault],
    );

    let request = StakeRequest {
        caller: *accounts.caller.key,
        source: *accounts.source.key,
        staker,
        role,
        amount,
    };
    let outcome = stake(
        &mut registry,
        stage,
        &request,
        existing,
        &mut ledger,
        |r| r.save(&mut accounts.registry.data.borrow_mut()),
    )?;
    registry.save(&mut accounts.registry.data.borrow_mut())?;

    match outcome {
        StakeOutcome::Merged { position, .. } => {
            msg!("+ Merged into position {}", position.token_id);
            position.save(&mut accounts.position.data.borrow_mut())?;
        }
        StakeOutcome::Created {
            key,
            position,
            token,
            event,
        } => {
            msg!("+ Creating position {}", token.token_id);
            Cpi::create_account(
                program_id,
                accounts.system_program,
                accounts.caller,
                accounts.position,
                &[Position::SEED, &key, &[position_nonce]],
                Position::LEN,
            )?;
            position.save(&mut accounts.position.data.borrow_mut())?;

            let (token_address, token_nonce) = PositionToken::find_key(token.token_id, program_id);
            check_account_key(
                accounts.position_token,
                &token_address,
                EmissionError::AccountNotDeterministic,
            )?;
            Cpi::create_account(
                program_id,
                accounts.system_program,
                accounts.caller,
                accounts.position_token,
                &[
                    PositionToken::SEED,
                    &token.token_id.to_le_bytes(),
                    &[token_nonce],
                ],
                PositionToken::LEN,
            )?;
            token.save(&mut accounts.position_token.data.borrow_mut())?;

            credit_holder(
                program_id,
                accounts.system_program,
                accounts.caller,
                accounts.holder,
                &staker,
            )?;
            event.emit()?;
        }
    }

    Ok(())
}
