//! Redeem a position and burn its token
use bonfida_utils::{BorshSize, InstructionsAccount};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::error::EmissionError;
use crate::ledger::SplLedger;
use crate::registry::redeem;
use crate::state::{Distributor, Position, PositionToken, Registry};
use crate::utils::{
    check_account_key, check_account_owner, check_signer, check_token_account, close_account,
    debit_holder,
};

#[derive(BorshDeserialize, BorshSerialize, BorshSize)]
/// The required parameters for the `burn` instruction
pub struct Params {
    // Position token to redeem
    pub token_id: u64,
}

#[derive(InstructionsAccount)]
/// The required accounts for the `burn` instruction
pub struct Accounts<'a, T> {
    /// The registry account
    #[cons(writable)]
    pub registry: &'a T,

    /// The distributor account
    pub distributor: &'a T,

    /// The position account
    #[cons(writable)]
    pub position: &'a T,

    /// The position token account
    #[cons(writable)]
    pub position_token: &'a T,

    /// The holder account of the caller
    #[cons(writable)]
    pub holder: &'a T,

    /// The holder of the position token
    #[cons(writable, signer)]
    pub caller: &'a T,

    /// The token account receiving the locked amount
    #[cons(writable)]
    pub destination: &'a T,

    /// The registry vault
    #[cons(writable)]
    pub vault: &'a T,

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
            destination: next_account_info(accounts_iter)?,
            vault: next_account_info(accounts_iter)?,
            spl_token_program: next_account_info(accounts_iter)?,
        };

        // Check keys
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

// Empty accounts stand for a position that does not exist
fn load_optional<T>(
    account: &AccountInfo,
    program_id: &Pubkey,
    load: fn(&AccountInfo) -> Result<T, ProgramError>,
) -> Result<Option<T>, ProgramError> {
    if account.data_is_empty() {
        return Ok(None);
    }
    check_account_owner(account, program_id, EmissionError::WrongOwner)?;
    load(account).map(Some)
}

pub fn process_burn(program_id: &Pubkey, accounts: &[AccountInfo], params: Params) -> ProgramResult {
    let accounts = Accounts::parse(accounts, program_id)?;

    let mut registry = Registry::from_account_info(accounts.registry)?;
    let distributor = Distributor::from_account_info(accounts.distributor)?;

    check_account_key(
        accounts.distributor,
        &registry.distributor,
        EmissionError::WrongDistributor,
    )?;
    check_account_key(accounts.vault, &registry.vault, EmissionError::WrongCustody)?;
    check_token_account(
        accounts.destination,
        &registry.token_mint,
        accounts.caller.key,
    )?;

    let (token_address, _) = PositionToken::find_key(params.token_id, program_id);
    check_account_key(
        accounts.position_token,
        &token_address,
        EmissionError::AccountNotDeterministic,
    )?;
    let token = load_optional(
        accounts.position_token,
        program_id,
        PositionToken::from_account_info,
    )?;
    let position = match &token {
        Some(token) => {
            let (position_address, _) = Position::find_key(&token.position_key(), program_id);
            check_account_key(
                accounts.position,
                &position_address,
                EmissionError::AccountNotDeterministic,
            )?;
            load_optional(accounts.position, program_id, Position::from_account_info)?
        }
        None => None,
    };

    let nonce = [registry.signer_nonce];
    let signer_seeds: &[&[u8]] = &[Registry::SEED, &nonce];
    let mut ledger = SplLedger::new(
        accounts.spl_token_program,
        accounts.registry,
        signer_seeds,
        vec![accounts.vault, accounts.destination],
    );

    // The position and its token are deleted before the vault pays out
    let event = redeem(
        &mut registry,
        distributor.current_stage,
        accounts.caller.key,
        token.as_ref(),
        position.as_ref(),
        accounts.destination.key,
        &mut ledger,
        |r| {
            r.save(&mut accounts.registry.data.borrow_mut())?;
            if let (Some(mut token), Some(mut position)) = (token.clone(), position.clone()) {
                token.close();
                token.save(&mut accounts.position_token.data.borrow_mut())?;
                position.close();
                position.save(&mut accounts.position.data.borrow_mut())?;
            }
            debit_holder(program_id, accounts.holder, accounts.caller.key)
        },
    )?;
    registry.save(&mut accounts.registry.data.borrow_mut())?;

    msg!("+ Closing position {}", params.token_id);
    close_account(accounts.position_token, accounts.caller)?;
    close_account(accounts.position, accounts.caller)?;

    event.emit()
}
