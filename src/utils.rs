use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, program_error::ProgramError,
    program_pack::Pack, pubkey::Pubkey,
};
use spl_token::state::Account;

use crate::cpi::Cpi;
use crate::error::EmissionError;
use crate::state::Holder;

pub fn check_account_key(account: &AccountInfo, key: &Pubkey, error: EmissionError) -> ProgramResult {
    if account.key != key {
        return Err(error.into());
    }
    Ok(())
}

pub fn check_account_owner(
    account: &AccountInfo,
    owner: &Pubkey,
    error: EmissionError,
) -> ProgramResult {
    if account.owner != owner {
        return Err(error.into());
    }
    Ok(())
}

pub fn check_signer(account: &AccountInfo, error: EmissionError) -> ProgramResult {
    if !(account.is_signer) {
        return Err(error.into());
    }
    Ok(())
}

pub fn assert_uninitialized(account: &AccountInfo) -> ProgramResult {
    if !account.data_is_empty() {
        return Err(EmissionError::AlreadyInitialized.into());
    }
    Ok(())
}

/// Unpacks an SPL token account of `mint` owned by `owner`
pub fn check_token_account(
    account: &AccountInfo,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<Account, ProgramError> {
    check_account_owner(account, &spl_token::ID, EmissionError::WrongTokenAccountOwner)?;
    let acc = Account::unpack(&account.data.borrow())?;
    if &acc.mint != mint {
        return Err(EmissionError::WrongMint.into());
    }
    if &acc.owner != owner {
        msg!("Invalid token account owner");
        return Err(EmissionError::WrongTokenAccountOwner.into());
    }
    Ok(acc)
}

/// Custody accounts must not be drainable by a third party
pub fn assert_no_close_or_delegate(token_account: &Account) -> ProgramResult {
    if token_account.delegate.is_some() || token_account.close_authority.is_some() {
        msg!("This token account cannot have a delegate or close authority");
        return Err(EmissionError::DelegatedTokenAccount.into());
    }
    Ok(())
}

/// Moves every lamport of `account` to `destination` and marks the data for deletion
pub fn close_account(account: &AccountInfo, destination: &AccountInfo) -> ProgramResult {
    let mut account_lamports = account.lamports.borrow_mut();
    let mut destination_lamports = destination.lamports.borrow_mut();

    **destination_lamports = (**destination_lamports)
        .checked_add(**account_lamports)
        .ok_or(EmissionError::Overflow)?;
    **account_lamports = 0;

    Ok(())
}

/// Runs `op` on `state`, restoring the previous state when it fails
pub fn rollback_on_error<S: Clone, T>(
    state: &mut S,
    op: impl FnOnce(&mut S) -> Result<T, ProgramError>,
) -> Result<T, ProgramError> {
    let snapshot = state.clone();
    match op(state) {
        Ok(value) => Ok(value),
        Err(e) => {
            *state = snapshot;
            Err(e)
        }
    }
}

/// Counts one more position token for `owner`, creating its holder account on first use
pub fn credit_holder<'a>(
    program_id: &Pubkey,
    system_program: &AccountInfo<'a>,
    fee_payer: &AccountInfo<'a>,
    holder_account: &AccountInfo<'a>,
    owner: &Pubkey,
) -> ProgramResult {
    let (key, nonce) = Holder::find_key(owner, program_id);
    check_account_key(holder_account, &key, EmissionError::AccountNotDeterministic)?;

    let mut holder = if holder_account.data_is_empty() {
        Cpi::create_account(
            program_id,
            system_program,
            fee_payer,
            holder_account,
            &[Holder::SEED, &owner.to_bytes(), &[nonce]],
            Holder::LEN,
        )?;
        Holder::new(*owner)
    } else {
        check_account_owner(holder_account, program_id, EmissionError::WrongOwner)?;
        Holder::from_account_info(holder_account)?
    };
    holder.receive()?;
    holder.save(&mut holder_account.data.borrow_mut())
}

pub fn debit_holder(program_id: &Pubkey, holder_account: &AccountInfo, owner: &Pubkey) -> ProgramResult {
    let (key, _) = Holder::find_key(owner, program_id);
    check_account_key(holder_account, &key, EmissionError::AccountNotDeterministic)?;
    check_account_owner(holder_account, program_id, EmissionError::WrongOwner)?;

    let mut holder = Holder::from_account_info(holder_account)?;
    holder.release()?;
    holder.save(&mut holder_account.data.borrow_mut())
}
