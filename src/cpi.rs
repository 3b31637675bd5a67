use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    program::{invoke, invoke_signed},
    pubkey::Pubkey,
    rent::Rent,
    system_instruction::{allocate, assign, create_account, transfer},
    sysvar::Sysvar,
};

pub struct Cpi {}

impl Cpi {
    /// Creates a program owned account at a program derived address.
    ///
    /// Derived addresses are predictable, anyone can send lamports to one
    /// before it is created. A funded address is topped up to rent exemption,
    /// then allocated and assigned instead of going through `create_account`.
    pub fn create_account<'a>(
        program_id: &Pubkey,
        system_program: &AccountInfo<'a>,
        fee_payer: &AccountInfo<'a>,
        account_to_create: &AccountInfo<'a>,
        signer_seeds: &[&[u8]],
        space: usize,
    ) -> ProgramResult {
        let rent = Rent::get()?;
        let required_lamports = rent.minimum_balance(space).max(1);
        let current_lamports = account_to_create.lamports();

        if current_lamports == 0 {
            let create_state_instruction = create_account(
                fee_payer.key,
                account_to_create.key,
                required_lamports,
                space as u64,
                program_id,
            );
            return invoke_signed(
                &create_state_instruction,
                &[
                    system_program.clone(),
                    fee_payer.clone(),
                    account_to_create.clone(),
                ],
                &[signer_seeds],
            );
        }

        let missing_lamports = required_lamports.saturating_sub(current_lamports);
        if missing_lamports > 0 {
            invoke(
                &transfer(fee_payer.key, account_to_create.key, missing_lamports),
                &[
                    fee_payer.clone(),
                    account_to_create.clone(),
                    system_program.clone(),
                ],
            )?;
        }

        invoke_signed(
            &allocate(account_to_create.key, space as u64),
            &[account_to_create.clone(), system_program.clone()],
            &[signer_seeds],
        )?;

        invoke_signed(
            &assign(account_to_create.key, program_id),
            &[account_to_create.clone(), system_program.clone()],
            &[signer_seeds],
        )
    }
}
