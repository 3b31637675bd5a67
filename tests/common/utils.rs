use solana_program::{
    instruction::{Instruction, InstructionError},
    program_option::COption,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
};
use solana_program_test::{BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    account::{Account, AccountSharedData},
    clock::Clock,
    signature::{Keypair, Signer},
    transaction::{Transaction, TransactionError},
};
use spl_token::state::{Account as TokenAccount, AccountState, Mint};

use staged_emission::error::EmissionError;

pub async fn sign_send_instructions(
    ctx: &mut ProgramTestContext,
    instructions: Vec<Instruction>,
    signers: Vec<&Keypair>,
) -> Result<(), BanksClientError> {
    // Identical transactions would be deduplicated, every send lands in a fresh slot
    let slot = ctx.banks_client.get_sysvar::<Clock>().await?.slot;
    ctx.warp_to_slot(slot + 1)
        .map_err(|_| BanksClientError::ClientError("failed to warp"))?;
    ctx.last_blockhash = ctx.banks_client.get_latest_blockhash().await?;

    let mut transaction = Transaction::new_with_payer(&instructions, Some(&ctx.payer.pubkey()));
    let mut payer_signers = vec![&ctx.payer];
    for s in signers {
        payer_signers.push(s);
    }
    transaction.partial_sign(&payer_signers, ctx.last_blockhash);
    ctx.banks_client.process_transaction(transaction).await
}

pub fn mint_bootstrap(
    decimals: u8,
    program_test: &mut ProgramTest,
    mint_authority: &Pubkey,
) -> Pubkey {
    let address = Pubkey::new_unique();
    let mint_info = Mint {
        mint_authority: COption::Some(*mint_authority),
        supply: 0,
        decimals,
        is_initialized: true,
        freeze_authority: COption::None,
    };
    let mut mint_account = Account::new(
        Rent::default().minimum_balance(Mint::LEN),
        Mint::LEN,
        &spl_token::ID,
    );
    mint_info.pack_into_slice(&mut mint_account.data);
    program_test.add_account(address, mint_account);
    address
}

/// Writes an initialized token account of `mint` owned by `owner`
pub fn token_account_bootstrap(
    ctx: &mut ProgramTestContext,
    mint: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> Pubkey {
    let address = Pubkey::new_unique();
    let state = TokenAccount {
        mint: *mint,
        owner: *owner,
        amount,
        state: AccountState::Initialized,
        ..TokenAccount::default()
    };
    let mut data = vec![0; TokenAccount::LEN];
    TokenAccount::pack(state, &mut data).unwrap();
    let account = Account {
        lamports: Rent::default().minimum_balance(TokenAccount::LEN),
        data,
        owner: spl_token::ID,
        executable: false,
        rent_epoch: 0,
    };
    ctx.set_account(&address, &AccountSharedData::from(account));
    address
}

/// Custom program error code carried by a failed transaction
pub fn custom_error_code(result: &Result<(), BanksClientError>) -> Option<u32> {
    let err = match result {
        Err(BanksClientError::TransactionError(err)) => err,
        Err(BanksClientError::SimulationError { err, .. }) => err,
        _ => return None,
    };
    match err {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => Some(*code),
        _ => None,
    }
}

pub fn assert_error(result: Result<(), BanksClientError>, expected: EmissionError) {
    assert_eq!(
        custom_error_code(&result),
        Some(expected as u32),
        "expected {:?}, got {:?}",
        expected,
        result
    );
}
