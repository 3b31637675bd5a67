use solana_sdk::signer::Signer;

use staged_emission::error::EmissionError;
use staged_emission::query::AssetData;
use staged_emission::registry::derive_position_key;
use staged_emission::state::{
    Holder, Position, PositionToken, Role, MINIMUM_STAKE_AMOUNT, TOKEN_DECIMALS_MULTIPLIER,
};

use crate::common::test_runner::TestRunner;
use crate::common::utils::assert_error;

pub mod common;

const M: u64 = TOKEN_DECIMALS_MULTIPLIER;

async fn started() -> TestRunner {
    let mut tr = TestRunner::new().await.unwrap();
    tr.configure_recipients().await.unwrap();
    tr.advance_stage(0).await.unwrap();
    tr
}

#[tokio::test]
async fn deposits_merge_and_unlock_after_two_stages() {
    let mut tr = started().await;
    let (funder, funder_source) = tr.create_user(1_500 * M);
    let (staker, staker_account) = tr.create_user(0);
    tr.approve(&funder, &funder_source, 1_500 * M).await.unwrap();

    tr.stake(&funder, &funder_source, &staker.pubkey(), Role::User, 1_000 * M)
        .await
        .unwrap();
    tr.stake(&funder, &funder_source, &staker.pubkey(), Role::User, 500 * M)
        .await
        .unwrap();

    assert_eq!(tr.get_registry().await.tokens_issued, 1);
    assert_eq!(
        tr.get_assets_data(&staker.pubkey()).await,
        vec![AssetData {
            token_id: 1,
            creation_stage: 0,
            role: Role::User,
            locked_amount: 1_500 * M,
        }]
    );
    let vault = tr.vault;
    assert_eq!(tr.token_balance(&vault).await, 1_500 * M);
    assert_eq!(tr.token_balance(&funder_source).await, 0);
    assert_eq!(tr.owner_of(1).await, Some(staker.pubkey()));
    assert_eq!(tr.balance_of(&staker.pubkey()).await, 1);

    tr.send_stage_reward().await.unwrap();
    tr.advance_stage(1).await.unwrap();
    assert_error(
        tr.burn(&staker, 1, &staker_account).await,
        EmissionError::PrematureRedemption,
    );

    tr.send_stage_reward().await.unwrap();
    tr.advance_stage(2).await.unwrap();
    tr.burn(&staker, 1, &staker_account).await.unwrap();

    assert_eq!(tr.token_balance(&staker_account).await, 1_500 * M);
    assert_eq!(tr.token_balance(&vault).await, 0);
    assert_eq!(tr.owner_of(1).await, None);
    assert_eq!(tr.balance_of(&staker.pubkey()).await, 0);
    assert!(tr.get_assets_data(&staker.pubkey()).await.is_empty());

    assert_error(
        tr.burn(&staker, 1, &staker_account).await,
        EmissionError::PositionNotFound,
    );
}

#[tokio::test]
async fn staking_for_oneself_records_reserved_role() {
    let mut tr = started().await;
    let (user, source) = tr.create_user(100 * M);
    tr.approve(&user, &source, 100 * M).await.unwrap();

    tr.stake(&user, &source, &user.pubkey(), Role::Creator, 40 * M)
        .await
        .unwrap();
    // Same key whatever role is requested
    tr.stake(&user, &source, &user.pubkey(), Role::User, 60 * M)
        .await
        .unwrap();

    assert_eq!(
        tr.get_assets_data(&user.pubkey()).await,
        vec![AssetData {
            token_id: 1,
            creation_stage: 0,
            role: Role::SelfStaker,
            locked_amount: 100 * M,
        }]
    );
}

#[tokio::test]
async fn roles_and_stages_open_separate_positions() {
    let mut tr = started().await;
    let (funder, source) = tr.create_user(300 * M);
    let staker = solana_sdk::signer::keypair::Keypair::new().pubkey();
    tr.approve(&funder, &source, 300 * M).await.unwrap();

    tr.stake(&funder, &source, &staker, Role::User, 100 * M)
        .await
        .unwrap();
    tr.stake(&funder, &source, &staker, Role::Creator, 100 * M)
        .await
        .unwrap();
    tr.send_stage_reward().await.unwrap();
    tr.advance_stage(1).await.unwrap();
    tr.stake(&funder, &source, &staker, Role::User, 100 * M)
        .await
        .unwrap();

    let assets = tr.get_assets_data(&staker).await;
    assert_eq!(
        assets
            .iter()
            .map(|a| (a.token_id, a.creation_stage, a.role))
            .collect::<Vec<_>>(),
        vec![(1, 0, Role::User), (2, 0, Role::Creator), (3, 1, Role::User)]
    );
    assert_eq!(tr.balance_of(&staker).await, 3);
}

#[tokio::test]
async fn stake_preconditions() {
    let mut tr = started().await;
    let (user, source) = tr.create_user(100 * M);
    let staker = solana_sdk::signer::keypair::Keypair::new().pubkey();

    assert_error(
        tr.stake(&user, &source, &staker, Role::User, MINIMUM_STAKE_AMOUNT - 1)
            .await,
        EmissionError::AmountBelowMinimum,
    );
    assert_error(
        tr.stake(&user, &source, &staker, Role::User, 50 * M).await,
        EmissionError::InsufficientAllowance,
    );
    tr.approve(&user, &source, 500 * M).await.unwrap();
    assert_error(
        tr.stake(&user, &source, &staker, Role::User, 200 * M).await,
        EmissionError::InsufficientBalance,
    );
    assert_eq!(tr.get_registry().await.tokens_issued, 0);
    assert_eq!(tr.token_balance(&source).await, 100 * M);
}

#[tokio::test]
async fn transferred_position_is_redeemed_by_new_holder() {
    let mut tr = started().await;
    let (staker, source) = tr.create_user(100 * M);
    let (buyer, buyer_account) = tr.create_user(0);
    tr.approve(&staker, &source, 100 * M).await.unwrap();
    tr.stake(&staker, &source, &staker.pubkey(), Role::User, 100 * M)
        .await
        .unwrap();

    assert_error(
        tr.transfer_position(&buyer, 1, &buyer.pubkey()).await,
        EmissionError::NotHolder,
    );
    tr.transfer_position(&staker, 1, &buyer.pubkey())
        .await
        .unwrap();
    assert_eq!(tr.owner_of(1).await, Some(buyer.pubkey()));
    assert_eq!(tr.balance_of(&staker.pubkey()).await, 0);
    assert_eq!(tr.balance_of(&buyer.pubkey()).await, 1);
    assert!(tr.get_assets_data(&staker.pubkey()).await.is_empty());
    assert_eq!(tr.get_assets_data(&buyer.pubkey()).await.len(), 1);

    tr.run_until(2).await.unwrap();
    assert_error(
        tr.burn(&staker, 1, &source).await,
        EmissionError::NotHolder,
    );
    tr.burn(&buyer, 1, &buyer_account).await.unwrap();
    assert_eq!(tr.token_balance(&buyer_account).await, 100 * M);
    assert_eq!(tr.balance_of(&buyer.pubkey()).await, 0);
}

#[tokio::test]
async fn paused_registry() {
    let mut tr = started().await;
    let (user, source) = tr.create_user(100 * M);
    tr.approve(&user, &source, 100 * M).await.unwrap();
    let registry = tr.registry;

    tr.admin_pause(&registry, true).await.unwrap();
    assert_error(
        tr.stake(&user, &source, &user.pubkey(), Role::User, 50 * M)
            .await,
        EmissionError::ComponentPaused,
    );
    // The distributor keeps running
    tr.send_stage_reward().await.unwrap();

    tr.admin_pause(&registry, false).await.unwrap();
    tr.stake(&user, &source, &user.pubkey(), Role::User, 50 * M)
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_position() {
    let mut tr = started().await;
    let (user, account) = tr.create_user(0);
    assert_error(
        tr.burn(&user, 7, &account).await,
        EmissionError::PositionNotFound,
    );
    assert_error(
        tr.transfer_position(&user, 7, &user.pubkey()).await,
        EmissionError::PositionNotFound,
    );
}

#[tokio::test]
async fn prefunded_addresses_do_not_block_staking() {
    let mut tr = started().await;
    let (user, source) = tr.create_user(100 * M);
    tr.approve(&user, &source, 100 * M).await.unwrap();

    let program_id = tr.program_id;
    let (position_token, _) = PositionToken::find_key(1, &program_id);
    let (position, _) = Position::find_key(
        &derive_position_key(0, Role::SelfStaker, &user.pubkey()),
        &program_id,
    );
    let (holder, _) = Holder::find_key(&user.pubkey(), &program_id);
    for key in [position_token, position, holder].iter() {
        tr.send_lamports(key, 1_000_000).await.unwrap();
    }

    tr.stake(&user, &source, &user.pubkey(), Role::User, 100 * M)
        .await
        .unwrap();

    let token = tr.get_position_token(1).await.unwrap();
    assert_eq!(token.holder, user.pubkey());
    assert_eq!(tr.balance_of(&user.pubkey()).await, 1);
    assert_eq!(
        tr.get_assets_data(&user.pubkey()).await,
        vec![AssetData {
            token_id: 1,
            creation_stage: 0,
            role: Role::SelfStaker,
            locked_amount: 100 * M,
        }]
    );
    // Topped up to rent exemption, never drained
    assert!(tr.lamports(&position_token).await > 1_000_000);
}
