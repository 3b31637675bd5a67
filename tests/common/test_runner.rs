use borsh::BorshDeserialize;
use solana_program::{program_pack::Pack, pubkey::Pubkey, system_instruction, system_program};
use solana_program_test::{processor, BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    account::AccountSharedData,
    native_token::LAMPORTS_PER_SOL,
    signer::{keypair::Keypair, Signer},
};
use spl_token::state::{Account as TokenAccount, AccountState};

use staged_emission::{
    entrypoint::process_instruction,
    instruction::{
        admin_pause, advance_stage, burn, change_authority, configure_recipients,
        create_distributor, create_registry, send_stage_reward, stake, transfer_position,
    },
    query,
    registry::{derive_position_key, effective_role},
    state::{Distributor, Holder, Position, PositionToken, Registry, Role, TOKEN_DECIMALS},
};

use crate::common::utils::{mint_bootstrap, sign_send_instructions, token_account_bootstrap};

pub struct TestRunner {
    pub program_id: Pubkey,
    prg_test_ctx: ProgramTestContext,
    mint: Pubkey,
    pub distributor: Pubkey,
    pub custody: Pubkey,
    pub registry: Pubkey,
    pub vault: Pubkey,
    pub content: Pubkey,
    pub dev_infra: Pubkey,
    pub treasury: Pubkey,
}

impl TestRunner {
    pub async fn new() -> Result<Self, BanksClientError> {
        let program_id = staged_emission::ID;

        let mut program_test = ProgramTest::new(
            "staged_emission",
            program_id,
            processor!(process_instruction),
        );

        let (distributor, _) = Distributor::find_key(&program_id);
        let (registry, _) = Registry::find_key(&program_id);

        //
        // Create mint
        //
        let mint = mint_bootstrap(TOKEN_DECIMALS, &mut program_test, &distributor);

        let mut prg_test_ctx = program_test.start_with_context().await;

        //
        // Token accounts of the program addresses and recipients
        //
        let custody = token_account_bootstrap(&mut prg_test_ctx, &mint, &distributor, 0);
        let vault = token_account_bootstrap(&mut prg_test_ctx, &mint, &registry, 0);
        let content =
            token_account_bootstrap(&mut prg_test_ctx, &mint, &Pubkey::new_unique(), 0);
        let dev_infra =
            token_account_bootstrap(&mut prg_test_ctx, &mint, &Pubkey::new_unique(), 0);
        let treasury =
            token_account_bootstrap(&mut prg_test_ctx, &mint, &Pubkey::new_unique(), 0);

        //
        // Create distributor
        //
        let create_distributor_ix = create_distributor(
            program_id,
            create_distributor::Accounts {
                distributor: &distributor,
                system_program: &system_program::ID,
                fee_payer: &prg_test_ctx.payer.pubkey(),
                mint: &mint,
                custody: &custody,
            },
            create_distributor::Params {
                authority: prg_test_ctx.payer.pubkey(),
            },
        );
        sign_send_instructions(&mut prg_test_ctx, vec![create_distributor_ix], vec![]).await?;

        //
        // Create registry
        //
        let create_registry_ix = create_registry(
            program_id,
            create_registry::Accounts {
                registry: &registry,
                distributor: &distributor,
                system_program: &system_program::ID,
                fee_payer: &prg_test_ctx.payer.pubkey(),
                vault: &vault,
            },
            create_registry::Params {
                authority: prg_test_ctx.payer.pubkey(),
            },
        );
        sign_send_instructions(&mut prg_test_ctx, vec![create_registry_ix], vec![]).await?;

        Ok(Self {
            program_id,
            prg_test_ctx,
            mint,
            distributor,
            custody,
            registry,
            vault,
            content,
            dev_infra,
            treasury,
        })
    }

    pub fn get_authority(&self) -> Pubkey {
        self.prg_test_ctx.payer.pubkey()
    }

    pub fn get_mint(&self) -> Pubkey {
        self.mint
    }

    pub async fn configure_recipients(&mut self) -> Result<(), BanksClientError> {
        let ix = configure_recipients(
            self.program_id,
            configure_recipients::Accounts {
                distributor: &self.distributor,
                authority: &self.prg_test_ctx.payer.pubkey(),
            },
            configure_recipients::Params {
                content: self.content,
                dev_infra: self.dev_infra,
                treasury: self.treasury,
            },
        );
        sign_send_instructions(&mut self.prg_test_ctx, vec![ix], vec![]).await
    }

    pub async fn advance_stage(&mut self, stage: u8) -> Result<(), BanksClientError> {
        let authority = self.prg_test_ctx.payer.pubkey();
        self.advance_stage_signed(&authority, stage, vec![]).await
    }

    pub async fn advance_stage_as(
        &mut self,
        signer: &Keypair,
        stage: u8,
    ) -> Result<(), BanksClientError> {
        self.advance_stage_signed(&signer.pubkey(), stage, vec![signer])
            .await
    }

    async fn advance_stage_signed(
        &mut self,
        authority: &Pubkey,
        stage: u8,
        signers: Vec<&Keypair>,
    ) -> Result<(), BanksClientError> {
        let ix = advance_stage(
            self.program_id,
            advance_stage::Accounts {
                distributor: &self.distributor,
                authority,
                mint: &self.mint,
                custody: &self.custody,
                spl_token_program: &spl_token::ID,
            },
            advance_stage::Params { stage },
        );
        sign_send_instructions(&mut self.prg_test_ctx, vec![ix], signers).await
    }

    pub async fn send_stage_reward(&mut self) -> Result<(), BanksClientError> {
        let ix = send_stage_reward(
            self.program_id,
            send_stage_reward::Accounts {
                distributor: &self.distributor,
                authority: &self.prg_test_ctx.payer.pubkey(),
                custody: &self.custody,
                content: &self.content,
                dev_infra: &self.dev_infra,
                treasury: &self.treasury,
                spl_token_program: &spl_token::ID,
            },
            send_stage_reward::Params {},
        );
        sign_send_instructions(&mut self.prg_test_ctx, vec![ix], vec![]).await
    }

    /// Pays out and advances until `stage` is reached and paid out
    pub async fn run_until(&mut self, stage: u8) -> Result<(), BanksClientError> {
        loop {
            let distributor = self.get_distributor().await;
            if !distributor.reward_sent(distributor.current_stage) {
                self.send_stage_reward().await?;
            }
            if distributor.current_stage >= stage as i8 {
                return Ok(());
            }
            self.advance_stage((distributor.current_stage + 1) as u8)
                .await?;
        }
    }

    /// Keypair owning a token account funded with `amount`
    pub fn create_user(&mut self, amount: u64) -> (Keypair, Pubkey) {
        let user = Keypair::new();
        // Stakers pay the rent of the accounts they open
        self.prg_test_ctx.set_account(
            &user.pubkey(),
            &AccountSharedData::new(LAMPORTS_PER_SOL, 0, &system_program::ID),
        );
        let token_account =
            token_account_bootstrap(&mut self.prg_test_ctx, &self.mint, &user.pubkey(), amount);
        (user, token_account)
    }

    /// Plain system transfer from the payer, the way anyone could fund an address
    pub async fn send_lamports(&mut self, to: &Pubkey, lamports: u64) -> Result<(), BanksClientError> {
        let ix = system_instruction::transfer(&self.prg_test_ctx.payer.pubkey(), to, lamports);
        sign_send_instructions(&mut self.prg_test_ctx, vec![ix], vec![]).await
    }

    /// Rewrites the state of a token account, a frozen account rejects transfers
    pub async fn set_frozen(&mut self, account: &Pubkey, frozen: bool) {
        let mut acc = self
            .prg_test_ctx
            .banks_client
            .get_account(*account)
            .await
            .unwrap()
            .unwrap();
        let mut state = TokenAccount::unpack(&acc.data).unwrap();
        state.state = if frozen {
            AccountState::Frozen
        } else {
            AccountState::Initialized
        };
        TokenAccount::pack(state, &mut acc.data).unwrap();
        self.prg_test_ctx
            .set_account(account, &AccountSharedData::from(acc));
    }

    pub async fn lamports(&mut self, key: &Pubkey) -> u64 {
        self.prg_test_ctx
            .banks_client
            .get_balance(*key)
            .await
            .unwrap()
    }

    /// Allows the registry to pull `amount` from `source`
    pub async fn approve(
        &mut self,
        owner: &Keypair,
        source: &Pubkey,
        amount: u64,
    ) -> Result<(), BanksClientError> {
        let ix = spl_token::instruction::approve(
            &spl_token::ID,
            source,
            &self.registry,
            &owner.pubkey(),
            &[],
            amount,
        )
        .unwrap();
        sign_send_instructions(&mut self.prg_test_ctx, vec![ix], vec![owner]).await
    }

    pub async fn stake(
        &mut self,
        caller: &Keypair,
        source: &Pubkey,
        staker: &Pubkey,
        role: Role,
        amount: u64,
    ) -> Result<(), BanksClientError> {
        let stage = self.get_distributor().await.current_stage;
        let next_token_id = self.get_registry().await.tokens_issued + 1;
        let role_key = effective_role(&caller.pubkey(), staker, role);
        let (position, _) = Position::find_key(
            &derive_position_key(stage, role_key, staker),
            &self.program_id,
        );
        let (position_token, _) = PositionToken::find_key(next_token_id, &self.program_id);
        let (holder, _) = Holder::find_key(staker, &self.program_id);

        let ix = stake(
            self.program_id,
            stake::Accounts {
                registry: &self.registry,
                distributor: &self.distributor,
                position: &position,
                position_token: &position_token,
                holder: &holder,
                caller: &caller.pubkey(),
                source,
                vault: &self.vault,
                system_program: &system_program::ID,
                spl_token_program: &spl_token::ID,
            },
            stake::Params {
                staker: *staker,
                role,
                amount,
            },
        );
        sign_send_instructions(&mut self.prg_test_ctx, vec![ix], vec![caller]).await
    }

    pub async fn burn(
        &mut self,
        caller: &Keypair,
        token_id: u64,
        destination: &Pubkey,
    ) -> Result<(), BanksClientError> {
        let (position_token, _) = PositionToken::find_key(token_id, &self.program_id);
        // Unknown tokens point at an empty position
        let position = match self.get_position_token(token_id).await {
            Some(token) => Position::find_key(&token.position_key(), &self.program_id).0,
            None => Pubkey::new_unique(),
        };
        let (holder, _) = Holder::find_key(&caller.pubkey(), &self.program_id);

        let ix = burn(
            self.program_id,
            burn::Accounts {
                registry: &self.registry,
                distributor: &self.distributor,
                position: &position,
                position_token: &position_token,
                holder: &holder,
                caller: &caller.pubkey(),
                destination,
                vault: &self.vault,
                spl_token_program: &spl_token::ID,
            },
            burn::Params { token_id },
        );
        sign_send_instructions(&mut self.prg_test_ctx, vec![ix], vec![caller]).await
    }

    pub async fn transfer_position(
        &mut self,
        caller: &Keypair,
        token_id: u64,
        new_holder: &Pubkey,
    ) -> Result<(), BanksClientError> {
        let (position_token, _) = PositionToken::find_key(token_id, &self.program_id);
        let (caller_holder, _) = Holder::find_key(&caller.pubkey(), &self.program_id);
        let (new_holder_holder, _) = Holder::find_key(new_holder, &self.program_id);

        let ix = transfer_position(
            self.program_id,
            transfer_position::Accounts {
                registry: &self.registry,
                position_token: &position_token,
                caller: &caller.pubkey(),
                caller_holder: &caller_holder,
                new_holder_holder: &new_holder_holder,
                system_program: &system_program::ID,
            },
            transfer_position::Params {
                token_id,
                new_holder: *new_holder,
            },
        );
        sign_send_instructions(&mut self.prg_test_ctx, vec![ix], vec![caller]).await
    }

    pub async fn admin_pause(
        &mut self,
        component: &Pubkey,
        paused: bool,
    ) -> Result<(), BanksClientError> {
        let ix = admin_pause(
            self.program_id,
            admin_pause::Accounts {
                authority: &self.prg_test_ctx.payer.pubkey(),
                component,
            },
            admin_pause::Params { paused },
        );
        sign_send_instructions(&mut self.prg_test_ctx, vec![ix], vec![]).await
    }

    pub async fn change_authority(
        &mut self,
        component: &Pubkey,
        new_authority: &Pubkey,
    ) -> Result<(), BanksClientError> {
        let ix = change_authority(
            self.program_id,
            change_authority::Accounts {
                component,
                authority: &self.prg_test_ctx.payer.pubkey(),
            },
            change_authority::Params {
                new_authority: *new_authority,
            },
        );
        sign_send_instructions(&mut self.prg_test_ctx, vec![ix], vec![]).await
    }

    async fn get_data(&mut self, key: &Pubkey) -> Option<Vec<u8>> {
        self.prg_test_ctx
            .banks_client
            .get_account(*key)
            .await
            .unwrap()
            .map(|a| a.data)
            .filter(|d| !d.is_empty())
    }

    pub async fn get_distributor(&mut self) -> Distributor {
        let key = self.distributor;
        let data = self.get_data(&key).await.unwrap();
        Distributor::deserialize(&mut &data[..]).unwrap()
    }

    pub async fn get_registry(&mut self) -> Registry {
        let key = self.registry;
        let data = self.get_data(&key).await.unwrap();
        query::load_registry(&data).unwrap()
    }

    pub async fn get_position_token(&mut self, token_id: u64) -> Option<PositionToken> {
        let (key, _) = PositionToken::find_key(token_id, &self.program_id);
        let data = self.get_data(&key).await?;
        PositionToken::deserialize(&mut &data[..]).ok()
    }

    pub async fn token_balance(&mut self, account: &Pubkey) -> u64 {
        let data = self.get_data(account).await.unwrap();
        TokenAccount::unpack(&data).unwrap().amount
    }

    pub async fn mint_supply(&mut self) -> u64 {
        let key = self.mint;
        let data = self.get_data(&key).await.unwrap();
        spl_token::state::Mint::unpack(&data).unwrap().supply
    }

    /// Fetches every account a registry view may read
    async fn snapshot(&mut self, keys: Vec<Pubkey>) -> std::collections::HashMap<Pubkey, Vec<u8>> {
        let mut accounts = std::collections::HashMap::new();
        for key in keys {
            if let Some(data) = self.get_data(&key).await {
                accounts.insert(key, data);
            }
        }
        accounts
    }

    pub async fn get_assets_data(&mut self, staker: &Pubkey) -> Vec<query::AssetData> {
        let registry = self.get_registry().await;
        let program_id = self.program_id;
        let mut keys = Vec::new();
        for token_id in 1..=registry.tokens_issued {
            let (token_key, _) = PositionToken::find_key(token_id, &program_id);
            keys.push(token_key);
            if let Some(token) = self.get_position_token(token_id).await {
                keys.push(Position::find_key(&token.position_key(), &program_id).0);
            }
        }
        let accounts = self.snapshot(keys).await;
        query::get_assets_data(&registry, staker, &program_id, |key| {
            accounts.get(key).cloned()
        })
    }

    pub async fn owner_of(&mut self, token_id: u64) -> Option<Pubkey> {
        let (key, _) = PositionToken::find_key(token_id, &self.program_id);
        let accounts = self.snapshot(vec![key]).await;
        query::owner_of(token_id, &self.program_id, |k| accounts.get(k).cloned())
    }

    pub async fn balance_of(&mut self, owner: &Pubkey) -> u64 {
        let (key, _) = Holder::find_key(owner, &self.program_id);
        let accounts = self.snapshot(vec![key]).await;
        query::balance_of(owner, &self.program_id, |k| accounts.get(k).cloned())
    }
}
