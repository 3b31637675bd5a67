pub use crate::processor::{
    admin_pause, advance_stage, burn, change_authority, configure_recipients, create_distributor,
    create_registry, send_stage_reward, stake, transfer_position,
};
use bonfida_utils::InstructionsAccount;
use borsh::{BorshDeserialize, BorshSerialize};
use num_derive::FromPrimitive;
use solana_program::{instruction::Instruction, pubkey::Pubkey};

#[allow(missing_docs)]
#[derive(BorshDeserialize, BorshSerialize, FromPrimitive, Clone, Copy, Debug, PartialEq)]
pub enum ProgramInstruction {
    /// Create the distributor at stage -1
    ///
    /// | Index | Writable | Signer | Description                   |
    /// | ----- | -------- | ------ | ----------------------------- |
    /// | 0     | ✅       | ❌     | The distributor account       |
    /// | 1     | ❌       | ❌     | The system program account    |
    /// | 2     | ✅       | ✅     | The fee payer account         |
    /// | 3     | ❌       | ❌     | The mint of the token         |
    /// | 4     | ❌       | ❌     | The custody token account     |
    CreateDistributor,
    /// Set the Content, DevInfra and Treasury recipients
    ConfigureRecipients,
    /// Advance to the next stage and mint its allocation
    AdvanceStage,
    /// Pay the reward of the current stage
    SendStageReward,
    /// Create the position registry
    ///
    /// | Index | Writable | Signer | Description                   |
    /// | ----- | -------- | ------ | ----------------------------- |
    /// | 0     | ✅       | ❌     | The registry account          |
    /// | 1     | ❌       | ❌     | The distributor account       |
    /// | 2     | ❌       | ❌     | The system program account    |
    /// | 3     | ✅       | ✅     | The fee payer account         |
    /// | 4     | ❌       | ❌     | The vault token account       |
    CreateRegistry,
    /// Lock tokens under a (stage, role, staker) position
    Stake,
    /// Redeem a position and burn its token
    Burn,
    /// Hand a position token over to another key
    TransferPosition,
    /// Pause or unpause a component
    AdminPause,
    /// Change the authority of a component
    ChangeAuthority,
}

#[allow(missing_docs)]
pub fn create_distributor(
    program_id: Pubkey,
    accounts: create_distributor::Accounts<Pubkey>,
    params: create_distributor::Params,
) -> Instruction {
    accounts.get_instruction(program_id, ProgramInstruction::CreateDistributor as u8, params)
}

#[allow(missing_docs)]
pub fn configure_recipients(
    program_id: Pubkey,
    accounts: configure_recipients::Accounts<Pubkey>,
    params: configure_recipients::Params,
) -> Instruction {
    accounts.get_instruction(program_id, ProgramInstruction::ConfigureRecipients as u8, params)
}

#[allow(missing_docs)]
pub fn advance_stage(
    program_id: Pubkey,
    accounts: advance_stage::Accounts<Pubkey>,
    params: advance_stage::Params,
) -> Instruction {
    accounts.get_instruction(program_id, ProgramInstruction::AdvanceStage as u8, params)
}

#[allow(missing_docs)]
pub fn send_stage_reward(
    program_id: Pubkey,
    accounts: send_stage_reward::Accounts<Pubkey>,
    params: send_stage_reward::Params,
) -> Instruction {
    accounts.get_instruction(program_id, ProgramInstruction::SendStageReward as u8, params)
}

#[allow(missing_docs)]
pub fn create_registry(
    program_id: Pubkey,
    accounts: create_registry::Accounts<Pubkey>,
    params: create_registry::Params,
) -> Instruction {
    accounts.get_instruction(program_id, ProgramInstruction::CreateRegistry as u8, params)
}

#[allow(missing_docs)]
pub fn stake(
    program_id: Pubkey,
    accounts: stake::Accounts<Pubkey>,
    params: stake::Params,
) -> Instruction {
    accounts.get_instruction(program_id, ProgramInstruction::Stake as u8, params)
}

#[allow(missing_docs)]
pub fn burn(
    program_id: Pubkey,
    accounts: burn::Accounts<Pubkey>,
    params: burn::Params,
) -> Instruction {
    accounts.get_instruction(program_id, ProgramInstruction::Burn as u8, params)
}

#[allow(missing_docs)]
pub fn transfer_position(
    program_id: Pubkey,
    accounts: transfer_position::Accounts<Pubkey>,
    params: transfer_position::Params,
) -> Instruction {
    accounts.get_instruction(program_id, ProgramInstruction::TransferPosition as u8, params)
}

#[allow(missing_docs)]
pub fn admin_pause(
    program_id: Pubkey,
    accounts: admin_pause::Accounts<Pubkey>,
    params: admin_pause::Params,
) -> Instruction {
    accounts.get_instruction(program_id, ProgramInstruction::AdminPause as u8, params)
}

#[allow(missing_docs)]
pub fn change_authority(
    program_id: Pubkey,
    accounts: change_authority::Accounts<Pubkey>,
    params: change_authority::Params,
) -> Instruction {
    accounts.get_instruction(program_id, ProgramInstruction::ChangeAuthority as u8, params)
}
