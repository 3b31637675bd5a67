use crate::instruction::ProgramInstruction;
use borsh::BorshDeserialize;
use num_traits::FromPrimitive;
use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, program_error::ProgramError,
    pubkey::Pubkey,
};

pub mod admin_pause;
pub mod advance_stage;
pub mod burn;
pub mod change_authority;
pub mod configure_recipients;
pub mod create_distributor;
pub mod create_registry;
pub mod send_stage_reward;
pub mod stake;
pub mod transfer_position;

pub struct Processor {}

impl Processor {
    pub fn process_instruction(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        msg!("Beginning processing");
        let (tag, instruction_data) = instruction_data
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;
        let instruction =
            FromPrimitive::from_u8(*tag).ok_or(ProgramError::InvalidInstructionData)?;
        msg!("Instruction unpacked");

        match instruction {
            ProgramInstruction::CreateDistributor => {
                msg!("Instruction: Create distributor");
                let params = create_distributor::Params::try_from_slice(instruction_data)
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                create_distributor::process_create_distributor(program_id, accounts, params)?;
            }
            ProgramInstruction::ConfigureRecipients => {
                msg!("Instruction: Configure recipients");
                let params = configure_recipients::Params::try_from_slice(instruction_data)
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                configure_recipients::process_configure_recipients(program_id, accounts, params)?;
            }
            ProgramInstruction::AdvanceStage => {
                msg!("Instruction: Advance stage");
                let params = advance_stage::Params::try_from_slice(instruction_data)
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                advance_stage::process_advance_stage(program_id, accounts, params)?;
            }
            ProgramInstruction::SendStageReward => {
                msg!("Instruction: Send stage reward");
                let params = send_stage_reward::Params::try_from_slice(instruction_data)
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                send_stage_reward::process_send_stage_reward(program_id, accounts, params)?;
            }
            ProgramInstruction::CreateRegistry => {
                msg!("Instruction: Create registry");
                let params = create_registry::Params::try_from_slice(instruction_data)
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                create_registry::process_create_registry(program_id, accounts, params)?;
            }
            ProgramInstruction::Stake => {
                msg!("Instruction: Stake");
                let params = stake::Params::try_from_slice(instruction_data)
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                stake::process_stake(program_id, accounts, params)?;
            }
            ProgramInstruction::Burn => {
                msg!("Instruction: Burn");
                let params = burn::Params::try_from_slice(instruction_data)
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                burn::process_burn(program_id, accounts, params)?;
            }
            ProgramInstruction::TransferPosition => {
                msg!("Instruction: Transfer position");
                let params = transfer_position::Params::try_from_slice(instruction_data)
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                transfer_position::process_transfer_position(program_id, accounts, params)?;
            }
            ProgramInstruction::AdminPause => {
                msg!("Instruction: Admin pause");
                let params = admin_pause::Params::try_from_slice(instruction_data)
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                admin_pause::process_admin_pause(program_id, accounts, params)?;
            }
            ProgramInstruction::ChangeAuthority => {
                msg!("Instruction: Change authority");
                let params = change_authority::Params::try_from_slice(instruction_data)
                    .map_err(|_| ProgramError::InvalidInstructionData)?;
                change_authority::process_change_authority(program_id, accounts, params)?;
            }
        }

        Ok(())
    }
}
