//! Notifications consumed by indexers
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    entrypoint::ProgramResult, log::sol_log_data, msg, program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::state::Role;

#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq, Clone)]
pub enum Event {
    StageChanged {
        stage: i8,
    },
    TokensMinted {
        stage: i8,
        amount: u64,
    },
    ContentRewarded {
        recipient: Pubkey,
        stage: i8,
        amount: u64,
    },
    DevInfraRewarded {
        recipient: Pubkey,
        stage: i8,
        amount: u64,
    },
    TreasuryRewarded {
        recipient: Pubkey,
        stage: i8,
        amount: u64,
    },
    PositionCreated {
        staker: Pubkey,
        token_id: u64,
        role: Role,
        stage: i8,
        amount: u64,
    },
    PositionRedeemed {
        staker: Pubkey,
        token_id: u64,
        amount: u64,
    },
    PositionTransferred {
        token_id: u64,
        from: Pubkey,
        to: Pubkey,
    },
    RecipientsConfigured {
        content: Pubkey,
        dev_infra: Pubkey,
        treasury: Pubkey,
    },
    Paused {
        component: Pubkey,
    },
    Unpaused {
        component: Pubkey,
    },
}

impl Event {
    /// Logs the event as borsh encoded program data
    pub fn emit(&self) -> ProgramResult {
        msg!("Event: {:?}", self);
        let data = self
            .try_to_vec()
            .map_err(|_| ProgramError::InvalidArgument)?;
        sol_log_data(&[&data]);
        Ok(())
    }
}

pub fn emit_all(events: &[Event]) -> ProgramResult {
    for event in events {
        event.emit()?;
    }
    Ok(())
}
