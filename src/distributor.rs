//! Stage-gated minting and reward distribution
//!
//! The distributor walks stages -1 to 10. Advancing into a stage mints that
//! stage's allocation into the custody account, and the reward of the
//! current stage must be paid out to the three recipients before the next
//! advance.
use std::convert::TryFrom;

use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::authority::{assert_authorized, AccessAuthority, Component, Operation};
use crate::error::{EmissionError, EmissionResult};
use crate::events::Event;
use crate::ledger::FungibleLedger;
use crate::schedule::{band, mint_amount, treasury_band};
use crate::state::{Distributor, Recipients, MAX_STAGE, UNINITIALIZED_STAGE};
use crate::utils::rollback_on_error;

/// Amounts paid out for one stage
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct StageReward {
    pub stage: i8,
    pub content: u64,
    pub dev_infra: u64,
    pub treasury: u64,
}

impl StageReward {
    pub fn for_stage(stage: i8) -> Self {
        Self {
            stage,
            content: band(stage),
            dev_infra: band(stage),
            treasury: treasury_band(stage),
        }
    }

    pub fn total(&self) -> EmissionResult<u64> {
        self.content
            .checked_add(self.dev_infra)
            .and_then(|a| a.checked_add(self.treasury))
            .ok_or(EmissionError::Overflow)
    }
}

impl Distributor {
    fn reward_bit(stage: i8) -> Option<u16> {
        if (UNINITIALIZED_STAGE..=MAX_STAGE).contains(&stage) {
            Some(1 << (stage + 1) as u16)
        } else {
            None
        }
    }

    pub fn reward_sent(&self, stage: i8) -> bool {
        Distributor::reward_bit(stage)
            .map(|bit| self.rewards_sent & bit != 0)
            .unwrap_or(false)
    }

    pub fn assert_not_paused(&self) -> EmissionResult {
        if self.paused {
            return Err(EmissionError::ComponentPaused);
        }
        Ok(())
    }

    pub fn enter(&mut self) -> EmissionResult {
        if self.entered {
            return Err(EmissionError::Reentrancy);
        }
        self.entered = true;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.entered = false;
    }

    /// Every precondition of an advance to `target`, checked without mutation
    pub fn check_advance(&self, target: i8) -> EmissionResult {
        if target > MAX_STAGE {
            return Err(EmissionError::StageOutOfRange);
        }
        if Some(target) != self.current_stage.checked_add(1) {
            return Err(EmissionError::OutOfOrderStage);
        }
        if !self.reward_sent(self.current_stage) {
            return Err(EmissionError::RewardNotSent);
        }
        if !self.recipients.is_configured() {
            return Err(EmissionError::RecipientsNotConfigured);
        }
        Ok(())
    }

    /// Moves to `target` and returns the amount of its scheduled mint
    pub fn advance(&mut self, target: i8) -> EmissionResult<u64> {
        self.check_advance(target)?;
        self.current_stage = target;
        self.record_mint(target)
    }

    // The caller already enforces the ordering, the guard still refuses a second mint
    fn record_mint(&mut self, stage: i8) -> EmissionResult<u64> {
        if self.last_minted_stage >= stage {
            return Err(EmissionError::DuplicateMint);
        }
        let amount = mint_amount(stage)?;
        self.last_minted_stage += 1;
        Ok(amount)
    }

    /// Marks the reward of the current stage as sent and returns what to pay
    pub fn begin_stage_reward(&mut self) -> EmissionResult<StageReward> {
        let stage = self.current_stage;
        let bit = match Distributor::reward_bit(stage) {
            Some(bit) if stage >= 0 => bit,
            _ => return Err(EmissionError::StageOutOfRange),
        };
        if self.rewards_sent & bit != 0 {
            return Err(EmissionError::RewardAlreadySent);
        }
        self.rewards_sent |= bit;
        Ok(StageReward::for_stage(stage))
    }
}

pub fn configure_recipients<A: AccessAuthority>(
    distributor: &mut Distributor,
    authority: &A,
    caller: &Pubkey,
    recipients: Recipients,
) -> Result<Event, ProgramError> {
    assert_authorized(
        authority,
        caller,
        Component::Distributor,
        Operation::ConfigureRecipients,
    )?;
    let null = Pubkey::default();
    if recipients.content == null || recipients.dev_infra == null || recipients.treasury == null {
        return Err(EmissionError::NullRecipient.into());
    }
    distributor.recipients = recipients;
    Ok(Event::RecipientsConfigured {
        content: recipients.content,
        dev_infra: recipients.dev_infra,
        treasury: recipients.treasury,
    })
}

/// Advances to `target` and mints its allocation into custody.
///
/// `checkpoint` persists the distributor before the ledger is called.
pub fn advance_stage<A, L, F>(
    distributor: &mut Distributor,
    authority: &A,
    caller: &Pubkey,
    target: u8,
    ledger: &mut L,
    mut checkpoint: F,
) -> Result<Vec<Event>, ProgramError>
where
    A: AccessAuthority,
    L: FungibleLedger,
    F: FnMut(&Distributor) -> Result<(), ProgramError>,
{
    assert_authorized(authority, caller, Component::Distributor, Operation::AdvanceStage)?;
    distributor.assert_not_paused()?;
    let target = i8::try_from(target).map_err(|_| EmissionError::StageOutOfRange)?;

    rollback_on_error(distributor, |d| {
        d.enter()?;
        let amount = d.advance(target)?;
        checkpoint(&*d)?;
        ledger.mint(&d.custody, amount)?;
        d.exit();
        Ok(vec![
            Event::TokensMinted {
                stage: target,
                amount,
            },
            Event::StageChanged { stage: target },
        ])
    })
}

/// Pays the reward of the current stage to the three recipients.
///
/// The reward flag is set and persisted through `checkpoint` before the
/// first transfer, a reentrant call observes the reward as already sent.
/// Only the checks ahead of the transfers are rolled back: once a transfer
/// has been issued the stage stays marked as rewarded, even when a later
/// transfer fails, so no recipient can be paid twice for one stage.
pub fn send_stage_reward<A, L, F>(
    distributor: &mut Distributor,
    authority: &A,
    caller: &Pubkey,
    ledger: &mut L,
    mut checkpoint: F,
) -> Result<Vec<Event>, ProgramError>
where
    A: AccessAuthority,
    L: FungibleLedger,
    F: FnMut(&Distributor) -> Result<(), ProgramError>,
{
    assert_authorized(
        authority,
        caller,
        Component::Distributor,
        Operation::SendStageReward,
    )?;
    distributor.assert_not_paused()?;

    let reward = rollback_on_error(distributor, |d| {
        d.enter()?;
        let reward = d.begin_stage_reward()?;
        if ledger.balance_of(&d.custody)? < reward.total()? {
            return Err(EmissionError::InsufficientBalance.into());
        }
        checkpoint(&*d)?;
        Ok(reward)
    })?;

    let custody = distributor.custody;
    let Recipients {
        content,
        dev_infra,
        treasury,
    } = distributor.recipients;
    let paid = ledger
        .transfer(&custody, &content, reward.content)
        .and_then(|_| ledger.transfer(&custody, &dev_infra, reward.dev_infra))
        .and_then(|_| ledger.transfer(&custody, &treasury, reward.treasury));
    distributor.exit();
    paid?;

    Ok(vec![
        Event::ContentRewarded {
            recipient: content,
            stage: reward.stage,
            amount: reward.content,
        },
        Event::DevInfraRewarded {
            recipient: dev_infra,
            stage: reward.stage,
            amount: reward.dev_infra,
        },
        Event::TreasuryRewarded {
            recipient: treasury,
            stage: reward.stage,
            amount: reward.treasury,
        },
    ])
}

pub fn set_paused<A: AccessAuthority>(
    distributor: &mut Distributor,
    authority: &A,
    caller: &Pubkey,
    key: &Pubkey,
    paused: bool,
) -> Result<Event, ProgramError> {
    let operation = if paused {
        Operation::Pause
    } else {
        Operation::Unpause
    };
    assert_authorized(authority, caller, Component::Distributor, operation)?;
    distributor.paused = paused;
    Ok(if paused {
        Event::Paused { component: *key }
    } else {
        Event::Unpaused { component: *key }
    })
}
