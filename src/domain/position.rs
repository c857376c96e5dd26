use std::fmt;

use ethers::types::{Address, U256};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use super::ratio::{Ratio, RatioError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PositionStatus {
    Acquiring,
    Holding,
    Selling,
    Closed,
    Aborted,
}

impl PositionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PositionStatus::Closed | PositionStatus::Aborted)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub token: Address,
    /// Token amount received from the buy
    pub amount_held: U256,
    /// Base asset spent on the buy
    pub reference_value: U256,
    status: PositionStatus,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PositionError {
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: PositionStatus,
        to: PositionStatus,
    },
    #[error("Buy filled zero tokens")]
    EmptyFill,
    #[error("Reference value must be positive")]
    ZeroReference,
}

impl Position {
    pub fn new(token: Address, reference_value: U256) -> Result<Self, PositionError> {
        if reference_value.is_zero() {
            return Err(PositionError::ZeroReference);
        }

        Ok(Self {
            token,
            amount_held: U256::zero(),
            reference_value,
            status: PositionStatus::Acquiring,
        })
    }

    pub fn status(&self) -> PositionStatus {
        self.status
    }

    pub fn filled(&mut self, amount: U256) -> Result<(), PositionError> {
        self.transition(PositionStatus::Acquiring, PositionStatus::Holding)?;
        if amount.is_zero() {
            self.status = PositionStatus::Aborted;
            return Err(PositionError::EmptyFill);
        }
        self.amount_held = amount;
        Ok(())
    }

    pub fn abort(&mut self) -> Result<(), PositionError> {
        self.transition(PositionStatus::Acquiring, PositionStatus::Aborted)
    }

    /// Claim the exit. Only one caller can move a position out of `Holding`.
    pub fn begin_exit(&mut self) -> Result<(), PositionError> {
        self.transition(PositionStatus::Holding, PositionStatus::Selling)
    }

    pub fn close(&mut self) -> Result<(), PositionError> {
        self.transition(PositionStatus::Selling, PositionStatus::Closed)
    }

    /// Value ratio for a quoted base-asset value of the held amount
    pub fn ratio(&self, current_value: U256) -> Result<Ratio, RatioError> {
        Ratio::of(current_value, self.reference_value)
    }

    fn transition(&mut self, from: PositionStatus, to: PositionStatus) -> Result<(), PositionError> {
        if self.status != from {
            return Err(PositionError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitTrigger {
    TakeProfit,
    StopLoss,
}

impl fmt::Display for ExitTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitTrigger::TakeProfit => write!(f, "take profit"),
            ExitTrigger::StopLoss => write!(f, "stop loss"),
        }
    }
}

/// Exit thresholds, both inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitThresholds {
    pub take_profit: Ratio,
    pub stop_loss: Ratio,
}

impl ExitThresholds {
    pub fn from_decimal(take_profit: Decimal, stop_loss: Decimal) -> Result<Self, RatioError> {
        Ok(Self {
            take_profit: Ratio::from_decimal(take_profit)?,
            stop_loss: Ratio::from_decimal(stop_loss)?,
        })
    }

    pub fn exit_trigger(&self, ratio: Ratio) -> Option<ExitTrigger> {
        if ratio >= self.take_profit {
            Some(ExitTrigger::TakeProfit)
        } else if ratio <= self.stop_loss {
            Some(ExitTrigger::StopLoss)
        } else {
            None
        }
    }
}
