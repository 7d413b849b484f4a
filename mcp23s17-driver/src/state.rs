//! Per-device transaction lifecycle.
//!
//! ```text
//!        begin_write            finish_write
//! Idle ──────────────► Writing ──────────────► Idle
//!   │    begin_read             finish_read
//!   └────────────────► Reading ──────────────► Idle
//! ```
//!
//! A new transaction is only accepted while idle, in both directions.

use embassy_sync::signal::Signal;
use log::{debug, warn};

use crate::error::{ExpanderError, TransportFault};
use crate::registers::RegisterAddress;

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    Idle,
    Writing,
    Reading,
}

/// Notification from the transport that the in-flight transfer has ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The frame went out.
    Done,
    /// The transfer failed after it was submitted.
    Failed(TransportFault),
}

/// Channel through which a transfer-complete interrupt hands a [`Completion`]
/// to the device that started the transfer.
pub type CompletionSignal<M> = Signal<M, Completion>;

/// A finished transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transaction {
    #[allow(missing_docs)]
    Write { register: RegisterAddress, data: u8 },
    #[allow(missing_docs)]
    Read { register: RegisterAddress, value: u8 },
}

/// Tracks what one device is doing and what it last did.
#[derive(Debug, Default)]
pub struct StateMachine {
    state: State,
    write_register: Option<RegisterAddress>,
    write_data: u8,
    pending_read: Option<RegisterAddress>,
    last_read: Option<(RegisterAddress, u8)>,
}

impl StateMachine {
    #[allow(missing_docs)]
    pub const fn new() -> Self {
        Self {
            state: State::Idle,
            write_register: None,
            write_data: 0,
            pending_read: None,
            last_read: None,
        }
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Start a write of `data` to `register`.
    pub fn begin_write(&mut self, register: RegisterAddress, data: u8) -> Result<(), ExpanderError> {
        self.ensure_idle()?;
        self.write_register = Some(register);
        self.write_data = data;
        self.state = State::Writing;
        debug!("begin write {:?} <- 0x{:02x}", register, data);
        Ok(())
    }

    /// Start a read of `register`.
    pub fn begin_read(&mut self, register: RegisterAddress) -> Result<(), ExpanderError> {
        self.ensure_idle()?;
        self.pending_read = Some(register);
        self.state = State::Reading;
        debug!("begin read {:?}", register);
        Ok(())
    }

    /// The write frame went out.
    pub fn finish_write(&mut self) -> Result<Transaction, ExpanderError> {
        match (self.state, self.write_register) {
            (State::Writing, Some(register)) => {
                self.state = State::Idle;
                Ok(Transaction::Write {
                    register,
                    data: self.write_data,
                })
            }
            _ => Err(ExpanderError::Parameter),
        }
    }

    /// The data byte of the pending read arrived.
    pub fn finish_read(&mut self, value: u8) -> Result<Transaction, ExpanderError> {
        match (self.state, self.pending_read) {
            (State::Reading, Some(register)) => {
                self.state = State::Idle;
                self.pending_read = None;
                self.last_read = Some((register, value));
                Ok(Transaction::Read { register, value })
            }
            _ => Err(ExpanderError::Parameter),
        }
    }

    /// Drop whatever was in flight and go back to idle.
    pub fn reset(&mut self) -> State {
        self.pending_read = None;
        core::mem::take(&mut self.state)
    }

    /// Register and data of the last write that was started.
    pub fn last_write(&self) -> Option<(RegisterAddress, u8)> {
        self.write_register.map(|register| (register, self.write_data))
    }

    /// Register and value of the last read that completed.
    pub fn last_read(&self) -> Option<(RegisterAddress, u8)> {
        self.last_read
    }

    fn ensure_idle(&self) -> Result<(), ExpanderError> {
        if self.state == State::Idle {
            Ok(())
        } else {
            warn!("transaction rejected, device is {:?}", self.state);
            Err(ExpanderError::Busy)
        }
    }
}
