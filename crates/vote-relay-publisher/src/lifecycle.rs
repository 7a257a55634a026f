//! Gateway connection state machine.
//!
//! Every publish owns one connection and walks it through these states:
//!
//! ```text
//!   ┌──────┐     ┌────────────┐     ┌──────┐     ┌─────────┐
//!   │ Idle │────▶│ Connecting │────▶│ Open │────▶│ Sending │
//!   └──┬───┘     └─────┬──────┘     └──┬───┘     └────┬────┘
//!      │               │ (timeout,     │              │ (write ok)
//!      │               │  error)       │              ▼
//!      │               │               │       ┌─────────────────┐
//!      │               │               │       │ Closed(Success) │
//!      │               ▼               ▼       └─────────────────┘
//!      │         ┌─────────────────────────┐
//!      └────────▶│     Closed(Failure)     │◀──── (write error)
//!                └─────────────────────────┘
//! ```
//!
//! `Closed` is terminal. The state machine never leaves it.

use crate::error::{PublishError, Result};

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The frame was written and a normal close was initiated.
    Success,
    /// The connection failed before the frame was written.
    Failure,
}

/// State of a single gateway connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Nothing attempted yet.
    Idle,
    /// Socket handshake in progress; the timeout applies.
    Connecting,
    /// Socket established.
    Open,
    /// Frame write in progress.
    Sending,
    /// Terminal state.
    Closed(CloseOutcome),
}

/// Check if a state transition is valid according to the state machine.
#[must_use]
pub const fn is_valid_transition(from: ConnectionState, to: ConnectionState) -> bool {
    use CloseOutcome::{Failure, Success};
    use ConnectionState::{Closed, Connecting, Idle, Open, Sending};

    matches!(
        (from, to),
        (Idle, Connecting)
            | (Connecting, Open)
            | (Open, Sending)
            | (Sending, Closed(Success))
            | (Idle | Connecting | Open | Sending, Closed(Failure))
    )
}

/// Returns true if the state is terminal.
#[must_use]
pub const fn is_terminal(state: ConnectionState) -> bool {
    matches!(state, ConnectionState::Closed(_))
}

/// Tracks the state of one connection and logs every transition.
#[derive(Debug)]
pub struct ConnectionLifecycle {
    state: ConnectionState,
}

impl ConnectionLifecycle {
    /// Start a lifecycle in `Idle`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ConnectionState::Idle,
        }
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Move to `to`.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::InvalidTransition` if the transition is not
    /// allowed; the state is left unchanged.
    pub fn advance(&mut self, to: ConnectionState) -> Result<()> {
        if !is_valid_transition(self.state, to) {
            return Err(PublishError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!(from = ?self.state, to = ?to, "Gateway connection transition");
        self.state = to;
        Ok(())
    }

    /// Move to `Closed(Failure)` unless already terminal.
    pub fn fail(&mut self) {
        if !is_terminal(self.state) {
            tracing::debug!(from = ?self.state, "Gateway connection failed");
            self.state = ConnectionState::Closed(CloseOutcome::Failure);
        }
    }
}

impl Default for ConnectionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
