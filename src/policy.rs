//! Timeout policies.
//!
//! When a wait cycle ends without a message, the configured action decides
//! what the driving loop does next. The set of valid actions depends on the
//! call shape, and strings are validated once at initialization.

use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// Usage shape of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    /// Subscribe and wait, no outbound publish.
    Listen,
    /// Publish, then wait for the response.
    Call,
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallShape::Listen => f.write_str("listen"),
            CallShape::Call => f.write_str("call"),
        }
    }
}

/// Timeout actions for the listen-only shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenTimeoutAction {
    /// Re-arm and wait again.
    #[default]
    KeepWaiting,
    /// End the produced sequence.
    Stop,
}

impl ListenTimeoutAction {
    pub const ALL: [ListenTimeoutAction; 2] = [Self::KeepWaiting, Self::Stop];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeepWaiting => "keep-waiting",
            Self::Stop => "stop",
        }
    }

    /// What a listener does after a timed-out cycle.
    pub fn on_timeout(self) -> ListenOutcome {
        match self {
            Self::KeepWaiting => ListenOutcome::Retry,
            Self::Stop => ListenOutcome::EndOfInput,
        }
    }
}

/// Listener reaction to a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenOutcome {
    /// Run the wait cycle again.
    Retry,
    /// Yield no further items.
    EndOfInput,
}

/// Timeout actions for the call shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallTimeoutAction {
    /// Produce nothing for the item.
    #[default]
    Drop,
    /// Pass the original item through unchanged.
    Input,
}

impl CallTimeoutAction {
    pub const ALL: [CallTimeoutAction; 2] = [Self::Drop, Self::Input];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Input => "input",
        }
    }

    /// Records emitted for `item` when its call timed out.
    pub fn on_timeout<T>(self, item: T) -> Vec<T> {
        match self {
            Self::Drop => Vec::new(),
            Self::Input => vec![item],
        }
    }
}

fn invalid_action(shape: CallShape, action: &str, expected: &[&str]) -> ConfigError {
    ConfigError::InvalidTimeoutAction {
        action: action.to_string(),
        shape,
        expected: expected.join(", "),
    }
}

impl FromStr for ListenTimeoutAction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| invalid_action(CallShape::Listen, s, &Self::ALL.map(|a| a.as_str())))
    }
}

impl FromStr for CallTimeoutAction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| invalid_action(CallShape::Call, s, &Self::ALL.map(|a| a.as_str())))
    }
}

impl fmt::Display for ListenTimeoutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CallTimeoutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timeout action, tagged with the shape it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutAction {
    Listen(ListenTimeoutAction),
    Call(CallTimeoutAction),
}

impl TimeoutAction {
    /// Parse an action name against the set valid for `shape`.
    pub fn parse(shape: CallShape, action: &str) -> Result<Self, ConfigError> {
        match shape {
            CallShape::Listen => action.parse().map(TimeoutAction::Listen),
            CallShape::Call => action.parse().map(TimeoutAction::Call),
        }
    }

    pub fn shape(&self) -> CallShape {
        match self {
            TimeoutAction::Listen(_) => CallShape::Listen,
            TimeoutAction::Call(_) => CallShape::Call,
        }
    }
}

/// What the driving loop does after a timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Run the wait cycle again.
    Retry,
    /// Yield no further items.
    EndOfInput,
    /// Emit these records for the current input item (possibly none).
    Emit(Vec<T>),
}

/// Decide the outcome of a timed-out wait cycle.
///
/// `item` is the original input of a call; listen cycles have none.
pub fn resolve_timeout<T>(action: TimeoutAction, item: Option<T>) -> Outcome<T> {
    match action {
        TimeoutAction::Listen(action) => match action.on_timeout() {
            ListenOutcome::Retry => Outcome::Retry,
            ListenOutcome::EndOfInput => Outcome::EndOfInput,
        },
        TimeoutAction::Call(action) => {
            Outcome::Emit(item.map(|item| action.on_timeout(item)).unwrap_or_default())
        }
    }
}
