//! # Provisioning States
//!
//! The management API reports lifecycle phases as free-form strings. This
//! module turns them into a closed [`ProvisioningState`] with an explicit
//! [`ProvisioningState::Other`] escape hatch, and buckets them into a
//! [`StateClass`] the orchestrator can act on.
//!
//! | Class       | Literals                                   |
//! |-------------|--------------------------------------------|
//! | `Running`   | Accepted, Registering, Creating, Running   |
//! | `Ended`     | Canceled, Failed                           |
//! | `Succeeded` | Succeeded (also counts as ended)           |
//! | `Unknown`   | anything else                              |
//!
//! Matching is exact and case-sensitive. `"accepted"` or `"Accepted "` are
//! `Other`.

use std::fmt;
use std::str::FromStr;

/// The semantic bucket a provisioning state falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateClass {
    /// Work is still in flight.
    Running,
    /// Terminal, but not successful.
    Ended,
    /// Terminal and successful.
    Succeeded,
    /// Neither running nor ended.
    Unknown,
}

impl StateClass {
    /// `Succeeded` is a terminal state too.
    pub fn is_terminal(self) -> bool {
        matches!(self, StateClass::Ended | StateClass::Succeeded)
    }
}

/// A provisioning state as reported by the management API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningState {
    Accepted,
    Registering,
    Creating,
    Running,
    Succeeded,
    Canceled,
    Failed,
    Created,
    Deleting,
    Deleted,
    NotSpecified,
    /// A value outside the documented set, kept verbatim.
    Other(String),
}

impl ProvisioningState {
    /// Parses a raw state string. Never fails; unrecognized values become `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Accepted" => Self::Accepted,
            "Registering" => Self::Registering,
            "Creating" => Self::Creating,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Canceled" => Self::Canceled,
            "Failed" => Self::Failed,
            "Created" => Self::Created,
            "Deleting" => Self::Deleting,
            "Deleted" => Self::Deleted,
            "NotSpecified" => Self::NotSpecified,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Accepted => "Accepted",
            Self::Registering => "Registering",
            Self::Creating => "Creating",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Canceled => "Canceled",
            Self::Failed => "Failed",
            Self::Created => "Created",
            Self::Deleting => "Deleting",
            Self::Deleted => "Deleted",
            Self::NotSpecified => "NotSpecified",
            Self::Other(raw) => raw,
        }
    }

    pub fn class(&self) -> StateClass {
        match self {
            Self::Accepted | Self::Registering | Self::Creating | Self::Running => {
                StateClass::Running
            }
            Self::Succeeded => StateClass::Succeeded,
            Self::Canceled | Self::Failed => StateClass::Ended,
            Self::Created | Self::Deleting | Self::Deleted | Self::NotSpecified | Self::Other(_) => {
                StateClass::Unknown
            }
        }
    }

    /// A deployment in this state must not be resubmitted.
    pub fn is_running(&self) -> bool {
        self.class() == StateClass::Running
    }

    /// Polling can stop.
    pub fn is_ended(&self) -> bool {
        self.class().is_terminal()
    }

    pub fn is_succeeded(&self) -> bool {
        self.class() == StateClass::Succeeded
    }
}

impl FromStr for ProvisioningState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ProvisioningState {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Classifies a raw provisioning state string.
pub fn classify(state: &str) -> StateClass {
    ProvisioningState::parse(state).class()
}
