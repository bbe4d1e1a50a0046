use serde::{Deserialize, Serialize};

/// Synchronization status of a working copy.
///
/// When several conditions hold at once the precedence is
/// `Dirty > NoUpstream > Unpushed > Clean`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Status {
    Clean = 0,
    Dirty = 1,
    Unpushed = 2,
    NoUpstream = 3,
}

/// Label rendered for a status code outside the known variants
pub const UNKNOWN_LABEL: &str = "unknown";

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Clean => "clean",
            Status::Dirty => "dirty",
            Status::Unpushed => "unpushed",
            Status::NoUpstream => "no upstream",
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Status {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Status::Clean),
            1 => Ok(Status::Dirty),
            2 => Ok(Status::Unpushed),
            3 => Ok(Status::NoUpstream),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Label for a raw status code. Never fails: unrecognized codes render as
/// [`UNKNOWN_LABEL`].
pub fn status_label(code: u8) -> &'static str {
    Status::try_from(code)
        .map(Status::label)
        .unwrap_or(UNKNOWN_LABEL)
}

/// Classify a repository from its observed facts. First matching rule wins.
///
/// A negative `ahead` is treated like zero.
pub fn classify(dirty: bool, has_upstream: bool, ahead: i64) -> Status {
    if dirty {
        Status::Dirty
    } else if !has_upstream {
        Status::NoUpstream
    } else if ahead > 0 {
        Status::Unpushed
    } else {
        Status::Clean
    }
}
