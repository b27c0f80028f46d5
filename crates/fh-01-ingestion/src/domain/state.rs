use std::fmt;

/// Lifecycle of the ingestion pump.
///
/// ```text
/// Connecting ──► Reading ◄──► Reconnecting
///      │            │               │
///      ▼            ▼               ▼
///   Failing     Completed        Failing
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PumpState {
    Connecting,
    Reading,
    Reconnecting,
    Completed,
    Failing,
}

impl PumpState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failing)
    }
}

impl fmt::Display for PumpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Reading => "reading",
            Self::Reconnecting => "reconnecting",
            Self::Completed => "completed",
            Self::Failing => "failing",
        };
        f.write_str(name)
    }
}

/// Summary of a pump run that ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpReport {
    pub bytes_read: u64,
    pub reconnects: u32,
    pub final_state: PumpState,
}
