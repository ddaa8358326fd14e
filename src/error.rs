use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum JournalError {
    #[error("Trade {0} not found")]
    TradeNotFound(String),
    #[error("Setup {0} not found")]
    SetupNotFound(String),
    #[error("Setup name '{0}' is already in use")]
    DuplicateSetupName(String),
    #[error("Net worth entry {0} not found")]
    NetWorthEntryNotFound(String),
    #[error("Invalid criterion selector '{0}' (expected bucket:name with bucket htf, ltf or etf)")]
    InvalidSelector(String),
    #[error("Unknown criteria bucket '{0}'")]
    UnknownBucket(String),
    #[error("Unsupported journal snapshot version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}
