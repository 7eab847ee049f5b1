use thiserror::Error;

pub type Result<T> = std::result::Result<T, CadenceError>;

#[derive(Debug, Error)]
pub enum CadenceError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("draw error: {0}")]
    Draw(#[from] DrawError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration problems abort plan generation for the affected account.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    MissingConfig(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("action count bounds invalid: min {min} > max {max}")]
    InvalidActionBounds { min: u32, max: u32 },
    #[error("no action types available for generation")]
    NoEligibleActions,
    #[error("no usable wallets in configuration")]
    NoUsableWallets,
}

/// Draw-level failures are non-fatal inside the generator; the draw is
/// skipped and the next iteration proceeds.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("no NFT contracts left for venue `{0}`")]
    NftInventoryEmpty(String),
    #[error("no token with positive balance for account {0}")]
    NoFundedToken(u32),
    #[error("no eligible pool token for `{0}`")]
    NoEligiblePoolToken(String),
    #[error("failed to pick a to-token for swap")]
    NoSwapCandidate,
    #[error("`{0}` breaks deposit/withdraw alternation")]
    OutOfSequence(String),
    #[error("venue `{venue}` does not support token {token}")]
    UnsupportedToken { venue: String, token: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("state file encoding failure: {0}")]
    Encoding(#[from] serde_json::Error),
}
