#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfiguratorError {
    #[error("asset is missing required entries: {}", missing.join(", "))]
    AssetIncomplete { missing: Vec<String> },
    #[error("an asset is already registered; unload it first")]
    AssetAlreadyLoaded,
    #[error("asset has not finished loading")]
    AssetNotReady,
    #[error("unknown scene node: {0}")]
    UnknownNode(String),
    #[error("unknown swappable surface: {0}")]
    UnknownSurface(String),
    #[error("unknown animation clip: {0}")]
    UnknownClip(String),
    #[error("unknown swatch: {0}")]
    UnknownSwatch(String),
    #[error("unknown preset view: {0}")]
    UnknownPreset(String),
    #[error("stale async result (epoch {ticket_epoch}, current {current_epoch})")]
    StaleAsyncResult {
        ticket_epoch: u64,
        current_epoch: u64,
    },
}

pub type Result<T> = std::result::Result<T, ConfiguratorError>;
