use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("store error: {0}")]
    Store(#[from] board_store::StoreError),

    #[error("filter pipeline error: {0}")]
    Pipeline(String),

    #[error("board not accessible: {0}")]
    BoardInaccessible(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    /// An error the simplified-retry tier cannot absorb. It propagates to
    /// the orchestrator-level guard, which performs the last-resort reset.
    #[error("fatal search error: {0}")]
    Fatal(String),

    #[error("{0}")]
    Other(String),
}
