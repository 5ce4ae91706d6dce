//! Application error type.
//!
//! Every failure in the pipeline is terminal, so a single error type carrying
//! a category, a process exit code and a human-readable message is enough.

/// Broad failure category.
///
/// The category decides the process exit code:
///
/// - `InvalidInput` / `Io` -> 2
/// - `InsufficientHistory` -> 3
/// - `DataFetch` / `Model` / `Terminal` -> 4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or market-data provider failure (including unparseable payloads).
    DataFetch,
    /// Fewer rows than the largest lookback window, or an empty split partition.
    InsufficientHistory,
    /// Bad CLI values, malformed CSV rows, invalid series.
    InvalidInput,
    /// Numerical failure while fitting or predicting.
    Model,
    /// File system failure.
    Io,
    /// Terminal setup or draw failure in the TUI.
    Terminal,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidInput | ErrorKind::Io => 2,
            ErrorKind::InsufficientHistory => 3,
            ErrorKind::DataFetch | ErrorKind::Model | ErrorKind::Terminal => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn data_fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataFetch, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Model, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, message)
    }

    /// Not enough rows to compute the requested windows.
    pub fn insufficient_history(required: usize, available: usize) -> Self {
        Self::new(
            ErrorKind::InsufficientHistory,
            format!("Insufficient history: need at least {required} rows, got {available}."),
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
