/// Application error: a user-facing message plus the process exit code.
///
/// Exit codes:
/// - `2` usage / invalid input (bad dates, empty selection, unreadable CSV)
/// - `3` the selection produced no data
/// - `4` upstream or runtime failure (HTTP, terminal, file writes)
#[derive(Clone, PartialEq, Eq)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub const USAGE: u8 = 2;
    pub const NO_DATA: u8 = 3;
    pub const RUNTIME: u8 = 4;

    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn no_currency_selected() -> Self {
        Self::new(Self::USAGE, "No currency selected. Pick at least one currency.")
    }

    pub fn no_data() -> Self {
        Self::new(
            Self::NO_DATA,
            "No data available for the selected period and currencies.",
        )
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
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
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
