use std::time::Duration;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;

use crate::i18n::Locale;

/// The Ads.txt library sheet. Used when no url is given.
pub const DEFAULT_SHEET_URL: &str =
    "https://docs.google.com/spreadsheets/d/1IO9Oc5NXABOARpqYECWKZt8BwDwxn-PdJyb0rm8UgO4/edit?gid=0";

pub const HELP_TEXT: &str = "\
q        Quit
j / ↓    Next row
k / ↑    Previous row
PgDn     Page down
PgUp     Page up
g / Home First row
G / End  Last row
/ or f   Filter rows (live, Enter keeps, Esc restores)
x        Clear filter
c        Column picker (Space / Enter toggles)
r        Reload sheet
o        Open another sheet url
L        Switch language
?        This help
Esc      Close popup";

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    Filter,
    ClearFilter,
    Columns,
    ToggleColumn,
    Reload,
    OpenUrl,
    SwitchLanguage,
    Help,
    Enter,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

/// What the command line input is currently used for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    Filter,
    OpenUrl,
}

#[derive(Debug, Clone, Setters)]
pub struct SVConfig {
    pub source_url: String,
    pub locale: Locale,
    pub fetch_timeout: Duration,
    pub event_poll_time: u64,
    pub max_column_width: usize,
}

impl Default for SVConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SHEET_URL.to_string(),
            locale: Locale::En,
            fetch_timeout: Duration::from_secs(30),
            event_poll_time: 100,
            max_column_width: 40,
        }
    }
}

#[derive(Debug, Error)]
pub enum SVError {
    #[error("Invalid Google Sheets URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch data: {0}")]
    FetchFailure(String),

    #[error("{0}")]
    IoError(#[from] std::io::Error),
}

impl From<reqwest::Error> for SVError {
    fn from(err: reqwest::Error) -> Self {
        SVError::FetchFailure(err.to_string())
    }
}
