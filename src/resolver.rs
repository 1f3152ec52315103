use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::domain::SVError;

const EXPORT_BASE: &str = "https://docs.google.com/spreadsheets/d";
const DEFAULT_GID: &str = "0";

static SPREADSHEET_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("valid spreadsheet id pattern"));
static SHEET_GID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&#]gid=(\d+)").expect("valid gid pattern"));

/// A spreadsheet tab identified from a user facing sheet url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSource {
    pub spreadsheet_id: String,
    pub gid: String,
}

impl SheetSource {
    /// Extract the spreadsheet id and tab gid from `sheet_url`.
    ///
    /// The gid is looked up in the query string and in the fragment, as the
    /// browser puts it in either place. A missing gid selects the first tab.
    pub fn parse(sheet_url: &str) -> Result<Self, SVError> {
        let spreadsheet_id = SPREADSHEET_ID
            .captures(sheet_url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| SVError::InvalidUrl(sheet_url.to_string()))?;

        let gid = SHEET_GID
            .captures(sheet_url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_GID.to_string());

        Ok(Self {
            spreadsheet_id,
            gid,
        })
    }

    pub fn export_url(&self) -> String {
        format!(
            "{EXPORT_BASE}/{}/export?format=csv&gid={}",
            self.spreadsheet_id, self.gid
        )
    }
}

/// Turn a public sheet url into the url that exports the tab as csv.
pub fn resolve_export_url(sheet_url: &str) -> Result<String, SVError> {
    let source = SheetSource::parse(sheet_url)?;
    let export_url = source.export_url();
    trace!("Resolved {sheet_url} => {export_url}");
    Ok(export_url)
}
