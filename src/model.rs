use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

use crate::domain::{CMDMode, HELP_TEXT, Message, SVConfig, SVError};
use crate::i18n::Locale;
use crate::inputter::{InputResult, Inputter};
use crate::loader::{LoadOutcome, LoadRequest};
use crate::projection::{Projection, ViewState, project};
use crate::resolver::resolve_export_url;
use crate::table::Dataset;
use crate::ui::{
    CMDLINE_HEIGH, COLUMN_WIDTH_MARGIN, NAVBAR_HEIGHT, TABLE_BORDER_HEIGHT, TABLE_HEADER_HEIGHT,
    TITLE_HEIGHT,
};

#[derive(Debug, PartialEq)]
pub enum Status {
    Running,
    Quitting,
}

/// Where the current load stands. Only `Ready` carries data.
#[derive(Debug, PartialEq)]
pub enum LoadState {
    Loading,
    Error(String),
    Ready(Dataset),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    Table,
    Columns,
    Popup,
    CmdInput,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnView {
    pub name: String,
    pub width: usize,
    pub data: Vec<String>,
}

#[derive(Debug)]
pub enum TableStatus {
    Loading,
    Error(String),
    Ready,
}

/// What the ui needs to draw one frame.
pub struct UIData {
    pub locale: Locale,
    pub status: TableStatus,
    pub source_url: String,
    pub table: Vec<ColumnView>,
    pub nrows: usize, // Rows passing the filter
    pub total_rows: usize,
    pub selected_row: usize,
    pub abs_selected_row: usize,
    pub filter_text: String,
    pub columns: Vec<(String, bool)>,
    pub column_curser: usize,
    pub show_columns: bool,
    pub show_popup: bool,
    pub popup_message: String,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
}

pub struct Model {
    config: SVConfig,
    pub status: Status,
    locale: Locale,
    source_url: String,
    generation: u64,
    pending_load: Option<LoadRequest>,
    load_state: LoadState,
    view: ViewState,
    projection: Projection,
    column_widths: Vec<usize>,
    modus: Modus,
    previous_modus: Modus,
    curser_row: usize,
    offset_row: usize,
    column_curser: usize,
    table_height: usize,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    filter_before_input: String,
    popup_message: String,
    status_message: String,
}

impl Model {
    pub fn init(config: &SVConfig, ui_width: usize, ui_height: usize) -> Self {
        trace!("Init model for a {ui_width}x{ui_height} ui");
        Self {
            config: config.clone(),
            status: Status::Running,
            locale: config.locale,
            source_url: config.source_url.clone(),
            generation: 0,
            pending_load: None,
            load_state: LoadState::Loading,
            view: ViewState::default(),
            projection: Projection::default(),
            column_widths: Vec::new(),
            modus: Modus::Table,
            previous_modus: Modus::Table,
            curser_row: 0,
            offset_row: 0,
            column_curser: 0,
            table_height: Self::table_height_for(ui_height),
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            filter_before_input: String::new(),
            popup_message: String::new(),
            status_message: config.locale.translate("status.started").to_string(),
        }
    }

    // -------------------------- Load lifecycle ---------------------------- //

    /// Start loading `source_url`, superseding any load still in flight.
    ///
    /// The previous dataset is dropped right away. An url without a
    /// spreadsheet id fails here, before any request is made, and `None` is
    /// returned. Otherwise the returned request has to be handed to the
    /// loader, whose outcome comes back through `finish_load`.
    pub fn load(&mut self, source_url: &str) -> Option<LoadRequest> {
        self.generation += 1;
        self.source_url = source_url.to_string();
        self.reset_view();
        info!("Load #{} of {}", self.generation, source_url);

        match resolve_export_url(source_url) {
            Ok(export_url) => {
                self.load_state = LoadState::Loading;
                self.set_status_message(self.locale.translate("table.loading").to_string());
                Some(LoadRequest {
                    generation: self.generation,
                    export_url,
                })
            }
            Err(e) => {
                self.fail_load(e);
                None
            }
        }
    }

    /// Apply a finished load. Outcomes of superseded requests are ignored.
    pub fn finish_load(&mut self, outcome: LoadOutcome) {
        if outcome.generation != self.generation {
            debug!(
                "Dropping stale load #{} (current #{})",
                outcome.generation, self.generation
            );
            return;
        }
        match outcome.result {
            Ok(dataset) => {
                self.view = ViewState::for_dataset(&dataset);
                self.column_widths = dataset.column_widths();
                self.set_status_message(format!(
                    "{} {} {}",
                    self.locale.translate("status.loaded"),
                    dataset.len(),
                    self.locale.translate("table.rows")
                ));
                self.load_state = LoadState::Ready(dataset);
                self.update_projection();
            }
            Err(e) => self.fail_load(e),
        }
    }

    /// Load request produced by a reload or open url action, if any.
    pub fn take_load_request(&mut self) -> Option<LoadRequest> {
        self.pending_load.take()
    }

    fn fail_load(&mut self, err: SVError) {
        error!("Loading {} failed: {err}", self.source_url);
        self.reset_view();
        self.load_state = LoadState::Error(err.to_string());
        self.set_status_message(err.to_string());
    }

    fn reset_view(&mut self) {
        self.load_state = LoadState::Loading;
        self.view = ViewState::default();
        self.projection = Projection::default();
        self.column_widths.clear();
        self.curser_row = 0;
        self.offset_row = 0;
        self.column_curser = 0;
        if self.modus == Modus::Columns {
            self.modus = Modus::Table;
        }
    }

    fn request_load(&mut self, source_url: String) {
        self.pending_load = self.load(&source_url);
    }

    // ---------------------------- View state ------------------------------ //

    /// Show or hide a column. Only possible once data is loaded.
    pub fn toggle_column(&mut self, column: &str) -> Option<bool> {
        if !matches!(self.load_state, LoadState::Ready(_)) {
            warn!("Ignoring column toggle while no data is loaded");
            return None;
        }
        let visible = self.view.toggle_column(column)?;
        self.update_projection();
        Some(visible)
    }

    /// Set the row filter. Only possible once data is loaded.
    pub fn set_filter_text(&mut self, text: &str) {
        if !matches!(self.load_state, LoadState::Ready(_)) {
            warn!("Ignoring filter while no data is loaded");
            return;
        }
        self.view.set_filter_text(text);
        self.update_projection();
    }

    fn update_projection(&mut self) {
        let LoadState::Ready(dataset) = &self.load_state else {
            self.projection = Projection::default();
            return;
        };
        let start_time = Instant::now();
        self.projection = project(dataset, &self.view);
        trace!(
            "Projected {}/{} rows, {} columns in {}ms",
            self.projection.nrows(),
            dataset.len(),
            self.projection.columns.len(),
            start_time.elapsed().as_millis()
        );
        // Keep the cursor inside the filtered rows.
        let last = self.projection.nrows().saturating_sub(1);
        let abs = std::cmp::min(self.offset_row + self.curser_row, last);
        self.select_row(abs);
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::CmdInput
    }

    pub fn quit(&mut self) {
        self.status = Status::Quitting;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        trace!("Status: {}", self.status_message);
    }

    // ------------------------------ UI data ------------------------------- //

    pub fn get_uidata(&self) -> UIData {
        let status = match &self.load_state {
            LoadState::Loading => TableStatus::Loading,
            LoadState::Error(msg) => TableStatus::Error(msg.clone()),
            LoadState::Ready(_) => TableStatus::Ready,
        };
        UIData {
            locale: self.locale,
            status,
            source_url: self.source_url.clone(),
            table: self.build_table_window(),
            nrows: self.projection.nrows(),
            total_rows: self.total_rows(),
            selected_row: self.curser_row,
            abs_selected_row: self.offset_row + self.curser_row,
            filter_text: self.view.filter_text().to_string(),
            columns: self
                .view
                .columns()
                .iter()
                .map(|c| (c.clone(), self.view.is_visible(c)))
                .collect(),
            column_curser: self.column_curser,
            show_columns: self.modus == Modus::Columns
                || (self.modus == Modus::Popup && self.previous_modus == Modus::Columns),
            show_popup: self.modus == Modus::Popup,
            popup_message: self.popup_message.clone(),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.modus == Modus::CmdInput,
            status_message: self.status_message.clone(),
        }
    }

    /// Visible columns restricted to the rows currently on screen.
    fn build_table_window(&self) -> Vec<ColumnView> {
        let LoadState::Ready(dataset) = &self.load_state else {
            return Vec::new();
        };
        let rbegin = self.offset_row;
        let rend = std::cmp::min(rbegin + self.table_height, self.projection.nrows());
        let rows: Vec<Vec<&str>> = (rbegin..rend)
            .map(|r| self.projection.cells(dataset, r))
            .collect();

        self.projection
            .columns
            .iter()
            .zip(self.projection.column_indices())
            .enumerate()
            .map(|(vidx, (name, &cidx))| {
                let width = self.column_widths.get(cidx).copied().unwrap_or(0);
                ColumnView {
                    name: name.clone(),
                    width: std::cmp::min(width + COLUMN_WIDTH_MARGIN, self.config.max_column_width),
                    data: rows.iter().map(|cells| cells[vidx].to_string()).collect(),
                }
            })
            .collect()
    }

    fn table_height_for(ui_height: usize) -> usize {
        let chrome = NAVBAR_HEIGHT + TITLE_HEIGHT + TABLE_BORDER_HEIGHT + TABLE_HEADER_HEIGHT
            + CMDLINE_HEIGH;
        std::cmp::max(ui_height.saturating_sub(chrome), 1)
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!("UI was resized! w:{width}, h:{height}");
        self.table_height = Self::table_height_for(height);
        let abs = self.offset_row + self.curser_row;
        self.select_row(abs);
    }

    // ------------------------------ Messages ------------------------------ //

    pub fn update(&mut self, message: Option<Message>) -> Result<(), SVError> {
        let Some(msg) = message else {
            return Ok(());
        };
        trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);

        if let Message::Resize(width, height) = msg {
            self.ui_resize(width, height);
            return Ok(());
        }

        match self.modus {
            Modus::Table => match msg {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_table_selection_down(1),
                Message::MoveUp => self.move_table_selection_up(1),
                Message::MovePageDown => self.move_table_selection_down(self.table_height),
                Message::MovePageUp => self.move_table_selection_up(self.table_height),
                Message::MoveBeginning => self.select_row(0),
                Message::MoveEnd => self.select_row(self.projection.nrows().saturating_sub(1)),
                Message::Filter => self.enter_cmd_mode(CMDMode::Filter),
                Message::ClearFilter | Message::Exit => self.clear_filter(),
                Message::Columns => self.open_column_picker(),
                Message::Reload => self.request_load(self.source_url.clone()),
                Message::OpenUrl => self.enter_cmd_mode(CMDMode::OpenUrl),
                Message::SwitchLanguage => self.switch_language(),
                Message::Help => self.show_help(),
                _ => (),
            },
            Modus::Columns => match msg {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_column_curser(1),
                Message::MoveUp => self.move_column_curser(-1),
                Message::ToggleColumn | Message::Enter => self.toggle_selected_column(),
                Message::Columns | Message::Exit => self.modus = Modus::Table,
                Message::SwitchLanguage => self.switch_language(),
                Message::Help => self.show_help(),
                _ => (),
            },
            Modus::Popup => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter | Message::Help => {
                    trace!("Close popup ...");
                    self.modus = self.previous_modus;
                    self.previous_modus = Modus::Popup;
                }
                _ => (),
            },
            Modus::CmdInput => {
                if let Message::RawKey(key) = msg {
                    self.raw_input(key)
                }
            }
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn switch_language(&mut self) {
        self.locale = self.locale.next();
        self.set_status_message(self.locale.name());
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::Popup;
        self.popup_message = HELP_TEXT.to_string();
    }

    fn open_column_picker(&mut self) {
        if !matches!(self.load_state, LoadState::Ready(_)) {
            return;
        }
        self.modus = Modus::Columns;
        self.column_curser = std::cmp::min(
            self.column_curser,
            self.view.columns().len().saturating_sub(1),
        );
    }

    fn move_column_curser(&mut self, step: i32) {
        let ncolumns = self.view.columns().len();
        if ncolumns == 0 {
            return;
        }
        self.column_curser = if step < 0 {
            self.column_curser.saturating_sub(step.unsigned_abs() as usize)
        } else {
            std::cmp::min(self.column_curser + step as usize, ncolumns - 1)
        };
    }

    fn toggle_selected_column(&mut self) {
        let Some(column) = self.view.columns().get(self.column_curser).cloned() else {
            return;
        };
        self.toggle_column(&column);
    }

    fn clear_filter(&mut self) {
        if !self.view.filter_text().is_empty() {
            self.set_filter_text("");
        }
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        if mode == CMDMode::Filter && !matches!(self.load_state, LoadState::Ready(_)) {
            return;
        }
        trace!("Entering command mode {mode:?} ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CmdInput;
        self.cmd_mode = Some(mode);

        self.input.clear();
        match mode {
            CMDMode::Filter => {
                self.filter_before_input = self.view.filter_text().to_string();
                self.input.set(&self.filter_before_input);
            }
            CMDMode::OpenUrl => self.input.set(&self.source_url),
        }
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        self.last_input = self.input.read(key);
        if self.cmd_mode == Some(CMDMode::Filter) && !self.last_input.canceled {
            // Filter while typing
            let text = self.last_input.input.clone();
            self.set_filter_text(&text);
        }
        if self.last_input.finished {
            self.handle_cmd_input();
        }
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {}", self.last_input.input);
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CmdInput;

        let cmd_input = self.last_input.input.clone();
        let canceled = self.last_input.canceled;
        match self.cmd_mode {
            Some(CMDMode::Filter) if canceled => {
                let previous = std::mem::take(&mut self.filter_before_input);
                self.set_filter_text(&previous);
            }
            Some(CMDMode::Filter) => {
                self.set_status_message(format!(
                    "{} / {} {}",
                    self.projection.nrows(),
                    self.total_rows(),
                    self.locale.translate("table.rows")
                ));
            }
            Some(CMDMode::OpenUrl) if !canceled && !cmd_input.trim().is_empty() => {
                self.request_load(cmd_input.trim().to_string());
            }
            Some(CMDMode::OpenUrl) => {}
            None => info!("Cmd mode is none!"),
        }
        self.cmd_mode = None;
        self.last_input = InputResult::default();
    }

    fn total_rows(&self) -> usize {
        match &self.load_state {
            LoadState::Ready(dataset) => dataset.len(),
            _ => 0,
        }
    }

    fn select_row(&mut self, row: usize) {
        let nrows = self.projection.nrows();
        if nrows == 0 {
            self.curser_row = 0;
            self.offset_row = 0;
            return;
        }
        let row = std::cmp::min(row, nrows - 1);
        if row < self.offset_row {
            self.offset_row = row;
        } else if row >= self.offset_row + self.table_height {
            self.offset_row = row + 1 - self.table_height;
        }
        self.curser_row = row - self.offset_row;
    }

    fn move_table_selection_up(&mut self, size: usize) {
        let abs = self.offset_row + self.curser_row;
        self.select_row(abs.saturating_sub(size));
    }

    fn move_table_selection_down(&mut self, size: usize) {
        let abs = self.offset_row + self.curser_row;
        self.select_row(abs + size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    const URL: &str = "https://docs.google.com/spreadsheets/d/abc123/edit?gid=5";

    fn model() -> Model {
        Model::init(&SVConfig::default(), 80, 24)
    }

    fn ready(model: &mut Model, csv: &str) {
        let request = model.load(URL).unwrap();
        model.finish_load(LoadOutcome {
            generation: request.generation,
            result: Ok(crate::parser::parse_csv(csv)),
        });
    }

    fn key(model: &mut Model, code: KeyCode) {
        model
            .update(Some(Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE))))
            .unwrap();
    }

    #[test]
    fn starts_loading_and_becomes_ready() {
        let mut model = model();
        assert_eq!(*model.load_state(), LoadState::Loading);

        let request = model.load(URL).unwrap();
        assert_eq!(
            request.export_url,
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv&gid=5"
        );
        assert_eq!(*model.load_state(), LoadState::Loading);

        model.finish_load(LoadOutcome {
            generation: request.generation,
            result: Ok(crate::parser::parse_csv("a,b\n1,2\n3,4")),
        });
        assert!(matches!(model.load_state(), LoadState::Ready(ds) if ds.len() == 2));
        assert_eq!(model.view().visible_columns(), vec!["a", "b"]);
        assert_eq!(model.projection().nrows(), 2);
    }

    #[test]
    fn startup_message_follows_the_locale() {
        let model = Model::init(&SVConfig::default().locale(Locale::Vi), 80, 24);
        assert_eq!(model.get_uidata().status_message, "Đã khởi động sv!");
    }

    #[test]
    fn invalid_url_fails_without_a_request() {
        let mut model = model();
        assert!(model.load("https://example.com/nothing-here").is_none());
        assert!(matches!(model.load_state(), LoadState::Error(msg) if msg.contains("Invalid")));
    }

    #[test]
    fn fetch_failure_clears_previous_dataset() {
        let mut model = model();
        ready(&mut model, "a\n1");

        let request = model.load(URL).unwrap();
        // Nothing of the old dataset survives while loading
        assert_eq!(model.projection().nrows(), 0);
        model.finish_load(LoadOutcome {
            generation: request.generation,
            result: Err(SVError::FetchFailure("404 Not Found".to_string())),
        });
        assert!(matches!(model.load_state(), LoadState::Error(msg) if msg.contains("404")));
        assert!(model.view().columns().is_empty());
        assert!(model.get_uidata().table.is_empty());
    }

    #[test]
    fn stale_outcome_does_not_overwrite_newer_load() {
        let mut model = model();
        let first = model.load(URL).unwrap();
        let second = model.load(URL).unwrap();
        assert!(second.generation > first.generation);

        model.finish_load(LoadOutcome {
            generation: second.generation,
            result: Ok(crate::parser::parse_csv("new\nx")),
        });
        model.finish_load(LoadOutcome {
            generation: first.generation,
            result: Ok(crate::parser::parse_csv("old\ny")),
        });
        assert_eq!(model.view().columns(), ["new"]);
    }

    #[test]
    fn reload_resets_visible_columns() {
        let mut model = model();
        ready(&mut model, "a,b\n1,2");
        model.toggle_column("a");
        assert_eq!(model.view().visible_columns(), vec!["b"]);

        model.update(Some(Message::Reload)).unwrap();
        let request = model.take_load_request().unwrap();
        assert_eq!(*model.load_state(), LoadState::Loading);
        model.finish_load(LoadOutcome {
            generation: request.generation,
            result: Ok(crate::parser::parse_csv("a,b,c\n1,2,3")),
        });
        assert_eq!(model.view().visible_columns(), vec!["a", "b", "c"]);
    }

    #[test]
    fn view_changes_are_ignored_until_ready() {
        let mut model = model();
        model.load(URL);
        model.set_filter_text("x");
        assert_eq!(model.toggle_column("a"), None);
        assert_eq!(model.view().filter_text(), "");
    }

    #[test]
    fn live_filter_and_escape_restores_previous_text() {
        let mut model = model();
        ready(&mut model, "name\nemma\nmark\nbeta");

        model.update(Some(Message::Filter)).unwrap();
        assert!(model.raw_keyevents());
        key(&mut model, KeyCode::Char('M'));
        assert_eq!(model.projection().nrows(), 2);
        key(&mut model, KeyCode::Enter);
        assert!(!model.raw_keyevents());
        assert_eq!(model.view().filter_text(), "M");

        model.update(Some(Message::Filter)).unwrap();
        key(&mut model, KeyCode::Char('m'));
        assert_eq!(model.projection().nrows(), 1);
        key(&mut model, KeyCode::Esc);
        assert_eq!(model.view().filter_text(), "M");
        assert_eq!(model.projection().nrows(), 2);

        model.update(Some(Message::ClearFilter)).unwrap();
        assert_eq!(model.projection().nrows(), 3);
    }

    #[test]
    fn column_picker_toggles_selected_column() {
        let mut model = model();
        ready(&mut model, "a,b,c\n1,2,3");

        model.update(Some(Message::Columns)).unwrap();
        model.update(Some(Message::MoveDown)).unwrap();
        model.update(Some(Message::ToggleColumn)).unwrap();
        let ui = model.get_uidata();
        assert!(ui.show_columns);
        assert_eq!(
            ui.columns,
            vec![
                ("a".to_string(), true),
                ("b".to_string(), false),
                ("c".to_string(), true)
            ]
        );
        assert_eq!(
            ui.table.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );

        model.update(Some(Message::Enter)).unwrap();
        model.update(Some(Message::Exit)).unwrap();
        let ui = model.get_uidata();
        assert!(!ui.show_columns);
        assert_eq!(ui.table.len(), 3);
    }

    #[test]
    fn open_url_starts_a_new_load() {
        let mut model = model();
        ready(&mut model, "a\n1");

        model.update(Some(Message::OpenUrl)).unwrap();
        for _ in 0..80 {
            key(&mut model, KeyCode::Backspace);
        }
        for c in "https://docs.google.com/spreadsheets/d/other/edit".chars() {
            key(&mut model, KeyCode::Char(c));
        }
        key(&mut model, KeyCode::Enter);

        let request = model.take_load_request().unwrap();
        assert!(request.export_url.contains("/d/other/export"));
        assert_eq!(model.source_url(), "https://docs.google.com/spreadsheets/d/other/edit");
        assert_eq!(*model.load_state(), LoadState::Loading);
    }

    #[test]
    fn cursor_scrolls_over_filtered_rows() {
        let mut model = Model::init(&SVConfig::default(), 80, 12);
        let csv = (0..50).fold(String::from("n"), |acc, i| format!("{acc}\n{i}"));
        ready(&mut model, &csv);
        let height = model.table_height;

        model.update(Some(Message::MoveEnd)).unwrap();
        let ui = model.get_uidata();
        assert_eq!(ui.abs_selected_row, 49);
        assert_eq!(ui.selected_row, height - 1);
        assert_eq!(ui.table[0].data.last().map(String::as_str), Some("49"));

        model.update(Some(Message::MoveDown)).unwrap();
        assert_eq!(model.get_uidata().abs_selected_row, 49);

        model.set_filter_text("4");
        // 4, 14, 24, 34, 40..49, 44 counted once
        assert_eq!(model.projection().nrows(), 14);
        assert_eq!(model.get_uidata().abs_selected_row, 13);

        model.update(Some(Message::MoveBeginning)).unwrap();
        assert_eq!(model.get_uidata().abs_selected_row, 0);
    }

    #[test]
    fn language_switch_keeps_data() {
        let mut model = model();
        ready(&mut model, "a\n1");
        model.update(Some(Message::SwitchLanguage)).unwrap();
        assert_eq!(model.locale(), Locale::Vi);
        assert_eq!(model.projection().nrows(), 1);
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = model();
        model.update(Some(Message::Help)).unwrap();
        assert!(model.get_uidata().show_popup);
        model.update(Some(Message::Exit)).unwrap();
        assert!(!model.get_uidata().show_popup);
        model.update(Some(Message::Quit)).unwrap();
        assert_eq!(model.status, Status::Quitting);
    }
}
