use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState},
};

use crate::domain::CMDMode;
use crate::i18n::Locale;
use crate::model::{Model, TableStatus, UIData};

pub const NAVBAR_HEIGHT: usize = 1;
pub const TITLE_HEIGHT: usize = 1;
pub const TABLE_BORDER_HEIGHT: usize = 2;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const CMDLINE_HEIGH: usize = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 1;

const NAV_ITEMS: [&str; 5] = ["nav.main", "nav.lines", "nav.test", "nav.library", "nav.contact"];
const ACTIVE_NAV_ITEM: &str = "nav.library";
const EMPTY_CELL: &str = "-";

#[derive(Default)]
pub struct TableUI {
    table_state: TableState,
    list_state: ListState,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [navbar, title, table, cmdline] = Layout::vertical([
            Constraint::Length(NAVBAR_HEIGHT as u16),
            Constraint::Length(TITLE_HEIGHT as u16),
            Constraint::Min(0),
            Constraint::Length(CMDLINE_HEIGH as u16),
        ])
        .areas(frame.area());

        Self::draw_navbar(&uidata, frame, navbar);
        Self::draw_title(&uidata, frame, title);
        match &uidata.status {
            TableStatus::Loading => Self::draw_loading(&uidata, frame, table),
            TableStatus::Error(detail) => Self::draw_error(&uidata, detail, frame, table),
            TableStatus::Ready => self.draw_table(&uidata, frame, table),
        }
        Self::draw_cmdline(&uidata, frame, cmdline);

        if uidata.show_columns {
            self.draw_column_picker(&uidata, frame, table);
        }
        if uidata.show_popup {
            Self::draw_popup(&uidata, frame, table);
        }
    }

    fn draw_navbar(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let t = |key| uidata.locale.translate(key);

        let mut items = vec![" OMP Team ".green().bold(), " ".into()];
        for key in NAV_ITEMS {
            let label = format!(" {} ", t(key));
            if key == ACTIVE_NAV_ITEM {
                items.push(Span::styled(label, Style::new().black().on_blue()));
            } else {
                items.push(Span::styled(label, Style::new().gray()));
            }
        }

        let right = Line::from(vec![
            Span::styled(uidata.locale.name(), Style::new().yellow()),
            " | ".into(),
            Span::styled(format!("{} ", t("nav.logout")), Style::new().gray()),
        ]);
        let [left_area, right_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(right.width() as u16)])
                .areas(area);
        frame.render_widget(Paragraph::new(Line::from(items)), left_area);
        frame.render_widget(Paragraph::new(right), right_area);
    }

    fn draw_title(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let t = |key| uidata.locale.translate(key);
        let visible = uidata.columns.iter().filter(|(_, v)| *v).count();
        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", t("sheet.title")),
                Style::new().add_modifier(Modifier::BOLD),
            ),
            format!(" {}: ", t("table.filters")).into(),
            Span::styled(uidata.filter_text.clone(), Style::new().yellow()),
            format!("  {}: {}/{}", t("table.columns"), visible, uidata.columns.len()).into(),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_loading(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let block = Block::bordered().border_set(border::THICK);
        let text = Text::from(vec![
            Line::from(""),
            Line::from(uidata.locale.translate("table.loading").bold()),
            Line::from(uidata.source_url.as_str().dark_gray()),
        ]);
        frame.render_widget(Paragraph::new(text).centered().block(block), area);
    }

    fn draw_error(uidata: &UIData, detail: &str, frame: &mut Frame, area: Rect) {
        let block = Block::bordered().border_set(border::THICK).red();
        let text = Text::from(vec![
            Line::from(""),
            Line::from(uidata.locale.translate("table.error").red().bold()),
            Line::from(detail.to_string()),
        ]);
        frame.render_widget(Paragraph::new(text).centered().block(block), area);
    }

    fn draw_table(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_set(border::THICK)
            .title_bottom(
                Line::from(format!(
                    " {}/{} ({}) ",
                    if uidata.nrows == 0 { 0 } else { uidata.abs_selected_row + 1 },
                    uidata.nrows,
                    uidata.total_rows
                ))
                .right_aligned(),
            );

        if uidata.table.is_empty() {
            // Every column is hidden
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        }

        let header = Row::new(
            uidata
                .table
                .iter()
                .map(|c| Cell::from(get_visible_name(&c.name, c.width))),
        )
        .style(Style::new().bold().underlined());

        let widths = uidata
            .table
            .iter()
            .map(|c| Constraint::Length(c.width as u16));

        let nrows = uidata.table[0].data.len();
        let rows: Vec<Row> = if uidata.nrows == 0 {
            let mut cells = vec![Cell::from(
                uidata.locale.translate("table.no_results").italic(),
            )];
            cells.extend((1..uidata.table.len()).map(|_| Cell::from("")));
            vec![Row::new(cells)]
        } else {
            (0..nrows)
                .map(|r| {
                    Row::new(uidata.table.iter().map(|c| {
                        let value = c.data[r].as_str();
                        Cell::from(if value.is_empty() { EMPTY_CELL } else { value })
                    }))
                })
                .collect()
        };

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .row_highlight_style(Style::new().reversed());

        if uidata.nrows == 0 {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(uidata.selected_row));
        }
        // The model already scrolled, the widget must not scroll again.
        *self.table_state.offset_mut() = 0;
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_column_picker(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let area = popup_area(area, 50, 80);
        let items: Vec<ListItem> = uidata
            .columns
            .iter()
            .map(|(name, visible)| {
                let mark = if *visible { "[x]" } else { "[ ]" };
                ListItem::new(format!("{mark} {name}"))
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::bordered()
                    .border_set(border::ROUNDED)
                    .title(format!(" {} ", uidata.locale.translate("table.toggle_columns"))),
            )
            .highlight_style(Style::new().reversed());

        self.list_state.select(Some(uidata.column_curser));
        frame.render_widget(Clear, area);
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn draw_popup(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let area = popup_area(area, 60, 90);
        let block = Block::bordered()
            .border_set(border::ROUNDED)
            .title(format!(" {} ", uidata.locale.translate("status.help")));
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(uidata.popup_message.as_str()).block(block),
            area,
        );
    }

    fn draw_cmdline(uidata: &UIData, frame: &mut Frame, area: Rect) {
        if uidata.active_cmdinput {
            let prefix = match uidata.cmd_mode {
                Some(CMDMode::Filter) => format!("{}: ", uidata.locale.translate("table.filters")),
                Some(CMDMode::OpenUrl) => {
                    format!("{}: ", uidata.locale.translate("status.open_url"))
                }
                None => String::from(": "),
            };
            let prefix_width = prefix.chars().count();
            let input = if uidata.cmdinput.input.is_empty() && uidata.cmd_mode == Some(CMDMode::Filter)
            {
                placeholder(uidata.locale)
            } else {
                Span::raw(uidata.cmdinput.input.clone())
            };
            frame.render_widget(
                Paragraph::new(Line::from(vec![Span::styled(prefix, Style::new().bold()), input])),
                area,
            );
            let offset = u16::try_from(prefix_width + uidata.cmdinput.curser_pos).unwrap_or(u16::MAX);
            let cursor_x = area
                .x
                .saturating_add(offset)
                .min(area.right().saturating_sub(1));
            frame.set_cursor_position(Position::new(cursor_x, area.y));
        } else {
            let help = " ? ".blue().bold();
            let [left, right] =
                Layout::horizontal([Constraint::Min(0), Constraint::Length(help.width() as u16)])
                    .areas(area);
            frame.render_widget(Paragraph::new(uidata.status_message.as_str()), left);
            frame.render_widget(Paragraph::new(help), right);
        }
    }
}

fn placeholder(locale: Locale) -> Span<'static> {
    Span::styled(
        locale.translate("table.filter_placeholder"),
        Style::new().dark_gray(),
    )
}

/// Shorten a column name so it fits into `width` characters.
fn get_visible_name(name: &str, width: usize) -> String {
    if width < 3 {
        return String::new();
    }
    if name.chars().count() > width {
        let mut reduced_name: String = name.chars().take(width - 3).collect();
        reduced_name.push_str("...");
        reduced_name
    } else {
        name.to_string()
    }
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, SVConfig, SVError};
    use crate::loader::LoadOutcome;
    use crate::parser::parse_csv;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};

    const URL: &str = "https://docs.google.com/spreadsheets/d/abc/edit";

    fn render(model: &Model) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let mut ui = TableUI::new();
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn finish(model: &mut Model, result: Result<&str, SVError>) {
        let request = model.load(URL).unwrap();
        model.finish_load(LoadOutcome {
            generation: request.generation,
            result: result.map(parse_csv),
        });
    }

    #[test]
    fn shows_loading_indicator() {
        let mut model = Model::init(&SVConfig::default(), 80, 20);
        model.load(URL);
        let screen = render(&model);
        assert!(screen.contains("Loading data..."));
        assert!(screen.contains("Ads.txt Library"));
        assert!(screen.contains("Library"));
    }

    #[test]
    fn shows_error_instead_of_table() {
        let mut model = Model::init(&SVConfig::default(), 80, 20);
        finish(&mut model, Err(SVError::FetchFailure("500 Internal".into())));
        let screen = render(&model);
        assert!(screen.contains("Failed to load data"));
        assert!(screen.contains("500 Internal"));
    }

    #[test]
    fn renders_visible_columns_and_placeholder_for_empty_cells() {
        let mut model = Model::init(&SVConfig::default(), 80, 20);
        finish(&mut model, Ok("domain,type,secret\nexample.com,,hidden-value"));
        model.toggle_column("secret");
        let screen = render(&model);
        assert!(screen.contains("domain"));
        assert!(screen.contains("example.com"));
        assert!(screen.contains(" - "));
        assert!(!screen.contains("hidden-value"));
    }

    #[test]
    fn shows_no_results_row() {
        let mut model = Model::init(&SVConfig::default(), 80, 20);
        finish(&mut model, Ok("a\nx"));
        model.set_filter_text("nothing");
        assert!(render(&model).contains("No results found"));
    }

    #[test]
    fn renders_in_vietnamese() {
        let mut model =
            Model::init(&SVConfig::default().locale(Locale::Vi), 80, 20);
        model.update(Some(Message::Help)).unwrap();
        let screen = render(&model);
        assert!(screen.contains("Thư viện Ads.txt"));
        assert!(screen.contains("Trợ giúp"));
    }

    #[test]
    fn cursor_stays_inside_the_cmdline_for_long_input() {
        let mut model = Model::init(&SVConfig::default(), 30, 20);
        model.update(Some(Message::OpenUrl)).unwrap();
        for _ in 0..200 {
            model
                .update(Some(Message::RawKey(KeyEvent::new(
                    KeyCode::Char('x'),
                    KeyModifiers::NONE,
                ))))
                .unwrap();
        }
        let mut terminal = Terminal::new(TestBackend::new(30, 20)).unwrap();
        let mut ui = TableUI::new();
        terminal.draw(|f| ui.draw(&model, f)).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!(cursor.x, 29);
        assert_eq!(cursor.y, 19);
    }

    #[test]
    fn long_names_are_shortened() {
        assert_eq!(get_visible_name("advertiser", 7), "adve...");
        assert_eq!(get_visible_name("id", 7), "id");
        assert_eq!(get_visible_name("id", 2), "");
    }
}
