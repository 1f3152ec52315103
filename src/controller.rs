use std::time::Duration;
use tracing::trace;

use crate::domain::{Message, SVConfig, SVError};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &SVConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    /// Wait up to the poll time for one terminal event and map it.
    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, SVError> {
        if !event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(None);
        }
        let message = match event::read()? {
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                if model.raw_keyevents() {
                    Some(Message::RawKey(key))
                } else {
                    self.handle_key(key)
                }
            }
            Event::Resize(width, height) => Some(Message::Resize(width as usize, height as usize)),
            _ => None,
        };
        Ok(message)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::MoveUp),
            KeyCode::PageDown => Some(Message::MovePageDown),
            KeyCode::PageUp => Some(Message::MovePageUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::MoveBeginning),
            KeyCode::Char('G') | KeyCode::End => Some(Message::MoveEnd),
            KeyCode::Char('/') | KeyCode::Char('f') => Some(Message::Filter),
            KeyCode::Char('x') => Some(Message::ClearFilter),
            KeyCode::Char('c') => Some(Message::Columns),
            KeyCode::Char(' ') => Some(Message::ToggleColumn),
            KeyCode::Char('r') => Some(Message::Reload),
            KeyCode::Char('o') => Some(Message::OpenUrl),
            KeyCode::Char('L') => Some(Message::SwitchLanguage),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Enter => Some(Message::Enter),
            KeyCode::Esc => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
