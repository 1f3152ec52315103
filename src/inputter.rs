use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Single line text editor driven by key events. The cursor counts chars,
/// not bytes.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
    finished: bool,
    canceled: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        trace!("Input key {:?}", key.code);
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.enter(),
            (KeyCode::Esc, _) => self.escape(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.home(),
            (KeyCode::End, _) => self.end(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.current_input.clear();
                self.curser_pos = 0;
                self.get()
            }
            (kc, km) => self.key(kc, km),
        }
    }

    /// Replace the content and put the cursor behind it.
    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = s.chars().count();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
        }
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.get()
    }

    fn escape(&mut self) -> InputResult {
        self.clear();
        self.canceled = true;
        self.finished = true;
        self.get()
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let at = self.getbytepos();
            self.current_input.remove(at);
        }
        self.get()
    }

    fn delete(&mut self) -> InputResult {
        if self.curser_pos < self.len() {
            let at = self.getbytepos();
            self.current_input.remove(at);
        }
        self.get()
    }

    fn left(&mut self) -> InputResult {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        self.get()
    }

    fn right(&mut self) -> InputResult {
        if self.curser_pos < self.len() {
            self.curser_pos += 1;
        }
        self.get()
    }

    fn home(&mut self) -> InputResult {
        self.curser_pos = 0;
        self.get()
    }

    fn end(&mut self) -> InputResult {
        self.curser_pos = self.len();
        self.get()
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) -> InputResult {
        if modifier.contains(KeyModifiers::CONTROL) || modifier.contains(KeyModifiers::ALT) {
            return self.get();
        }
        if let Some(chr) = code.as_char() {
            self.current_input.insert(self.getbytepos(), chr);
            self.curser_pos += 1;
        }
        self.get()
    }

    fn len(&self) -> usize {
        self.current_input.chars().count()
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}
