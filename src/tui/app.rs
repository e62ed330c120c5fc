use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    models::Post,
    search::{SearchController, SearchState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Editing,
    Detail,
    ConfirmDelete,
}

/// Work the event loop performs against the API on the app's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Open(i64),
    Delete(i64),
}

pub struct App {
    pub controller: SearchController,
    pub state: SearchState,
    pub input: String,
    pub selected: usize,
    pub mode: Mode,
    pub detail: Option<Post>,
    pub scroll: u16,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(controller: SearchController) -> Self {
        let state = controller.state();
        Self {
            input: state.query.clone(),
            controller,
            state,
            selected: 0,
            mode: Mode::Browse,
            detail: None,
            scroll: 0,
            status: None,
            should_quit: false,
        }
    }

    pub fn set_state(&mut self, state: SearchState) {
        self.state = state;
        if self.selected >= self.state.items.len() {
            self.selected = self.state.items.len().saturating_sub(1);
        }
    }

    pub fn next(&mut self) {
        if !self.state.items.is_empty() {
            self.selected = (self.selected + 1) % self.state.items.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.state.items.is_empty() {
            self.selected = if self.selected == 0 {
                self.state.items.len() - 1
            } else {
                self.selected - 1
            };
        }
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.state.items.get(self.selected)
    }

    pub fn show_detail(&mut self, post: Post) {
        self.detail = Some(post);
        self.scroll = 0;
        self.mode = Mode::Detail;
    }

    pub fn after_delete(&mut self) {
        self.detail = None;
        self.mode = Mode::Browse;
        self.status = Some("Post deleted.".to_string());
        // Removing the last post on a page leaves nothing to show there.
        if self.state.items.len() <= 1 && self.state.page > 1 {
            self.selected = 0;
            self.controller.set_page(self.state.page - 1);
        } else {
            self.controller.load();
        }
    }

    /// Moves by `delta` pages, ignoring moves off either end.
    fn change_page(&mut self, delta: i64) {
        let Some(controls) = self.state.controls() else {
            return;
        };
        let target = i64::from(self.state.page) + delta;
        if let Ok(target) = u32::try_from(target) {
            if controls.accepts(target) {
                self.selected = 0;
                self.controller.set_page(target);
            }
        }
    }

    fn target_id(&self) -> Option<i64> {
        match self.mode {
            Mode::Detail | Mode::ConfirmDelete if self.detail.is_some() => {
                self.detail.as_ref().map(|p| p.id)
            }
            _ => self.selected_post().map(|p| p.id),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        match self.mode {
            Mode::Editing => self.handle_editing(key),
            Mode::Browse => self.handle_browse(key),
            Mode::Detail => self.handle_detail(key),
            Mode::ConfirmDelete => self.handle_confirm(key),
        }
    }

    fn handle_editing(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char(c) => {
                self.input.push(c);
                self.controller.set_query(self.input.clone());
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.controller.set_query(self.input.clone());
            }
            KeyCode::Enter => {
                let path = self.controller.submit();
                self.status = Some(format!("Share: {}", path));
                self.selected = 0;
                self.mode = Mode::Browse;
            }
            KeyCode::Esc => self.mode = Mode::Browse,
            _ => {}
        }
        None
    }

    fn handle_browse(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => {
                self.status = None;
                self.mode = Mode::Editing;
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Right | KeyCode::Char('n') => self.change_page(1),
            KeyCode::Left | KeyCode::Char('p') => self.change_page(-1),
            KeyCode::Char('r') => self.controller.load(),
            KeyCode::Char('d') if self.selected_post().is_some() => {
                self.mode = Mode::ConfirmDelete;
            }
            KeyCode::Enter => return self.selected_post().map(|p| Action::Open(p.id)),
            _ => {}
        }
        None
    }

    fn handle_detail(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => {
                self.detail = None;
                self.mode = Mode::Browse;
            }
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Char('d') => self.mode = Mode::ConfirmDelete,
            _ => {}
        }
        None
    }

    fn handle_confirm(&mut self, key: KeyEvent) -> Option<Action> {
        let target = self.target_id();
        self.mode = if self.detail.is_some() {
            Mode::Detail
        } else {
            Mode::Browse
        };

        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => target.map(Action::Delete),
            _ => None,
        }
    }
}
