use crate::audio::{AudioEngine, NullAudioEngine, RodioAudioEngine};
use crate::clipboard::{ClipboardSink, CopyIndicator, SystemClipboard};
use crate::config;
use crate::contact::ContactForm;
use crate::content::content;
use crate::model::{Page, bundled_playlist};
use crate::player::PlayerController;
use crate::projects::ProjectBrowser;
use crate::relay::{self, ContactRelay, RelayError};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::theme::ThemeManager;
use crate::ui::{self, UiLayout, View};
use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::Rect;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

const SEEK_STEP: f64 = 0.05;
const VOLUME_STEP: f32 = 0.05;

#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub asset_root: PathBuf,
    pub force_silent: bool,
}

pub struct App<S: KeyValueStore> {
    pub theme: ThemeManager<S>,
    pub player: PlayerController,
    pub page: Page,
    pub scroll: u16,
    pub form: ContactForm,
    pub editing_form: bool,
    pub status: String,
    pub dirty: bool,
    pub projects: ProjectBrowser,
    pub selected_link: usize,
    pub copied: CopyIndicator,
    clipboard: Box<dyn ClipboardSink>,
    relay: Arc<dyn ContactRelay>,
    pending_send: Option<Receiver<Result<(), RelayError>>>,
    layout: UiLayout,
    seen_theme_revision: u64,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(theme: ThemeManager<S>, player: PlayerController, relay: Arc<dyn ContactRelay>) -> Self {
        let seen_theme_revision = theme.revision();
        Self {
            theme,
            player,
            page: Page::default(),
            scroll: 0,
            form: ContactForm::new(),
            editing_form: false,
            status: String::from("Welcome"),
            dirty: true,
            projects: ProjectBrowser::new(),
            selected_link: 0,
            copied: CopyIndicator::new(),
            clipboard: Box::new(SystemClipboard),
            relay,
            pending_send: None,
            layout: UiLayout::default(),
            seen_theme_revision,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn set_layout(&mut self, layout: UiLayout) {
        self.layout = layout;
    }

    pub fn is_sending(&self) -> bool {
        self.pending_send.is_some()
    }

    /// True when anything visible changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        let theme_changed = self.theme.revision() != self.seen_theme_revision;
        self.seen_theme_revision = self.theme.revision();
        let dirty = self.dirty || self.player.dirty || theme_changed;
        self.dirty = false;
        self.player.dirty = false;
        dirty
    }

    /// Per-iteration housekeeping: engine polling, idle close, relay replies.
    pub fn poll(&mut self, now: Instant) {
        self.player.tick();
        if self.player.poll_idle(now) {
            log::debug!("player panel closed after idle period");
        }
        if self.form.poll_banner(now) {
            self.dirty = true;
        }
        if self.copied.poll(now) {
            self.dirty = true;
        }

        let Some(rx) = self.pending_send.as_ref() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(RelayError::Disconnected),
        };
        self.pending_send = None;
        self.status = match &result {
            Ok(()) => String::from("Message sent"),
            Err(_) => String::from("Message not sent"),
        };
        self.form.finish_submit(result, now);
        self.dirty = true;
    }

    pub fn go_to(&mut self, page: Page) {
        if self.page != page {
            self.page = page;
            self.scroll = 0;
            self.editing_form = false;
            self.form.set_focus(None);
            self.projects.searching = false;
            self.projects.close_detail();
            self.dirty = true;
        }
    }

    /// Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        if self.editing_form {
            self.handle_form_key(key);
            return false;
        }
        if self.projects.searching {
            self.handle_search_key(key);
            return false;
        }

        if self.player.panel().is_open() && self.handle_panel_key(key, now) {
            self.player.touch(now);
            return false;
        }

        let consumed = match self.page {
            Page::Home => self.handle_home_key(key),
            Page::Projects => self.handle_projects_key(key),
            Page::Contacts => self.handle_contacts_key(key, now),
            Page::About | Page::BehindStory => false,
        };
        if consumed {
            self.dirty = true;
            return false;
        }

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Right | KeyCode::Tab => self.go_to(self.page.next()),
            KeyCode::Left | KeyCode::BackTab => self.go_to(self.page.prev()),
            KeyCode::Char(ch @ '1'..='5') => {
                let index = usize::from(ch as u8 - b'1');
                self.go_to(Page::ALL[index]);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                self.dirty = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                self.dirty = true;
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                self.dirty = true;
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                self.dirty = true;
            }
            KeyCode::Char('t') => {
                self.theme.toggle_mode();
                self.status = format!("{} mode", self.theme.mode().as_str());
                self.dirty = true;
            }
            KeyCode::Char('a') => {
                self.theme.cycle_accent();
                self.status = format!("Accent: {}", self.theme.theme().accent_name);
                self.dirty = true;
            }
            KeyCode::Char('m') => self.player.press_main_button(now),
            _ => {}
        }
        false
    }

    /// Call-to-action keys listed on the home page.
    fn handle_home_key(&mut self, key: KeyEvent) -> bool {
        let KeyCode::Char(ch) = key.code else {
            return false;
        };
        let Some(action) = content().home.action_for(ch) else {
            return false;
        };
        self.go_to(Page::from_id(&action.target));
        true
    }

    fn handle_projects_key(&mut self, key: KeyEvent) -> bool {
        let site = content();
        if self.projects.detail().is_some() {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace => {
                    self.projects.close_detail();
                    true
                }
                _ => false,
            };
        }

        let techs = site.project_technologies();
        match key.code {
            KeyCode::Char('/') => self.projects.searching = true,
            KeyCode::Char('c') => self.projects.cycle_category(&site.project_categories()),
            KeyCode::Char('h') => self.projects.move_tech_cursor(-1, techs.len()),
            KeyCode::Char('l') => self.projects.move_tech_cursor(1, techs.len()),
            KeyCode::Char(' ') => self.projects.toggle_tech_at_cursor(&techs),
            KeyCode::Char('r') => {
                self.projects.reset();
                self.status = String::from("Filters cleared");
            }
            KeyCode::Down | KeyCode::Char('j') => self.projects.select_next(&site.projects),
            KeyCode::Up | KeyCode::Char('k') => self.projects.select_prev(),
            KeyCode::Enter => {
                self.projects.open_detail(&site.projects);
            }
            _ => return false,
        }
        true
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.projects.searching = false,
            KeyCode::Backspace => self.projects.pop_search(),
            KeyCode::Char(ch) => self.projects.push_search(ch),
            _ => return,
        }
        self.dirty = true;
    }

    fn handle_contacts_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        let link_count = content().contacts.links.len();
        match key.code {
            KeyCode::Char('e') => {
                self.editing_form = true;
                self.form.focus_next();
            }
            KeyCode::Char('x') => self.form.dismiss_banner(),
            KeyCode::Down | KeyCode::Char('j') if link_count > 0 => {
                self.selected_link = (self.selected_link + 1).min(link_count - 1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_link = self.selected_link.saturating_sub(1);
            }
            KeyCode::Char('c') => self.copy_selected_link(now),
            _ => return false,
        }
        true
    }

    fn copy_selected_link(&mut self, now: Instant) {
        let Some(link) = content().contacts.links.get(self.selected_link) else {
            return;
        };
        match self.clipboard.set_text(&link.text) {
            Ok(()) => {
                self.copied.mark(self.selected_link, now);
                self.status = format!("Copied {}", link.label);
            }
            Err(err) => {
                log::warn!("failed to copy {}: {err:#}", link.label);
                self.status = String::from("Clipboard unavailable");
            }
        }
    }

    /// Player controls while the panel is open. Returns true if the key was consumed.
    fn handle_panel_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        match key.code {
            KeyCode::Char(' ') => self.player.toggle_play(),
            KeyCode::Char('n') => self.player.next(),
            KeyCode::Char('b') => self.player.previous(),
            KeyCode::Char('s') => self.player.toggle_shuffle(),
            KeyCode::Char('r') => self.player.toggle_repeat(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.player.nudge_volume(VOLUME_STEP),
            KeyCode::Char('-') => self.player.nudge_volume(-VOLUME_STEP),
            KeyCode::Char('0') => self.player.toggle_mute(),
            KeyCode::Char('l') => self.player.toggle_playlist_view(now),
            KeyCode::Char(']') => self.player.next_page(),
            KeyCode::Char('[') => self.player.prev_page(),
            KeyCode::Char('>') | KeyCode::Char('.') => {
                self.player.seek_fraction(self.player.progress() + SEEK_STEP)
            }
            KeyCode::Char('<') | KeyCode::Char(',') => {
                self.player.seek_fraction(self.player.progress() - SEEK_STEP)
            }
            KeyCode::Char(ch @ ('1' | '2')) if self.player.panel().shows_playlist() => {
                let slot = usize::from(ch as u8 - b'1');
                let index = self.player.playlist_page() * crate::player::TRACKS_PER_PAGE + slot;
                self.player.select_track(index);
            }
            KeyCode::Esc => self.player.close_panel(),
            _ => return false,
        }
        if let Some(err) = self.player.last_error() {
            self.status = err.to_string();
            self.dirty = true;
        }
        true
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.editing_form = false;
                self.form.set_focus(None);
            }
            KeyCode::Tab | KeyCode::Down => self.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus_prev(),
            KeyCode::Backspace => self.form.pop_char(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char(ch) => self.form.push_char(ch),
            _ => return,
        }
        self.dirty = true;
    }

    fn submit_form(&mut self) {
        if self.pending_send.is_some() {
            return;
        }
        match self.form.begin_submit() {
            Some(params) => {
                self.pending_send = Some(relay::spawn_send(Arc::clone(&self.relay), params));
                self.editing_form = false;
                self.form.set_focus(None);
                self.status = String::from("Sending message...");
            }
            None => self.status = String::from("Please fix the highlighted fields"),
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let over_player = point_in_rect(mouse.column, mouse.row, self.layout.player);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) if over_player => {
                self.player.touch(now);
            }
            MouseEventKind::Down(MouseButton::Left) if over_player => {
                if !self.player.panel().is_open() {
                    self.player.press_main_button(now);
                    return;
                }
                self.player.touch(now);
                if mouse.row == self.layout.progress.y
                    && let Some(fraction) = ui::progress_fraction(self.layout.progress, mouse.column)
                {
                    self.player.seek_fraction(fraction);
                } else if mouse.row == self.layout.page_dots.y
                    && let Some(page) = ui::page_dot_at(
                        self.layout.page_dots,
                        mouse.column,
                        self.player.page_count(),
                    )
                {
                    self.player.set_page(page);
                }
            }
            MouseEventKind::ScrollDown if !over_player => {
                self.scroll = self.scroll.saturating_add(1);
                self.dirty = true;
            }
            MouseEventKind::ScrollUp if !over_player => {
                self.scroll = self.scroll.saturating_sub(1);
                self.dirty = true;
            }
            _ => {}
        }
    }

    pub fn view(&self) -> View<'_> {
        View {
            theme: self.theme.theme(),
            page: self.page,
            scroll: self.scroll,
            player: &self.player,
            form: &self.form,
            editing_form: self.editing_form,
            status: &self.status,
            projects: &self.projects,
            selected_link: self.selected_link,
            copied: &self.copied,
        }
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}

fn open_store() -> Box<dyn KeyValueStore> {
    match config::ensure_config_dir().and_then(|_| config::storage_path()) {
        Ok(path) => Box::new(FileStore::open(&path)),
        Err(err) => {
            log::warn!("preferences will not be saved: {err:#}");
            Box::new(MemoryStore::new())
        }
    }
}

fn open_audio(force_silent: bool) -> Box<dyn AudioEngine> {
    if force_silent {
        return Box::new(NullAudioEngine::new());
    }
    match RodioAudioEngine::new() {
        Ok(engine) => Box::new(engine),
        Err(err) => {
            log::warn!("no audio output, playing silently: {err:#}");
            Box::new(NullAudioEngine::new())
        }
    }
}

pub fn run(options: AppOptions) -> Result<()> {
    let theme = ThemeManager::restore(open_store());
    let tracks = bundled_playlist(&config::music_dir(&options.asset_root));
    let mut player = PlayerController::new(open_audio(options.force_silent), tracks);
    player.mount();
    let relay = relay::relay_from_credentials(config::relay_credentials());
    let mut app = App::new(theme, player, relay);

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut last_draw = Instant::now();
    let result: Result<()> = loop {
        app.poll(Instant::now());

        if app.take_dirty() || last_draw.elapsed() > Duration::from_millis(250) {
            let mut regions = UiLayout::default();
            terminal.draw(|frame| regions = ui::draw(frame, &app.view()))?;
            app.set_layout(regions);
            last_draw = Instant::now();
        }

        if !event::poll(Duration::from_millis(33))? {
            continue;
        }

        let now = Instant::now();
        match event::read()? {
            Event::Key(key) => {
                if app.handle_key(key, now) {
                    break Ok(());
                }
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse, now),
            Event::Resize(_, _) => app.dirty = true,
            _ => {}
        }
    };

    app.player.unmount();
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    log::info!("folio exiting");
    result
}
