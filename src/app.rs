use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{ListState, Paragraph},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::browse::{self, BrowsePage, Category};
use crate::carousel::Carousel;
use crate::catalog::{
    CatalogApi, EpisodeSummary, MediaDetail, MediaId, MediaSummary, MediaType, SearchQuery,
};
use crate::config::Config;
use crate::detail::{DetailCommand, DetailOrchestrator, Display, RequestToken};
use crate::error::Result;
use crate::player::UrlOpener;
use crate::search;
use crate::ui::{render_browse_view, render_detail_view, render_search_view, render_tabs, widgets};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Browse,
    Search,
    Help,
}

pub enum AppMessage {
    PageLoaded {
        category: Category,
        token: u64,
        page: BrowsePage,
    },
    SearchResults {
        token: u64,
        results: Vec<MediaSummary>,
    },
    SearchError {
        token: u64,
        error: String,
    },
    DetailLoaded {
        token: RequestToken,
        result: Result<MediaDetail>,
    },
    SeasonLoaded {
        token: RequestToken,
        season: u32,
        result: Result<Vec<EpisodeSummary>>,
    },
}

/// Load state of one category tab.
#[derive(Debug, Default)]
pub struct PageState {
    pub page: Option<BrowsePage>,
    pub loading: bool,
    pub token: u64,
    pub focus: usize,
    pub list_states: Vec<ListState>,
}

impl PageState {
    fn section_count(&self) -> usize {
        self.page
            .as_ref()
            .map(|p| p.visible_sections().count())
            .unwrap_or(0)
    }
}

pub struct App {
    pub config: Config,
    pub running: bool,
    pub view: View,
    pub previous_view: View,
    pub accent: Color,

    pub category: Category,
    pub pages: HashMap<Category, PageState>,
    pub carousel: Carousel,

    pub search_query: String,
    pub search_editing: bool,
    pub search_results: Vec<MediaSummary>,
    pub search_state: ListState,
    pub search_loading: bool,
    pub search_token: u64,

    pub detail: DetailOrchestrator,
    pub opener: UrlOpener,
    pub status: Option<String>,

    pub msg_tx: mpsc::UnboundedSender<AppMessage>,
    pub msg_rx: mpsc::UnboundedReceiver<AppMessage>,

    pub api: Arc<dyn CatalogApi>,
    last_token: u64,
}

impl App {
    pub fn new(config: Config, api: Arc<dyn CatalogApi>) -> Self {
        let accent = widgets::parse_accent_color(&config.ui.accent_color);
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();

        let pages = Category::ALL
            .iter()
            .map(|c| (*c, PageState::default()))
            .collect();

        Self {
            running: true,
            view: View::Browse,
            previous_view: View::Browse,
            accent,

            category: Category::Home,
            pages,
            carousel: Carousel::new(Duration::from_secs(config.ui.carousel_interval_secs.max(1))),

            search_query: String::new(),
            search_editing: false,
            search_results: Vec::new(),
            search_state: ListState::default(),
            search_loading: false,
            search_token: 0,

            detail: DetailOrchestrator::new(config.playback.embed_base_url.clone()),
            opener: UrlOpener::from_config(&config.playback),
            status: None,

            msg_tx,
            msg_rx,

            api,
            last_token: 0,
            config,
        }
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.load_category(self.category);

        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
            self.process_messages();
            self.carousel.tick(Instant::now());
        }

        info!("Shutting down");
        Ok(())
    }

    fn next_token(&mut self) -> u64 {
        self.last_token += 1;
        self.last_token
    }

    fn process_messages(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.handle_message(msg);
        }
    }

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::PageLoaded {
                category,
                token,
                page,
            } => self.apply_page(category, token, page),
            AppMessage::SearchResults { token, results } => {
                if token != self.search_token {
                    debug!(token, "Dropping stale search results");
                    return;
                }
                self.search_loading = false;
                self.search_results = results;
                self.search_state
                    .select((!self.search_results.is_empty()).then_some(0));
            }
            AppMessage::SearchError { token, error } => {
                if token != self.search_token {
                    return;
                }
                self.search_loading = false;
                self.search_results.clear();
                self.search_state.select(None);
                self.status = Some(format!("Search failed: {}", error));
            }
            AppMessage::DetailLoaded { token, result } => {
                if let Some(cmd) = self.detail.on_detail_loaded(token, result) {
                    self.dispatch(cmd);
                }
            }
            AppMessage::SeasonLoaded {
                token,
                season,
                result,
            } => {
                self.detail.on_season_loaded(token, season, result);
            }
        }
    }

    fn apply_page(&mut self, category: Category, token: u64, page: BrowsePage) {
        let state = self.pages.entry(category).or_default();
        if state.token != token {
            debug!(category = category.as_display(), token, "Dropping stale page");
            return;
        }

        state.loading = false;
        state.focus = 0;
        state.list_states = page
            .visible_sections()
            .map(|_| ListState::default().with_selected(Some(0)))
            .collect();

        if category == Category::Home {
            self.carousel.reset(page.carousel.len(), Instant::now());
        }
        state.page = Some(page);
    }

    /// Fetch a category page. A newer load supersedes any in flight.
    fn load_category(&mut self, category: Category) {
        let token = self.next_token();
        let state = self.pages.entry(category).or_default();
        state.loading = true;
        state.token = token;

        let window = self.config.ui.trending_window;
        let api = Arc::clone(&self.api);
        let tx = self.msg_tx.clone();

        tokio::spawn(async move {
            let page = browse::load(api.as_ref(), category, window).await;
            let _ = tx.send(AppMessage::PageLoaded {
                category,
                token,
                page,
            });
        });
    }

    fn switch_category(&mut self, category: Category) {
        self.category = category;
        self.view = View::Browse;

        let needs_load = self
            .pages
            .get(&category)
            .is_none_or(|s| s.page.is_none() && !s.loading);
        if needs_load {
            self.load_category(category);
        }
    }

    fn perform_search(&mut self) {
        let query = match SearchQuery::new(&self.search_query) {
            Ok(query) => query,
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        };

        let token = self.next_token();
        self.search_token = token;
        self.search_loading = true;
        self.search_editing = false;
        self.search_results.clear();
        self.search_state.select(None);

        let api = Arc::clone(&self.api);
        let tx = self.msg_tx.clone();

        tokio::spawn(async move {
            match search::search(api.as_ref(), query.as_str()).await {
                Ok(results) => {
                    let _ = tx.send(AppMessage::SearchResults { token, results });
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::SearchError {
                        token,
                        error: e.to_string(),
                    });
                }
            }
        });
    }

    fn clear_search(&mut self) {
        self.search_query.clear();
        self.search_results.clear();
        self.search_state.select(None);
        self.search_loading = false;
        self.search_editing = false;
        // Results still in flight are now stale
        self.search_token = self.next_token();
        self.view = View::Browse;
    }

    /// Run a detail command on a background task.
    fn dispatch(&self, cmd: DetailCommand) {
        let api = Arc::clone(&self.api);
        let tx = self.msg_tx.clone();

        match cmd {
            DetailCommand::FetchDetail { token, kind, id } => {
                tokio::spawn(async move {
                    let result = api.details(kind, id).await;
                    let _ = tx.send(AppMessage::DetailLoaded { token, result });
                });
            }
            DetailCommand::FetchSeason {
                token,
                series_id,
                season,
            } => {
                tokio::spawn(async move {
                    let result = api.season_details(series_id, season).await;
                    let _ = tx.send(AppMessage::SeasonLoaded {
                        token,
                        season,
                        result,
                    });
                });
            }
        }
    }

    fn open_detail(&mut self, id: MediaId, media_type: MediaType) {
        self.status = None;
        let cmd = self.detail.open(id, media_type);
        self.dispatch(cmd);
    }

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let tabs_area = chunks[0];
        let main_area = chunks[1];
        let help_area = chunks[2];

        render_tabs(frame, tabs_area, self.category, self.accent);

        let base = if self.view == View::Help {
            self.previous_view
        } else {
            self.view
        };

        match base {
            View::Search => {
                render_search_view(
                    frame,
                    main_area,
                    &self.search_query,
                    self.search_editing,
                    &self.search_results,
                    &mut self.search_state,
                    self.search_loading,
                    self.accent,
                );
            }
            View::Browse | View::Help => {
                let category = self.category;
                let state = self.pages.entry(category).or_default();
                render_browse_view(
                    frame,
                    main_area,
                    category,
                    state.page.as_ref(),
                    state.loading,
                    state.focus,
                    &mut state.list_states,
                    &self.carousel,
                    &self.config.catalog.image_base_url,
                    self.accent,
                );
            }
        }

        if let Some(session) = self.detail.session() {
            let url = self.detail.playback_url();
            render_detail_view(
                frame,
                session,
                url.as_deref(),
                &self.config.catalog.image_base_url,
                self.status.as_deref(),
                self.accent,
            );
        } else if let Some(status) = &self.status {
            let line = Paragraph::new(status.as_str()).style(Style::default().fg(Color::Yellow));
            frame.render_widget(line, help_area);
        } else {
            let hints: &[(&str, &str)] = match base {
                View::Search if self.search_editing => &[("Enter", "search"), ("Esc", "back")],
                View::Search => &[("Enter", "open"), ("/", "edit"), ("Esc", "back")],
                _ => &[("1-4", "tabs"), ("/", "search"), ("?", "help"), ("q", "quit")],
            };
            frame.render_widget(widgets::help_bar(hints), help_area);
        }

        if self.view == View::Help {
            self.render_help(frame);
        }
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(());
                }
                self.handle_key(key);
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        if self.view == View::Help {
            self.handle_help_input(key.code);
            return;
        }

        if self.detail.is_open() {
            self.handle_detail_input(key.code);
            return;
        }

        self.status = None;
        match self.view {
            View::Browse => self.handle_browse_input(key.code),
            View::Search => self.handle_search_input(key),
            View::Help => {}
        }
    }

    fn handle_browse_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => {
                self.running = false;
            }
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.switch_category(Category::ALL[idx]);
            }
            KeyCode::Tab => self.switch_category(self.category.next()),
            KeyCode::BackTab => self.switch_category(self.category.prev()),
            KeyCode::Char('/') => {
                self.view = View::Search;
                self.search_editing = true;
            }
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection_up(),
            KeyCode::Char('l') | KeyCode::Right => self.move_focus(true),
            KeyCode::Char('h') | KeyCode::Left => self.move_focus(false),
            KeyCode::Char('.') => self.carousel.next(),
            KeyCode::Char(',') => self.carousel.prev(),
            KeyCode::Home => self.carousel.jump(0),
            KeyCode::End => {
                if let Some(last) = self.carousel_len().checked_sub(1) {
                    self.carousel.jump(last);
                }
            }
            KeyCode::Char('i') => {
                if let Some(id) = self.carousel_item() {
                    self.open_detail(id, MediaType::Movie);
                }
            }
            KeyCode::Enter => {
                if let Some((id, media_type)) = self.selected_browse_item() {
                    self.open_detail(id, media_type);
                }
            }
            KeyCode::Char('r') => {
                info!(category = self.category.as_display(), "Refreshing");
                self.load_category(self.category);
            }
            _ => {}
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent) {
        if self.search_editing {
            match key.code {
                KeyCode::Esc => self.clear_search(),
                KeyCode::Enter => self.perform_search(),
                KeyCode::Backspace => {
                    self.search_query.pop();
                }
                KeyCode::Down | KeyCode::Tab if !self.search_results.is_empty() => {
                    self.search_editing = false;
                }
                KeyCode::Char(c) => {
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    {
                        self.search_query.push(c);
                    }
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.clear_search(),
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('/') => self.search_editing = true,
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection_up(),
            KeyCode::Enter => {
                let selected = self
                    .search_state
                    .selected()
                    .and_then(|i| self.search_results.get(i))
                    .map(|r| (r.id(), MediaType::from(r.kind())));
                if let Some((id, media_type)) = selected {
                    self.open_detail(id, media_type);
                }
            }
            _ => {}
        }
    }

    fn handle_detail_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => {
                if !self.detail.back_to_overview() {
                    self.detail.close();
                }
                self.status = None;
            }
            KeyCode::Char('w') | KeyCode::Enter => {
                self.detail.play_media();
            }
            KeyCode::Char('t') => {
                if !self.detail.play_trailer() {
                    self.status = Some("No trailer available".to_string());
                }
            }
            KeyCode::Char('o') => self.open_current_url(),
            KeyCode::Char(']') | KeyCode::Char('L') => {
                if let Some(cmd) = self.detail.step_season(true) {
                    self.dispatch(cmd);
                }
            }
            KeyCode::Char('[') | KeyCode::Char('H') => {
                if let Some(cmd) = self.detail.step_season(false) {
                    self.dispatch(cmd);
                }
            }
            KeyCode::Char('r') => self.retry_episodes(),
            KeyCode::Char('j') | KeyCode::Down => {
                self.detail.step_episode(true);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.detail.step_episode(false);
            }
            KeyCode::Char('?') => self.toggle_help(),
            _ => {}
        }
    }

    fn open_current_url(&mut self) {
        let Some(session) = self.detail.session() else {
            return;
        };
        let url = match session.ready().map(|r| r.display) {
            Some(Display::PlayingMedia) => self.detail.playback_url(),
            Some(Display::PlayingTrailer) => session.trailer_url(),
            _ => None,
        };
        let Some(url) = url else {
            return;
        };

        self.status = match self.opener.open(&url) {
            Ok(()) => Some(format!("Opened {}", url)),
            Err(e) => {
                warn!(error = %e, "Could not open URL");
                Some(e.to_string())
            }
        };
    }

    /// Refetch the selected season, e.g. after its episode list failed.
    fn retry_episodes(&mut self) {
        let season = self
            .detail
            .session()
            .and_then(|s| s.ready())
            .map(|r| r.selected_season);
        if let Some(cmd) = season.and_then(|s| self.detail.select_season(s)) {
            self.dispatch(cmd);
        }
    }

    fn carousel_len(&self) -> usize {
        self.pages
            .get(&Category::Home)
            .and_then(|s| s.page.as_ref())
            .map(|p| p.carousel.len())
            .unwrap_or(0)
    }

    fn carousel_item(&self) -> Option<MediaId> {
        if self.category != Category::Home {
            return None;
        }
        let page = self.pages.get(&Category::Home)?.page.as_ref()?;
        page.carousel.get(self.carousel.index()).map(MediaSummary::id)
    }

    fn selected_browse_item(&self) -> Option<(MediaId, MediaType)> {
        let state = self.pages.get(&self.category)?;
        let section = state.page.as_ref()?.visible_sections().nth(state.focus)?;
        let idx = state.list_states.get(state.focus)?.selected()?;
        let item = section.items.get(idx)?;
        Some((item.id(), section.media_type))
    }

    fn move_focus(&mut self, forward: bool) {
        let Some(state) = self.pages.get_mut(&self.category) else {
            return;
        };
        let count = state.section_count();
        if count == 0 {
            return;
        }
        state.focus = if forward {
            (state.focus + 1) % count
        } else {
            (state.focus + count - 1) % count
        };
    }

    /// The list the cursor keys act on, with its length.
    fn selection(&mut self) -> Option<(&mut ListState, usize)> {
        match self.view {
            View::Search => Some((&mut self.search_state, self.search_results.len())),
            View::Browse => {
                let state = self.pages.get_mut(&self.category)?;
                let focus = state.focus;
                let len = state
                    .page
                    .as_ref()?
                    .visible_sections()
                    .nth(focus)?
                    .items
                    .len();
                Some((state.list_states.get_mut(focus)?, len))
            }
            View::Help => None,
        }
    }

    fn move_selection_down(&mut self) {
        let Some((state, len)) = self.selection() else {
            return;
        };

        if len == 0 {
            return;
        }

        let next = match state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        state.select(Some(next));
    }

    fn move_selection_up(&mut self) {
        let Some((state, len)) = self.selection() else {
            return;
        };

        if len > 0 {
            let i = match state.selected() {
                Some(i) => {
                    if i == 0 {
                        len - 1
                    } else {
                        i - 1
                    }
                }
                None => 0,
            };
            state.select(Some(i));
        }
    }

    fn toggle_help(&mut self) {
        if self.view == View::Help {
            self.view = self.previous_view;
        } else {
            self.previous_view = self.view;
            self.view = View::Help;
        }
    }

    fn render_help(&self, frame: &mut Frame) {
        use ratatui::style::Modifier;
        use ratatui::widgets::{Block, Borders, Clear, Row, Table};

        let dialog_area = widgets::centered(frame.area(), 70, 26);
        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.accent));

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let rows = vec![
            Row::new(vec!["Global", "?", "Toggle Help"]),
            Row::new(vec!["", "q", "Quit"]),
            Row::new(vec!["", "1-4 / Tab", "Switch Category"]),
            Row::new(vec!["Browse", "j/k", "Navigate"]),
            Row::new(vec!["", "h/l", "Switch Section"]),
            Row::new(vec!["", "Enter", "Open Details"]),
            Row::new(vec!["", ", / .", "Previous/Next Slide"]),
            Row::new(vec!["", "Home/End", "First/Last Slide"]),
            Row::new(vec!["", "i", "Open Slide"]),
            Row::new(vec!["", "r", "Refresh"]),
            Row::new(vec!["", "/", "Search"]),
            Row::new(vec!["Search", "Enter", "Submit / Open"]),
            Row::new(vec!["", "Esc", "Clear Search"]),
            Row::new(vec!["Details", "w", "Watch Now"]),
            Row::new(vec!["", "t", "Watch Trailer"]),
            Row::new(vec!["", "[ / ]", "Previous/Next Season"]),
            Row::new(vec!["", "j/k", "Next/Previous Episode"]),
            Row::new(vec!["", "r", "Reload Episodes"]),
            Row::new(vec!["", "o", "Open in Browser"]),
            Row::new(vec!["", "Esc", "Back / Close"]),
        ];

        let table = Table::new(
            rows,
            &[
                Constraint::Percentage(20),
                Constraint::Percentage(25),
                Constraint::Percentage(55),
            ],
        )
        .header(
            Row::new(vec!["Context", "Key", "Action"]).style(
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(self.accent),
            ),
        )
        .block(Block::default().borders(Borders::NONE));

        frame.render_widget(table, inner);
    }

    fn handle_help_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                self.toggle_help();
            }
            _ => {}
        }
    }
}

pub fn init_terminal() -> io::Result<DefaultTerminal> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    Ok(ratatui::init())
}

pub fn restore_terminal() -> io::Result<()> {
    ratatui::restore();
    Ok(())
}
