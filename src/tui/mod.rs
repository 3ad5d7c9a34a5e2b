pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::app::{AppContext, Result};
use crate::browse::{PageRequest, PageTicket, PageUpdate, PaginationState, SwipeController};
use crate::domain::{Article, ArticlesPage, FetchOutcome};
use crate::pipeline::{drain_signals, FetchOptions, NewsRepository};

use self::app::{DetailView, PreferenceView, Screen, TuiApp};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Responses from spawned fetches, handed back to the UI loop.
enum Fetched {
    Page(PageTicket, Option<FetchOutcome<ArticlesPage>>),
    Article(i64, Option<FetchOutcome<Article>>),
    Sites(Option<FetchOutcome<Vec<String>>>),
}

/// Spawns repository calls so the UI keeps drawing while they run.
struct Fetcher {
    repo: NewsRepository,
    tx: mpsc::UnboundedSender<Fetched>,
}

impl Fetcher {
    fn page(&self, app: &mut TuiApp, request: PageRequest) {
        if let Some(ticket) = app.pagination.begin(request) {
            self.spawn_page(ticket);
        }
    }

    fn next_page(&self, app: &mut TuiApp) {
        if let Some(ticket) = app.pagination.begin_next_page() {
            self.spawn_page(ticket);
        }
    }

    fn spawn_page(&self, ticket: PageTicket) {
        let repo = self.repo.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = repo
                .articles(ticket.offset(), ticket.title_contains().map(String::from))
                .next()
                .await;
            let _ = tx.send(Fetched::Page(ticket, outcome));
        });
    }

    fn article(&self, id: i64) {
        let repo = self.repo.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = repo.article(id).next().await;
            let _ = tx.send(Fetched::Article(id, outcome));
        });
    }

    /// Chip list load; runs behind the article list without its own loader.
    fn sites(&self) {
        let repo = self.repo.clone();
        let tx = self.tx.clone();
        let options = FetchOptions {
            show_progress: false,
            ..repo.pipeline().defaults()
        };
        tokio::spawn(async move {
            let outcome = repo.site_names(options).next().await;
            let _ = tx.send(Fetched::Sites(outcome));
        });
    }
}

pub async fn run(ctx: Arc<AppContext>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>) -> Result<()> {
    let config = &ctx.config;
    let pagination = PaginationState::new().with_sequencing(config.pipeline.sequence_requests);
    let mut tui_app = TuiApp::new(pagination);
    let event_handler = EventHandler::new(Duration::from_millis(100));

    let mut signals = ctx.signals().subscribe();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let fetcher = Fetcher {
        repo: ctx.repository.clone(),
        tx,
    };

    // Initial load: the stored preference filters the first page.
    let stored = ctx.preferences().selected()?;
    let initial = if stored.is_empty() {
        PageRequest::fresh()
    } else {
        PageRequest {
            offset: None,
            search: Some(stored),
        }
    };
    fetcher.page(&mut tui_app, initial);
    fetcher.sites();

    loop {
        terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;

        if let AppEvent::Key(key) = event_handler.next()? {
            handle_key(&mut tui_app, &ctx, &fetcher, key)?;
        }

        let now = Instant::now();
        if let Some(detail) = tui_app.detail.as_mut() {
            if let Some(id) = detail.pager.poll(now) {
                tracing::debug!("Pager settled on article {}", id);
                fetcher.article(id);
            }
        }

        while let Ok(fetched) = rx.try_recv() {
            apply_fetched(&mut tui_app, &ctx, fetched)?;
        }
        for signal in drain_signals(&mut signals) {
            tui_app.apply_signal(signal, now);
        }
        tui_app.expire_toast(now);

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

fn apply_fetched(tui_app: &mut TuiApp, ctx: &AppContext, fetched: Fetched) -> Result<()> {
    match fetched {
        Fetched::Page(ticket, outcome) => {
            match tui_app.pagination.complete(&ticket, outcome) {
                PageUpdate::Applied { added } => {
                    tracing::debug!("Loaded {} articles", added);
                    tui_app.clamp_cursor(ticket.request().replaces());
                }
                PageUpdate::Failed(message) => {
                    tracing::warn!("Article list request failed: {}", message);
                }
                PageUpdate::Stale | PageUpdate::NoOutcome | PageUpdate::Skipped => {}
            }
        }
        Fetched::Article(id, outcome) => {
            if let Some(detail) = tui_app.detail.as_mut() {
                detail.apply_outcome(id, outcome);
            }
        }
        Fetched::Sites(outcome) => {
            if let Some(FetchOutcome::Success(sites)) = outcome {
                tui_app.sites = sites;
                let stored = ctx.preferences().selected()?;
                tui_app.select_chip_by_name(Some(stored.as_str()).filter(|s| !s.is_empty()));
                if let Some(view) = tui_app.preferences.as_mut() {
                    view.sites = tui_app.sites.clone();
                }
            }
        }
    }
    Ok(())
}

/// Edit to a text field for `key`, if it is one.
fn edit_text(key: &KeyEvent) -> Option<TextEdit> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Char(c) => Some(TextEdit::Push(c)),
        KeyCode::Backspace => Some(TextEdit::Pop),
        KeyCode::Enter | KeyCode::Esc => Some(TextEdit::Done),
        _ => None,
    }
}

enum TextEdit {
    Push(char),
    Pop,
    Done,
}

fn handle_key(
    tui_app: &mut TuiApp,
    ctx: &AppContext,
    fetcher: &Fetcher,
    key: KeyEvent,
) -> Result<()> {
    let action = ctx.config.keybindings.get_action(&key);
    if action == Action::Quit && key.modifiers.contains(KeyModifiers::CONTROL) {
        tui_app.should_quit = true;
        return Ok(());
    }

    match tui_app.screen {
        Screen::List if tui_app.editing_search => {
            let request = match edit_text(&key) {
                Some(TextEdit::Push(c)) => tui_app.push_search(c),
                Some(TextEdit::Pop) => tui_app.pop_search(),
                Some(TextEdit::Done) => {
                    tui_app.editing_search = false;
                    None
                }
                None => None,
            };
            if let Some(request) = request {
                tui_app.selected_chip = None;
                fetcher.page(tui_app, request);
            }
        }
        Screen::List => handle_list_action(tui_app, ctx, fetcher, action)?,
        Screen::Detail => handle_detail_action(tui_app, action),
        Screen::Preferences => {
            let editing = tui_app
                .preferences
                .as_ref()
                .map(|view| view.editing)
                .unwrap_or(false);
            if editing {
                if let Some(view) = tui_app.preferences.as_mut() {
                    match edit_text(&key) {
                        Some(TextEdit::Push(c)) => view.push_filter(c),
                        Some(TextEdit::Pop) => view.pop_filter(),
                        Some(TextEdit::Done) => view.editing = false,
                        None => {}
                    }
                }
            } else {
                handle_preference_action(tui_app, ctx, fetcher, action)?;
            }
        }
    }

    Ok(())
}

fn handle_list_action(
    tui_app: &mut TuiApp,
    ctx: &AppContext,
    fetcher: &Fetcher,
    action: Action,
) -> Result<()> {
    match action {
        Action::Quit => tui_app.should_quit = true,
        Action::MoveUp => tui_app.move_up(),
        Action::MoveDown => {
            tui_app.move_down();
            if tui_app.at_end() {
                fetcher.next_page(tui_app);
            }
        }
        Action::NextPage => {
            tui_app.next_page();
            if tui_app.at_end() {
                fetcher.next_page(tui_app);
            }
        }
        Action::PrevPage => tui_app.prev_page(),
        Action::Search => tui_app.editing_search = true,
        Action::NextChip => tui_app.next_chip(),
        Action::PrevChip => tui_app.prev_chip(),
        Action::ToggleChip => {
            if let Some(request) = tui_app.toggle_chip() {
                tui_app.search.clear();
                fetcher.page(tui_app, request);
            }
        }
        Action::Refresh => {
            tui_app.search.clear();
            tui_app.selected_chip = None;
            fetcher.page(tui_app, PageRequest::fresh());
        }
        Action::Select => {
            if let Some(article) = tui_app.selected_item().cloned() {
                let page_count = tui_app
                    .pagination
                    .count()
                    .map(|count| count.max(0) as usize)
                    .unwrap_or(tui_app.items().len());
                let pager = SwipeController::new(
                    article.id,
                    tui_app.item_index,
                    page_count,
                    ctx.config.swipe.debounce(),
                )
                .with_cumulative_ids(ctx.config.swipe.cumulative_ids);
                fetcher.article(article.id);
                tui_app.detail = Some(DetailView::new(pager, Some(article)));
                tui_app.screen = Screen::Detail;
            }
        }
        Action::OpenInBrowser => {
            let url = tui_app.selected_item().and_then(|a| a.url.clone());
            open_url(tui_app, url.as_deref());
        }
        Action::Preferences => {
            let stored = ctx.preferences().selected()?;
            let selected = Some(stored).filter(|s| !s.is_empty());
            if tui_app.sites.is_empty() {
                fetcher.sites();
            }
            tui_app.preferences = Some(PreferenceView::new(tui_app.sites.clone(), selected));
            tui_app.screen = Screen::Preferences;
        }
        Action::Back
        | Action::SwipePrev
        | Action::SwipeNext
        | Action::Confirm
        | Action::None => {}
    }
    Ok(())
}

fn handle_detail_action(tui_app: &mut TuiApp, action: Action) {
    let now = Instant::now();
    match action {
        Action::Quit => tui_app.should_quit = true,
        Action::Back => {
            tui_app.detail = None;
            tui_app.screen = Screen::List;
        }
        Action::OpenInBrowser => {
            let url = tui_app
                .detail
                .as_ref()
                .and_then(|d| d.article.as_ref())
                .and_then(|a| a.url.clone());
            open_url(tui_app, url.as_deref());
        }
        _ => {
            let Some(detail) = tui_app.detail.as_mut() else {
                return;
            };
            match action {
                Action::SwipePrev => {
                    detail.pager.swipe(-1, now);
                }
                Action::SwipeNext => {
                    detail.pager.swipe(1, now);
                }
                Action::MoveUp => detail.scroll = detail.scroll.saturating_sub(1),
                Action::MoveDown => detail.scroll = detail.scroll.saturating_add(1),
                Action::PrevPage => detail.scroll = detail.scroll.saturating_sub(10),
                Action::NextPage => detail.scroll = detail.scroll.saturating_add(10),
                _ => {}
            }
        }
    }
}

fn handle_preference_action(
    tui_app: &mut TuiApp,
    ctx: &AppContext,
    fetcher: &Fetcher,
    action: Action,
) -> Result<()> {
    let Some(view) = tui_app.preferences.as_mut() else {
        tui_app.screen = Screen::List;
        return Ok(());
    };

    match action {
        Action::Quit => tui_app.should_quit = true,
        Action::Back => {
            tui_app.preferences = None;
            tui_app.screen = Screen::List;
        }
        Action::Search => view.editing = true,
        Action::MoveUp => view.move_up(),
        Action::MoveDown => view.move_down(),
        Action::ToggleChip | Action::Select => view.toggle(),
        Action::Confirm => {
            let selected = view.selected.clone();
            ctx.preferences()
                .set_selected(selected.as_deref().unwrap_or(""))?;
            tracing::info!("Preferred site set to {:?}", selected);

            tui_app.select_chip_by_name(selected.as_deref());
            tui_app.search.clear();
            tui_app.set_status(match &selected {
                Some(site) => format!("Preferred site: {}", site),
                None => "Preference cleared".to_string(),
            });
            fetcher.page(tui_app, PageRequest::for_site(selected));
            tui_app.preferences = None;
            tui_app.screen = Screen::List;
        }
        _ => {}
    }
    Ok(())
}

fn open_url(tui_app: &mut TuiApp, url: Option<&str>) {
    match url {
        Some(url) => {
            if let Err(e) = open::that(url) {
                tui_app.set_status(format!("Failed to open browser: {}", e));
            }
        }
        None => tui_app.set_status("Article has no link".to_string()),
    }
}
