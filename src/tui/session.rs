use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    Terminal,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use wfm_grid::{
    app::{AppState, Mode, SyncStatus},
    input::{command_mode::{self, CommandEffect}, drag_mode, mouse, normal_mode},
    schedule::{RosterSnapshot, SchedulePeriod},
    storage::{cache::Cache, config::Config},
    sync::{SyncEngine, SyncMessage},
    ui::theme::Theme,
};
use crate::tui::{
    presentation::{grid_geometry, ui},
    sample_roster::build_sample_roster,
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub period: SchedulePeriod,
    pub sample: Option<usize>,
}

enum RosterSource {
    Sample(usize),
    Remote(SyncEngine),
    Offline,
}

struct Session {
    app: AppState,
    source: RosterSource,
    cache: Option<Cache>,
    tx: UnboundedSender<SyncMessage>,
    push_moves: bool,
    refresh_interval: Duration,
    last_refresh: Instant,
}

pub fn open_cache(config: &Config) -> Option<Cache> {
    let path = config.cache_path();
    match Cache::open(&path) {
        Ok(cache) => Some(cache),
        Err(e) => {
            tracing::warn!("Cache unavailable at {}: {}", path.display(), e);
            None
        }
    }
}

pub async fn run_tui(options: SessionOptions) -> Result<(), io::Error> {
    let config = Config::load_or_create()
        .map_err(|e| io::Error::other(e.to_string()))?;

    let source = match options.sample {
        Some(size) => RosterSource::Sample(size),
        None => match SyncEngine::from_config(&config) {
            Ok(engine) => RosterSource::Remote(engine),
            Err(e) => {
                tracing::info!("Running without roster source: {}", e);
                RosterSource::Offline
            }
        },
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = Theme::get_by_name(&config.ui.theme);
    let app = AppState::new(options.period)
        .with_theme(theme)
        .with_ui_config(&config.ui);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = Session {
        app,
        source,
        cache: open_cache(&config),
        tx,
        push_moves: config.sync.push_moves,
        refresh_interval: Duration::from_secs(config.sync.refresh_interval_seconds.max(1)),
        last_refresh: Instant::now(),
    };

    session.reload();

    let res = run_app(&mut terminal, &mut session, &mut rx).await;

    session.persist_offline_edits();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    session: &mut Session,
    rx: &mut UnboundedReceiver<SyncMessage>,
) -> io::Result<()> {
    loop {
        while let Ok(message) = rx.try_recv() {
            session.handle_sync_message(message);
        }

        if session.refresh_due() {
            session.reload();
        }

        let size = terminal.size()?;
        let geometry = grid_geometry(size, &session.app);
        session.app.set_geometry(geometry);

        terminal.draw(|f| ui(f, &session.app))?;

        if !event::poll(POLL_INTERVAL)? {
            tokio::task::yield_now().await;
            continue;
        }

        let effect = match event::read()? {
            TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                handle_key(key.code, &mut session.app)
            }
            TermEvent::Mouse(mouse_event) => {
                if !session.app.show_help {
                    mouse::handle_mouse(mouse_event, &mut session.app);
                }
                CommandEffect::None
            }
            _ => CommandEffect::None,
        };

        session.flush_pushes();

        match effect {
            CommandEffect::Quit => return Ok(()),
            CommandEffect::Reload => session.reload(),
            CommandEffect::None => {}
        }
    }
}

fn handle_key(code: KeyCode, app: &mut AppState) -> CommandEffect {
    match app.mode {
        Mode::Normal if app.show_help => {
            handle_help_keys(code, app);
            CommandEffect::None
        }
        Mode::Normal => match code {
            KeyCode::Char('q') => CommandEffect::Quit,
            _ => normal_mode::handle_key(code, app),
        },
        Mode::Drag => {
            drag_mode::handle_key(code, app);
            CommandEffect::None
        }
        Mode::Command => command_mode::handle_key(code, app),
    }
}

fn handle_help_keys(code: KeyCode, app: &mut AppState) {
    match code {
        KeyCode::Char('j') => {
            app.help_scroll = app.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') => {
            app.help_scroll = app.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            app.show_help = false;
            app.help_scroll = 0;
        }
        _ => {}
    }
}

impl Session {
    fn refresh_due(&self) -> bool {
        matches!(self.source, RosterSource::Remote(_))
            && self.app.mode != Mode::Drag
            && self.last_refresh.elapsed() >= self.refresh_interval
    }

    fn reload(&mut self) {
        self.last_refresh = Instant::now();
        let period = self.app.period();

        match &self.source {
            RosterSource::Sample(size) => {
                let ticket = self.app.begin_load();
                self.app.apply_load(ticket, period, build_sample_roster(&period, *size));
            }
            RosterSource::Remote(engine) => {
                let ticket = self.app.begin_load();
                engine.spawn_load(ticket, period, self.tx.clone());
            }
            RosterSource::Offline => {
                if !self.restore_from_cache() {
                    self.app.sync_status = SyncStatus::Offline;
                    self.app.show_banner(
                        "No roster source configured. Set [api] base_url or run with --sample",
                    );
                }
            }
        }
    }

    fn restore_from_cache(&mut self) -> bool {
        let period = self.app.period();
        let Some(cache) = &self.cache else {
            return false;
        };
        match cache.load_snapshot(&period) {
            Ok(Some(cached)) => {
                tracing::info!("Showing cached roster for {}", period.label());
                self.app.apply_cached(cached.snapshot, cached.saved_at);
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::error!("Failed to read cache: {}", e);
                false
            }
        }
    }

    fn handle_sync_message(&mut self, message: SyncMessage) {
        match message {
            SyncMessage::Loaded { ticket, period, result: Ok(snapshot) } => {
                let fetched = self.cache.is_some().then(|| snapshot.clone());
                if self.app.apply_load(ticket, period, snapshot) {
                    self.app.dismiss_banner();
                    if let Some(fetched) = fetched {
                        self.store_in_cache(&fetched);
                    }
                }
            }
            SyncMessage::Loaded { ticket, period, result: Err(message) } => {
                if self.app.load_failed(ticket, &message) && period == self.app.period() {
                    self.restore_from_cache();
                }
            }
            SyncMessage::MovePushed { shift_id, result: Ok(_) } => {
                tracing::debug!("Move of shift {} saved", shift_id);
                self.app.confirm_push(&shift_id);
            }
            SyncMessage::MovePushed { shift_id, result: Err(message) } => {
                self.app.show_banner(format!("Move of shift {} was not saved: {}", shift_id, message));
            }
        }
    }

    /// Caches data as the source sent it. Unconfirmed edits are replayed
    /// on restore, so they must not be baked in.
    fn store_in_cache(&self, snapshot: &RosterSnapshot) {
        if let Some(cache) = &self.cache
            && let Err(e) = cache.store_snapshot(&self.app.period(), snapshot)
        {
            tracing::warn!("Failed to cache roster: {}", e);
        }
    }

    fn flush_pushes(&mut self) {
        let pushes = self.app.take_pending_pushes();
        if let RosterSource::Remote(engine) = &self.source
            && self.push_moves
        {
            for shift in pushes {
                engine.spawn_push(shift, self.tx.clone());
            }
        }
    }

    fn persist_offline_edits(&self) {
        if matches!(self.source, RosterSource::Offline) && !self.app.store.roster().is_empty() {
            self.store_in_cache(&self.app.store.to_snapshot());
        }
    }
}
