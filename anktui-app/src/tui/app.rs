use crate::config::Config;
use crate::tui::inputs::map_event;
use crate::tui::state::{App, AppEvent, Effect, Settings};
use crate::tui::theme::Theme;
use crate::tui::views;
use anktui_core::{Clock, DeckStore};
use anyhow::Result;
use crossterm::{
    event::{self},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

pub struct TuiApp {
    pub store: Arc<dyn DeckStore>,
    pub clock: Arc<dyn Clock>,
    pub rt: Arc<Runtime>,
    app: App,
    theme: Theme,
    jobs: UnboundedSender<Effect>,
    rx: UnboundedReceiver<AppEvent>,
    pending: usize,
}

/// Applies store effects one at a time, in the order they were queued, so a
/// later snapshot of a deck always lands after an earlier one.
pub async fn run_writer(
    store: Arc<dyn DeckStore>,
    mut jobs: UnboundedReceiver<Effect>,
    events: UnboundedSender<AppEvent>,
) {
    while let Some(job) = jobs.recv().await {
        let ev = match job {
            Effect::Save(deck) => {
                let result = store.save_deck(&deck).await.map_err(|e| e.to_string());
                if let Err(e) = &result {
                    error!(deck = %deck.id, error = %e, "save failed");
                }
                AppEvent::Saved { deck: deck.name, result }
            }
            Effect::Delete(id) => {
                let result = store.delete_deck(id).await.map_err(|e| e.to_string());
                if let Err(e) = &result {
                    error!(deck = %id, error = %e, "delete failed");
                }
                AppEvent::Deleted { deck: id.to_string(), result }
            }
            Effect::Quit => continue,
        };
        if events.send(ev).is_err() {
            break;
        }
    }
}

impl TuiApp {
    pub fn new(store: Arc<dyn DeckStore>, clock: Arc<dyn Clock>, config: Config, rt: Arc<Runtime>) -> Self {
        let settings = Settings {
            show_progress: config.study_session.show_progress,
            // validated before the TUI starts
            session_size: config.session_size().unwrap_or_default(),
            default_ease: config.default_ease_factor,
        };
        let (tx, rx) = unbounded_channel();
        let (jobs, jobs_rx) = unbounded_channel();
        rt.spawn(run_writer(Arc::clone(&store), jobs_rx, tx));
        Self {
            store,
            clock,
            rt,
            app: App::new(Vec::new(), settings),
            theme: Theme::by_name(&config.theme),
            jobs,
            rx,
            pending: 0,
        }
    }

    fn load_decks(&mut self) {
        match self.rt.block_on(self.store.load_all_decks()) {
            Ok(decks) => {
                info!(count = decks.len(), "loaded decks");
                self.app.decks = decks;
            }
            Err(e) => {
                error!(error = %e, "loading decks failed");
                self.app.status = Some(format!("Could not load decks: {e}"));
            }
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.load_decks();

        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.mainloop(&mut terminal);

        disable_raw_mode().ok();
        let mut out: Stdout = std::io::stdout();
        execute!(out, LeaveAlternateScreen).ok();
        terminal.show_cursor().ok();

        self.wait_for_pending();
        res
    }

    fn mainloop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            while let Ok(ev) = self.rx.try_recv() {
                self.pending = self.pending.saturating_sub(1);
                self.app.handle_event(ev);
            }

            let now = self.clock.now();
            terminal.draw(|f| views::draw_ui(f, &self.app, &self.theme, now))?;

            if event::poll(Duration::from_millis(100))? {
                let input = map_event(event::read()?);
                for effect in self.app.handle_input(input, self.clock.now()) {
                    match effect {
                        Effect::Quit => return Ok(()),
                        other => self.dispatch(other),
                    }
                }
            }
        }
    }

    /// Queues a store call for the writer task; the result comes back through the channel.
    fn dispatch(&mut self, effect: Effect) {
        if self.jobs.send(effect).is_ok() {
            self.pending += 1;
        } else {
            error!("storage writer stopped");
            self.app.status = Some("Storage writer stopped; changes are not being saved".into());
        }
    }

    /// Lets in-flight saves land before the runtime is dropped.
    fn wait_for_pending(&mut self) {
        while self.pending > 0 {
            if self.rt.block_on(self.rx.recv()).is_none() {
                break;
            }
            self.pending -= 1;
        }
    }
}
