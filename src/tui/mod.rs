//! Terminal runtime: owns the screen, feeds keys and job results to the
//! session, and runs each spawned job on a worker thread.

mod keys;
mod view;

pub use keys::map_key;

use crate::config::ConfigLocation;
use crate::core::RepoOps;
use crate::session::{perform, Effect, Job, Msg, Session};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const TICK_RATE: Duration = Duration::from_millis(120);

/// Run the interactive session until the user quits. Returns the process
/// exit code.
pub fn run(repo: Arc<dyn RepoOps>, location: ConfigLocation, manual: bool) -> Result<i32> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut session = Session::new(repo.clone(), manual);
    let result = run_app(&mut terminal, &mut session, repo, location);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result?;
    if let Some(notice) = session.exit_notice() {
        eprintln!("{notice}");
    }
    info!(code = session.exit_code(), "session ended");
    Ok(session.exit_code())
}

struct Runtime {
    repo: Arc<dyn RepoOps>,
    location: ConfigLocation,
    tx: mpsc::Sender<Msg>,
}

impl Runtime {
    /// Carry out `effect`. Returns `true` when the session asked to quit.
    fn apply(&self, effect: Effect) -> bool {
        match effect {
            Effect::None => false,
            Effect::Quit => true,
            Effect::Spawn(job) => {
                self.spawn(job);
                false
            }
        }
    }

    fn spawn(&self, job: Job) {
        debug!(?job, "spawning job");
        let repo = Arc::clone(&self.repo);
        let location = self.location.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let progress_tx = tx.clone();
            let msg = perform(&*repo, &location, job, move |line| {
                let _ = progress_tx.send(Msg::Progress(line));
            });
            let _ = tx.send(msg);
        });
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &mut Session,
    repo: Arc<dyn RepoOps>,
    location: ConfigLocation,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let runtime = Runtime { repo, location, tx };
    let mut last_tick = Instant::now();

    if runtime.apply(session.init()) {
        return Ok(());
    }

    loop {
        terminal.draw(|frame| view::draw(frame, &*session))?;

        while let Ok(msg) = rx.try_recv() {
            if runtime.apply(session.update(msg)) {
                return Ok(());
            }
        }

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(event) = event::read()? {
                if let Some(key) = map_key(event) {
                    if runtime.apply(session.update(Msg::Key(key))) {
                        return Ok(());
                    }
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            session.update(Msg::Tick);
            last_tick = Instant::now();
        }
    }
}
