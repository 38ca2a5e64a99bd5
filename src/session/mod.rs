//! Interactive session state machine.
//!
//! [`Session::update`] consumes one [`Msg`] at a time (a key press or the
//! result of a background [`Job`]) and returns the [`Effect`] the runtime
//! must carry out next. Quick repository calls (stash, tag writes, the
//! return checkout) run inline; anything slow is handed back as a job.
//! At most one job is outstanding while a workflow runs.

mod load;

pub use load::{load, perform, refresh, Job, LoadedRepo};

use crate::config::SyncConfig;
use crate::core::{
    driver, Branch, Collection, RepoOps, StashGuard, StepEvent, StepOutcome, SyncDriver,
    SyncError, SyncMode, SyncResult, SyncStep,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Key commands recognized by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Esc,
    Backspace,
    Char(char),
    /// Ctrl+C.
    Interrupt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Browsing,
    Searching,
    Tagging { branch: String, input: String },
    Help,
    ConfirmingStash { mode: SyncMode },
    ConfirmingUpdate,
    ConfirmingDelete,
    Updating,
    Deleting,
    Done,
    Error { message: String },
}

#[derive(Debug)]
pub enum Msg {
    Key(Key),
    Loaded(Result<LoadedRepo, SyncError>),
    Refreshed(Result<Collection, SyncError>),
    Progress(String),
    StepDone(StepEvent),
    Tick,
}

/// What the runtime must do after an update.
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    Spawn(Job),
    Quit,
}

pub struct Session {
    repo: Arc<dyn RepoOps>,
    state: SessionState,
    config: Option<SyncConfig>,
    branches: Vec<Branch>,
    skipped: usize,
    cursor: usize,
    query: String,
    manual: bool,
    delete_mode: bool,
    original_branch: Option<String>,
    stash: StashGuard,
    driver: Option<SyncDriver>,
    planned: Vec<String>,
    progress: Option<String>,
    warnings: Vec<String>,
    notice: Option<String>,
    exit_notice: Option<String>,
    spinner: usize,
}

impl Session {
    pub fn new(repo: Arc<dyn RepoOps>, manual: bool) -> Self {
        Self {
            repo,
            state: SessionState::Loading,
            config: None,
            branches: Vec::new(),
            skipped: 0,
            cursor: 0,
            query: String::new(),
            manual,
            delete_mode: false,
            original_branch: None,
            stash: StashGuard::new(),
            driver: None,
            planned: Vec::new(),
            progress: None,
            warnings: Vec::new(),
            notice: None,
            exit_notice: None,
            spinner: 0,
        }
    }

    /// The first effect: load the repository.
    pub fn init(&mut self) -> Effect {
        self.state = SessionState::Loading;
        Effect::Spawn(Job::Load)
    }

    pub fn update(&mut self, msg: Msg) -> Effect {
        match msg {
            Msg::Key(key) => self.on_key(key),
            Msg::Loaded(result) => self.on_loaded(result),
            Msg::Refreshed(result) => self.on_refreshed(result),
            Msg::Progress(line) => {
                if self.is_running() {
                    self.progress = Some(line);
                }
                Effect::None
            }
            Msg::StepDone(event) => self.on_step_done(event),
            Msg::Tick => {
                self.spinner = self.spinner.wrapping_add(1);
                Effect::None
            }
        }
    }

    // ── accessors ───────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> Option<&SyncConfig> {
        self.config.as_ref()
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Branches matching the current search query, in list order.
    pub fn visible(&self) -> Vec<&Branch> {
        let query = self.query.to_lowercase();
        self.branches.iter().filter(|b| b.matches(&query)).collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn manual(&self) -> bool {
        self.manual
    }

    pub fn delete_mode(&self) -> bool {
        self.delete_mode
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn selected_count(&self) -> usize {
        self.branches.iter().filter(|b| b.selected).count()
    }

    pub fn original_branch(&self) -> Option<&str> {
        self.original_branch.as_deref()
    }

    pub fn driver(&self) -> Option<&SyncDriver> {
        self.driver.as_ref()
    }

    pub fn result(&self) -> Option<&SyncResult> {
        self.driver.as_ref().map(SyncDriver::result)
    }

    /// Commands the running or last workflow was planned to execute.
    pub fn planned(&self) -> &[String] {
        &self.planned
    }

    pub fn progress(&self) -> Option<&str> {
        self.progress.as_deref()
    }

    /// Non-fatal problems from the last workflow's cleanup.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// One-line message for the browsing footer.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn spinner(&self) -> usize {
        self.spinner
    }

    pub fn stash_owed(&self) -> bool {
        self.stash.is_owed()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Updating | SessionState::Deleting)
    }

    /// Process exit code once the session has quit.
    pub fn exit_code(&self) -> i32 {
        match (&self.state, &self.config) {
            (SessionState::Error { .. }, None) => 1,
            _ => 0,
        }
    }

    /// Message to print after the terminal is restored.
    pub fn exit_notice(&self) -> Option<&str> {
        self.exit_notice.as_deref()
    }

    // ── messages ────────────────────────────────────────────────────────

    fn on_loaded(&mut self, result: Result<LoadedRepo, SyncError>) -> Effect {
        match result {
            Ok(loaded) => {
                self.config = Some(loaded.config);
                self.original_branch = loaded.current_branch;
                self.apply_collection(loaded.collection);
                self.state = SessionState::Browsing;
            }
            Err(e) => self.fail(e),
        }
        Effect::None
    }

    fn on_refreshed(&mut self, result: Result<Collection, SyncError>) -> Effect {
        // Only a reset waits for a refresh; anything else is stale.
        if self.state != SessionState::Loading {
            debug!("ignoring refresh outside of loading");
            return Effect::None;
        }
        match result {
            Ok(collection) => {
                self.apply_collection(collection);
                self.state = SessionState::Browsing;
            }
            Err(e) => self.fail(e),
        }
        Effect::None
    }

    fn apply_collection(&mut self, collection: Collection) {
        self.branches = collection.branches;
        self.skipped = collection.skipped;
        self.clamp_cursor();
    }

    fn on_step_done(&mut self, event: StepEvent) -> Effect {
        let Some(driver) = self.driver.as_mut() else {
            warn!(branch = %event.branch, "step completion without a workflow");
            return Effect::None;
        };
        let mode = driver.mode();

        // Failed branches keep their pre-run status; the reason lives in the result.
        if matches!(event.outcome, StepOutcome::Success) {
            if let Some(branch) = self.branches.iter_mut().find(|b| b.name == event.branch) {
                branch.status = mode.success_status();
                if mode == SyncMode::Update {
                    branch.behind = 0;
                }
            }
        }

        self.progress = None;
        match driver.complete(event) {
            Some(step) => self.spawn_step(step),
            None => {
                self.finish_workflow();
                Effect::None
            }
        }
    }

    // ── keys ────────────────────────────────────────────────────────────

    fn on_key(&mut self, key: Key) -> Effect {
        match self.state.clone() {
            SessionState::Loading => match key {
                Key::Interrupt | Key::Char('q') => self.quit(),
                _ => Effect::None,
            },
            SessionState::Browsing => self.browsing_key(key),
            SessionState::Searching => self.searching_key(key),
            SessionState::Tagging { branch, input } => self.tagging_key(key, branch, input),
            SessionState::Help => match key {
                Key::Interrupt => self.quit(),
                Key::Esc | Key::Char('h' | '?' | 'q') => {
                    self.state = SessionState::Browsing;
                    Effect::None
                }
                _ => Effect::None,
            },
            SessionState::ConfirmingStash { mode } => match key {
                Key::Interrupt => self.quit(),
                Key::Char('y') => {
                    if let Err(e) = self.stash.stash(&*self.repo) {
                        self.fail(e);
                        return Effect::None;
                    }
                    self.proceed(mode)
                }
                Key::Esc | Key::Char('n' | 'q') => {
                    self.state = SessionState::Browsing;
                    Effect::None
                }
                _ => Effect::None,
            },
            SessionState::ConfirmingUpdate | SessionState::ConfirmingDelete => {
                let mode = match self.state {
                    SessionState::ConfirmingDelete => SyncMode::Delete,
                    _ => SyncMode::Update,
                };
                match key {
                    Key::Interrupt => self.quit(),
                    Key::Char('y') => self.start_workflow(mode),
                    Key::Esc | Key::Char('n' | 'q') => {
                        self.cancel_confirmation();
                        Effect::None
                    }
                    _ => Effect::None,
                }
            }
            SessionState::Updating | SessionState::Deleting => match key {
                Key::Interrupt | Key::Char('q') => self.quit(),
                _ => Effect::None,
            },
            SessionState::Done | SessionState::Error { .. } => match key {
                Key::Interrupt | Key::Char('q') => self.quit(),
                _ => self.reset(),
            },
        }
    }

    fn browsing_key(&mut self, key: Key) -> Effect {
        self.notice = None;
        match key {
            Key::Interrupt | Key::Char('q') => return self.quit(),
            Key::Up | Key::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            Key::Down | Key::Char('j') => {
                if self.cursor + 1 < self.visible_indices().len() {
                    self.cursor += 1;
                }
            }
            Key::Char(' ') => {
                if let Some(i) = self.cursor_index() {
                    self.branches[i].selected = !self.branches[i].selected;
                }
            }
            Key::Char('a') => self.select_visible(true),
            Key::Char('n') => self.select_visible(false),
            Key::Char('/') => self.state = SessionState::Searching,
            Key::Char('t') => {
                if let Some(i) = self.cursor_index() {
                    let branch = &self.branches[i];
                    self.state = SessionState::Tagging {
                        branch: branch.name.clone(),
                        input: branch.description.clone(),
                    };
                }
            }
            Key::Char('h' | '?') => self.state = SessionState::Help,
            Key::Char('m') => {
                self.manual = !self.manual;
                info!(manual = self.manual, "manual mode toggled");
            }
            Key::Char('d') => {
                if self.delete_mode {
                    return self.request_workflow(SyncMode::Delete);
                }
                self.delete_mode = true;
            }
            Key::Enter => {
                if !self.delete_mode {
                    return self.request_workflow(SyncMode::Update);
                }
            }
            Key::Esc => {
                if !self.query.is_empty() {
                    self.query.clear();
                    self.cursor = 0;
                } else if self.delete_mode {
                    self.delete_mode = false;
                    self.select_all(false);
                }
            }
            _ => {}
        }
        Effect::None
    }

    fn searching_key(&mut self, key: Key) -> Effect {
        match key {
            Key::Interrupt => return self.quit(),
            Key::Enter | Key::Esc => self.state = SessionState::Browsing,
            Key::Backspace => {
                self.query.pop();
                self.cursor = 0;
            }
            Key::Char(c) => {
                self.query.push(c);
                self.cursor = 0;
            }
            Key::Up | Key::Down => {}
        }
        Effect::None
    }

    fn tagging_key(&mut self, key: Key, branch: String, mut input: String) -> Effect {
        match key {
            Key::Interrupt => return self.quit(),
            Key::Esc => self.state = SessionState::Browsing,
            Key::Enter => {
                self.save_tag(&branch, input.trim());
                self.state = SessionState::Browsing;
            }
            Key::Backspace => {
                input.pop();
                self.state = SessionState::Tagging { branch, input };
            }
            Key::Char(c) => {
                input.push(c);
                self.state = SessionState::Tagging { branch, input };
            }
            Key::Up | Key::Down => {}
        }
        Effect::None
    }

    fn save_tag(&mut self, name: &str, text: &str) {
        let Some(branch) = self.branches.iter_mut().find(|b| b.name == name) else {
            return;
        };
        if branch.description == text {
            return;
        }

        let result = if text.is_empty() {
            self.repo.unset_branch_description(name)
        } else {
            self.repo.set_branch_description(name, text)
        };
        match result {
            Ok(()) => {
                debug!(branch = name, tag = text, "tag saved");
                branch.description = text.to_string();
            }
            Err(e) => {
                warn!(branch = name, "failed to save tag: {e:#}");
                self.notice = Some(format!("Failed to save tag for '{name}': {e:#}"));
            }
        }
    }

    // ── workflow ────────────────────────────────────────────────────────

    /// Stash check first, then confirmation or start.
    fn request_workflow(&mut self, mode: SyncMode) -> Effect {
        if self.selected_count() == 0 {
            self.notice = Some(format!("No branches selected to {}", mode.verb()));
            return Effect::None;
        }
        match StashGuard::needs_stash(&*self.repo) {
            Ok(true) => {
                self.state = SessionState::ConfirmingStash { mode };
                Effect::None
            }
            Ok(false) => self.proceed(mode),
            Err(e) => {
                self.fail(e);
                Effect::None
            }
        }
    }

    fn proceed(&mut self, mode: SyncMode) -> Effect {
        if !self.manual {
            return self.start_workflow(mode);
        }
        self.planned = self.planned_for(mode);
        self.state = match mode {
            SyncMode::Update => SessionState::ConfirmingUpdate,
            SyncMode::Delete => SessionState::ConfirmingDelete,
        };
        Effect::None
    }

    fn cancel_confirmation(&mut self) {
        self.planned.clear();
        self.state = SessionState::Browsing;
        if let Err(e) = self.stash.restore(&*self.repo) {
            self.fail(e);
        }
    }

    fn queue(&self) -> Vec<String> {
        self.branches
            .iter()
            .filter(|b| b.selected)
            .map(|b| b.name.clone())
            .collect()
    }

    fn planned_for(&self, mode: SyncMode) -> Vec<String> {
        match &self.config {
            Some(config) => driver::planned_commands(config, mode, &self.queue()),
            None => Vec::new(),
        }
    }

    fn start_workflow(&mut self, mode: SyncMode) -> Effect {
        let queue = self.queue();
        self.planned = self.planned_for(mode);
        self.warnings.clear();
        self.progress = None;
        self.state = match mode {
            SyncMode::Update => SessionState::Updating,
            SyncMode::Delete => SessionState::Deleting,
        };

        let mut driver = SyncDriver::new(mode);
        let first = driver.start(queue);
        self.driver = Some(driver);
        match first {
            Some(step) => self.spawn_step(step),
            None => {
                self.finish_workflow();
                Effect::None
            }
        }
    }

    fn spawn_step(&self, step: SyncStep) -> Effect {
        match &self.config {
            Some(config) => Effect::Spawn(Job::Step {
                step,
                config: config.clone(),
            }),
            None => Effect::None,
        }
    }

    /// Return to the original branch, restore the stash, then show the
    /// summary or the fatal error.
    fn finish_workflow(&mut self) {
        let Some(driver) = self.driver.as_mut() else {
            return;
        };
        let mode = driver.mode();
        let aborted = driver.take_aborted();

        if mode == SyncMode::Update {
            if let Some(original) = &self.original_branch {
                if let Err(e) = self.repo.checkout(original) {
                    warn!(branch = %original, "could not return to original branch: {e:#}");
                    self.warnings
                        .push(format!("Could not check out '{original}' again: {e:#}"));
                }
            }
        }

        let restored = self.stash.restore(&*self.repo);

        match (aborted, restored) {
            (Some(err), Ok(_)) => self.fail(err),
            (Some(err), Err(pop)) => self.state = SessionState::Error {
                message: format!("{err}\n\n{pop}"),
            },
            (None, Err(pop)) => self.fail(pop),
            (None, Ok(_)) => self.state = SessionState::Done,
        }
    }

    fn fail(&mut self, err: SyncError) {
        warn!("{err}");
        self.state = SessionState::Error {
            message: err.to_string(),
        };
    }

    /// Back to browsing with selection and mode cleared. Re-collects branch
    /// info, or reloads from scratch if the first load never succeeded.
    /// Input waits in `Loading` until the fresh list arrives.
    fn reset(&mut self) -> Effect {
        self.delete_mode = false;
        self.query.clear();
        self.cursor = 0;
        self.driver = None;
        self.planned.clear();
        self.progress = None;
        self.warnings.clear();
        self.notice = None;
        self.select_all(false);

        match &self.config {
            Some(config) => {
                self.state = SessionState::Loading;
                Effect::Spawn(Job::Refresh(config.clone()))
            }
            None => self.init(),
        }
    }

    fn quit(&mut self) -> Effect {
        if self.is_running() {
            if self.stash.forget() {
                self.exit_notice = Some(
                    "Your uncommitted changes are still stashed. Run 'git stash pop' once the repository is clean."
                        .to_string(),
                );
            }
        } else if let Err(e) = self.stash.restore(&*self.repo) {
            self.exit_notice = Some(e.to_string());
        }
        Effect::Quit
    }

    // ── selection helpers ───────────────────────────────────────────────

    fn visible_indices(&self) -> Vec<usize> {
        let query = self.query.to_lowercase();
        self.branches
            .iter()
            .enumerate()
            .filter(|(_, b)| b.matches(&query))
            .map(|(i, _)| i)
            .collect()
    }

    fn cursor_index(&self) -> Option<usize> {
        self.visible_indices().get(self.cursor).copied()
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_indices().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn select_visible(&mut self, selected: bool) {
        for i in self.visible_indices() {
            self.branches[i].selected = selected;
        }
    }

    fn select_all(&mut self, selected: bool) {
        for branch in &mut self.branches {
            branch.selected = selected;
        }
    }
}
