//! Rendering. Pure functions of the session snapshot.

use crate::core::{Branch, SyncMode};
use crate::session::{Session, SessionState};
use crate::styles;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(frame: &mut Frame, session: &Session) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let body = Paragraph::new(body(session))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(format!(" gitsync · {} ", title(session)), styles::title())),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(body, layout[0]);

    let footer = Paragraph::new(Line::from(Span::styled(footer(session), styles::dim())));
    frame.render_widget(footer, layout[1]);
}

fn title(session: &Session) -> &'static str {
    match session.state() {
        SessionState::Loading => "Loading",
        SessionState::Browsing | SessionState::Searching => "Branches",
        SessionState::Tagging { .. } => "Tag Branch",
        SessionState::Help => "Help",
        SessionState::ConfirmingStash { .. } => "Uncommitted Changes",
        SessionState::ConfirmingUpdate => "Confirm Update",
        SessionState::ConfirmingDelete => "Confirm Delete",
        SessionState::Updating => "Updating",
        SessionState::Deleting => "Deleting",
        SessionState::Done => "Complete",
        SessionState::Error { .. } => "Error",
    }
}

fn footer(session: &Session) -> String {
    let text = match session.state() {
        SessionState::Loading => "q: quit",
        SessionState::Browsing if session.delete_mode() => {
            "space: select  a/n: all/none  d: delete selected  esc: leave delete mode  q: quit"
        }
        SessionState::Browsing => {
            "↑↓/jk: move  space: select  a/n: all/none  /: search  t: tag  enter: update  d: delete mode  m: manual  h: help  q: quit"
        }
        SessionState::Searching => "type to filter  enter/esc: done",
        SessionState::Tagging { .. } => "enter: save  esc: cancel",
        SessionState::Help => "h/?/q/esc: back",
        SessionState::ConfirmingStash { .. }
        | SessionState::ConfirmingUpdate
        | SessionState::ConfirmingDelete => "y: yes  n/esc: cancel",
        SessionState::Updating | SessionState::Deleting => "q: quit (leaves the current step unfinished)",
        SessionState::Done | SessionState::Error { .. } => "any key: continue  q: quit",
    };
    format!(" {text}")
}

pub(crate) fn body(session: &Session) -> Vec<Line<'static>> {
    match session.state() {
        SessionState::Loading => vec![Line::from(format!(
            "{} Loading branches...",
            SPINNER[session.spinner() % SPINNER.len()]
        ))],
        SessionState::Browsing | SessionState::Searching => browsing(session),
        SessionState::Tagging { branch, input } => vec![
            Line::from(format!("Branch: {branch}")),
            Line::from(""),
            Line::from(vec![
                Span::raw("Description: "),
                Span::styled(format!("{input}█"), styles::cursor()),
            ]),
            Line::from(""),
            Line::styled("An empty description removes the tag.", styles::dim()),
        ],
        SessionState::Help => help(),
        SessionState::ConfirmingStash { mode } => vec![
            Line::styled("You have uncommitted changes.", styles::warning()),
            Line::from(""),
            Line::from(format!(
                "Stash them (untracked files included) before the {} and restore them afterwards? (y/n)",
                mode.verb()
            )),
        ],
        SessionState::ConfirmingUpdate => confirming(session, SyncMode::Update),
        SessionState::ConfirmingDelete => confirming(session, SyncMode::Delete),
        SessionState::Updating | SessionState::Deleting => running(session),
        SessionState::Done => done(session),
        SessionState::Error { message } => {
            let mut lines = vec![Line::styled(format!("✗ {message}"), styles::error())];
            lines.extend(warnings(session));
            lines
        }
    }
}

fn browsing(session: &Session) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(config) = session.config() {
        let mut header = vec![
            Span::raw("Base: "),
            Span::styled(config.upstream_ref(), styles::key()),
            Span::raw(format!("  Push to: {}", config.origin_remote)),
        ];
        if session.manual() {
            header.push(Span::styled("  [manual]", styles::warning()));
        }
        if session.skipped() > 0 {
            header.push(Span::styled(
                format!("  {} branch(es) skipped, see log", session.skipped()),
                styles::warning(),
            ));
        }
        lines.push(Line::from(header));
    }

    if session.delete_mode() {
        lines.push(Line::styled(
            " DELETE MODE: press d again to delete the selected branches ",
            styles::danger(),
        ));
    }

    if matches!(session.state(), SessionState::Searching) || !session.query().is_empty() {
        lines.push(Line::from(vec![
            Span::raw("Search: "),
            Span::styled(session.query().to_string(), styles::cursor()),
        ]));
    }
    lines.push(Line::from(""));

    let visible = session.visible();
    if visible.is_empty() {
        lines.push(Line::styled("No branches to show.", styles::dim()));
    }
    for (i, branch) in visible.iter().enumerate() {
        lines.push(branch_row(branch, i == session.cursor()));
    }

    if let Some(notice) = session.notice() {
        lines.push(Line::from(""));
        lines.push(Line::styled(notice.to_string(), styles::warning()));
    }
    lines
}

fn branch_row(branch: &Branch, under_cursor: bool) -> Line<'static> {
    let name_style = if under_cursor {
        styles::cursor()
    } else {
        ratatui::style::Style::default()
    };
    let mut spans = vec![
        Span::raw(if under_cursor { "> " } else { "  " }),
        Span::raw(if branch.selected { "[x] " } else { "[ ] " }),
        Span::styled("● ", styles::status(branch.status)),
        Span::styled(format!("{:<30}", branch.name), name_style),
        Span::styled(
            format!(" ↓{} ↑{}", branch.behind, branch.ahead),
            styles::dim(),
        ),
    ];
    if !branch.description.is_empty() {
        spans.push(Span::styled(format!("  {}", branch.description), styles::key()));
    }
    spans.push(Span::styled(format!("  {}", branch.last_commit), styles::dim()));
    Line::from(spans)
}

fn command_list(session: &Session, heading: &str) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(""), Line::from(heading.to_string())];
    lines.extend(
        session
            .planned()
            .iter()
            .map(|c| Line::styled(format!("  {c}"), styles::dim())),
    );
    lines
}

fn confirming(session: &Session, mode: SyncMode) -> Vec<Line<'static>> {
    let names: Vec<String> = session
        .branches()
        .iter()
        .filter(|b| b.selected)
        .map(|b| format!("  • {}", b.name))
        .collect();

    let mut lines = vec![Line::from(format!(
        "{} {} branch(es)?",
        match mode {
            SyncMode::Update => "Update",
            SyncMode::Delete => "Delete",
        },
        names.len()
    ))];
    lines.extend(names.into_iter().map(Line::from));
    lines.extend(command_list(session, "Commands that will run:"));
    lines.push(Line::from(""));
    lines.push(Line::from("Proceed? (y/n)"));
    lines
}

fn running(session: &Session) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let Some(driver) = session.driver() else {
        return lines;
    };
    let total = driver.queue().len();
    let done = driver.completed();
    lines.push(Line::styled(
        format!(
            "{} Progress: {}/{}",
            SPINNER[session.spinner() % SPINNER.len()],
            (done + 1).min(total),
            total
        ),
        styles::key(),
    ));
    lines.push(Line::from(""));

    let result = driver.result();
    for (i, name) in driver.queue().iter().enumerate() {
        let failed = result.failures.iter().any(|f| &f.branch == name);
        let (icon, style) = if i >= done {
            (if i == done { "▸" } else { "○" }, styles::dim())
        } else if failed {
            ("✗", styles::error())
        } else {
            ("✓", styles::success())
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {icon} "), style),
            Span::raw(name.clone()),
        ]));
    }

    if let Some(progress) = session.progress() {
        lines.push(Line::from(""));
        lines.push(Line::styled(format!("  {progress}"), styles::dim()));
    }
    lines.extend(command_list(session, "Commands that will run:"));
    lines
}

fn done(session: &Session) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let (Some(driver), Some(config)) = (session.driver(), session.config()) else {
        return lines;
    };
    let mode = driver.mode();
    let result = driver.result();

    if result.success_count > 0 {
        let past = match mode {
            SyncMode::Update => "updated",
            SyncMode::Delete => "deleted",
        };
        lines.push(Line::styled(
            format!("✓ Successfully {past} {} branch(es)", result.success_count),
            styles::success(),
        ));
        for name in driver
            .queue()
            .iter()
            .filter(|n| !result.failures.iter().any(|f| &&f.branch == n))
        {
            lines.push(Line::from(format!("    • {name}")));
        }
    }

    if !result.failures.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::styled(
            format!("✗ Failed: {} branch(es)", result.failures.len()),
            styles::error(),
        ));
        for failure in &result.failures {
            lines.push(Line::from(format!("    • {failure}")));
        }

        lines.push(Line::from(""));
        lines.push(Line::styled("Next steps:", styles::warning()));
        match mode {
            SyncMode::Update => {
                lines.push(Line::from("    1. Checkout the failed branch"));
                lines.push(Line::from(format!(
                    "    2. Run: git rebase {} and resolve conflicts",
                    config.base_branch
                )));
                lines.push(Line::from(format!(
                    "    3. Push: git push {} <branch> --force-with-lease",
                    config.origin_remote
                )));
            }
            SyncMode::Delete => {
                lines.push(Line::from(
                    "    1. Delete the failed branches manually (git branch -D) if desired",
                ));
            }
        }
    }

    if result.success_count == 0 && result.failures.is_empty() {
        lines.push(Line::from("Nothing to do."));
    }
    lines.extend(warnings(session));
    lines
}

fn warnings(session: &Session) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if !session.warnings().is_empty() {
        lines.push(Line::from(""));
        for warning in session.warnings() {
            lines.push(Line::styled(format!("! {warning}"), styles::warning()));
        }
    }
    lines
}

fn help() -> Vec<Line<'static>> {
    let keys = [
        ("↑/k ↓/j", "move"),
        ("space", "select or deselect the branch"),
        ("a / n", "select all / none of the visible branches"),
        ("/", "search by name or description"),
        ("t", "edit the branch description"),
        ("enter", "rebase the selected branches onto the base and push them"),
        ("d", "delete mode; press d again to delete the selected branches"),
        ("m", "toggle manual mode (confirm before running)"),
        ("h / ?", "this help"),
        ("q / ctrl+c", "quit"),
    ];

    let mut lines = vec![
        Line::from("gitsync keeps feature branches rebased onto a shared base branch."),
        Line::from(""),
        Line::styled("Workflow:", styles::title()),
        Line::from("  1. Fetch the base from the upstream remote."),
        Line::from("  2. Stop if the local base has commits upstream does not."),
        Line::from("  3. Hard-reset the local base to upstream and push it to origin."),
        Line::from("  4. Rebase each selected branch onto the base and push it with --force-with-lease."),
        Line::from(""),
        Line::styled("Keys:", styles::title()),
    ];
    for (key, what) in keys {
        lines.push(Line::from(vec![
            Span::styled(format!("  {key:<12}"), styles::key()),
            Span::raw(what),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled("Status:", styles::title()));
    lines.push(Line::from(vec![
        Span::styled("  ● ", styles::success()),
        Span::raw("up to date with the base"),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  ● ", styles::warning()),
        Span::raw("behind the base"),
    ]));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fake::FakeRepo;
    use crate::session::{perform, Effect, Key, Msg};
    use crate::config::ConfigLocation;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn text(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn run(session: &mut Session, repo: &FakeRepo, mut effect: Effect) {
        let location = ConfigLocation::Default(PathBuf::from("/nonexistent/.gitsync.yaml"));
        while let Effect::Spawn(job) = effect {
            effect = session.update(perform(repo, &location, job, |_| {}));
        }
    }

    #[test]
    fn test_browsing_shows_branches_and_skipped_count() {
        let repo = Arc::new(
            FakeRepo::new(&["main", "feature-a", "broken"])
                .with_counts("feature-a", 2, 1)
                .with_description("feature-a", "login")
                .with_broken_info("broken"),
        );
        let mut session = Session::new(repo.clone(), false);
        let effect = session.init();
        run(&mut session, &repo, effect);

        let out = text(&body(&session));
        assert!(out.contains("upstream/main"));
        assert!(out.contains("1 branch(es) skipped"));
        assert!(out.contains("feature-a"));
        assert!(out.contains("↓2 ↑1"));
        assert!(out.contains("login"));
    }

    #[test]
    fn test_done_lists_failures_and_next_steps() {
        let repo = Arc::new(FakeRepo::new(&["main", "a", "b"]).with_conflict("b"));
        let mut session = Session::new(repo.clone(), false);
        let effect = session.init();
        run(&mut session, &repo, effect);
        let effect = session.update(Msg::Key(Key::Char('a')));
        run(&mut session, &repo, effect);
        let effect = session.update(Msg::Key(Key::Enter));
        run(&mut session, &repo, effect);

        let out = text(&body(&session));
        assert!(out.contains("Successfully updated 1 branch(es)"));
        assert!(out.contains("b (rebase conflict)"));
        assert!(out.contains("git rebase main"));
    }

    #[test]
    fn test_loading_and_help_render() {
        let repo = Arc::new(FakeRepo::new(&["main"]));
        let session = Session::new(repo, false);
        assert!(text(&body(&session)).contains("Loading"));
        assert!(text(&help()).contains("force-with-lease"));
    }
}
