use crate::host::StatusLine;
use crate::plugin::{self, PluginHandle};
use crate::settings::{SETTING_FIELDS, SettingField};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use eyre::Result;
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{io, time::Duration};
use tokio::{runtime::Handle, sync::mpsc::UnboundedReceiver};

/// How many notices are kept around for display
const MAX_NOTICES: usize = 50;

pub struct StatefulList<T> {
    state: ListState,
    items: Vec<T>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> StatefulList<T> {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        StatefulList { state, items }
    }

    fn next(&mut self) {
        let i = match self.state.selected() {
            Some(i) => (i + 1) % self.items.len(),
            None => 0,
        };
        self.state.select(Some(i));
    }

    fn previous(&mut self) {
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }
}

enum AppState {
    Browse,
    Editing { buffer: String },
}

struct App {
    state: AppState,
    plugin: PluginHandle,
    runtime: Handle,
    fields: StatefulList<SettingField>,
    notices: Vec<String>,
    receiver: UnboundedReceiver<String>,
    status: StatusLine,
}

impl App {
    fn push_notice(&mut self, notice: String) {
        self.notices.push(notice);
        if self.notices.len() > MAX_NOTICES {
            let excess = self.notices.len() - MAX_NOTICES;
            self.notices.drain(..excess);
        }
    }

    fn drain_notices(&mut self) {
        while let Ok(notice) = self.receiver.try_recv() {
            self.push_notice(notice);
        }
    }

    fn commit_edit(&mut self, buffer: String) {
        let Some(field) = self.fields.selected().copied() else {
            return;
        };
        let result = self.runtime.block_on(self.plugin.on_change(field.key, buffer));
        if let Err(e) = result {
            self.push_notice(format!("Failed to save settings: {e:#}"));
        }
    }
}

/// Runs the terminal host until the user quits, then stops the plugin.
///
/// Must be called from a thread where blocking is allowed; async work is
/// driven through `runtime`.
pub fn run_ui(
    plugin: PluginHandle,
    runtime: Handle,
    receiver: UnboundedReceiver<String>,
    status: StatusLine,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App {
        state: AppState::Browse,
        plugin,
        runtime,
        fields: StatefulList::with_items(SETTING_FIELDS.to_vec()),
        notices: Vec::new(),
        receiver,
        status,
    };

    let res = run_app(&mut terminal, &mut app);
    let restored = shutdown(app.plugin, || restore_terminal(&mut terminal));

    res?;
    Ok(restored?)
}

/// Stops the plugin, then hands the terminal back. The plugin is stopped even
/// when restoring the terminal fails.
fn shutdown(plugin: PluginHandle, restore: impl FnOnce() -> io::Result<()>) -> io::Result<()> {
    plugin::stop(plugin);
    restore()
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.drain_notices();
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match &mut app.state {
            AppState::Browse => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down => app.fields.next(),
                KeyCode::Up => app.fields.previous(),
                KeyCode::Char('t') => {
                    // Outcome and errors arrive through the notice channel.
                    let _ = app.runtime.block_on(app.plugin.toggle());
                }
                KeyCode::Enter => {
                    if let Some(field) = app.fields.selected() {
                        app.state = AppState::Editing {
                            buffer: app.plugin.settings().get(field.key).to_owned(),
                        };
                    }
                }
                _ => {}
            },
            AppState::Editing { buffer } => match key.code {
                KeyCode::Char(c) => buffer.push(c),
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Esc => app.state = AppState::Browse,
                KeyCode::Enter => {
                    let buffer = std::mem::take(buffer);
                    app.state = AppState::Browse;
                    app.commit_edit(buffer);
                }
                _ => {}
            },
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(2 * SETTING_FIELDS.len() as u16 + 2),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = match app.state {
        AppState::Browse => "Symlink toggle",
        AppState::Editing { .. } => "Editing setting (Enter to save, Esc to cancel)",
    };
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let selected = app.fields.state.selected();
    let items = app
        .fields
        .items
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let value = match &app.state {
                AppState::Editing { buffer } if Some(i) == selected => {
                    Span::raw(format!("{buffer}_"))
                }
                _ => match app.plugin.settings().get(field.key) {
                    "" => Span::styled(field.placeholder, Style::default().fg(Color::DarkGray)),
                    value => Span::raw(value.to_owned()),
                },
            };
            ListItem::new(vec![
                Line::from(vec![Span::raw(format!("{}: ", field.name)), value]),
                Line::from(Span::styled(
                    field.description,
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect::<Vec<_>>();

    let settings = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Settings"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(settings, chunks[1], &mut app.fields.state);

    let visible = chunks[2].height.saturating_sub(2) as usize;
    let start = app.notices.len().saturating_sub(visible);
    let notices = List::new(
        app.notices[start..]
            .iter()
            .map(|notice| ListItem::new(notice.as_str()))
            .collect::<Vec<_>>(),
    )
    .block(Block::default().borders(Borders::ALL).title("Notices"));
    f.render_widget(notices, chunks[2]);

    let keys = match app.state {
        AppState::Browse => "t: toggle  ↑↓: select  Enter: edit  q: quit",
        AppState::Editing { .. } => "Enter: save  Esc: cancel",
    };
    let footer = Paragraph::new(Line::from(vec![
        Span::styled(
            app.status.text(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(keys, Style::default().fg(Color::Gray)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[3]);
}
