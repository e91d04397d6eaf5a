use anyhow::Result;
use blocknote_config::Config;
use blocknote_engine::{
    BlockId, Collaborators, Command, MoveDirection, Outcome, Session, SessionOptions,
    SystemClock, io,
};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use relative_path::RelativePathBuf;
use std::{env, io::stdout, path::PathBuf, process};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Notes,
    Blocks,
}

struct App {
    notes: Vec<RelativePathBuf>,
    note_list_state: ListState,
    block_list_state: ListState,
    focus: Pane,
    session: Session,
    /// Block picked up with `m`, waiting to be dropped with `p` or `P`
    picked: Option<BlockId>,
    status: Option<String>,
}

impl App {
    fn new(notes_path: PathBuf, options: SessionOptions) -> Result<Self> {
        let notes = io::scan_note_files(&notes_path)?;
        let session = Session::new(Collaborators::filesystem(notes_path), options);

        let mut app = Self {
            notes,
            note_list_state: ListState::default(),
            block_list_state: ListState::default(),
            focus: Pane::Notes,
            session,
            picked: None,
            status: None,
        };

        // Select first note if available
        if !app.notes.is_empty() {
            app.note_list_state.select(Some(0));
        }

        Ok(app)
    }

    fn selected_block(&self) -> Option<BlockId> {
        let position = self.block_list_state.selected()?;
        self.session.store().get(position).map(|b| b.id())
    }

    fn move_selection(&mut self, forward: bool) {
        let (state, len) = match self.focus {
            Pane::Notes => (&mut self.note_list_state, self.notes.len()),
            Pane::Blocks => (&mut self.block_list_state, self.session.store().len()),
        };
        if len == 0 {
            state.select(None);
            return;
        }
        let i = match state.selected() {
            Some(i) if forward => (i + 1) % len,
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        state.select(Some(i));
    }

    /// Keep the block selection inside the store after it changed shape
    fn clamp_block_selection(&mut self) {
        let len = self.session.store().len();
        let selected = match self.block_list_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.block_list_state.select(selected);
    }

    /// Point the block selection at `block`, wherever it ended up
    fn follow(&mut self, block: BlockId) {
        if let Some(position) = self.session.store().position_of(block) {
            self.block_list_state.select(Some(position));
        }
    }

    fn open_selected_note(&mut self) {
        let Some(path) = self
            .note_list_state
            .selected()
            .and_then(|i| self.notes.get(i))
            .cloned()
        else {
            return;
        };
        match self.session.open(path.clone()) {
            Ok(()) => {
                self.picked = None;
                self.focus = Pane::Blocks;
                self.block_list_state.select(None);
                self.clamp_block_selection();
                self.status = Some(format!("Opened {path}"));
            }
            Err(e) => self.status = Some(format!("Error opening {path}: {e}")),
        }
    }

    fn dispatch(&mut self, command: Command) -> Outcome {
        match self.session.dispatch(command) {
            Ok(outcome) => {
                self.clamp_block_selection();
                outcome
            }
            Err(e) => {
                self.status = Some(format!("Error: {e}"));
                Outcome::Ignored
            }
        }
    }

    /// Handle one key press. Returns true when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let editing = self
            .session
            .edit_state()
            .session()
            .map(|s| (s.block(), s.buffer().to_string()));
        if let Some((block, mut buffer)) = editing {
            match key.code {
                KeyCode::Esc => {
                    self.dispatch(Command::Cancel);
                }
                KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.dispatch(Command::Commit);
                    self.follow(block);
                }
                KeyCode::Enter => {
                    buffer.push('\n');
                    self.dispatch(Command::UpdateBuffer { text: buffer });
                }
                KeyCode::Backspace => {
                    buffer.pop();
                    self.dispatch(Command::UpdateBuffer { text: buffer });
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    self.dispatch(Command::UpdateBuffer { text: buffer });
                }
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Char('q') => match self.session.close() {
                Ok(()) => return true,
                Err(e) => self.status = Some(format!("Not quitting, save failed: {e}")),
            },
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Pane::Notes => Pane::Blocks,
                    Pane::Blocks => Pane::Notes,
                };
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Enter if self.focus == Pane::Notes => self.open_selected_note(),
            _ if self.session.path().is_none() => {}
            KeyCode::Char('u') => {
                self.dispatch(Command::Undo);
            }
            KeyCode::Char('r') => {
                self.dispatch(Command::Redo);
            }
            KeyCode::Char('s') => match self.session.save() {
                Ok(()) => self.status = Some("Saved".to_string()),
                Err(e) => self.status = Some(format!("Error: {e}")),
            },
            _ if self.focus == Pane::Blocks => self.handle_block_key(key.code),
            _ => {}
        }
        false
    }

    fn handle_block_key(&mut self, code: KeyCode) {
        let selected = self.selected_block();
        match (code, selected) {
            (KeyCode::Enter, Some(block)) => {
                self.dispatch(Command::BeginEdit { block });
            }
            (KeyCode::Char('a'), _) => {
                let at = self.block_list_state.selected().map_or(0, |i| i + 1);
                if self.dispatch(Command::AddBlock { at }) == Outcome::Applied {
                    self.block_list_state.select(Some(at));
                }
            }
            (KeyCode::Char('d'), Some(block)) => {
                self.dispatch(Command::Delete { block });
            }
            (KeyCode::Char('J'), Some(block)) => {
                self.dispatch(Command::Move {
                    block,
                    direction: MoveDirection::Down,
                });
                self.follow(block);
            }
            (KeyCode::Char('K'), Some(block)) => {
                self.dispatch(Command::Move {
                    block,
                    direction: MoveDirection::Up,
                });
                self.follow(block);
            }
            (KeyCode::Char('m'), Some(block)) => {
                self.picked = Some(block);
                self.status = Some("Picked block; select a position, then p to drop above or P below".to_string());
            }
            (KeyCode::Char(key @ ('p' | 'P')), _) => {
                let Some(block) = self.picked.take() else {
                    return;
                };
                // `p` drops into the gap above the selection, `P` below it
                let selected = self.block_list_state.selected().unwrap_or(0);
                let target = if key == 'P' { selected + 1 } else { selected };
                if self.dispatch(Command::Drop { block, target }) == Outcome::Applied {
                    self.follow(block);
                }
                self.status = None;
            }
            _ => {}
        }
    }

    fn block_lines(&self) -> Vec<ListItem<'static>> {
        let editing = self.session.edit_state().session();
        self.session
            .store()
            .iter()
            .map(|block| {
                let (text, style) = match editing {
                    Some(s) if s.block() == block.id() => (
                        format!("{}_", s.buffer()),
                        Style::default().fg(Color::Green),
                    ),
                    _ => (block.content().to_string(), Style::default()),
                };
                let marker = if self.picked == Some(block.id()) {
                    "✋"
                } else {
                    "  "
                };
                let mut lines = vec![Line::from(vec![
                    Span::styled(
                        format!("{marker}{:>3} ", block.index()),
                        Style::default().add_modifier(Modifier::DIM),
                    ),
                    Span::styled(text.lines().next().unwrap_or_default().to_string(), style),
                ])];
                lines.extend(
                    text.lines()
                        .skip(1)
                        .map(|l| Line::from(Span::styled(format!("      {l}"), style))),
                );
                ListItem::new(lines)
            })
            .collect()
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    // Determine notes path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {} [notes-folder-path]", args[0]);
            process::exit(1);
        }
    };

    let (notes_path, from_config) = match (args.len(), &config) {
        // CLI argument provided - use it
        (2, _) => (PathBuf::from(&args[1]), false),
        (1, Some(config)) => (config.notes_path.clone(), true),
        (1, None) => {
            eprintln!("Error: No notes path provided and no config file found");
            eprintln!("Usage: {} <notes-folder-path>", args[0]);
            eprintln!("Or create a config file at {}", config_path.display());
            process::exit(1);
        }
        _ => {
            eprintln!("Usage: {} [notes-folder-path]", args[0]);
            process::exit(1);
        }
    };

    // Validate notes directory using engine
    if let Err(e) = io::validate_notes_dir(&notes_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Notes path '{}'{} is invalid: {e}",
            notes_path.display(),
            source
        );
        process::exit(1);
    }

    let options = session_options(config.as_ref());
    let mut app = App::new(notes_path, options)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn session_options(config: Option<&Config>) -> SessionOptions {
    let mut options = SessionOptions::default();
    let Some(config) = config else {
        return options;
    };
    options.history_limit = config.history_limit;
    if let Some(minutes) = config.utc_offset_minutes {
        match SystemClock::with_offset_minutes(minutes) {
            Some(clock) => options.clock = Box::new(clock),
            None => log::warn!("ignoring out of range utc_offset_minutes {minutes}"),
        }
    }
    options
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && app.handle_key(key)
        {
            return Ok(());
        }
    }
}

fn focus_style(app: &App, pane: Pane) -> Style {
    if app.focus == pane {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
        .split(rows[0]);

    // Notes list panel
    let note_items: Vec<ListItem> = app
        .notes
        .iter()
        .map(|path| ListItem::new(Line::from(format!("📄 {path}"))))
        .collect();

    let notes_list = List::new(note_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_style(app, Pane::Notes))
                .title("Notes"),
        )
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(notes_list, chunks[0], &mut app.note_list_state);

    // Outline in the title, blocks below
    let outline = app
        .session
        .view()
        .headings
        .iter()
        .map(|h| format!("{}{}", "·".repeat(h.level as usize - 1), h.text))
        .collect::<Vec<_>>()
        .join(" | ");
    let title = match app.session.path() {
        Some(path) if outline.is_empty() => path.to_string(),
        Some(path) => format!("{path} :: {outline}"),
        None => "Select a note and press Enter".to_string(),
    };

    let blocks_list = List::new(app.block_lines())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_style(app, Pane::Blocks))
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));

    f.render_stateful_widget(blocks_list, chunks[1], &mut app.block_list_state);

    // Instructions
    let help_text = match (&app.status, app.session.edit_state().is_editing()) {
        (_, true) => Line::from("Editing | Ctrl-s: Commit | Esc: Cancel | Enter: Newline"),
        (Some(status), false) => Line::from(status.clone()),
        (None, false) => Line::from(vec![
            Span::raw("q: Quit | Tab: Switch pane | j/k: Select | Enter: Open/Edit | "),
            Span::raw("a: Add | d: Delete | J/K: Move | m: Pick | p/P: Drop above/below | "),
            Span::raw("u/r: Undo/Redo | s: Save"),
        ]),
    };

    let help = Paragraph::new(vec![help_text]).block(Block::default());

    f.render_widget(help, rows[1]);
}
