//! Main TUI application state and logic

use crate::interpreter::engine::{Interpreter, Status};
use crate::ui::panes::console::InputLine;
use crate::ui::panes::source::SourceView;
use crate::ui::panes::{
    render_console_pane, render_memory_pane, render_source_pane, render_status_bar,
    SourceScrollState,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use log::debug;
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Delay between two lines in auto-play mode
const PLAY_INTERVAL: Duration = Duration::from_millis(600);

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Console,
    Memory,
}

impl FocusedPane {
    /// Move focus to the next pane (source -> console -> memory)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Console,
            FocusedPane::Console => FocusedPane::Memory,
            FocusedPane::Memory => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// The interpreter instance
    pub interpreter: Interpreter,

    /// The source code being executed
    pub source_code: String,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub source_scroll: SourceScrollState,
    pub console_scroll: usize,
    pub memory_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,

    /// Text typed while the run waits for input
    pub input_buffer: String,
}

impl App {
    /// Create a new app with the given interpreter and source code
    pub fn new(interpreter: Interpreter, source_code: String) -> Self {
        let long_ago = Instant::now()
            .checked_sub(Duration::from_secs(1))
            .unwrap_or_else(Instant::now);
        App {
            interpreter,
            source_code,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            console_scroll: 0,
            memory_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready! Press r to run or s to step."),
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: long_ago,
            input_buffer: String::new(),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // Handle auto-play mode
            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                self.step();
                if self.interpreter.status() != Status::Running {
                    self.is_playing = false;
                }
                self.last_play_time = Instant::now();
            }

            // Use poll with timeout to allow auto-play to work
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Console (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(columns[0]);

        let dialect = self.interpreter.config().dialect;
        let status = self.interpreter.status();
        let current_line = self.interpreter.current_line();

        let view = SourceView {
            source_code: &self.source_code,
            dialect,
            current_line,
            error_line: self.interpreter.failed_line(),
            waiting_for_input: status == Status::WaitingForInput,
        };
        render_source_pane(
            frame,
            left_rows[0],
            &view,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        let input = self.interpreter.prompt().map(|prompt| InputLine {
            prompt,
            buffer: &self.input_buffer,
        });
        render_console_pane(
            frame,
            left_rows[1],
            self.interpreter.console(),
            input,
            self.focused_pane == FocusedPane::Console,
            &mut self.console_scroll,
        );

        render_memory_pane(
            frame,
            columns[1],
            self.interpreter.memory(),
            dialect,
            self.focused_pane == FocusedPane::Memory,
            &mut self.memory_scroll,
        );

        render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            status,
            current_line,
            self.is_playing,
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.interpreter.is_waiting_for_input() {
            self.handle_input_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.is_playing = false;
                self.restart();
                self.interpreter.run_to_pause();
                self.after_execution();
            }
            KeyCode::Right | KeyCode::Char('s') | KeyCode::Char('S') => {
                self.is_playing = false;
                self.step();
            }
            KeyCode::Enter => {
                // Continue to the end or the next input
                self.is_playing = false;
                if self.ensure_started() {
                    self.interpreter.run_to_pause();
                }
                self.after_execution();
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.interpreter.clear_console();
                self.console_scroll = 0;
                self.status_message = "Console cleared".to_string();
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling up makes the current line move down visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Console => {
                    self.console_scroll = self.console_scroll.saturating_sub(1);
                }
                FocusedPane::Memory => {
                    self.memory_scroll = self.memory_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Console => {
                    self.console_scroll = self.console_scroll.saturating_add(1);
                }
                FocusedPane::Memory => {
                    self.memory_scroll = self.memory_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play mode (with 200ms debounce to prevent key repeat spam)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(PLAY_INTERVAL)
                            .unwrap_or_else(Instant::now);
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            _ => {}
        }
    }

    /// Keys while the run waits for input go to the input line
    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input_buffer);
                match self.interpreter.submit_input(&text) {
                    Ok(Status::Running) => {
                        self.interpreter.run_to_pause();
                        self.after_execution();
                    }
                    Ok(_) => self.after_execution(),
                    Err(e) => self.status_message = e.to_string(),
                }
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Esc => {
                self.input_buffer.clear();
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
            }
            _ => {}
        }
    }

    /// Arm a fresh run of the source; its console starts empty
    fn restart(&mut self) {
        debug!("restarting run");
        self.input_buffer.clear();
        self.console_scroll = 0;
        if let Err(err) = self.interpreter.start(&self.source_code) {
            debug!("run not started: {}", err);
        }
    }

    /// Start a run unless one is in progress. Returns whether it is running.
    fn ensure_started(&mut self) -> bool {
        let status = self.interpreter.status();
        if status == Status::Idle || status.is_finished() {
            self.restart();
        }
        self.interpreter.status() == Status::Running
    }

    /// Execute one line
    fn step(&mut self) {
        if self.ensure_started() {
            self.interpreter.step();
        }
        self.after_execution();
    }

    fn after_execution(&mut self) {
        // Auto-scroll console to bottom
        self.console_scroll = usize::MAX;
        self.status_message = match self.interpreter.status() {
            Status::Idle => "Ready".to_string(),
            Status::Running => match self.interpreter.current_line() {
                Some(line) => format!("Next: line {}", line),
                None => "Running".to_string(),
            },
            Status::WaitingForInput => self
                .interpreter
                .prompt()
                .unwrap_or("waiting for input")
                .to_string(),
            Status::Completed => "Run completed".to_string(),
            Status::Failed => match self.interpreter.failed_line() {
                Some(line) => format!("Run failed at line {}", line),
                None => "Run failed".to_string(),
            },
        };
    }
}
