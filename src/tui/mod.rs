//! TUI module - Terminal dashboard with ratatui

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table},
};
use std::io::{stdout, Stdout};

use crate::manager::WorkoutManager;
use crate::tracker::{ExerciseHistory, ProgressTrend, Series};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const OVERVIEW: &str = "Over Time Progress";

/// One row of the per-exercise table
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub label: String,
    pub sessions: usize,
    pub latest: Option<(f64, String)>,
    pub best: Option<f64>,
    pub trend: Option<String>,
}

impl SeriesSummary {
    fn from_series(label: String, series: &Series<f64>) -> Self {
        Self {
            label,
            sessions: series.len(),
            latest: series.last().map(|(v, d)| (*v, d.to_string())),
            best: series.values().iter().copied().reduce(f64::max),
            trend: ProgressTrend::fit(series).map(|t| t.summary()),
        }
    }
}

/// Volume first, then each rep count in ascending order
pub fn summarize(history: &ExerciseHistory) -> Vec<SeriesSummary> {
    let mut rows = vec![SeriesSummary::from_series("Volume".into(), &history.volume)];
    rows.extend(
        history
            .by_reps
            .iter()
            .map(|(reps, series)| SeriesSummary::from_series(format!("{} reps", reps), series)),
    );
    rows
}

/// App state for TUI
pub struct App {
    manager: WorkoutManager,
    /// 0 is the overview, `n` is the n-th exercise
    selected: usize,
    should_quit: bool,
}

impl App {
    pub fn new(manager: WorkoutManager) -> Self {
        Self {
            manager,
            selected: 0,
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }

        restore_terminal()?;
        Ok(())
    }

    fn item_count(&self) -> usize {
        self.manager.exercises().len() + 1
    }

    fn selected_exercise(&self) -> Option<&str> {
        self.selected
            .checked_sub(1)
            .and_then(|i| self.manager.exercises().names().get(i))
            .map(String::as_str)
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let stats = self.manager.tracker().stats();
        let header = Paragraph::new(format!(
            "liftlog - Total reps: {}, Total weight lifted: {} lbs",
            stats.total_reps, stats.total_volume
        ))
        .style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(chunks[1]);

        // Exercise picker
        let mut items = vec![ListItem::new(OVERVIEW).style(Style::default().fg(Color::Yellow))];
        items.extend(
            self.manager
                .exercises()
                .iter()
                .map(|name| ListItem::new(name.to_string())),
        );
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Exercises"))
            .highlight_style(Style::default().bg(Color::DarkGray).bold())
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, body[0], &mut state);

        match self.selected_exercise() {
            Some(name) => self.render_exercise(frame, body[1], name),
            None => self.render_overview(frame, body[1]),
        }

        // Footer
        let footer = Paragraph::new("q: quit | r: reload | up/down: select")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }

    fn render_overview(&self, frame: &mut Frame, area: Rect) {
        let stats = self.manager.tracker().stats();
        let rows: Vec<Row> = stats
            .reps_per_workout
            .iter()
            .zip(stats.volume_per_workout.values())
            .map(|((reps, date), volume)| {
                Row::new(vec![
                    Cell::from(date.to_string()),
                    Cell::from(reps.to_string()),
                    Cell::from(format!("{} lbs", volume)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(20),
                Constraint::Length(10),
                Constraint::Min(12),
            ],
        )
        .header(Row::new(vec!["Date", "Reps", "Volume"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("Per workout"));

        frame.render_widget(table, area);
    }

    fn render_exercise(&self, frame: &mut Frame, area: Rect, name: &str) {
        let tracker = self.manager.tracker();

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5)])
            .split(area);

        let pb_text = match tracker.personal_best(name) {
            Some(pb) if pb.is_set() => format!(
                "PB for {} is {} lbs, completed for {} reps on {}",
                name, pb.weight, pb.reps, pb.date
            ),
            _ => format!("No sessions logged for {} yet", name),
        };
        let pb = Paragraph::new(pb_text)
            .style(Style::default().fg(Color::Green))
            .block(Block::default().borders(Borders::ALL).title("Personal best"));
        frame.render_widget(pb, parts[0]);

        let summaries = tracker.exercise(name).map(summarize).unwrap_or_default();
        let rows: Vec<Row> = summaries
            .into_iter()
            .map(|s| {
                let (latest, date) = s
                    .latest
                    .map(|(v, d)| (v.to_string(), d))
                    .unwrap_or_else(|| ("-".into(), "-".into()));
                Row::new(vec![
                    Cell::from(s.label),
                    Cell::from(s.sessions.to_string()),
                    Cell::from(latest),
                    Cell::from(date),
                    Cell::from(s.best.map(|b| b.to_string()).unwrap_or_else(|| "-".into())),
                    Cell::from(s.trend.unwrap_or_else(|| "-".into())),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(9),
                Constraint::Length(10),
                Constraint::Length(20),
                Constraint::Length(10),
                Constraint::Min(20),
            ],
        )
        .header(
            Row::new(vec!["Series", "Sessions", "Latest", "Date", "Best", "Trend"])
                .style(Style::default().bold()),
        )
        .block(Block::default().borders(Borders::ALL).title(name.to_string()));

        frame.render_widget(table, parts[1]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => self.should_quit = true,
                        KeyCode::Char('r') => {
                            self.manager.reload()?;
                            self.selected = self.selected.min(self.item_count() - 1);
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            self.selected = (self.selected + 1) % self.item_count();
                        }
                        KeyCode::Up | KeyCode::Char('k') => {
                            self.selected = self
                                .selected
                                .checked_sub(1)
                                .unwrap_or(self.item_count() - 1);
                        }
                        _ => {}
                    }
                }
        Ok(())
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
