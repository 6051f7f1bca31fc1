use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{io::stdout, time::Instant};

use tetris2048::{
    board::{DEFAULT_HEIGHT, DEFAULT_WIDTH},
    game::{Game, GameState},
    Difficulty, GameConfig,
};

// ============================================================================
// Command Line
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "tetris2048", about = "Falling tetrominoes whose tiles merge like 2048")]
struct Args {
    /// Auto-fall speed
    #[arg(short, long, value_enum, default_value_t = Difficulty::Normal)]
    difficulty: Difficulty,

    /// Board width in cells, 4 to 256
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Board height in cells, 1 to 256
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,

    /// Seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 5;
const EMPTY_CELL: &str = "  ·  ";

// ============================================================================
// Color Mapping
// ============================================================================

fn tile_color(value: u32) -> Color {
    match value {
        2 => Color::Rgb(239, 230, 221),
        4 => Color::Rgb(239, 227, 205),
        8 => Color::Rgb(245, 179, 127),
        16 => Color::Rgb(247, 152, 107),
        32 => Color::Rgb(247, 124, 90),
        64 => Color::Rgb(247, 93, 59),
        128 => Color::Rgb(239, 205, 115),
        256 => Color::Rgb(239, 206, 99),
        512 => Color::Rgb(239, 198, 82),
        1024 => Color::Rgb(238, 198, 66),
        2048 => Color::Rgb(239, 194, 49),
        _ => Color::Rgb(61, 58, 51),
    }
}

fn tile_span(value: Option<u32>) -> Span<'static> {
    match value {
        Some(value) => {
            let fg = if value > 2048 { Color::White } else { Color::Rgb(30, 30, 30) };
            Span::styled(
                format!("{:^width$}", value, width = CELL_WIDTH as usize),
                Style::default().fg(fg).bg(tile_color(value)),
            )
        }
        None => Span::styled(EMPTY_CELL, Style::default().fg(Color::DarkGray)),
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game) {
    let area = frame.size();

    match game.state {
        GameState::Playing => render_game(frame, game, area),
        GameState::Paused => render_paused(frame, game, area),
        GameState::GameOver => render_game_over(frame, game, area),
    }
}

fn render_game(frame: &mut Frame, game: &Game, area: Rect) {
    let cols = u16::try_from(game.board.width()).unwrap_or(u16::MAX);
    let rows = u16::try_from(game.board.height()).unwrap_or(u16::MAX);
    let grid_display_width = cols.saturating_mul(CELL_WIDTH).saturating_add(2);
    let grid_display_height = rows.saturating_add(2);
    let side_width = 4 * CELL_WIDTH + 4;
    let total_width = grid_display_width.saturating_add(side_width);
    let total_height = grid_display_height.saturating_add(2);

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Next / Score]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(side_width),
    ])
    .split(game_row);

    let side = Layout::vertical([Constraint::Length(8), Constraint::Fill(1)]).split(horizontal[1]);

    render_grid(frame, game, horizontal[0]);
    render_preview(frame, game, side[0]);
    render_info(frame, game, side[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→: Move | ↓: Soft drop | ↑: Rotate | Space: Drop | P: Pause | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tetris 2048 ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visual_grid = game.render_grid();

    // Row 0 is the ground, so draw from the top row down.
    let lines: Vec<Line> = visual_grid
        .iter()
        .rev()
        .map(|row| Line::from(row.iter().map(|&value| tile_span(value)).collect::<Vec<_>>()))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_preview(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = vec![Line::from("")];
    for row in game.preview() {
        let mut spans = vec![Span::raw(" ")];
        spans.extend(row.into_iter().map(|value| match value {
            Some(_) => tile_span(value),
            None => Span::raw(" ".repeat(CELL_WIDTH as usize)),
        }));
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score())),
        Line::from(""),
        Line::from(Span::styled("Speed", Style::default().fg(Color::Cyan))),
        Line::from(format!("{:?}", game.config().difficulty)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    render_game(frame, game, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score())),
        Line::from(""),
        Line::from(Span::styled(
            "R to restart, ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(30, 9, area);
    frame.render_widget(paragraph, popup_area);
}

fn render_paused(frame: &mut Frame, game: &Game, area: Rect) {
    render_game(frame, game, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "Press P to continue",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Paused ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(24, 10, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    game: &mut Game,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| render(frame, game))?;

        let timeout = game.time_until_fall(Instant::now());

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        KeyCode::Char('p') | KeyCode::Char('P') => game.toggle_pause(),
                        KeyCode::Char('r') | KeyCode::Char('R') if game.is_game_over() => {
                            game.restart();
                        }
                        _ if game.state == GameState::Playing => match key.code {
                            KeyCode::Left => {
                                game.move_piece(0, -1);
                            }
                            KeyCode::Right => {
                                game.move_piece(0, 1);
                            }
                            KeyCode::Down => game.soft_drop()?,
                            KeyCode::Up => {
                                game.rotate_piece();
                            }
                            KeyCode::Char(' ') => game.hard_drop()?,
                            _ => {}
                        },
                        _ => {}
                    }
                }
            }
        }

        game.update(Instant::now())?;
        game.take_events();
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = GameConfig {
        width: args.width,
        height: args.height,
        difficulty: args.difficulty,
        ..GameConfig::default()
    };
    let mut game = match args.seed {
        Some(seed) => Game::with_seed(config, seed),
        None => Game::new(config),
    }
    .context("invalid board size")?;

    enable_raw_mode().context("failed to enable raw mode")?;
    stdout()
        .execute(EnterAlternateScreen)
        .context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut game);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}
