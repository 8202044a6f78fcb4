use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

use crate::shared::LedState;

// One row of step cells; a wider gap marks each beat.
pub fn draw_step_row(
    frame: &mut Frame,
    area: Rect,
    leds: &[LedState],
    steps_per_beat: usize,
    cursor: Option<usize>,
) {
    if leds.is_empty() {
        return;
    }
    let constraints: Vec<Constraint> = leds
        .iter()
        .map(|_| Constraint::Ratio(1, leds.len() as u32))
        .collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (step, (led, cell)) in leds.iter().zip(cells.iter()).enumerate() {
        let style = match led {
            LedState::OnHigh => Style::default().fg(Color::Yellow).bg(Color::Yellow),
            LedState::OnMedium => Style::default().fg(Color::Green).bg(Color::Green),
            LedState::Off => Style::default().fg(Color::DarkGray),
        };
        let mut borders = Borders::ALL;
        if steps_per_beat > 0 && step % steps_per_beat != 0 {
            borders.remove(Borders::LEFT);
        }
        let mut block = Block::default().borders(borders).border_style(style).style(style);
        if cursor == Some(step) {
            block = block.border_style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );
        }
        frame.render_widget(block, *cell);
    }
}
