use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::shared::{DisplayState, PlayerView};

use super::grid::draw_step_row;

const HELP: &str =
    "space play/pause  bksp stop  tab player  -/= tempo  1-4 q-r a-f z-v steps  \u{2190}\u{2192}/enter cursor  esc quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let mut constraints: Vec<Constraint> = state
        .players
        .iter()
        .map(|_| Constraint::Length(5))
        .collect();
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(2));

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, player) in state.players.iter().enumerate() {
        let selected = i == state.selected;
        let cursor = selected.then_some(state.cursor);
        draw_player(frame, sections[i], player, selected, cursor);
    }
    draw_status(frame, sections[sections.len() - 1], state);
}

fn draw_player(
    frame: &mut Frame,
    area: Rect,
    player: &PlayerView,
    selected: bool,
    cursor: Option<usize>,
) {
    let title = format!(
        " {} [{}] {}x{} {} BPM {} ",
        player.name,
        player.sound,
        player.beats_per_bar,
        player.steps_per_beat,
        player.bpm,
        player.transport.label()
    );
    let border = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    draw_step_row(frame, inner, &player.leds, player.steps_per_beat, cursor);
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let lines = vec![
        Line::from(Span::styled(
            state.display_text.clone(),
            Style::default().fg(Color::LightMagenta),
        )),
        Line::from(Span::styled(HELP, Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}
