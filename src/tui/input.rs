use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::shared::InputEvent;

// poll for one key press and resolve it into input events for the middle layer
pub fn poll_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code).into_iter().collect());
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode) -> Option<InputEvent> {
    let event = match code {
        KeyCode::Esc => InputEvent::Quit,
        KeyCode::Char(' ') => InputEvent::PlayPause,
        KeyCode::Backspace => InputEvent::Stop,
        KeyCode::Tab => InputEvent::NextPlayer,
        KeyCode::Char('-') => InputEvent::TempoDown,
        KeyCode::Char('=') | KeyCode::Char('+') => InputEvent::TempoUp,
        KeyCode::Left => InputEvent::CursorLeft,
        KeyCode::Right => InputEvent::CursorRight,
        KeyCode::Enter => InputEvent::ToggleAtCursor,
        KeyCode::Char(c) => InputEvent::ToggleStep(char_to_pad(c)?),
        _ => return None,
    };
    Some(event)
}

// the 4x4 pad block on the left of the keyboard, row by row
fn char_to_pad(c: char) -> Option<u8> {
    let idx = match c {
        '1' => 0, '2' => 1, '3' => 2, '4' => 3,
        'q' => 4, 'w' => 5, 'e' => 6, 'r' => 7,
        'a' => 8, 's' => 9, 'd' => 10, 'f' => 11,
        'z' => 12, 'x' => 13, 'c' => 14, 'v' => 15,
        _ => return None,
    };
    Some(idx)
}
