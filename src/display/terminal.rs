//! Crossterm-backed terminal surface
//!
//! Owns raw mode and the alternate screen for its lifetime. Frames are
//! wrapped in synchronized updates so clearing does not flicker.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};

use super::{Key, Surface};

pub struct TerminalSurface {
    out: Stdout,
}

impl TerminalSurface {
    /// Switch the terminal into raw mode on the alternate screen
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        if let Err(e) = execute!(out, EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self { out })
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        if let Err(e) = execute!(self.out, cursor::Show, LeaveAlternateScreen) {
            log::error!("failed to leave alternate screen: {}", e);
        }
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("failed to disable raw mode: {}", e);
        }
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> io::Result<(u16, u16)> {
        let (cols, rows) = terminal::size()?;
        Ok((rows, cols))
    }

    fn clear(&mut self) -> io::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate, Clear(ClearType::All))
    }

    fn draw_str(&mut self, row: u16, col: u16, text: &str) -> io::Result<()> {
        queue!(self.out, cursor::MoveTo(col, row), Print(text))
    }

    fn draw_char(&mut self, row: u16, col: u16, ch: char) -> io::Result<()> {
        queue!(self.out, cursor::MoveTo(col, row), Print(ch))
    }

    fn refresh(&mut self) -> io::Result<()> {
        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()
    }

    fn poll_key(&mut self) -> io::Result<Option<Key>> {
        if !event::poll(Duration::ZERO)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(KeyEvent {
                code: KeyCode::Char(c),
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => {
                if modifiers.contains(KeyModifiers::CONTROL) && c.eq_ignore_ascii_case(&'c') {
                    Ok(Some(Key::Interrupt))
                } else {
                    Ok(Some(Key::Char(c)))
                }
            }
            _ => Ok(None),
        }
    }
}
