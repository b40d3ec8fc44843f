//! In-memory surface
//!
//! Keeps a character grid and the last refreshed frame, and replays keys
//! queued with [`MemorySurface::push_keys`]. Used for headless runs and tests.

use std::collections::VecDeque;
use std::io;

use super::{Key, Surface};

#[derive(Debug, Clone)]
pub struct MemorySurface {
    rows: u16,
    cols: u16,
    cells: Vec<char>,
    frame: Vec<String>,
    keys: VecDeque<Key>,
    refreshes: u64,
}

impl MemorySurface {
    pub fn new(rows: u16, cols: u16) -> Self {
        let cells = vec![' '; rows as usize * cols as usize];
        Self {
            rows,
            cols,
            frame: Self::render(&cells, cols),
            cells,
            keys: VecDeque::new(),
            refreshes: 0,
        }
    }

    pub fn push_key(&mut self, key: Key) {
        self.keys.push_back(key);
    }

    /// Queue one key per character
    pub fn push_keys(&mut self, keys: &str) {
        self.keys.extend(keys.chars().map(Key::Char));
    }

    /// Rows of the last refreshed frame
    pub fn screen(&self) -> &[String] {
        &self.frame
    }

    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    fn render(cells: &[char], cols: u16) -> Vec<String> {
        if cols == 0 {
            return Vec::new();
        }
        cells
            .chunks(cols as usize)
            .map(|row| row.iter().collect())
            .collect()
    }

    fn put(&mut self, row: u16, col: u16, ch: char) {
        if row < self.rows && col < self.cols {
            self.cells[row as usize * self.cols as usize + col as usize] = ch;
        }
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok((self.rows, self.cols))
    }

    fn clear(&mut self) -> io::Result<()> {
        self.cells.fill(' ');
        Ok(())
    }

    fn draw_str(&mut self, row: u16, col: u16, text: &str) -> io::Result<()> {
        for (i, ch) in text.chars().enumerate() {
            self.put(row, col.saturating_add(i as u16), ch);
        }
        Ok(())
    }

    fn draw_char(&mut self, row: u16, col: u16, ch: char) -> io::Result<()> {
        self.put(row, col, ch);
        Ok(())
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.frame = Self::render(&self.cells, self.cols);
        self.refreshes += 1;
        Ok(())
    }

    fn poll_key(&mut self) -> io::Result<Option<Key>> {
        Ok(self.keys.pop_front())
    }
}
