use std::{io::{Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, poll, read};
use log::warn;

use crate::error::Result;
use crate::game::{CELL_SIZE, GRID_CELLS};
use crate::render::{Color, InputEvent, Key, Renderer};
use crate::snake::Position;

// Each grid cell is two columns wide so it looks roughly square.
const COLS_PER_CELL: i32 = 2;
const CANVAS_COLS: usize = (GRID_CELLS * COLS_PER_CELL) as usize;
const CANVAS_ROWS: usize = GRID_CELLS as usize;

// Canvas pixels covered by one terminal column / row.
const PIXELS_PER_COL: i32 = CELL_SIZE / COLS_PER_CELL;
const PIXELS_PER_ROW: i32 = CELL_SIZE;

const BLOCK_CHAR: char = '█';

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    color: Color,
}

const BLANK: Cell = Cell { ch: ' ', color: Color::WHITE };

/// Character grid the frame is composed into before being shown.
struct Canvas {
    cells: Vec<Cell>,
}

impl Canvas {
    fn new() -> Self {
        Canvas { cells: vec![BLANK; CANVAS_COLS * CANVAS_ROWS] }
    }

    fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = BLANK);
    }

    fn put(&mut self, col: i32, row: i32, cell: Cell) {
        if col < 0 || row < 0 || col as usize >= CANVAS_COLS || row as usize >= CANVAS_ROWS {
            return;
        }
        self.cells[row as usize * CANVAS_COLS + col as usize] = cell;
    }

    fn fill_rect(&mut self, top_left: Position, size: (i32, i32), color: Color) {
        let (col0, row0) = (top_left.x / PIXELS_PER_COL, top_left.y / PIXELS_PER_ROW);
        let col1 = (top_left.x + size.0) / PIXELS_PER_COL;
        let row1 = (top_left.y + size.1) / PIXELS_PER_ROW;

        for row in row0..row1 {
            for col in col0..col1 {
                self.put(col, row, Cell { ch: BLOCK_CHAR, color });
            }
        }
    }

    fn text(&mut self, pos: Position, text: &str, color: Color) {
        let (col, row) = (pos.x / PIXELS_PER_COL, pos.y / PIXELS_PER_ROW);
        for (i, ch) in text.chars().enumerate() {
            self.put(col + i as i32, row, Cell { ch, color });
        }
    }

    fn get(&self, col: usize, row: usize) -> Cell {
        self.cells[row * CANVAS_COLS + col]
    }
}

pub struct TermManager {
    stdout: Stdout,
    screen: Canvas,
    shown: Canvas,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size()?;
        let (need_w, need_h) = (CANVAS_COLS as u16 + 2, CANVAS_ROWS as u16 + 2);
        if width < need_w || height < need_h {
            warn!("Terminal is {}x{}, the board needs {}x{}", width, height, need_w, need_h);
        }

        Ok(TermManager { stdout: stdout(), screen: Canvas::new(), shown: Canvas::new() })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.shown.clear();
        self.draw_borders()
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking)?;
        execute!(self.stdout, LeaveAlternateScreen)?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_borders(&mut self) -> Result<()> {
        let end_x = CANVAS_COLS as u16 + 1;
        let end_y = CANVAS_ROWS as u16 + 1;

        for x in 0..=end_x {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            queue!(self.stdout, cursor::MoveTo(x, 0), style::Print(ch))?;
            queue!(self.stdout, cursor::MoveTo(x, end_y), style::Print(ch))?;
        }

        for y in 1..end_y {
            queue!(self.stdout, cursor::MoveTo(0, y), style::Print('|'))?;
            queue!(self.stdout, cursor::MoveTo(end_x, y), style::Print('|'))?;
        }

        self.stdout.flush()?;
        Ok(())
    }
}

impl Renderer for TermManager {
    fn clear_screen(&mut self) -> Result<()> {
        self.screen.clear();
        Ok(())
    }

    fn draw_rect(&mut self, top_left: Position, size: (i32, i32), color: Color) -> Result<()> {
        self.screen.fill_rect(top_left, size, color);
        Ok(())
    }

    fn draw_text(&mut self, pos: Position, text: &str, color: Color) -> Result<()> {
        self.screen.text(pos, text, color);
        Ok(())
    }

    /// Writes only the cells that changed since the last present.
    fn present(&mut self) -> Result<()> {
        for row in 0..CANVAS_ROWS {
            for col in 0..CANVAS_COLS {
                let cell = self.screen.get(col, row);
                if cell == self.shown.get(col, row) {
                    continue;
                }

                let Color { r, g, b } = cell.color;
                queue!(
                    self.stdout,
                    cursor::MoveTo(col as u16 + 1, row as u16 + 1),
                    style::SetForegroundColor(style::Color::Rgb { r, g, b }),
                    style::Print(cell.ch)
                )?;
            }
        }

        queue!(self.stdout, style::ResetColor)?;
        self.stdout.flush()?;
        self.shown.cells.copy_from_slice(&self.screen.cells);
        Ok(())
    }

    fn poll_events(&mut self) -> Result<Vec<InputEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(0))? {
            if let Event::Key(ev) = read()? {
                events.extend(map_key(ev));
            }
        }

        Ok(events)
    }
}

fn map_key(ev: KeyEvent) -> Option<InputEvent> {
    use InputEvent::*;

    match ev {
        KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL } => Some(Quit),
        KeyEvent { code, modifiers: _ } => match code {
            KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(KeyDown(Key::Up)),
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(KeyDown(Key::Left)),
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(KeyDown(Key::Down)),
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(KeyDown(Key::Right)),
            KeyCode::Char(' ') => Some(KeyDown(Key::Confirm)),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Quit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent { code, modifiers: KeyModifiers::NONE }
    }

    #[test]
    fn maps_movement_and_control_keys() {
        assert_eq!(map_key(key(KeyCode::Char('w'))), Some(InputEvent::KeyDown(Key::Up)));
        assert_eq!(map_key(key(KeyCode::Left)), Some(InputEvent::KeyDown(Key::Left)));
        assert_eq!(map_key(key(KeyCode::Char('S'))), Some(InputEvent::KeyDown(Key::Down)));
        assert_eq!(map_key(key(KeyCode::Right)), Some(InputEvent::KeyDown(Key::Right)));
        assert_eq!(map_key(key(KeyCode::Char(' '))), Some(InputEvent::KeyDown(Key::Confirm)));
        assert_eq!(map_key(key(KeyCode::Esc)), Some(InputEvent::Quit));
        assert_eq!(map_key(key(KeyCode::Char('x'))), None);

        let ctrl_c = KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL };
        assert_eq!(map_key(ctrl_c), Some(InputEvent::Quit));
    }

    #[test]
    fn a_cell_covers_two_columns() {
        let mut canvas = Canvas::new();
        canvas.fill_rect(Position::new(40, 60), (20, 20), Color::GREEN);

        let green = Cell { ch: BLOCK_CHAR, color: Color::GREEN };
        assert_eq!(canvas.get(4, 3), green);
        assert_eq!(canvas.get(5, 3), green);
        assert_eq!(canvas.get(3, 3), BLANK);
        assert_eq!(canvas.get(6, 3), BLANK);
        assert_eq!(canvas.get(4, 4), BLANK);
    }

    #[test]
    fn text_is_clipped_at_the_edge() {
        let mut canvas = Canvas::new();
        canvas.text(Position::new(580, 580), "abc", Color::WHITE);

        assert_eq!(canvas.get(58, 29).ch, 'a');
        assert_eq!(canvas.get(59, 29).ch, 'b');

        canvas.clear();
        assert_eq!(canvas.get(58, 29), BLANK);
    }
}
