use crate::error::Result;
use crate::snake::Position;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Confirm,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
}

/// Drawing and input surface the game talks to. Coordinates are canvas pixels.
pub trait Renderer {
    fn clear_screen(&mut self) -> Result<()>;
    fn draw_rect(&mut self, top_left: Position, size: (i32, i32), color: Color) -> Result<()>;
    fn draw_text(&mut self, pos: Position, text: &str, color: Color) -> Result<()>;
    fn present(&mut self) -> Result<()>;
    fn poll_events(&mut self) -> Result<Vec<InputEvent>>;
}
