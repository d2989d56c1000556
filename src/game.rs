use log::{error, info};
use rand::{rngs::ThreadRng, seq::SliceRandom, Rng};

use crate::error::Result;
use crate::highscore::HighScoreStore;
use crate::render::{Color, InputEvent, Key, Renderer};
use crate::snake::{is_valid_turn, Direction, Position, Snake};

pub const CELL_SIZE: i32 = 20;
pub const FIELD_SIZE: i32 = 600;
pub const GRID_CELLS: i32 = FIELD_SIZE / CELL_SIZE;
pub const INITIAL_SPEED: u32 = 5;
pub const SPEED_STEP: u32 = 10;
pub const TARGET_FPS: u32 = 60;

// Random draws before falling back to scanning for a free cell.
const APPLE_SPAWN_ATTEMPTS: usize = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Playing,
    GameOver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

enum Collision {
    Nothing,
    Body,
    Wall,
    Apple,
}

pub struct GameSession<R: Rng = ThreadRng> {
    state: GameState,
    snake: Snake,
    apple: Position,
    velocity: Option<Direction>,
    // Ticks per second.
    speed: u32,
    score: u32,
    last_speed_up: u32,
    // Seconds accumulated towards the next tick.
    elapsed: f64,
    // Cleared after a turn, reopened each tick.
    can_turn: bool,
    won: bool,
    high_score: Option<u32>,
    high_score_updated: bool,
    store: HighScoreStore,
    rng: R,
}

impl<R: Rng> GameSession<R> {
    pub fn new(store: HighScoreStore, high_score: Option<u32>, rng: R) -> Self {
        let mut session = GameSession {
            state: GameState::Playing,
            snake: Snake::new(field_center()),
            apple: Position::new(0, 0),
            velocity: None,
            speed: INITIAL_SPEED,
            score: 0,
            last_speed_up: 0,
            elapsed: 0.0,
            can_turn: true,
            won: false,
            high_score,
            high_score_updated: false,
            store,
            rng,
        };
        session.new_game();
        session
    }

    pub fn new_game(&mut self) {
        self.state = GameState::Playing;
        self.snake = Snake::new(field_center());
        self.velocity = None;
        self.speed = INITIAL_SPEED;
        self.score = 0;
        self.last_speed_up = 0;
        self.can_turn = true;
        self.won = false;
        self.high_score_updated = false;
        self.place_apple();

        info!("New game started");
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Control {
        let key = match event {
            InputEvent::Quit => {
                info!("Quit requested with score {}", self.score);
                return Control::Quit;
            }
            InputEvent::KeyDown(key) => key,
        };

        match (self.state, key) {
            (GameState::Playing, Key::Up) => self.turn(Direction::Up),
            (GameState::Playing, Key::Down) => self.turn(Direction::Down),
            (GameState::Playing, Key::Left) => self.turn(Direction::Left),
            (GameState::Playing, Key::Right) => self.turn(Direction::Right),
            (GameState::GameOver, Key::Confirm) => self.new_game(),
            _ => {}
        }

        Control::Continue
    }

    /// Advances the clock by `elapsed` seconds. At most one step runs per call,
    /// and the leftover time is discarded when it does.
    pub fn tick(&mut self, elapsed: f64) {
        self.elapsed += elapsed;
        if self.elapsed < 1.0 / self.speed as f64 {
            return;
        }

        self.elapsed = 0.0;
        self.can_turn = true;

        match self.state {
            GameState::Playing => self.step(),
            GameState::GameOver => self.update_high_score(),
        }
    }

    pub fn render<T: Renderer>(&self, out: &mut T) -> Result<()> {
        out.clear_screen()?;

        match self.state {
            GameState::Playing => {
                let cell = (CELL_SIZE, CELL_SIZE);
                for pos in self.snake.body() {
                    out.draw_rect(*pos, cell, Color::GREEN)?;
                }
                out.draw_rect(self.apple, cell, Color::RED)?;
                out.draw_text(Position::new(20, 10), &self.score.to_string(), Color::WHITE)?;
            }
            GameState::GameOver => {
                if self.won {
                    out.draw_text(Position::new(100, 100), "You won!", Color::WHITE)?;
                }

                match self.high_score {
                    Some(best) if best >= self.score && !self.high_score_updated => {
                        let final_score = format!("Final Score: {}", self.score);
                        out.draw_text(Position::new(100, 200), &final_score, Color::WHITE)?;
                        let best = format!("Highscore: {}", best);
                        out.draw_text(Position::new(110, 300), &best, Color::WHITE)?;
                    }
                    _ => {
                        let new_best = format!("New Highscore: {}", self.score);
                        out.draw_text(Position::new(90, 200), &new_best, Color::WHITE)?;
                    }
                }

                out.draw_text(Position::new(90, 400), "Press Space to play again", Color::WHITE)?;
            }
        }

        out.present()
    }

    pub fn close(self) -> Result<()> {
        self.store.close()
    }

    ////////////////////////////////////////////////////////////////////////

    fn turn(&mut self, direction: Direction) {
        if self.can_turn && is_valid_turn(self.velocity, direction) {
            self.velocity = Some(direction);
            self.can_turn = false;
        }
    }

    fn step(&mut self) {
        if let Some(direction) = self.velocity {
            self.snake.move_step(direction, CELL_SIZE);
        }

        match self.collision() {
            Collision::Body => self.game_over("ran into itself"),
            Collision::Wall => self.game_over("hit the wall"),
            Collision::Apple => self.eat_apple(),
            Collision::Nothing => {}
        }
    }

    fn collision(&self) -> Collision {
        let head = self.snake.head();

        if self.snake.hit_itself() {
            Collision::Body
        } else if head.x < 0 || head.y < 0 || head.x >= FIELD_SIZE || head.y >= FIELD_SIZE {
            Collision::Wall
        } else if head == self.apple {
            Collision::Apple
        } else {
            Collision::Nothing
        }
    }

    fn eat_apple(&mut self) {
        self.snake.grow();
        self.place_apple();
        self.add_score();
    }

    fn add_score(&mut self) {
        self.score += 1;
        if self.score == self.last_speed_up + SPEED_STEP {
            self.last_speed_up = self.score;
            self.speed += 1;
            info!("Speed raised to {} at score {}", self.speed, self.score);
        }
    }

    fn place_apple(&mut self) {
        match self.spawn_apple() {
            Some(apple) => self.apple = apple,
            None => {
                self.won = true;
                self.game_over("filled the board");
            }
        }
    }

    /// A uniformly random cell not covered by the snake, or `None` if there is none.
    fn spawn_apple(&mut self) -> Option<Position> {
        for _ in 0..APPLE_SPAWN_ATTEMPTS {
            let pos = Position::new(
                self.rng.gen_range(0..GRID_CELLS) * CELL_SIZE,
                self.rng.gen_range(0..GRID_CELLS) * CELL_SIZE,
            );
            if !self.snake.contains(pos) {
                return Some(pos);
            }
        }

        let snake = &self.snake;
        let free: Vec<Position> = all_cells().filter(|pos| !snake.contains(*pos)).collect();
        free.choose(&mut self.rng).copied()
    }

    fn game_over(&mut self, reason: &str) {
        info!("Game over: snake {} with score {}", reason, self.score);
        self.state = GameState::GameOver;
        self.high_score_updated = false;
    }

    fn update_high_score(&mut self) {
        if self.high_score_updated {
            return;
        }

        if self.high_score.map_or(true, |best| self.score > best) {
            match self.store.save(self.score) {
                Ok(()) => info!("New high score {}", self.score),
                Err(e) => error!("Could not save high score {}: {}", self.score, e),
            }
            self.high_score = Some(self.score);
            self.high_score_updated = true;
        }
    }
}

fn field_center() -> Position {
    Position::new(GRID_CELLS / 2 * CELL_SIZE, GRID_CELLS / 2 * CELL_SIZE)
}

fn all_cells() -> impl Iterator<Item = Position> {
    (0..GRID_CELLS).flat_map(|y| {
        (0..GRID_CELLS).map(move |x| Position::new(x * CELL_SIZE, y * CELL_SIZE))
    })
}
