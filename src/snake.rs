use Direction::*;

/// A grid-aligned point on the play-field, in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Direction {
    pub fn axis(self) -> Axis {
        match self {
            Up | Down => Axis::Vertical,
            Left | Right => Axis::Horizontal,
        }
    }

    /// Unit velocity, with y growing downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }
}

/// A stationary snake may turn anywhere; a moving one only onto the other axis.
pub fn is_valid_turn(current: Option<Direction>, requested: Direction) -> bool {
    match current {
        None => true,
        Some(dir) => dir.axis() != requested.axis(),
    }
}

/// Snake body, head first.
#[derive(Clone, Debug)]
pub struct Snake {
    body: Vec<Position>,
}

impl Snake {
    pub fn new(head: Position) -> Self {
        Snake { body: vec![head] }
    }

    pub fn body(&self) -> &[Position] {
        &self.body
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Moves every segment onto the one in front of it, walking from the tail
    /// so nothing is read after being overwritten, then pushes the head `step`
    /// pixels towards `direction`.
    pub fn move_step(&mut self, direction: Direction, step: i32) {
        for i in (1..self.body.len()).rev() {
            self.body[i] = self.body[i - 1];
        }

        let (dx, dy) = direction.delta();
        let head = &mut self.body[0];
        head.x += dx * step;
        head.y += dy * step;
    }

    /// Appends a segment on top of the current tail. It trails out on the next move.
    pub fn grow(&mut self) {
        let tail = self.tail();
        self.body.push(tail);
    }

    pub fn hit_itself(&self) -> bool {
        let head = self.head();
        self.body[1..].contains(&head)
    }

    #[cfg(test)]
    pub fn from_body(body: Vec<Position>) -> Self {
        assert!(!body.is_empty());
        Snake { body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turns_only_onto_the_other_axis() {
        assert!(is_valid_turn(None, Left));
        assert!(is_valid_turn(Some(Right), Up));
        assert!(is_valid_turn(Some(Right), Down));
        assert!(!is_valid_turn(Some(Right), Left));
        assert!(!is_valid_turn(Some(Right), Right));
        assert!(!is_valid_turn(Some(Up), Down));
        assert!(is_valid_turn(Some(Up), Left));
    }

    #[test]
    fn segments_follow_the_head() {
        let mut snake = Snake::from_body(vec![
            Position::new(60, 0),
            Position::new(40, 0),
            Position::new(20, 0),
        ]);

        snake.move_step(Down, 20);

        assert_eq!(snake.body(), &[
            Position::new(60, 20),
            Position::new(60, 0),
            Position::new(40, 0),
        ]);
    }

    #[test]
    fn growth_trails_after_the_next_move() {
        let mut snake = Snake::new(Position::new(100, 100));
        snake.grow();
        assert_eq!(snake.body().len(), 2);
        assert_eq!(snake.body()[0], snake.body()[1]);
        // Only the head counts, so the stacked tail is not a collision yet.
        snake.move_step(Right, 20);
        assert!(!snake.hit_itself());
        assert_eq!(snake.body(), &[Position::new(120, 100), Position::new(100, 100)]);
    }

    #[test]
    fn detects_running_into_the_body() {
        // A ring of five: moving the head up lands on the old fourth segment.
        let mut snake = Snake::from_body(vec![
            Position::new(20, 20),
            Position::new(40, 20),
            Position::new(40, 0),
            Position::new(20, 0),
            Position::new(0, 0),
        ]);
        snake.move_step(Up, 20);
        assert_eq!(snake.head(), Position::new(20, 0));
        assert!(snake.hit_itself());
    }
}
