mod clock;
mod error;
mod game;
mod highscore;
mod render;
mod snake;
mod term;

use std::{fs::File, process::exit};

use log::{error, info};
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::clock::FrameClock;
use crate::error::Result;
use crate::game::{Control, GameSession, TARGET_FPS};
use crate::highscore::HighScoreStore;
use crate::render::Renderer;
use crate::term::TermManager;

const HIGHSCORE_FILE: &str = "highscore";
const LOG_FILE: &str = "gridsnake.log";

fn main() {
    if let Err(e) = run() {
        error!("Fatal: {}", e);
        eprintln!("gridsnake: {}", e);
        exit(1);
    }
}

fn run() -> Result<()> {
    // The terminal belongs to the game, so logs go to a file
    WriteLogger::init(LevelFilter::Info, Config::default(), File::create(LOG_FILE)?)?;
    info!("Starting gridsnake");

    let (store, high_score) = HighScoreStore::load_or_create(HIGHSCORE_FILE)?;
    let mut session = GameSession::new(store, high_score, rand::thread_rng());

    let mut term = TermManager::new()?;
    term.setup()?;
    let played = play(&mut session, &mut term);
    // Give the terminal back even if the loop failed
    let restored = term.restore();

    session.close()?;
    played?;
    restored?;

    info!("Exiting");
    Ok(())
}

/// One iteration per frame: input, simulation, drawing, then pacing.
fn play<R: rand::Rng>(session: &mut GameSession<R>, term: &mut TermManager) -> Result<()> {
    let mut clock = FrameClock::new();
    let mut elapsed = 0.0;

    loop {
        for event in term.poll_events()? {
            if session.handle_input(event) == Control::Quit {
                return Ok(());
            }
        }

        session.tick(elapsed);
        session.render(term)?;
        elapsed = clock.tick(TARGET_FPS);
    }
}
