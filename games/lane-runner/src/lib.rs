use wasm_bindgen::prelude::*;
use runner_engine::*;

pub mod config;
pub mod game;
pub mod manager;
pub mod player;
pub mod track;

use game::RunnerGame;

runner_web::export_game!(RunnerGame, "lane-runner");

/// Replace the movement/track config from JSON. Invalid configs are logged
/// and ignored; a valid one applies once the current run is over.
#[wasm_bindgen]
pub fn game_configure(json: &str) -> bool {
    with_runner(|r| match r.game_mut().configure(json) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("lane-runner: rejected config: {}", e);
            false
        }
    })
    .unwrap_or(false)
}
