//! UV frame sample -- headless driver for atlas frame sequencers.
//!
//! The scene descriptor lists a handful of flip-book effects (dirt puffs,
//! fire, explosions). Each becomes a node with a billboard and a
//! `FrameSequencer`; only one node is shown at a time.
//!
//! There is no window here. The loop runs on a simulated clock:
//!
//!   1. `begin_frame_with(fixed_dt)` -- feed the fixed-step accumulator
//!   2. `while should_step()` -- tap this step's scripted keys, let the gallery
//!      react (Q/E cycle, R restart, Space pause, Escape quit), run the update
//!      pass
//!   3. every `REPORT_INTERVAL_STEPS`, log what the selected sequence committed
//!
//! The run ends when the replay script runs out or Escape is pressed.

mod gallery;
mod replay;
mod scene;
mod selector;

use std::path::Path;
use std::process::ExitCode;

use gallery::Gallery;
use replay::load_replay_from_path;
use scene::{build_gallery, load_scene_from_path};
use uvf_core::input::{InputState, Key};
use uvf_core::time::TimeState;

const SCENE_PATH: &str = "assets/uvframe/scenes/gallery.json";
const REPLAY_PATH: &str = "assets/uvframe/replays/cycle.json";
const REPORT_INTERVAL_STEPS: u64 = 60;

fn run() -> Result<(), String> {
    let scene = load_scene_from_path(Path::new(SCENE_PATH))?;
    let mut gallery = build_gallery(&scene)?;
    let replay = load_replay_from_path(Path::new(REPLAY_PATH))?;
    let steps = replay.expanded_presses();

    log::info!(
        "Running {} steps of {}s ({} sequences)",
        steps.len(),
        replay.fixed_dt,
        gallery.entries().len()
    );

    let outcome = run_steps(&mut gallery, &steps, replay.fixed_dt);

    log::info!(
        "Finished after {} steps ({:.2}s simulated){}",
        outcome.steps_run,
        outcome.total_time,
        if outcome.quit { ", quit early" } else { "" }
    );
    gallery.log_summary();
    Ok(())
}

/// How a scripted run ended.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RunOutcome {
    /// Steps that reached the update pass.
    steps_run: u64,
    total_time: f64,
    quit: bool,
}

/// Drive `gallery` through `steps`, one entry of key taps per fixed step.
/// Stops when the script runs out or Escape is tapped; the Escape step
/// itself is not updated.
fn run_steps(gallery: &mut Gallery, steps: &[Vec<Key>], fixed_dt: f32) -> RunOutcome {
    let mut time = TimeState::with_fixed_dt(f64::from(fixed_dt));
    let mut input = InputState::new();
    let dt_us = time.fixed_dt_us();

    let mut step_index = 0usize;
    let mut steps_run = 0u64;
    let mut quit = false;
    while step_index < steps.len() && !quit {
        time.begin_frame_with(time.fixed_dt);
        while time.should_step() {
            let Some(presses) = steps.get(step_index) else {
                break;
            };
            step_index += 1;

            for &key in presses {
                input.key_down(key);
            }
            if input.is_just_pressed(Key::Escape) {
                log::info!("Escape pressed, stopping");
                quit = true;
                break;
            }

            gallery.handle_input(&input, dt_us);
            gallery.update(fixed_dt);
            steps_run += 1;

            for &key in presses {
                input.key_up(key);
            }
            input.end_frame();

            if time.fixed_step_count % REPORT_INTERVAL_STEPS == 0 {
                report_selected(gallery, time.total_time);
            }
        }
    }

    RunOutcome {
        steps_run,
        total_time: time.total_time,
        quit,
    }
}

fn report_selected(gallery: &Gallery, total_time: f64) {
    let Some(entry) = gallery.selected() else {
        return;
    };
    match gallery.committed_row_col(entry) {
        Some(row_col) => log::info!(
            "[{total_time:6.2}s] '{}' frame {} -> row {} col {}",
            entry.node.name,
            entry.sequencer.current_frame(),
            row_col.x,
            row_col.y
        ),
        None => log::info!(
            "[{total_time:6.2}s] '{}' has not committed a frame yet",
            entry.node.name
        ),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("UV frame sample starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
