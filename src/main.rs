//! Summit Dash entry point
//!
//! Headless driver: loads settings and a map, then runs a scripted
//! fixed-step session through the key bindings and logs what happens.
//!
//! Usage: `summit-dash [map.json]`

use summit_dash::consts::TICK_DT;
use summit_dash::sim::{GameEvent, GameState, tick};
use summit_dash::view::FrameView;
use summit_dash::{Settings, map};

/// Held keys for a number of ticks
struct Segment {
    ticks: u64,
    keys: &'static [&'static str],
}

/// Demo route, expressed in default-binding key names
const SCRIPT: &[Segment] = &[
    Segment { ticks: 20, keys: &[] },
    Segment { ticks: 30, keys: &["D"] },
    Segment { ticks: 1, keys: &["D", "K"] },
    Segment { ticks: 25, keys: &["D"] },
    Segment { ticks: 1, keys: &["D", "W", "J"] },
    Segment { ticks: 40, keys: &["D"] },
    Segment { ticks: 30, keys: &["L", "W"] },
    Segment { ticks: 1, keys: &["L", "A", "K"] },
    Segment { ticks: 30, keys: &["A", "S"] },
    Segment { ticks: 60, keys: &["A"] },
];

fn main() {
    env_logger::init();
    log::info!("Summit Dash (headless) starting...");

    let settings = Settings::load_from(Settings::FILE_NAME);
    for line in settings.bindings.describe() {
        log::debug!("{}", line);
    }

    let map_path = std::env::args().nth(1).unwrap_or_else(|| settings.map_path.clone());
    let world = map::load_map_or_empty(&map_path);
    let mut state = GameState::new(world);

    let mut deaths = 0u32;
    let mut checkpoints = 0u32;
    let mut pickups = 0u32;

    let script_ticks: u64 = SCRIPT.iter().map(|s| s.ticks).sum();
    let mut segments = SCRIPT.iter().cycle().flat_map(|s| (0..s.ticks).map(move |_| s.keys));
    let total = settings.session_ticks.max(script_ticks);

    for _ in 0..total {
        let keys = segments.next().unwrap_or(&[]);
        let input = settings.bindings.intents(keys.iter().copied());
        tick(&mut state, &input, TICK_DT);

        for event in &state.events {
            match event {
                GameEvent::Died => deaths += 1,
                GameEvent::CheckpointActivated { .. } => checkpoints += 1,
                GameEvent::PickupConsumed { .. } => pickups += 1,
                _ => {}
            }
            log::debug!("tick {}: {:?}", state.time_ticks, event);
        }
    }

    let frame = FrameView::capture(&state);
    log::info!(
        "Session over after {} ticks ({:.1}s): avatar at ({:.1}, {:.1}), style {:?}",
        state.time_ticks,
        state.elapsed_seconds(),
        frame.avatar.rect.x,
        frame.avatar.rect.y,
        frame.avatar.style
    );
    log::info!(
        "Deaths: {}, checkpoints activated: {}, pickups consumed: {}",
        deaths,
        checkpoints,
        pickups
    );
}
