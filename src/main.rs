//! Headless demo runner
//!
//! Runs a scripted race session at a fixed timestep and prints the final
//! stats as JSON. Useful for eyeballing tuning changes and for reproducing
//! a run from its seed:
//!
//! ```text
//! RUST_LOG=debug gravshift [seed] [config.json]
//! ```

use gravshift::config::SessionConfig;
use gravshift::consts::SIM_DT;
use gravshift::sim::{GameEvent, Session, TickInput, tick};

/// Safety cap so an endless config still terminates the demo
const MAX_FRAMES: u32 = 60 * 300;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xC0FFEE);
    let config = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => SessionConfig::from_json(&json),
            Err(err) => {
                log::warn!("Cannot read {path} ({err}), using default config");
                SessionConfig::default()
            }
        },
        None => SessionConfig::default(),
    };

    let mut session = Session::new(config, seed);
    let mut frame = 0u32;

    while !session.is_over() && frame < MAX_FRAMES {
        let t = frame as f32 * SIM_DT;
        // Scripted driver: weave across the track, boost on a full tank
        let input = TickInput {
            steer: (t * 0.7).sin(),
            boost: session.vehicle.nitro > session.config.tuning.nitro_max * 0.9,
            ..Default::default()
        };
        tick(&mut session, &input, SIM_DT);

        for event in session.drain_events() {
            match event {
                GameEvent::Drift { .. } => {}
                other => log::debug!("frame {frame}: {other:?}"),
            }
        }
        if frame.is_multiple_of(60) {
            log::info!(
                "t={t:.0}s distance={:.0} speed={:.0} score={} combo={}",
                session.vehicle.distance,
                session.vehicle.speed,
                session.score.score,
                session.score.combo,
            );
        }
        frame += 1;
    }

    match serde_json::to_string_pretty(&session.stats()) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Failed to encode stats: {err}"),
    }
}
