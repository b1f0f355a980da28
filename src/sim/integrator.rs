//! Kinematic integrator
//!
//! Advances the vehicle one step from input and track-imposed forces. Pure
//! function of (state, input, dt): no RNG, no track mutation, no allocation
//! beyond the event queue. All blends are frame-rate normalized so variable
//! dt produces the same trajectory as an equivalent fixed-step run.

use crate::config::VehicleTuning;
use crate::consts::*;
use crate::{exp_decay, lerp, move_toward};

use super::state::{GameEvent, Vehicle};
use super::tick::TickInput;

/// Advance the vehicle by one (already sub-stepped) timestep.
///
/// `target_rotation` is the gravity-shift angle of the current segment;
/// the heading blends toward it rather than snapping. `dt <= 0` is a no-op.
pub fn integrate(
    vehicle: &mut Vehicle,
    tuning: &VehicleTuning,
    input: &TickInput,
    target_rotation: f32,
    dt: f32,
    events: &mut Vec<GameEvent>,
) {
    if dt <= 0.0 {
        return;
    }

    // Forward speed: accelerate toward the target, brake decays harder,
    // always clamped to the boosted maximum.
    let boosting = input.boost && vehicle.nitro > 0.0;
    let target_speed = if input.brake {
        0.0
    } else if boosting {
        tuning.speed_cap()
    } else {
        tuning.max_speed
    };
    let rate = if target_speed < vehicle.speed {
        tuning.brake_force
    } else {
        tuning.acceleration
    };
    vehicle.speed = move_toward(vehicle.speed, target_speed, rate * dt).clamp(0.0, tuning.speed_cap());

    // Nitro drains while boosting, trickles back otherwise
    if boosting {
        vehicle.nitro = (vehicle.nitro - NITRO_DRAIN * dt).max(0.0);
    } else {
        vehicle.nitro = (vehicle.nitro + NITRO_REGEN * dt).min(tuning.nitro_max);
    }

    // Lateral: steering implies a target velocity; the gravity-shift angle
    // adds a sideways pull the player has to steer against.
    let steer = input.steer.clamp(-1.0, 1.0);
    let target_lateral = steer * tuning.steer_speed;
    vehicle.lateral_vel += vehicle.rotation.sin() * GRAVITY_LATERAL_PULL * dt;

    // Slip against the steer target decides grip: past the threshold the
    // vehicle is drifting and converges slowly (more slide).
    let slip = vehicle.lateral_vel - target_lateral;
    vehicle.drift_magnitude = slip.abs();
    vehicle.drifting = vehicle.drift_magnitude > DRIFT_SLIP_THRESHOLD;
    let grip = if vehicle.drifting {
        tuning.drift_grip
    } else {
        tuning.grip
    };
    vehicle.lateral_vel = exp_decay(vehicle.lateral_vel, target_lateral, grip, dt);

    if vehicle.drifting {
        events.push(GameEvent::Drift { dt });
    }

    // Heading eases toward the segment rotation (the visible gravity shift)
    vehicle.rotation = lerp(vehicle.rotation, target_rotation, (ROTATION_BLEND * dt).min(1.0));

    // Position
    vehicle.x = (vehicle.x + vehicle.lateral_vel * dt).clamp(vehicle.min_x, vehicle.max_x);
    vehicle.distance += vehicle.speed * dt;

    // Damage cooldown
    vehicle.invincible_timer = (vehicle.invincible_timer - dt).max(0.0);
}
