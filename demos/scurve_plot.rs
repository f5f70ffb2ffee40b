use std::error::Error;

use gnuplot::*;
use smooth_motion::{MotionLimits, ProfileConfig, SmoothMotion};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // -----------------------
    // 1. Set up parameters
    // -----------------------
    let pos_1 = 50.0; // Target position
    let vel_1 = 0.0; // Target velocity

    // Motion limits
    let v_lim = 20.0; // Maximum velocity
    let a_lim = 10.0; // Maximum acceleration
    let jerk = 40.0; // Jerk of every ramp

    let step = 1e-3; // fixed simulation tick (1 kHz)

    // -------------------------
    // 2. Create and configure
    // -------------------------
    let mut axis = SmoothMotion::new(
        MotionLimits::new(v_lim, a_lim, jerk),
        ProfileConfig::default(),
    )?
    .with_fixed_time_step(step)?;
    axis.set_initial_position(0.0);
    axis.set_initial_velocity(0.0);

    // Starting with an acceleration opposing the move shows the correction phase
    axis.set_initial_acceleration(-5.0);
    axis.set_target(pos_1, vel_1)?;

    let total_time = axis.get_duration();
    if total_time <= 0.0 {
        return Err("Calculated total motion time is non-positive. Check inputs.".into());
    }

    // --------------------------------
    // 3. Fill trajectory data at each tick
    // --------------------------------
    let num_points = (total_time / step).ceil() as usize + 1;
    let mut time_axis = Vec::with_capacity(num_points);
    let mut positions = Vec::with_capacity(num_points);
    let mut velocities = Vec::with_capacity(num_points);
    let mut accelerations = Vec::with_capacity(num_points);

    for _ in 0..num_points {
        axis.integrate(step);
        time_axis.push(axis.get_time());
        positions.push(axis.get_position());
        velocities.push(axis.get_velocity());
        accelerations.push(axis.get_acceleration());
    }

    if !axis.is_at_target() {
        eprintln!("Warning: axis did not settle on the target position.");
    }

    // --------------
    // 4. Plot data
    // --------------
    let mut fg = Figure::new();
    {
        let axes = fg.axes2d();
        axes.set_title("Position, Velocity, Acceleration vs. Time", &[]);
        axes.set_x_label("Time (s)", &[]);
        axes.set_y_label("Position derivatives", &[]);
        axes.lines(&time_axis, &positions, &[Color("blue"), Caption("Position")]);
        axes.lines(&time_axis, &velocities, &[Color("red"), Caption("Velocity")]);
        axes.lines(&time_axis, &accelerations, &[Color("green"), Caption("Acceleration")]);
    }

    // Attempt to show in a pop-up window (might require gnuplot installed)
    fg.show().map_err(|e| format!("Failed to display plot: {e}"))?;

    println!("Plot generated. Total motion time: {:.3} seconds.", total_time);
    Ok(())
}
