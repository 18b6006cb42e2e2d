//! CorePlugin wires the fixed simulation tick and its counter.
use bevy::prelude::*;
#[cfg(feature = "core_debug")]
use bevy::time::TimerMode;

const DEFAULT_TICKS_PER_SECOND: f64 = 20.0;
const MIN_TICKS_PER_SECOND: f64 = 1.0;

#[cfg(feature = "core_debug")]
#[derive(Resource)]
struct DebugTickTimer {
    timer: Timer,
}

#[cfg(feature = "core_debug")]
impl Default for DebugTickTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(5.0, TimerMode::Repeating),
        }
    }
}

/// Monotonic count of fixed simulation ticks ("world time").
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SimulationTick {
    current: u64,
}

impl SimulationTick {
    /// Creates a counter starting at the provided tick.
    pub fn starting_at(current: u64) -> Self {
        Self { current }
    }

    /// Returns the current tick.
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Advances the counter by one tick.
    pub fn advance(&mut self) {
        self.current = self.current.wrapping_add(1);
    }

    /// True when the current tick lands on a multiple of `interval`.
    pub fn is_multiple_of(&self, interval: u64) -> bool {
        interval != 0 && self.current % interval == 0
    }
}

/// Registers the fixed tick rate and simulation counter.
#[derive(Debug, Clone, Copy)]
pub struct CorePlugin {
    ticks_per_second: f64,
}

impl CorePlugin {
    /// Creates a CorePlugin running the fixed schedule at `ticks_per_second`.
    pub const fn with_tick_rate(ticks_per_second: f64) -> Self {
        Self { ticks_per_second }
    }

    /// Tick rate after clamping to a sane minimum.
    pub fn ticks_per_second(&self) -> f64 {
        self.ticks_per_second.max(MIN_TICKS_PER_SECOND)
    }
}

impl Default for CorePlugin {
    fn default() -> Self {
        Self::with_tick_rate(DEFAULT_TICKS_PER_SECOND)
    }
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(self.ticks_per_second()))
            .init_resource::<SimulationTick>()
            .add_systems(Startup, log_startup_tick_rate)
            .add_systems(FixedFirst, advance_simulation_tick);

        #[cfg(feature = "core_debug")]
        {
            app.insert_resource(DebugTickTimer::default())
                .add_systems(Update, log_tick_progress);
        }
    }
}

fn advance_simulation_tick(mut tick: ResMut<SimulationTick>) {
    tick.advance();
}

fn log_startup_tick_rate(fixed: Res<Time<Fixed>>) {
    info!(
        "CorePlugin initialised with fixed tick interval: {:.3}s",
        fixed.timestep().as_secs_f64()
    );
}

#[cfg(feature = "core_debug")]
fn log_tick_progress(
    mut timer: ResMut<DebugTickTimer>,
    time: Res<Time>,
    tick: Res<SimulationTick>,
) {
    if timer.timer.tick(time.delta()).just_finished() {
        info!(
            target: "core_debug",
            "Simulation tick: {} | real elapsed: {:.2}s",
            tick.current(),
            time.elapsed_secs(),
        );
    }
}
