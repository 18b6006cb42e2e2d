use std::time::Duration;

use bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*};

mod core;
mod host;
mod hostile;

use crate::{core::CorePlugin, host::HostPlugin, hostile::HostilePlugin};

/// Frame pacing for the headless runner; simulation runs on the fixed tick.
const FRAME_INTERVAL_SECS: f64 = 1.0 / 60.0;

fn main() {
    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                FRAME_INTERVAL_SECS,
            ))),
            LogPlugin::default(),
            CorePlugin::default(),
            HostPlugin,
            HostilePlugin, // After HostPlugin so host messages are registered
        ))
        .run();
}
