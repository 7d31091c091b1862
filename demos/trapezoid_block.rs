//! Trapezoid block walkthrough.
//!
//! Dispatches one planned block on mock pins and drives the tick loop by
//! hand, printing the rate profile as the block moves through its
//! acceleration, cruise, and deceleration segments.
//!
//! This example uses in-memory mock pins, so it runs without hardware.

use step_motion::{ActuatorPins, Axis, AxisPins, Block, MotionHooks, MotionSystem};

/// Mock output pin for demonstration.
struct MockPin;

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Print every speed change the rate controller makes.
#[derive(Default)]
struct PrintingHooks {
    changes: u32,
}

impl MotionHooks for PrintingHooks {
    fn on_speed_change(&mut self, rate: u32) {
        self.changes += 1;
        // One line every 10 ms keeps the output readable.
        if self.changes % 10 == 0 {
            println!("  rate = {:>5} steps/sec", rate);
        }
    }

    fn on_block_released(&mut self) {
        println!("  block released");
    }
}

const CONFIG: &str = r#"
[timer]
frequency_hz = 100000
acceleration_ticks_per_sec = 1000

[actuators.alpha]
name = "X"
steps_per_mm = 80.0
max_rate_mm_per_sec = 500.0

[actuators.beta]
name = "Y"
steps_per_mm = 80.0
max_rate_mm_per_sec = 500.0

[actuators.gamma]
name = "Z"
steps_per_mm = 400.0
max_rate_mm_per_sec = 100.0
"#;

fn main() {
    println!("=== Trapezoid Block Example ===\n");

    let config = step_motion::parse_config(CONFIG).expect("config is valid");

    let pins = AxisPins {
        alpha: ActuatorPins { step: MockPin, dir: MockPin, enable: MockPin },
        beta: ActuatorPins { step: MockPin, dir: MockPin, enable: MockPin },
        gamma: ActuatorPins { step: MockPin, dir: MockPin, enable: MockPin },
    };

    let mut system = MotionSystem::from_config(&config, pins).expect("system builds");
    let mut hooks = PrintingHooks::default();

    // A 12.5 mm block: 1000 steps on X, half on Y, ramping 200 -> 2000
    // -> 200 steps/sec with 40 steps/sec per acceleration tick.
    let block = Block::new([1000, 500, 0], [false, false, false], 12.5)
        .with_rates(200, 2000, 20, 2000)
        .with_acceleration(40, 450, 550);

    println!("Dispatching {} main-axis steps", block.steps_event_count);
    system.begin_block(block, &mut hooks);

    let frequency = system.timer().frequency();
    let mut ticks: u64 = 0;
    while !system.is_idle() {
        system.tick(&mut hooks);
        ticks += 1;
    }

    println!("\nDone in {} ticks ({:.1} ms at {} Hz)", ticks, ticks as f64 * 1e3 / frequency as f64, frequency);
    println!(
        "X: {} steps ({:.3} mm), Y: {} steps ({:.3} mm)",
        system.motor(Axis::Alpha).position_steps(),
        system.position(Axis::Alpha).value(),
        system.motor(Axis::Beta).position_steps(),
        system.position(Axis::Beta).value(),
    );
}
