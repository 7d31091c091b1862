//! Shared test harness: observable mock pins, a canned configuration,
//! and recording hooks for driving the motion system deterministically.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::OutputPin;
use step_motion::{ActuatorPins, Axis, AxisPins, MotionHooks, MotionSystem};

/// Observable pin state shared between the motor and the test.
#[derive(Debug, Default)]
pub struct PinState {
    pub high: bool,
    pub rising_edges: u32,
}

/// Mock output pin that counts rising edges.
#[derive(Clone, Default)]
pub struct SharedPin(Rc<RefCell<PinState>>);

impl SharedPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> u32 {
        self.0.borrow().rising_edges
    }

    pub fn is_high(&self) -> bool {
        self.0.borrow().high
    }
}

impl embedded_hal::digital::ErrorType for SharedPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SharedPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        if !state.high {
            state.high = true;
            state.rising_edges += 1;
        }
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().high = false;
        Ok(())
    }
}

/// Recording implementation of the external collaborators.
#[derive(Debug, Default)]
pub struct TestHooks {
    pub flushing: bool,
    pub speed_changes: Vec<u32>,
    pub released: u32,
}

impl MotionHooks for TestHooks {
    fn is_flushing(&self) -> bool {
        self.flushing
    }

    fn on_speed_change(&mut self, rate: u32) {
        self.speed_changes.push(rate);
    }

    fn on_block_released(&mut self) {
        self.released += 1;
    }
}

pub const TEST_CONFIG: &str = r#"
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

/// The system under test plus handles to every observable pin.
pub struct Bench {
    pub system: MotionSystem<SharedPin>,
    pub step_pins: [SharedPin; 3],
    pub enable_pins: [SharedPin; 3],
}

pub fn bench() -> Bench {
    let config = step_motion::parse_config(TEST_CONFIG).expect("test config is valid");

    let step_pins = [SharedPin::new(), SharedPin::new(), SharedPin::new()];
    let enable_pins = [SharedPin::new(), SharedPin::new(), SharedPin::new()];

    let pins = AxisPins {
        alpha: ActuatorPins {
            step: step_pins[0].clone(),
            dir: SharedPin::new(),
            enable: enable_pins[0].clone(),
        },
        beta: ActuatorPins {
            step: step_pins[1].clone(),
            dir: SharedPin::new(),
            enable: enable_pins[1].clone(),
        },
        gamma: ActuatorPins {
            step: step_pins[2].clone(),
            dir: SharedPin::new(),
            enable: enable_pins[2].clone(),
        },
    };

    let system = MotionSystem::from_config(&config, pins).expect("system builds");
    Bench {
        system,
        step_pins,
        enable_pins,
    }
}

impl Bench {
    pub fn run_ticks(&mut self, hooks: &mut TestHooks, ticks: u32) {
        for _ in 0..ticks {
            self.system.tick(hooks);
        }
    }

    /// Tick until every motor is idle; returns the ticks consumed.
    ///
    /// Panics if the system is still moving after `max_ticks`.
    pub fn run_until_idle(&mut self, hooks: &mut TestHooks, max_ticks: u32) -> u32 {
        for tick in 0..max_ticks {
            if self.system.is_idle() {
                return tick;
            }
            self.system.tick(hooks);
        }
        assert!(self.system.is_idle(), "system still moving after {} ticks", max_ticks);
        max_ticks
    }

    /// Tick until a predicate on the system holds; returns the ticks
    /// consumed.
    pub fn run_until<F>(&mut self, hooks: &mut TestHooks, max_ticks: u32, mut done: F) -> u32
    where
        F: FnMut(&MotionSystem<SharedPin>) -> bool,
    {
        for tick in 0..max_ticks {
            if done(&self.system) {
                return tick;
            }
            self.system.tick(hooks);
        }
        panic!("condition not reached after {} ticks", max_ticks);
    }

    pub fn pulses(&self, axis: Axis) -> u32 {
        self.step_pins[axis.index()].pulses()
    }

    pub fn total_pulses(&self) -> u32 {
        self.step_pins.iter().map(|p| p.pulses()).sum()
    }
}
