//! Output driver context
//!
//! Owns the hardware backend, the motor and servo port registries, and
//! the global motor enable gate. All entry points are called
//! synchronously from the control loop; invalid targets are silent
//! no-ops so a dropped write can never halt the loop.

use aquila_hal::{CompareCell, DshotBackend, OcPolarity, OutputBackend, PinTag, TimerChannel};
use heapless::Vec;

use crate::config::{MotorConfig, ServoConfig};
use crate::port::{OutputPort, MAX_SUPPORTED_MOTORS, MAX_SUPPORTED_SERVOS};
use crate::protocol::{ProtocolFamily, PulseEncoder, SyncMode, PWM_TIMER_MHZ};

/// Synced timers run at the maximum representable period; rollover is
/// software-triggered instead of rate-driven.
const SYNCED_PERIOD: u16 = 0xFFFF;

/// Motor and servo output driver
///
/// One instance per vehicle, created at startup and re-initialized
/// wholesale on configuration changes.
pub struct OutputDriver<B: OutputBackend + DshotBackend> {
    backend: B,
    motors: Vec<OutputPort<B::Ccr>, MAX_SUPPORTED_MOTORS>,
    servos: Vec<OutputPort<B::Ccr>, MAX_SUPPORTED_SERVOS>,
    motors_enabled: bool,
    motor_sync: SyncMode,
}

impl<B: OutputBackend + DshotBackend> OutputDriver<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            motors: Vec::new(),
            servos: Vec::new(),
            motors_enabled: true,
            motor_sync: SyncMode::None,
        }
    }

    /// Configure motor outputs for the selected protocol
    ///
    /// Walks the configured pin list up to `motor_count`, stopping at the
    /// first absent pin or the first pin without a resolvable timer
    /// resource; already-configured ports stay valid. Returns the number
    /// of ports configured; a caller seeing fewer than requested should
    /// inhibit arming.
    pub fn init_motors(
        &mut self,
        config: &MotorConfig,
        idle_pulse: u16,
        motor_count: usize,
    ) -> usize {
        self.motors.clear();

        let protocol = config.protocol;
        let unsynced = config.use_unsynced_pwm || protocol.forces_unsynced();
        let idle_pulse = if protocol.forces_unsynced() {
            0
        } else {
            idle_pulse
        };

        self.motor_sync = match protocol.family() {
            ProtocolFamily::Digital(_) => SyncMode::Digital,
            ProtocolFamily::Analog { .. } if unsynced => SyncMode::None,
            ProtocolFamily::Analog { .. } => SyncMode::Oneshot,
        };

        for index in 0..motor_count.min(MAX_SUPPORTED_MOTORS) {
            let Some(tag) = config.pins[index] else {
                break;
            };
            let Some(channel) = self.backend.resolve_channel(tag) else {
                // No timer resource: leave this and later outputs
                // unconfigured so the caller can refuse to arm.
                break;
            };

            let port = match protocol.family() {
                ProtocolFamily::Digital(variant) => {
                    self.backend.configure_dshot_motor(&channel, index, variant);
                    OutputPort {
                        ccr: None,
                        period: 0,
                        timer: channel.timer,
                        enabled: true,
                        encoder: PulseEncoder::Digital,
                        pin: Some(tag),
                    }
                }
                ProtocolFamily::Analog { clock_mhz } => {
                    self.backend.configure_af_push_pull(tag);
                    let (period, initial) = if unsynced {
                        let hz = clock_mhz * 1_000_000;
                        let rate = u32::from(config.pwm_rate.max(1));
                        ((hz / rate) as u16, idle_pulse)
                    } else {
                        (SYNCED_PERIOD, 0)
                    };
                    let encoder = PulseEncoder::for_protocol(protocol, period);
                    self.configure_output(tag, &channel, clock_mhz, period, initial, encoder)
                }
            };

            if self.motors.push(port).is_err() {
                break;
            }
        }

        self.motors.len()
    }

    /// Configure servo outputs
    ///
    /// Servos are always free-running standard pulses at the configured
    /// refresh rate; the center pulse is staged as the OC initial value.
    /// Returns the number of ports configured.
    pub fn init_servos(&mut self, config: &ServoConfig) -> usize {
        self.servos.clear();

        for index in 0..MAX_SUPPORTED_SERVOS {
            let Some(tag) = config.pins[index] else {
                break;
            };

            self.backend.configure_af_push_pull(tag);

            let Some(channel) = self.backend.resolve_channel(tag) else {
                break;
            };

            let rate = u32::from(config.servo_pwm_rate.max(1));
            let period = (PWM_TIMER_MHZ * 1_000_000 / rate) as u16;
            let port = self.configure_output(
                tag,
                &channel,
                PWM_TIMER_MHZ,
                period,
                config.servo_center_pulse,
                PulseEncoder::Standard,
            );

            if self.servos.push(port).is_err() {
                break;
            }
        }

        self.servos.len()
    }

    /// Stage a commanded value on one motor output
    ///
    /// Silent no-op unless the index is configured, the global enable
    /// gate is on, and the port completed configuration. The staged
    /// value takes effect on the hardware's own timing: the next period
    /// boundary when free-running, the next forced rollover when synced.
    pub fn write_motor(&mut self, index: usize, value: u16) {
        if !self.motors_enabled {
            return;
        }
        let Some(port) = self.motors.get(index) else {
            return;
        };
        if !port.enabled {
            return;
        }

        match port.encoder {
            PulseEncoder::Digital => self.backend.write_dshot(index, value),
            encoder => port.set_compare(encoder.encode(value)),
        }
    }

    /// Stage a pulse width on one servo output
    ///
    /// Servos are not gated by the motor enable switch and take the
    /// value as compare ticks directly.
    pub fn write_servo(&mut self, index: usize, value: u16) {
        if let Some(port) = self.servos.get(index) {
            port.set_compare(value);
        }
    }

    /// End the control cycle for synced protocols
    ///
    /// Must be called exactly once per control cycle, after all writes,
    /// when [`Self::is_synchronized`] reports true. Forces one rollover
    /// per physical timer (committing the staged pulses) and re-arms
    /// every port at zero so a delayed loop cannot emit a stale pulse.
    pub fn complete_motor_update(&mut self, motor_count: usize) {
        match self.motor_sync {
            SyncMode::None => {}
            SyncMode::Digital => self.backend.complete_dshot_update(motor_count),
            SyncMode::Oneshot => {
                let count = motor_count.min(self.motors.len());
                for index in 0..count {
                    let timer = self.motors[index].timer;
                    // One rollover per physical timer, not per channel
                    let rolled = self.motors.iter().take(index).any(|m| m.timer == timer);
                    if !rolled {
                        self.backend.force_rollover(timer);
                    }
                    // Zero the compare so the timer emits nothing if it
                    // wraps on its own before the next write arrives.
                    self.motors[index].set_compare(0);
                }
            }
        }
    }

    /// Whether the active protocol requires [`Self::complete_motor_update`]
    pub fn is_synchronized(&self) -> bool {
        self.motor_sync != SyncMode::None
    }

    /// Zero every configured motor compare register
    ///
    /// Idempotent and independent of protocol or enable state; used to
    /// guarantee no further pulses without re-initialization.
    pub fn shutdown_pulses_for_all_motors(&mut self, motor_count: usize) {
        for port in self.motors.iter().take(motor_count) {
            port.set_compare(0);
        }
    }

    /// Open the global motor write gate
    pub fn enable_motors(&mut self) {
        self.motors_enabled = true;
    }

    /// Close the global motor write gate
    ///
    /// Blocks future motor writes only; hardware state and
    /// already-staged compare values are untouched.
    pub fn disable_motors(&mut self) {
        self.motors_enabled = false;
    }

    /// Configured motor ports, in index order
    pub fn motor_ports(&self) -> &[OutputPort<B::Ccr>] {
        &self.motors
    }

    pub fn motor_count(&self) -> usize {
        self.motors.len()
    }

    pub fn servo_count(&self) -> usize {
        self.servos.len()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Shared timer/OC configuration for one analog output channel
    ///
    /// The OC stage is armed with `initial`, then the compare cell is
    /// zeroed: nothing pulses until the first write.
    fn configure_output(
        &mut self,
        tag: PinTag,
        channel: &TimerChannel,
        clock_mhz: u32,
        period: u16,
        initial: u16,
        encoder: PulseEncoder,
    ) -> OutputPort<B::Ccr> {
        self.backend
            .configure_time_base(channel.timer, period, clock_mhz);

        let polarity = if channel.output.inverted {
            OcPolarity::High
        } else {
            OcPolarity::Low
        };
        self.backend
            .configure_output_compare(channel, initial, polarity, channel.output.complementary);

        if channel.output.enabled {
            self.backend.enable_outputs(channel.timer);
        }
        self.backend.start_timer(channel.timer);

        let ccr = self.backend.compare_cell(channel);
        ccr.set(0);

        OutputPort {
            ccr: Some(ccr),
            period,
            timer: channel.timer,
            enabled: true,
            encoder,
            pin: Some(tag),
        }
    }
}
