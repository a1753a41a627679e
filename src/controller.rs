//! Controller orchestration.
//!
//! Ties the scheduler, the mode state machine and the serial command framing
//! together: a fixed five-task set drives the lamp, the dial and the status
//! line, while toggle events from buttons or `M:` commands switch modes and
//! gate tasks. Everything runs in the host's polling loop; the only
//! cross-context value is the edge-event queue drained at the top of each
//! poll.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::brightness::BrightnessScale;
use crate::command::{Command, LineBuffer};
use crate::cycle::{CyclePhase, PhaseDurations, TAIL_BLINK_COUNT, TAIL_BLINK_PERIOD};
use crate::event::EventReceiver;
use crate::mode::{Mode, ToggleTarget};
use crate::scheduler::{Iterations, Scheduler, Task, TaskId};
use crate::status::{self, StatusFrame};
use crate::{BrightnessDial, LampDriver, LampLevels, StatusSink};

/// Size of the fixed task set.
const TASK_COUNT: usize = 5;

/// Serial line capacity; the longest well-formed command is a `D:` line
/// with three ten-digit fields.
const LINE_CAP: usize = 64;

/// Periods for the fixed task set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPeriods {
    /// Normal-cycle phase evaluation.
    pub cycle: Duration,
    /// All-blink parity flips.
    pub all_blink: Duration,
    /// Brightness dial sampling.
    pub dial: Duration,
    /// Periodic status lines.
    pub status: Duration,
}

impl Default for TaskPeriods {
    fn default() -> Self {
        Self {
            cycle: Duration::from_millis(500),
            all_blink: Duration::from_millis(500),
            dial: Duration::from_millis(10),
            status: Duration::from_millis(200),
        }
    }
}

/// Configuration for the controller.
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    /// Hold durations for the Normal cycle.
    pub durations: PhaseDurations,
    pub periods: TaskPeriods,
    pub scale: BrightnessScale,
    /// Intensity used until the first dial sample lands.
    pub brightness: u8,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            durations: PhaseDurations::default(),
            periods: TaskPeriods::default(),
            scale: BrightnessScale::default(),
            brightness: 255,
        }
    }
}

/// Blink-tail lifecycle within the Normal cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TailState {
    /// Hold phases running, tail window not reached yet.
    Idle,
    /// Tail window entered this poll; task restart pending.
    Armed,
    /// Tail task flipping the green channel.
    Running { remaining: u32 },
    /// Flips exhausted; green parked lit until the cycle wraps.
    Done,
}

impl TailState {
    const fn is_active(self) -> bool {
        matches!(self, TailState::Armed | TailState::Running { .. })
    }
}

/// Phase-timing state for the Normal cycle.
#[derive(Debug, Clone, Copy)]
struct PhaseState {
    /// Start of the current cycle.
    reference: Instant,
    /// Shared by the all-blink and tail tasks; each resets it on entry.
    parity: bool,
    tail: TailState,
}

/// Mutable state every task action works on.
struct Core<D, S, B> {
    lamp: D,
    sink: S,
    dial: B,
    mode: Mode,
    phase: PhaseState,
    levels: LampLevels,
    brightness: u8,
    scale: BrightnessScale,
    durations: PhaseDurations,
    pending_durations: Option<PhaseDurations>,
}

impl<D: LampDriver, S: StatusSink, B: BrightnessDial> Core<D, S, B> {
    /// Write a frame when it differs from the previous one.
    fn apply(&mut self, levels: LampLevels) {
        if levels != self.levels {
            self.levels = levels;
            self.lamp.write(levels);
        }
    }

    /// Re-anchor the cycle and swap in pending durations.
    fn reset_cycle(&mut self, now: Instant) {
        self.phase.reference = now;
        self.phase.tail = TailState::Idle;
        if let Some(durations) = self.pending_durations.take() {
            self.durations = durations;
        }
    }

    fn emit_status(&mut self) {
        let frame = StatusFrame {
            mode: self.mode,
            levels: self.levels,
            brightness: self.brightness,
            tail_active: self.phase.tail.is_active(),
        };
        let line = status::encode(&frame);
        self.sink.write_line(&line);
    }
}

/// Evaluates the Normal cycle: paints the hold phases, arms the blink tail,
/// wraps at the cycle end.
fn cycle_task<D: LampDriver, S: StatusSink, B: BrightnessDial>(
    core: &mut Core<D, S, B>,
    now: Instant,
) {
    if core.mode != Mode::Normal {
        return;
    }
    let mut elapsed = now.duration_since(core.phase.reference);
    if elapsed >= core.durations.total() {
        core.reset_cycle(now);
        elapsed = Duration::from_millis(0);
    }
    let brightness = core.brightness;
    match core.durations.phase_at(elapsed) {
        Some(CyclePhase::RedHold) => core.apply(LampLevels::red_only(brightness)),
        Some(CyclePhase::YellowHold) => core.apply(LampLevels::yellow_only(brightness)),
        Some(CyclePhase::GreenHold) => core.apply(LampLevels::green_only(brightness)),
        Some(CyclePhase::BlinkTail) => {
            // Arm once per window; the tail task owns the green channel
            // until it finishes or the cycle wraps.
            if core.phase.tail == TailState::Idle {
                core.phase.parity = true;
                core.phase.tail = TailState::Armed;
            }
        }
        None => {}
    }
}

/// Flips the green channel through the tail window, parking it lit on the
/// last flip.
fn tail_blink_task<D: LampDriver, S: StatusSink, B: BrightnessDial>(
    core: &mut Core<D, S, B>,
    _now: Instant,
) {
    let TailState::Running { remaining } = core.phase.tail else {
        return;
    };
    core.phase.parity = !core.phase.parity;
    let remaining = remaining.saturating_sub(1);
    if remaining == 0 {
        core.phase.tail = TailState::Done;
        let brightness = core.brightness;
        core.apply(LampLevels::green_only(brightness));
    } else {
        core.phase.tail = TailState::Running { remaining };
        let level = if core.phase.parity { core.brightness } else { 0 };
        core.apply(LampLevels::green_only(level));
    }
}

/// Flashes all three channels in unison while the all-blink mode is active.
fn all_blink_task<D: LampDriver, S: StatusSink, B: BrightnessDial>(
    core: &mut Core<D, S, B>,
    _now: Instant,
) {
    if core.mode != Mode::AllBlink {
        return;
    }
    core.phase.parity = !core.phase.parity;
    let level = if core.phase.parity { core.brightness } else { 0 };
    core.apply(LampLevels::all(level));
}

/// Samples the dial and republishes the brightness on change.
fn dial_task<D: LampDriver, S: StatusSink, B: BrightnessDial>(
    core: &mut Core<D, S, B>,
    _now: Instant,
) {
    let raw = core.dial.read_raw();
    let brightness = core.scale.map(raw);
    if brightness == core.brightness {
        return;
    }
    core.brightness = brightness;
    // RedOnly holds a static frame, so it repaints here; the other modes
    // repaint on their own cadence.
    if core.mode == Mode::RedOnly {
        core.apply(LampLevels::red_only(brightness));
    }
}

/// Periodic status line.
fn status_task<D: LampDriver, S: StatusSink, B: BrightnessDial>(
    core: &mut Core<D, S, B>,
    _now: Instant,
) {
    core.emit_status();
}

/// Ids of the tasks the controller gates after construction. The dial and
/// status tasks stay enabled for the controller's whole life.
struct TaskSet {
    cycle: TaskId,
    tail: TaskId,
    all_blink: TaskId,
}

/// The assembled controller: scheduler, task set, mode machine and serial
/// command framing.
///
/// Every method takes `now` from the caller, which must be monotonically
/// non-decreasing; the crate never reads a clock itself.
pub struct Controller<'a, D, S, B, const EVENTS: usize> {
    scheduler: Scheduler<Core<D, S, B>, TASK_COUNT>,
    core: Core<D, S, B>,
    events: EventReceiver<'a, EVENTS>,
    line: LineBuffer<LINE_CAP>,
    tasks: TaskSet,
}

impl<'a, D, S, B, const EVENTS: usize> Controller<'a, D, S, B, EVENTS>
where
    D: LampDriver,
    S: StatusSink,
    B: BrightnessDial,
{
    /// Build the controller and its task set.
    ///
    /// `now` anchors the first cycle; the cycle task paints red on the first
    /// poll. The lamp is assumed dark at construction.
    pub fn new(
        lamp: D,
        sink: S,
        dial: B,
        events: EventReceiver<'a, EVENTS>,
        config: &ControllerConfig,
        now: Instant,
    ) -> Self {
        let core = Core {
            lamp,
            sink,
            dial,
            mode: Mode::Normal,
            phase: PhaseState {
                reference: now,
                parity: false,
                tail: TailState::Idle,
            },
            levels: LampLevels::OFF,
            brightness: config.brightness,
            scale: config.scale,
            durations: config.durations,
            pending_durations: None,
        };
        let (mut scheduler, [cycle, tail, all_blink, dial_id, status_id]) = Scheduler::from_tasks([
            Task::new(
                config.periods.cycle,
                Iterations::Unbounded,
                cycle_task::<D, S, B>,
            ),
            Task::new(
                TAIL_BLINK_PERIOD,
                Iterations::Finite(TAIL_BLINK_COUNT),
                tail_blink_task::<D, S, B>,
            ),
            Task::new(
                config.periods.all_blink,
                Iterations::Unbounded,
                all_blink_task::<D, S, B>,
            ),
            Task::new(config.periods.dial, Iterations::Unbounded, dial_task::<D, S, B>),
            Task::new(
                config.periods.status,
                Iterations::Unbounded,
                status_task::<D, S, B>,
            ),
        ]);
        scheduler.enable(cycle);
        scheduler.enable(dial_id);
        scheduler.enable(status_id);
        Self {
            scheduler,
            core,
            events,
            line: LineBuffer::new(),
            tasks: TaskSet {
                cycle,
                tail,
                all_blink,
            },
        }
    }

    /// Run one scheduler pass.
    ///
    /// Pending edge events are applied first, then due tasks in registration
    /// order. Call continuously from the host loop.
    pub fn poll(&mut self, now: Instant) {
        while let Some(target) = self.events.receive() {
            self.toggle(target, now);
        }
        self.scheduler.poll(&mut self.core, now);
        self.sync_tail(now);
    }

    /// Apply one control toggle, exactly as a button edge or `M:` command.
    ///
    /// Toggling the active mode's control returns to Normal with a fresh
    /// cycle reference; any other control switches straight to its mode.
    /// One status line goes out immediately either way.
    pub fn toggle(&mut self, target: ToggleTarget, now: Instant) {
        if self.core.mode == target.mode() {
            self.leave_special(now);
        } else {
            self.enter_special(target);
        }
        #[cfg(feature = "esp32-log")]
        println!("[Controller.toggle] mode set to {}", self.core.mode.as_str());
        self.core.emit_status();
    }

    /// Feed one serial byte. Completed lines are parsed and dispatched;
    /// malformed lines vanish silently.
    pub fn feed(&mut self, byte: u8, now: Instant) {
        if let Some(command) = self.line.push(byte) {
            self.dispatch(command, now);
        }
    }

    /// Feed a chunk of serial bytes.
    pub fn feed_bytes(&mut self, bytes: &[u8], now: Instant) {
        for &byte in bytes {
            self.feed(byte, now);
        }
    }

    /// Current operating mode.
    pub const fn mode(&self) -> Mode {
        self.core.mode
    }

    /// Most recent frame handed to the lamp driver.
    pub const fn levels(&self) -> LampLevels {
        self.core.levels
    }

    /// Current dial-mapped intensity.
    pub const fn brightness(&self) -> u8 {
        self.core.brightness
    }

    /// Whether the blink tail is live (armed or flipping).
    pub const fn tail_active(&self) -> bool {
        self.core.phase.tail.is_active()
    }

    fn dispatch(&mut self, command: Command, now: Instant) {
        match command {
            Command::Durations(durations) => {
                // Takes effect at the next cycle reset, never mid-cycle.
                self.core.pending_durations = Some(durations);
            }
            Command::Toggle(target) => self.toggle(target, now),
        }
    }

    fn leave_special(&mut self, now: Instant) {
        self.core.mode = Mode::Normal;
        self.core.reset_cycle(now);
        self.scheduler.disable(self.tasks.all_blink);
        self.scheduler.disable(self.tasks.tail);
        self.scheduler.enable(self.tasks.cycle);
    }

    fn enter_special(&mut self, target: ToggleTarget) {
        self.core.mode = target.mode();
        self.core.phase.tail = TailState::Idle;
        self.scheduler.disable(self.tasks.cycle);
        self.scheduler.disable(self.tasks.all_blink);
        self.scheduler.disable(self.tasks.tail);
        match target {
            ToggleTarget::RedOnly => {
                let brightness = self.core.brightness;
                self.core.apply(LampLevels::red_only(brightness));
            }
            ToggleTarget::AllBlink => {
                // First flip paints every channel on.
                self.core.phase.parity = false;
                self.scheduler.enable(self.tasks.all_blink);
            }
            ToggleTarget::AllOff => self.core.apply(LampLevels::OFF),
        }
    }

    /// Keep the tail task's gate in step with the tail sub-state: an armed
    /// tail starts its flips, a wrapped cycle cancels leftover ones.
    fn sync_tail(&mut self, now: Instant) {
        match self.core.phase.tail {
            TailState::Armed => {
                self.scheduler.restart(self.tasks.tail, now);
                self.core.phase.tail = TailState::Running {
                    remaining: TAIL_BLINK_COUNT,
                };
            }
            TailState::Idle => {
                if self.scheduler.is_enabled(self.tasks.tail) {
                    self.scheduler.disable(self.tasks.tail);
                }
            }
            TailState::Running { .. } | TailState::Done => {}
        }
    }
}
