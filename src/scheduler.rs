//! Cooperative task scheduling.
//!
//! A fixed-capacity table of periodic tasks polled from a single host loop.
//! Tasks never block; each action computes, writes its outputs and returns.
//! The scheduler owns the table exclusively and is driven with timestamps
//! supplied by the caller, so it never reads a clock itself.

use embassy_time::{Duration, Instant};
use heapless::Vec;

/// Iteration budget for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iterations {
    /// Run the given number of times, then self-disable.
    Finite(u32),
    /// Run for the lifetime of the program.
    Unbounded,
}

/// Error returned when registering onto a full scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterError;

/// Handle to a registered task.
///
/// Ids are only valid for the scheduler that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskId(usize);

/// A schedulable unit: a periodic action with an enable gate and an
/// iteration budget.
///
/// Actions are plain function pointers over a caller-supplied context, so
/// the task table itself carries no borrowed state.
pub struct Task<C> {
    period: Duration,
    budget: Iterations,
    remaining: u32,
    enabled: bool,
    last_run: Option<Instant>,
    action: fn(&mut C, Instant),
}

impl<C> Task<C> {
    /// Create a task. Tasks start disabled; enable them by id once
    /// registered.
    pub const fn new(period: Duration, budget: Iterations, action: fn(&mut C, Instant)) -> Self {
        Self {
            period,
            budget,
            remaining: match budget {
                Iterations::Finite(count) => count,
                Iterations::Unbounded => 0,
            },
            enabled: false,
            last_run: None,
            action,
        }
    }
}

/// Fixed-order cooperative scheduler.
///
/// `N` is the table capacity. Registration order is execution order and
/// never changes afterwards.
pub struct Scheduler<C, const N: usize> {
    tasks: Vec<Task<C>, N>,
}

impl<C, const N: usize> Scheduler<C, N> {
    /// Create an empty scheduler.
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Build a scheduler from a complete task array.
    ///
    /// Ids come back in array order. The array length equals the table
    /// capacity, so this cannot fail.
    pub fn from_tasks(tasks: [Task<C>; N]) -> (Self, [TaskId; N]) {
        let mut table = Vec::new();
        for task in tasks {
            let _ = table.push(task);
        }
        (Self { tasks: table }, core::array::from_fn(TaskId))
    }

    /// Register one task at startup.
    ///
    /// Returns its id, or [`RegisterError`] once the table is full.
    pub fn register(&mut self, task: Task<C>) -> Result<TaskId, RegisterError> {
        let id = TaskId(self.tasks.len());
        self.tasks.push(task).map_err(|_| RegisterError)?;
        Ok(id)
    }

    /// Run every due, enabled task exactly once, in registration order.
    ///
    /// A task is due on its first poll after registration, and afterwards
    /// whenever `now - last_run >= period` (a restart counts as a run at the
    /// restart instant). `now` must be monotonically non-decreasing across
    /// calls. Finite budgets are charged per invocation; the invocation that
    /// exhausts the budget still runs, and the task is disabled from then on.
    pub fn poll(&mut self, ctx: &mut C, now: Instant) {
        for task in &mut self.tasks {
            if !task.enabled {
                continue;
            }
            let due = match task.last_run {
                None => true,
                Some(prev) => now.duration_since(prev) >= task.period,
            };
            if !due {
                continue;
            }
            task.last_run = Some(now);
            if let Iterations::Finite(_) = task.budget {
                if task.remaining == 0 {
                    // enabled by hand after exhaustion; correct the gate
                    task.enabled = false;
                    continue;
                }
                task.remaining -= 1;
                if task.remaining == 0 {
                    task.enabled = false;
                }
            }
            (task.action)(ctx, now);
        }
    }

    /// Open the gate. Does not touch `last_run`, so the task keeps its
    /// original phase instead of re-anchoring to the enable instant.
    pub fn enable(&mut self, id: TaskId) {
        self.tasks[id.0].enabled = true;
    }

    /// Close the gate. Observed on the next poll.
    pub fn disable(&mut self, id: TaskId) {
        self.tasks[id.0].enabled = false;
    }

    /// Re-arm a task: full budget, enabled, first run one period after
    /// `now`.
    pub fn restart(&mut self, id: TaskId, now: Instant) {
        let task = &mut self.tasks[id.0];
        task.last_run = Some(now);
        task.remaining = match task.budget {
            Iterations::Finite(count) => count,
            Iterations::Unbounded => 0,
        };
        task.enabled = true;
    }

    /// Whether the task's gate is currently open.
    pub fn is_enabled(&self, id: TaskId) -> bool {
        self.tasks[id.0].enabled
    }
}

impl<C, const N: usize> Default for Scheduler<C, N> {
    fn default() -> Self {
        Self::new()
    }
}
