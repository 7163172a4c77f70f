//! Virtual-clock timers.
//!
//! Components arm and cancel timers through [`Scheduler`]; the page drives
//! time forward and runs whatever the queue hands back.

use std::fmt;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(i64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The timer surface components depend on.
pub trait Scheduler<T> {
    fn now_ms(&self) -> i64;

    /// Runs `task` once, `delay_ms` from now.
    fn set_timeout(&mut self, delay_ms: i64, task: T) -> TimerId;

    /// Runs `task` every `interval_ms`, first time one interval from now.
    fn set_interval(&mut self, interval_ms: i64, task: T) -> TimerId;

    /// Cancels a timer. Returns whether it was still live.
    fn clear(&mut self, id: TimerId) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer<T> {
    pub id: TimerId,
    pub due_at: i64,
    pub order: i64,
    pub interval_ms: Option<i64>,
    pub task: T,
}

#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    id: TimerId,
    due_at: i64,
    order: i64,
    interval_ms: Option<i64>,
    task: T,
}

/// A timer that has been taken off the queue and is about to run.
#[derive(Debug, Clone)]
pub struct FiredTimer<T> {
    pub id: TimerId,
    pub due_at: i64,
    pub interval_ms: Option<i64>,
    pub task: T,
}

#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    tasks: Vec<ScheduledTask<T>>,
    now_ms: i64,
    next_timer_id: i64,
    next_task_order: i64,
    running_timer_id: Option<TimerId>,
    running_timer_canceled: bool,
    step_limit: usize,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            now_ms: 0,
            next_timer_id: 1,
            next_task_order: 0,
            running_timer_id: None,
            running_timer_canceled: false,
            step_limit: 10_000,
        }
    }

    pub fn step_limit(&self) -> usize {
        self.step_limit
    }

    pub fn set_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::Timer("step limit requires at least 1 step".into()));
        }
        self.step_limit = max_steps;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_live(&self, id: TimerId) -> bool {
        self.tasks.iter().any(|task| task.id == id)
            || (self.running_timer_id == Some(id) && !self.running_timer_canceled)
    }

    /// Moves the clock to `target_ms` without running anything.
    pub(crate) fn set_now(&mut self, target_ms: i64) {
        self.now_ms = target_ms;
    }

    pub fn clear_all(&mut self) -> usize {
        let cleared = self.tasks.len();
        self.tasks.clear();
        if self.running_timer_id.is_some() {
            self.running_timer_canceled = true;
        }
        cleared
    }

    fn push(&mut self, delay_ms: i64, interval_ms: Option<i64>, task: T) -> TimerId {
        let delay_ms = delay_ms.max(0);
        let id = TimerId(self.next_timer_id);
        self.next_timer_id += 1;
        self.push_with_id(id, self.now_ms.saturating_add(delay_ms), interval_ms, task);
        id
    }

    fn push_with_id(&mut self, id: TimerId, due_at: i64, interval_ms: Option<i64>, task: T) {
        let order = self.next_task_order;
        self.next_task_order += 1;
        self.tasks.push(ScheduledTask {
            id,
            due_at,
            order,
            interval_ms,
            task,
        });
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    pub fn has_due(&self, due_limit: Option<i64>) -> bool {
        self.next_task_index(due_limit).is_some()
    }

    /// Takes the earliest timer due at or before `due_limit` (any timer when
    /// `None`), advancing the clock to its due time if it lies ahead. The
    /// timer counts as running until [`TimerQueue::finish`].
    pub fn pop_next(&mut self, due_limit: Option<i64>) -> Option<FiredTimer<T>> {
        let idx = self.next_task_index(due_limit)?;
        let task = self.tasks.remove(idx);
        if task.due_at > self.now_ms {
            self.now_ms = task.due_at;
        }
        self.running_timer_id = Some(task.id);
        self.running_timer_canceled = false;
        Some(FiredTimer {
            id: task.id,
            due_at: task.due_at,
            interval_ms: task.interval_ms,
            task: task.task,
        })
    }

    /// Ends the run started by [`TimerQueue::pop_next`]. Intervals go back on
    /// the queue one period after their due time unless they were cleared
    /// while running. Returns the next due time when re-queued.
    pub fn finish(&mut self, fired: FiredTimer<T>) -> Option<i64> {
        let canceled = self.running_timer_canceled;
        self.running_timer_id = None;
        self.running_timer_canceled = false;

        let interval_ms = fired.interval_ms?;
        if canceled {
            return None;
        }
        let due_at = fired.due_at.saturating_add(interval_ms.max(0));
        self.push_with_id(fired.id, due_at, Some(interval_ms), fired.task);
        Some(due_at)
    }

    pub fn step_limit_error(&self, steps: usize, due_limit: Option<i64>) -> Error {
        let due_limit_desc = due_limit
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());

        let next_task_desc = self
            .next_task_index(due_limit)
            .and_then(|idx| self.tasks.get(idx))
            .map(|task| {
                let interval_desc = task
                    .interval_ms
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "none".into());
                format!(
                    "id={},due_at={},order={},interval_ms={}",
                    task.id, task.due_at, task.order, interval_desc
                )
            })
            .unwrap_or_else(|| "none".into());

        Error::Timer(format!(
            "exceeded max timer steps: limit={}, steps={steps}, now_ms={}, due_limit={}, pending_tasks={}, next_task={}",
            self.step_limit,
            self.now_ms,
            due_limit_desc,
            self.tasks.len(),
            next_task_desc
        ))
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn pending(&self) -> Vec<PendingTimer<T>> {
        let mut timers = self
            .tasks
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                interval_ms: task.interval_ms,
                task: task.task.clone(),
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }
}

impl<T> Scheduler<T> for TimerQueue<T> {
    fn now_ms(&self) -> i64 {
        self.now_ms
    }

    fn set_timeout(&mut self, delay_ms: i64, task: T) -> TimerId {
        self.push(delay_ms, None, task)
    }

    fn set_interval(&mut self, interval_ms: i64, task: T) -> TimerId {
        let interval_ms = interval_ms.max(0);
        self.push(interval_ms, Some(interval_ms), task)
    }

    fn clear(&mut self, id: TimerId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let mut existed = before != self.tasks.len();
        if self.running_timer_id == Some(id) && !self.running_timer_canceled {
            self.running_timer_canceled = true;
            existed = true;
        }
        existed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_due(queue: &mut TimerQueue<&'static str>, limit: i64) -> Vec<(i64, &'static str)> {
        let mut ran = Vec::new();
        while let Some(fired) = queue.pop_next(Some(limit)) {
            ran.push((queue.now_ms(), fired.task));
            queue.finish(fired);
        }
        ran
    }

    #[test]
    fn timers_fire_in_due_then_insertion_order() {
        let mut queue = TimerQueue::new();
        queue.set_timeout(10, "b");
        queue.set_timeout(5, "a");
        queue.set_timeout(10, "c");
        assert_eq!(drain_due(&mut queue, 10), vec![(5, "a"), (10, "b"), (10, "c")]);
        assert!(queue.is_empty());
    }

    #[test]
    fn interval_requeues_relative_to_due_time() {
        let mut queue = TimerQueue::new();
        let id = queue.set_interval(100, "tick");
        assert_eq!(drain_due(&mut queue, 250), vec![(100, "tick"), (200, "tick")]);
        let pending = queue.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, id);
        assert_eq!(pending[0].due_at, 300);
    }

    #[test]
    fn clearing_a_running_interval_stops_requeue() {
        let mut queue = TimerQueue::new();
        let id = queue.set_interval(10, "tick");
        let fired = queue.pop_next(None).expect("fired");
        assert!(queue.is_live(id));
        assert!(queue.clear(id));
        assert!(!queue.is_live(id));
        assert_eq!(queue.finish(fired), None);
        assert!(queue.is_empty());
        assert!(!queue.clear(id));
    }

    #[test]
    fn negative_delays_are_treated_as_zero() {
        let mut queue = TimerQueue::new();
        queue.set_timeout(-50, "now");
        assert_eq!(queue.pending()[0].due_at, 0);
    }

    #[test]
    fn step_limit_must_be_positive_and_is_reported() {
        let mut queue: TimerQueue<&'static str> = TimerQueue::new();
        assert!(queue.set_step_limit(0).is_err());
        queue.set_step_limit(3).expect("limit");
        queue.set_interval(1, "spin");
        let err = queue.step_limit_error(4, Some(10));
        match err {
            Error::Timer(msg) => {
                assert!(msg.contains("limit=3"), "{msg}");
                assert!(msg.contains("interval_ms=1"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
