//! Recurring timers for column mutation.
//!
//! All columns share one scheduler thread. The thread blocks on its command
//! channel until either a command arrives or the earliest task deadline
//! passes, then runs every task that is due.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// What a task wants after running once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Run again one interval after the previous deadline.
    Continue,
    /// Start over: run again after the given delay, then every interval.
    Restart(Duration),
    /// Do not run again.
    Stop,
}

type Job = Box<dyn FnMut() -> Schedule + Send + 'static>;

enum Command {
    Schedule {
        id: u64,
        delay: Duration,
        interval: Duration,
        job: Job,
    },
    Cancel {
        id: u64,
        ack: Sender<()>,
    },
}

struct Task {
    deadline: Instant,
    interval: Duration,
    job: Job,
}

/// Handle to the shared timer thread. Cheap to clone.
///
/// The thread exits once every `Scheduler` clone and [`TaskHandle`] is gone.
#[derive(Debug, Clone)]
pub struct Scheduler {
    commands: Sender<Command>,
    next_id: Arc<AtomicU64>,
}

impl Scheduler {
    /// Start the timer thread.
    pub fn spawn() -> io::Result<Self> {
        let (commands, inbox) = mpsc::channel();
        thread::Builder::new()
            .name("bitfall-scheduler".into())
            .spawn(move || run(inbox))?;

        Ok(Self {
            commands,
            next_id: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run `job` after `delay`, then every `interval` until it stops or the
    /// returned handle is cancelled or dropped.
    pub fn schedule<F>(&self, delay: Duration, interval: Duration, job: F) -> TaskHandle
    where
        F: FnMut() -> Schedule + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let sent = self
            .commands
            .send(Command::Schedule {
                id,
                delay,
                interval,
                job: Box::new(job),
            })
            .is_ok();
        if !sent {
            debug!(id, "scheduler thread is gone, task not scheduled");
        }

        TaskHandle {
            id,
            commands: self.commands.clone(),
            active: sent,
        }
    }
}

/// Owner of one scheduled task.
#[derive(Debug)]
pub struct TaskHandle {
    id: u64,
    commands: Sender<Command>,
    active: bool,
}

impl TaskHandle {
    /// Cancel the task and wait until it is guaranteed not to be running.
    ///
    /// Must not be called from inside a scheduled job.
    pub fn cancel(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        let (ack, acked) = mpsc::channel();
        if self.commands.send(Command::Cancel { id: self.id, ack }).is_ok() {
            // Commands are handled between jobs, so the ack means the job is idle.
            let _ = acked.recv();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run(inbox: Receiver<Command>) {
    let mut tasks: HashMap<u64, Task> = HashMap::new();

    loop {
        let next_deadline = tasks.values().map(|task| task.deadline).min();
        let received = match next_deadline {
            Some(deadline) => {
                inbox.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => inbox.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Command::Schedule {
                id,
                delay,
                interval,
                job,
            }) => {
                trace!(id, ?delay, ?interval, "task scheduled");
                tasks.insert(
                    id,
                    Task {
                        deadline: Instant::now() + delay,
                        interval,
                        job,
                    },
                );
            }
            Ok(Command::Cancel { id, ack }) => {
                tasks.remove(&id);
                let _ = ack.send(());
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        run_due(&mut tasks);
    }

    debug!("scheduler thread exiting");
}

fn run_due(tasks: &mut HashMap<u64, Task>) {
    let now = Instant::now();
    let mut due: Vec<(Instant, u64)> = tasks
        .iter()
        .filter(|(_, task)| task.deadline <= now)
        .map(|(id, task)| (task.deadline, *id))
        .collect();
    due.sort_unstable();

    for (_, id) in due {
        let Some(task) = tasks.get_mut(&id) else {
            continue;
        };
        match (task.job)() {
            Schedule::Continue => {
                task.deadline += task.interval;
                // Skip missed ticks instead of bursting to catch up.
                let now = Instant::now();
                if task.deadline < now {
                    task.deadline = now;
                }
            }
            Schedule::Restart(delay) => task.deadline = Instant::now() + delay,
            Schedule::Stop => {
                tasks.remove(&id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(5) {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn test_task_repeats_until_cancelled() {
        let scheduler = Scheduler::spawn().unwrap();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = count.clone();
        let mut handle = scheduler.schedule(Duration::ZERO, Duration::from_millis(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Schedule::Continue
        });

        assert!(wait_until(|| count.load(Ordering::SeqCst) >= 3));
        handle.cancel();
        assert!(!handle.is_active());

        let after_cancel = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
    }

    #[test]
    fn test_cancel_waits_for_running_job() {
        let scheduler = Scheduler::spawn().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let started = Arc::new(AtomicUsize::new(0));

        let job_log = log.clone();
        let job_started = started.clone();
        let mut handle = scheduler.schedule(Duration::ZERO, Duration::from_secs(60), move || {
            job_started.store(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(30));
            job_log.lock().unwrap().push("job finished");
            Schedule::Continue
        });

        assert!(wait_until(|| started.load(Ordering::SeqCst) == 1));
        handle.cancel();
        log.lock().unwrap().push("cancel returned");

        assert_eq!(*log.lock().unwrap(), vec!["job finished", "cancel returned"]);
    }

    #[test]
    fn test_stop_and_restart() {
        let scheduler = Scheduler::spawn().unwrap();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = count.clone();
        let _handle = scheduler.schedule(Duration::ZERO, Duration::from_millis(1), move || {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Schedule::Restart(Duration::from_millis(5)),
                1 => Schedule::Continue,
                _ => Schedule::Stop,
            }
        });

        assert!(wait_until(|| count.load(Ordering::SeqCst) == 3));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_dropping_handle_cancels() {
        let scheduler = Scheduler::spawn().unwrap();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = count.clone();
        let handle = scheduler.schedule(Duration::from_millis(50), Duration::from_millis(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Schedule::Continue
        });
        drop(handle);

        thread::sleep(Duration::from_millis(80));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
