// src/services/poll.rs

//! Fixed-interval background refresh.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// What a poller does after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Continue,
    /// The polled container is gone; the poller ends itself
    Stop,
}

/// Handle to a running poller.
///
/// Dropping the handle does not stop the poller.
#[derive(Debug)]
pub struct PollHandle {
    name: String,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cancel(&self) {
        log::debug!("Cancelling poller {}", self.name);
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Run `tick` every `interval`, starting one interval from now.
///
/// A zero interval disables polling and returns `None`.
pub fn spawn_poller<F, Fut>(
    name: impl Into<String>,
    interval: Duration,
    mut tick: F,
) -> Option<PollHandle>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = PollStatus> + Send + 'static,
{
    let name = name.into();
    if interval.is_zero() {
        log::debug!("Poller {name} disabled");
        return None;
    }

    let task_name = name.clone();
    let task = tokio::spawn(async move {
        let mut timer = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            timer.tick().await;
            if tick().await == PollStatus::Stop {
                log::debug!("Poller {task_name} stopped, its container is gone");
                break;
            }
        }
    });

    Some(PollHandle { name, task })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting(
        stop_after: usize,
    ) -> (Arc<AtomicUsize>, impl FnMut() -> std::future::Ready<PollStatus>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let tick = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n >= stop_after {
                PollStatus::Stop
            } else {
                PollStatus::Continue
            })
        };
        (count, tick)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let (count, tick) = counting(usize::MAX);
        let handle = spawn_poller("stats", Duration::from_secs(60), tick).unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(151)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_container_is_gone() {
        let (count, tick) = counting(2);
        let handle = spawn_poller("recent", Duration::from_secs(10), tick).unwrap();

        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let (count, tick) = counting(usize::MAX);
        let handle = spawn_poller("auth", Duration::from_secs(10), tick).unwrap();
        handle.cancel();

        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_interval_disables() {
        let (_, tick) = counting(usize::MAX);
        assert!(spawn_poller("off", Duration::ZERO, tick).is_none());
    }
}
