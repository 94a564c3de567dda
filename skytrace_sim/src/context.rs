//! Simulation context implementing FlightContext for deterministic testing.
//!
//! Time is a virtual clock advanced manually; spawned tasks land in an
//! explicit queue drained by the harness. A sleeping task stays pending
//! until the clock reaches its deadline, so one `step(interval)` produces
//! exactly one tick of a playing flight.

use async_trait::async_trait;
use skytrace_env::FlightContext;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Wake, Waker};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send>>;

/// The harness re-polls explicitly after every clock advance, so wakers
/// carry no information.
struct NoopWake;

impl Wake for NoopWake {
    fn wake(self: Arc<Self>) {}
}

/// Future that resolves once the virtual clock reaches its deadline.
struct SleepUntil {
    clock: Arc<Mutex<u64>>,
    deadline_ns: u64,
}

impl Future for SleepUntil {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if *self.clock.lock().unwrap() >= self.deadline_ns {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

/// Simulation context backed by a virtual clock and a drained task queue.
pub struct SimContext {
    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<Mutex<u64>>,

    /// Tasks spawned but not yet picked up by the poll loop
    incoming: Mutex<Vec<BoxedTask>>,

    /// Tasks currently pending
    running: Mutex<Vec<BoxedTask>>,

    /// Epoch offset (virtual time 0 maps to this wall-clock time)
    epoch: SystemTime,
}

impl SimContext {
    pub fn new() -> Self {
        Self {
            virtual_time_ns: Arc::new(Mutex::new(0)),
            incoming: Mutex::new(Vec::new()),
            running: Mutex::new(Vec::new()),
            epoch: UNIX_EPOCH + Duration::from_secs(1_704_067_200), // 2024-01-01 00:00:00 UTC
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Advances virtual time without polling tasks.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self.virtual_time_ns.lock().unwrap();
        *time += duration.as_nanos() as u64;
    }

    /// Advances virtual time, then polls spawned tasks until quiescent.
    pub fn step(&self, duration: Duration) {
        self.advance_time(duration);
        self.run_until_stalled();
    }

    /// Polls every queued task until no task completes and nothing new is
    /// spawned. Periodic loops (tick timers) stay parked on their next
    /// sleep; one-shot tasks (telemetry sends) run to completion.
    pub fn run_until_stalled(&self) {
        let waker = Waker::from(Arc::new(NoopWake));
        let mut cx = Context::from_waker(&waker);

        loop {
            let mut tasks = std::mem::take(&mut *self.running.lock().unwrap());
            let picked_up = {
                let mut incoming = self.incoming.lock().unwrap();
                let n = incoming.len();
                tasks.append(&mut incoming);
                n
            };

            let before = tasks.len();
            tasks.retain_mut(|task| task.as_mut().poll(&mut cx).is_pending());
            let completed = before - tasks.len();

            self.running.lock().unwrap().append(&mut tasks);

            let spawned_during_poll = !self.incoming.lock().unwrap().is_empty();
            if completed == 0 && picked_up == 0 && !spawned_during_poll {
                break;
            }
        }
    }

    /// Number of tasks still parked (periodic loops between ticks).
    pub fn pending_tasks(&self) -> usize {
        self.running.lock().unwrap().len() + self.incoming.lock().unwrap().len()
    }

    fn time_ns(&self) -> u64 {
        *self.virtual_time_ns.lock().unwrap()
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlightContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    fn system_time(&self) -> SystemTime {
        self.epoch + self.now()
    }

    async fn sleep(&self, duration: Duration) {
        let deadline_ns = self.time_ns() + duration.as_nanos() as u64;
        SleepUntil {
            clock: Arc::clone(&self.virtual_time_ns),
            deadline_ns,
        }
        .await
    }

    fn spawn<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let _name = name.to_string();
        self.incoming.lock().unwrap().push(Box::pin(future));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_sim_context_time() {
        let ctx = SimContext::new();
        assert_eq!(ctx.now(), Duration::ZERO);

        ctx.advance_time(Duration::from_secs(1));
        assert_eq!(ctx.now(), Duration::from_secs(1));

        ctx.advance_time(Duration::from_millis(500));
        assert_eq!(ctx.now(), Duration::from_millis(1500));
    }

    #[test]
    fn test_system_time_tracks_virtual_clock() {
        let ctx = SimContext::new();
        let t0 = ctx.system_time();
        ctx.advance_time(Duration::from_secs(10));
        assert_eq!(ctx.system_time(), t0 + Duration::from_secs(10));
    }

    #[test]
    fn test_one_shot_task_runs_on_drain() {
        let ctx = SimContext::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter2 = Arc::clone(&counter);

        ctx.spawn("one-shot", async move {
            counter2.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        ctx.run_until_stalled();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.pending_tasks(), 0);
    }

    #[test]
    fn test_periodic_task_ticks_once_per_step() {
        let ctx = SimContext::shared();
        let counter = Arc::new(AtomicU32::new(0));
        let counter2 = Arc::clone(&counter);
        let ctx2 = Arc::clone(&ctx);

        ctx.spawn("ticker", async move {
            loop {
                ctx2.sleep(Duration::from_secs(1)).await;
                counter2.fetch_add(1, Ordering::SeqCst);
            }
        });

        ctx.run_until_stalled();
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        for expected in 1..=5 {
            ctx.step(Duration::from_secs(1));
            assert_eq!(counter.load(Ordering::SeqCst), expected);
        }
    }
}
