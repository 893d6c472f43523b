use crossbeam::channel::{self, Sender};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::thread::{self, JoinHandle};

/// Deferred unit of work: an admitted asynchronous mutation.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Serialized execution of deferred configuration changes.
///
/// Jobs run in submission order and cannot be cancelled once queued.
pub trait Scheduler: Send + Sync {
    fn request_configuration_change(&self, job: Job);
}

/// FIFO queue drained explicitly by its single consumer.
#[derive(Default)]
pub struct TaskQueue {
    jobs: Mutex<VecDeque<Job>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        TaskQueue::default()
    }

    pub fn pending(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Runs queued jobs until the queue is empty, including jobs queued
    /// while draining. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        loop {
            // The queue lock is not held while a job runs
            let job = self.jobs.lock().pop_front();
            match job {
                Some(job) => {
                    job();
                    count += 1;
                }
                None => return count,
            }
        }
    }
}

impl Scheduler for TaskQueue {
    fn request_configuration_change(&self, job: Job) {
        self.jobs.lock().push_back(job);
    }
}

/// Runs jobs on one dedicated worker thread, in submission order.
pub struct WorkerScheduler {
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl WorkerScheduler {
    pub fn new() -> Self {
        let (sender, receiver) = channel::unbounded::<Job>();
        let worker = thread::Builder::new()
            .name("propdispatch-config".to_string())
            .spawn(move || {
                for job in receiver.iter() {
                    job();
                }
            })
            .ok();

        if worker.is_none() {
            tracing::warn!("cannot spawn configuration worker, jobs will be dropped");
        }

        WorkerScheduler { sender: Some(sender), worker }
    }

    /// Blocks until every job submitted before this call has run.
    pub fn wait_idle(&self) {
        let (done, wait) = channel::bounded::<()>(1);
        self.request_configuration_change(Box::new(move || {
            let _ = done.send(());
        }));
        let _ = wait.recv();
    }
}

impl Default for WorkerScheduler {
    fn default() -> Self {
        WorkerScheduler::new()
    }
}

impl Scheduler for WorkerScheduler {
    fn request_configuration_change(&self, job: Job) {
        if let Some(ref sender) = self.sender {
            if sender.send(job).is_err() {
                tracing::warn!("configuration worker is gone, dropping job");
            }
        }
    }
}

impl Drop for WorkerScheduler {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            // A job holding the last reference drops us on the worker itself
            if worker.thread().id() == thread::current().id() {
                tracing::debug!("configuration worker released from within, detaching");
                return;
            }
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn task_queue_is_fifo() {
        let queue = TaskQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let log = log.clone();
            queue.request_configuration_change(Box::new(move || log.lock().push(i)));
        }
        assert_eq!(queue.pending(), 3);
        assert!(log.lock().is_empty());

        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*log.lock(), vec![0, 1, 2]);
        assert_eq!(queue.run_pending(), 0);
    }

    #[test]
    fn worker_runs_in_order() {
        let worker = WorkerScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            let log = log.clone();
            worker.request_configuration_change(Box::new(move || log.lock().push(i)));
        }
        worker.wait_idle();

        assert_eq!(*log.lock(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn worker_may_drop_its_own_scheduler() {
        let worker = Arc::new(Mutex::new(Some(WorkerScheduler::new())));
        let (gate_tx, gate_rx) = channel::bounded::<()>(0);
        let (done_tx, done_rx) = channel::bounded::<bool>(1);

        let held = worker.clone();
        if let Some(ref scheduler) = *worker.lock() {
            scheduler.request_configuration_change(Box::new(move || {
                let _ = gate_rx.recv();
                // The job now owns the only scheduler; dropping it here runs Drop on the worker
                let scheduler = held.lock().take();
                drop(held);
                drop(scheduler);
                let _ = done_tx.send(true);
            }));
        }
        drop(worker);

        gate_tx.send(()).unwrap();
        assert_eq!(done_rx.recv_timeout(std::time::Duration::from_secs(5)), Ok(true));
    }
}
