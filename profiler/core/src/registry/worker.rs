//! Single background thread that runs exports in submission order.

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use crate::error::ProfilerError;

pub(crate) const WORKER_THREAD_NAME: &str = "profiler-export";

pub(crate) type ExportJob = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug)]
pub(crate) struct ExportWorker {
    sender: Option<Sender<ExportJob>>,
    handle: Option<JoinHandle<()>>,
}

impl ExportWorker {
    pub(crate) fn spawn() -> Result<Self, ProfilerError> {
        let (sender, receiver) = mpsc::channel::<ExportJob>();
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                // Ends once every sender is dropped and the queue is drained.
                for job in receiver {
                    job();
                }
            })
            .map_err(ProfilerError::Worker)?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Queues `job`. Hands it back if the worker is no longer running.
    pub(crate) fn submit(&self, job: ExportJob) -> Result<(), ExportJob> {
        match &self.sender {
            Some(sender) => sender.send(job).map_err(|err| err.0),
            None => Err(job),
        }
    }

    /// Closes the queue and waits for already queued jobs to finish.
    ///
    /// Returns false if the worker thread panicked.
    pub(crate) fn shutdown(&mut self) -> bool {
        self.sender.take();
        match self.handle.take() {
            Some(handle) if handle.thread().id() != thread::current().id() => handle.join().is_ok(),
            // Shutting down from inside a job: the thread exits after this job returns.
            Some(_) => true,
            None => true,
        }
    }
}

impl Drop for ExportWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
