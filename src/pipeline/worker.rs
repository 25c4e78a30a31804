//! Single-slot worker thread for offloading blocking inference.

use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::error::{Error, Result};

/// A dedicated thread that accepts one job at a time.
///
/// `submit` hands a job over and returns immediately; `retrieve` blocks
/// until the result is ready. With at most one job in flight, the pair
/// behaves like the dispatch/retrieve contract of the inference ports
/// while the submitting thread overlaps its own work with the
/// computation.
pub struct InferenceWorker<I, O> {
    input_tx: Option<Sender<I>>,
    output_rx: Receiver<O>,
    handle: Option<thread::JoinHandle<()>>,
}

impl<I, O> InferenceWorker<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Spawn a named worker running `job` for every submitted input.
    pub fn spawn<F>(name: &str, mut job: F) -> std::io::Result<Self>
    where
        F: FnMut(I) -> O + Send + 'static,
    {
        let (input_tx, input_rx) = bounded::<I>(1);
        let (output_tx, output_rx) = bounded::<O>(1);
        let handle = thread::Builder::new()
            .name(format!("infer-{name}"))
            .spawn(move || {
                for input in input_rx {
                    if output_tx.send(job(input)).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self {
            input_tx: Some(input_tx),
            output_rx,
            handle: Some(handle),
        })
    }

    /// Queue `input` on the worker and return without waiting for it.
    pub fn submit(&self, input: I) -> Result<()> {
        let tx = self.input_tx.as_ref().ok_or(Error::WorkerGone)?;
        tx.send(input).map_err(|_| Error::WorkerGone)
    }

    /// Block until the in-flight job finishes and take its result.
    pub fn retrieve(&self) -> Result<O> {
        self.output_rx.recv().map_err(|_| Error::WorkerGone)
    }
}

impl<I, O> Drop for InferenceWorker<I, O> {
    fn drop(&mut self) {
        // Closing the input channel ends the worker loop.
        self.input_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_retrieve() {
        let worker = InferenceWorker::spawn("test", |n: u32| n * 2).unwrap();
        worker.submit(21).unwrap();
        assert_eq!(worker.retrieve().unwrap(), 42);
    }

    #[test]
    fn test_sequential_jobs() {
        let worker = InferenceWorker::spawn("test", |n: u32| n + 1).unwrap();
        for n in 0..5 {
            worker.submit(n).unwrap();
            assert_eq!(worker.retrieve().unwrap(), n + 1);
        }
    }

    #[test]
    fn test_overlapped_work() {
        let worker = InferenceWorker::spawn("test", |n: u64| {
            std::thread::sleep(std::time::Duration::from_millis(20));
            n
        })
        .unwrap();
        worker.submit(7).unwrap();
        // The submitting thread is free while the job runs.
        let local = 3 + 4;
        assert_eq!(worker.retrieve().unwrap(), local as u64);
    }
}
