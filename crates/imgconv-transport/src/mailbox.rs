// crates/imgconv-transport/src/mailbox.rs

//! An in-process stand-in for the point-to-point MPI world the reference
//! implementation runs over: ranks are OS threads, and each (master, worker)
//! pair gets its own pair of channels rather than a shared communicator.
//! In-order delivery per (sender, tag) pair falls out of each channel being
//! FIFO; "probe any" is a `Select` over the master's inbound receivers.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Select, Sender};

use crate::message::Envelope;

/// The master's end of the world: one outbound sender and one inbound
/// receiver per worker, indexed by worker rank (0-based among workers,
/// i.e. rank `i` here is MPI rank `i + 1`).
pub struct MasterEnd {
    to_workers: Vec<Sender<Envelope>>,
    from_workers: Vec<Receiver<Envelope>>,
}

/// One worker's end of the world.
pub struct WorkerEnd {
    to_master: Sender<Envelope>,
    from_master: Receiver<Envelope>,
}

/// Build an in-process topology for `num_workers` workers plus the master.
#[must_use]
pub fn build_world(num_workers: usize) -> (MasterEnd, Vec<WorkerEnd>) {
    let mut to_workers = Vec::with_capacity(num_workers);
    let mut from_workers = Vec::with_capacity(num_workers);
    let mut worker_ends = Vec::with_capacity(num_workers);

    for _ in 0..num_workers {
        let (master_to_worker_tx, master_to_worker_rx) = crossbeam_channel::unbounded();
        let (worker_to_master_tx, worker_to_master_rx) = crossbeam_channel::unbounded();

        to_workers.push(master_to_worker_tx);
        from_workers.push(worker_to_master_rx);
        worker_ends.push(WorkerEnd { to_master: worker_to_master_tx, from_master: master_to_worker_rx });
    }

    (MasterEnd { to_workers, from_workers }, worker_ends)
}

impl MasterEnd {
    /// Number of workers in this world.
    #[must_use]
    pub fn num_workers(&self) -> usize {
        self.to_workers.len()
    }

    /// Send an envelope to worker `w`.
    ///
    /// # Errors
    /// Returns an error if the worker's inbound channel is closed.
    pub fn send(&self, w: usize, env: Envelope) -> Result<()> {
        self.to_workers[w].send(env).with_context(|| format!("master: sending to worker {w}"))
    }

    /// Block until some worker has a message ready, and return its rank and
    /// the message. This realizes the master's probe-then-receive step.
    ///
    /// # Errors
    /// Returns an error if every worker channel has disconnected.
    pub fn recv_any(&self) -> Result<(usize, Envelope)> {
        let mut sel = Select::new();
        for rx in &self.from_workers {
            sel.recv(rx);
        }
        let oper = sel.select();
        let w = oper.index();
        let env = oper
            .recv(&self.from_workers[w])
            .with_context(|| format!("master: receiving from worker {w}"))?;
        Ok((w, env))
    }

    /// Block for the next message specifically from worker `w`. Messages on
    /// a worker's channel are delivered in send order, so once a header has
    /// been matched to `w` via [`Self::recv_any`], the reply payload is
    /// known to be the very next thing on that same channel.
    ///
    /// # Errors
    /// Returns an error if worker `w`'s channel has disconnected.
    pub fn recv_from(&self, w: usize) -> Result<Envelope> {
        self.from_workers[w].recv().with_context(|| format!("master: receiving from worker {w}"))
    }
}

impl WorkerEnd {
    /// Block for the next message from the master.
    ///
    /// # Errors
    /// Returns an error if the master's channel has disconnected.
    pub fn recv(&self) -> Result<Envelope> {
        self.from_master.recv().context("worker: receiving from master")
    }

    /// Send an envelope back to the master.
    ///
    /// # Errors
    /// Returns an error if the master's inbound channel is closed.
    pub fn send(&self, env: Envelope) -> Result<()> {
        self.to_master.send(env).context("worker: sending to master")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Tag;

    #[test]
    fn master_can_recv_any_from_a_single_worker() {
        let (master, mut workers) = build_world(1);
        let worker = workers.pop().unwrap();
        worker.send(Envelope::terminate()).unwrap();
        let (w, env) = master.recv_any().unwrap();
        assert_eq!(w, 0);
        assert_eq!(env.tag, Tag::Terminate);
    }

    #[test]
    fn each_worker_has_an_independent_channel() {
        let (master, workers) = build_world(2);
        master.send(0, Envelope::terminate()).unwrap();
        assert!(workers[0].recv().is_ok());
        assert!(workers[1].from_master.try_recv().is_err());
    }
}
