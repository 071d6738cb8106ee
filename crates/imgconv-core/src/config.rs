// crates/imgconv-core/src/config.rs

//! The immutable run configuration built once by the CLI layer and threaded
//! down into every component. Nothing below this type re-reads CLI flags or
//! environment state.

use std::path::PathBuf;

use crate::kernel::Operation;

/// Which execution strategy to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Single-threaded, single-rank reference implementation.
    Serial,
    /// Static, shared-filesystem: every rank reads its own band directly.
    Sft,
    /// Static, non-shared filesystem: rank 0 reads and scatters.
    NoSft,
    /// Dynamic master/worker, streaming fixed-size row chunks.
    MasterWorker,
}

/// Cluster topology available to every rank at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Topology {
    /// Total number of ranks (processes) in the run.
    pub processes: u32,
    /// CPU cores available per node.
    pub cores_per_node: u32,
    /// Number of physical nodes the ranks are spread across.
    pub nodes: u32,
}

impl Topology {
    /// `max(1, cores_per_node / processes)`, the SFT threading budget.
    #[must_use]
    pub fn threads_per_process_sft(self) -> usize {
        (self.cores_per_node / self.processes.max(1)).max(1) as usize
    }

    /// `max(1, cores_per_node / (processes / nodes))`, the NoSFT/MW threading budget.
    #[must_use]
    pub fn threads_per_process_distributed(self) -> usize {
        let processes_per_node = (self.processes / self.nodes.max(1)).max(1);
        (self.cores_per_node / processes_per_node).max(1) as usize
    }
}

/// The fully-resolved, immutable configuration for one run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Execution strategy.
    pub mode: Mode,
    /// Input BMP path.
    pub input: PathBuf,
    /// Output BMP path.
    pub output: PathBuf,
    /// Kernel to apply.
    pub operation: Operation,
    /// Row chunk size for `Mode::MasterWorker`; ignored otherwise.
    pub chunk_size: u32,
    /// Cluster topology.
    pub topology: Topology,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sft_threading_budget_floors_at_one() {
        let topo = Topology { processes: 16, cores_per_node: 4, nodes: 1 };
        assert_eq!(topo.threads_per_process_sft(), 1);
    }

    #[test]
    fn distributed_threading_budget_divides_by_processes_per_node() {
        let topo = Topology { processes: 8, cores_per_node: 16, nodes: 1 };
        assert_eq!(topo.threads_per_process_distributed(), 2);
    }
}
