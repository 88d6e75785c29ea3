//! Zen Network consensus driver service.
//!
//! A long-running service owning the block-production cadence. It:
//!
//! 1. Ticks on the configured block time and, on each tick, runs one
//!    `produce -> broadcast -> commit -> finalize` cycle strictly in
//!    sequence. If a cycle overruns the interval the next tick is delayed,
//!    never run concurrently with the in-flight one.
//! 2. Ingests finality votes from the network layer between ticks and
//!    re-attempts finalization as the tally grows.
//! 3. Persists an engine snapshot after every finalized height.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────────────────────────────────────────┐
//!  │                ConsensusService                  │
//!  │                                                  │
//!  │  ┌────────────┐    ┌─────────────┐               │
//!  │  │ Vote RX    │───▶│ Consensus   │──▶ block TX   │
//!  │  │ (network)  │    │ Engine      │   (broadcast) │
//!  │  └────────────┘    └──────┬──────┘               │
//!  │        tick ─────────────▶│                      │
//!  │                     ┌─────▼──────┐               │
//!  │                     │ Snapshot   │               │
//!  │                     │ Store      │               │
//!  │                     └────────────┘               │
//!  └──────────────────────────────────────────────────┘
//! ```
//!
//! Timeout/re-proposal policy for blocks that never reach quorum is owned
//! by the layer driving this service, not by the consensus core; the
//! service simply keeps producing on cadence.

use {
    crossbeam_channel::{Receiver, RecvTimeoutError, Sender},
    log::*,
    solana_hash::Hash,
    solana_pubkey::Pubkey,
    solana_time_utils::timestamp,
    std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        thread::{self, Builder, JoinHandle},
        time::{Duration, Instant},
    },
    zen_consensus::{Block, ConsensusEngine, ConsensusError, SnapshotStore},
};

/// A finality vote delivered by the network layer. Signature verification
/// happens at that boundary before a vote reaches the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalityVote {
    pub height: u64,
    pub voter: Pubkey,
}

/// The consensus event loop, on its own named thread.
pub struct ConsensusService {
    thread: JoinHandle<()>,
}

impl ConsensusService {
    /// Start the service.
    ///
    /// * `engine` — the shared consensus engine.
    /// * `snapshot_store` — where to persist the aggregate after each
    ///   finalized height; `None` disables persistence (tests).
    /// * `vote_receiver` — inbound finality votes from the network layer.
    /// * `block_sender` — outbound candidate blocks for broadcast.
    /// * `exit` — global shutdown flag.
    pub fn new(
        engine: Arc<ConsensusEngine>,
        snapshot_store: Option<SnapshotStore>,
        vote_receiver: Receiver<FinalityVote>,
        block_sender: Sender<Block>,
        exit: Arc<AtomicBool>,
    ) -> Self {
        let thread = Builder::new()
            .name("zenConsensusSvc".to_string())
            .spawn(move || {
                Self::run(
                    &engine,
                    snapshot_store.as_ref(),
                    &vote_receiver,
                    &block_sender,
                    &exit,
                );
            })
            .expect("failed to spawn consensus service thread");
        Self { thread }
    }

    /// Join the service thread.
    pub fn join(self) -> thread::Result<()> {
        self.thread.join()
    }

    fn run(
        engine: &ConsensusEngine,
        snapshot_store: Option<&SnapshotStore>,
        vote_receiver: &Receiver<FinalityVote>,
        block_sender: &Sender<Block>,
        exit: &AtomicBool,
    ) {
        let block_time = Duration::from_millis(engine.config().block_time_ms);
        info!(
            "ConsensusService: starting at height {} (identity: {}, block time {:?})",
            engine.current_height(),
            engine.identity(),
            block_time,
        );

        let mut next_tick = Instant::now() + block_time;
        loop {
            if exit.load(Ordering::Relaxed) {
                info!("ConsensusService: exit signal received, shutting down");
                break;
            }

            let now = Instant::now();
            if now >= next_tick {
                Self::run_cycle(engine, snapshot_store, block_sender);
                // Cycles never overlap: an overrun pushes the next tick out.
                next_tick = Instant::now() + block_time;
                continue;
            }

            match vote_receiver.recv_timeout(next_tick - now) {
                Ok(vote) => Self::handle_vote(engine, snapshot_store, vote),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!("ConsensusService: vote channel disconnected, shutting down");
                    break;
                }
            }
        }

        info!(
            "ConsensusService: consensus loop exited at height {}",
            engine.current_height()
        );
    }

    /// One production cycle: advance height, produce, broadcast, commit,
    /// and finalize if the quorum is already in hand.
    fn run_cycle(
        engine: &ConsensusEngine,
        snapshot_store: Option<&SnapshotStore>,
        block_sender: &Sender<Block>,
    ) {
        let height = engine.current_height() + 1;
        let now = timestamp() as i64;

        let block = match engine.produce_block(height, now, Hash::default()) {
            Ok(block) => block,
            Err(err) => {
                warn!("ConsensusService: block production failed at height {height}: {err}");
                return;
            }
        };

        // Hand the candidate to the network collaborator for broadcast.
        if let Err(err) = block_sender.send(block.clone()) {
            warn!("ConsensusService: failed to broadcast candidate block: {err}");
        }

        if let Err(err) = engine.commit_block(&block) {
            warn!("ConsensusService: commit failed at height {height}: {err}");
            return;
        }

        match engine.finalize_block(height) {
            Ok(finalized) => {
                info!(
                    "ConsensusService: height {height} finalized with {} votes",
                    finalized.votes
                );
                Self::persist_snapshot(engine, snapshot_store);
            }
            Err(ConsensusError::Finality(_)) => {
                // Quorum not in yet; votes will retrigger finalization.
            }
            Err(err) => {
                warn!("ConsensusService: finalization failed at height {height}: {err}");
            }
        }
    }

    fn handle_vote(
        engine: &ConsensusEngine,
        snapshot_store: Option<&SnapshotStore>,
        vote: FinalityVote,
    ) {
        // Duplicate votes change nothing; skip the finalize attempt.
        if !engine.record_finality_vote(vote.height, vote.voter) {
            return;
        }
        match engine.finalize_block(vote.height) {
            Ok(finalized) => {
                info!(
                    "ConsensusService: height {} finalized with {} votes",
                    vote.height, finalized.votes
                );
                Self::persist_snapshot(engine, snapshot_store);
            }
            Err(ConsensusError::Finality(_)) => {}
            Err(ConsensusError::Chain(_)) => {
                // The vote ran ahead of our local commit; it stays recorded
                // and is counted once the block lands.
                trace!(
                    "ConsensusService: vote for height {} ahead of local chain",
                    vote.height
                );
            }
            Err(err) => {
                warn!(
                    "ConsensusService: finalization attempt failed at height {}: {err}",
                    vote.height
                );
            }
        }
    }

    fn persist_snapshot(engine: &ConsensusEngine, snapshot_store: Option<&SnapshotStore>) {
        let Some(store) = snapshot_store else {
            return;
        };
        if let Err(err) = store.persist(&engine.snapshot()) {
            warn!("ConsensusService: snapshot persistence failed: {err}");
        }
    }
}
