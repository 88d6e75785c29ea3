//! Integration tests for BFT quorum arithmetic and vote handling.

use {
    crate::harness::{produce_and_commit, ZenTestHarness},
    solana_pubkey::Pubkey,
    zen_consensus::{quorum_size, ConsensusError, FinalityError},
};

// ═══════════════════════════════════════════════════════════════════════════
//  1. Quorum arithmetic: required = floor(2n/3) + 1
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_quorum_size_table() {
    // (roster size, required votes, tolerated Byzantine validators)
    let cases = [
        (1, 1, 0),
        (2, 2, 0),
        (3, 3, 0),
        (4, 3, 1),
        (7, 5, 2),
        (10, 7, 3),
        (100, 67, 33),
    ];
    for (n, required, tolerated) in cases {
        assert_eq!(quorum_size(n), required, "n={n}");
        assert_eq!((n - 1) / 3, tolerated, "n={n}");
    }
}

#[test]
fn test_ten_validators_finalize_at_exactly_seven_votes() {
    let harness = ZenTestHarness::new(10);
    let engine = harness.build_engine();
    let addresses = harness.addresses();
    produce_and_commit(&engine, 1);

    // Six votes: one short of floor(20/3) + 1 = 7.
    for address in &addresses[..6] {
        engine.record_finality_vote(1, *address);
    }
    assert_eq!(
        engine.finalize_block(1).unwrap_err(),
        ConsensusError::Finality(FinalityError::InsufficientSignatures { have: 6, need: 7 })
    );

    // The seventh unique vote crosses the threshold.
    engine.record_finality_vote(1, addresses[6]);
    let finalized = engine.finalize_block(1).unwrap();
    assert_eq!(finalized.votes, 7);
}

// ═══════════════════════════════════════════════════════════════════════════
//  2. Vote deduplication
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_duplicate_votes_tally_once() {
    let harness = ZenTestHarness::new(10);
    let engine = harness.build_engine();
    let addresses = harness.addresses();
    produce_and_commit(&engine, 1);

    // One validator voting ten times is still one vote.
    for _ in 0..10 {
        engine.record_finality_vote(1, addresses[0]);
    }
    assert_eq!(
        engine.finalize_block(1).unwrap_err(),
        ConsensusError::Finality(FinalityError::InsufficientSignatures { have: 1, need: 7 })
    );
}

#[test]
fn test_duplicates_never_substitute_for_unique_voters() {
    let harness = ZenTestHarness::new(4);
    let engine = harness.build_engine();
    let addresses = harness.addresses();
    produce_and_commit(&engine, 1);

    // Two validators spamming votes cannot reach the 3-vote quorum.
    for _ in 0..5 {
        engine.record_finality_vote(1, addresses[0]);
        engine.record_finality_vote(1, addresses[1]);
    }
    assert_eq!(
        engine.finalize_block(1).unwrap_err(),
        ConsensusError::Finality(FinalityError::InsufficientSignatures { have: 2, need: 3 })
    );
}

// ═══════════════════════════════════════════════════════════════════════════
//  3. Vote timing and membership
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_votes_recorded_before_commit_still_count() {
    let harness = ZenTestHarness::new(4);
    let engine = harness.build_engine();
    let addresses = harness.addresses();

    // Network reordering: votes land before this node commits the block.
    for address in &addresses[..3] {
        engine.record_finality_vote(1, *address);
    }
    produce_and_commit(&engine, 1);
    let finalized = engine.finalize_block(1).unwrap();
    assert_eq!(finalized.votes, 3);
}

#[test]
fn test_evicted_validator_votes_stop_counting() {
    let harness = ZenTestHarness::new(4);
    let engine = harness.build_engine();
    let addresses = harness.addresses();
    produce_and_commit(&engine, 1);

    for address in &addresses[..3] {
        engine.record_finality_vote(1, *address);
    }
    // One of the three voters leaves the roster before finalization.
    engine.remove_validator(&addresses[0]).unwrap();

    // 3 remaining validators still require 3 votes; only 2 counted ones
    // are in hand.
    assert_eq!(
        engine.finalize_block(1).unwrap_err(),
        ConsensusError::Finality(FinalityError::InsufficientSignatures { have: 2, need: 3 })
    );
}

#[test]
fn test_unknown_identities_never_count() {
    let harness = ZenTestHarness::new(4);
    let engine = harness.build_engine();
    produce_and_commit(&engine, 1);

    for _ in 0..10 {
        engine.record_finality_vote(1, Pubkey::new_unique());
    }
    assert_eq!(
        engine.finalize_block(1).unwrap_err(),
        ConsensusError::Finality(FinalityError::InsufficientSignatures { have: 0, need: 3 })
    );
}

#[test]
fn test_votes_are_per_height() {
    let harness = ZenTestHarness::new(4);
    let engine = harness.build_engine();
    let addresses = harness.addresses();

    produce_and_commit(&engine, 1);
    for address in &addresses[..3] {
        engine.record_finality_vote(1, *address);
    }
    engine.finalize_block(1).unwrap();

    // Height 2 starts from an empty tally; height 1 votes don't leak.
    produce_and_commit(&engine, 2);
    assert_eq!(
        engine.finalize_block(2).unwrap_err(),
        ConsensusError::Finality(FinalityError::InsufficientSignatures { have: 0, need: 3 })
    );
}
