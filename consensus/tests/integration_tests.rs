//! End-to-end tests driving the engine the way an embedding service would:
//! open accounts → submit claims → stake → resolve → inspect balances and
//! reputation.

use verity_consensus::{ClaimDraft, ClaimStatus, ConsensusEngine, ConsensusError, EngineConfig};
use verity_ledger::LedgerError;
use verity_reputation::Reputation;
use verity_types::{ClaimCategory, ClaimId, ParticipantId, Side, Timestamp, VrtAmount};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const NOW: Timestamp = Timestamp::new(1_700_000_000);

fn vrt(tokens: u64) -> VrtAmount {
    VrtAmount::from_tokens(tokens)
}

fn pid(name: &str) -> ParticipantId {
    ParticipantId::new(name)
}

/// Engine with an `author` (10 VRT) and the given participants.
fn setup(participants: &[(&str, u64)]) -> ConsensusEngine {
    let engine = ConsensusEngine::new();
    engine.open_account(pid("author"), vrt(10)).unwrap();
    for (name, tokens) in participants {
        engine.open_account(pid(name), vrt(*tokens)).unwrap();
    }
    engine
}

fn post(engine: &ConsensusEngine) -> ClaimId {
    let draft = ClaimDraft::new("Global sea levels rose 20cm since 1900", "Per NOAA data.")
        .with_category(ClaimCategory::Climate)
        .with_source("https://www.noaa.gov");
    engine.submit_claim(&pid("author"), draft, NOW).unwrap()
}

// ---------------------------------------------------------------------------
// Worked scenarios
// ---------------------------------------------------------------------------

#[test]
fn tie_between_equal_stakers_goes_to_dispute() {
    let engine = setup(&[("a", 100), ("b", 100)]);
    let claim = post(&engine);
    engine.place_stake(claim, &pid("a"), Side::Verify, vrt(10), NOW).unwrap();
    engine.place_stake(claim, &pid("b"), Side::Dispute, vrt(10), NOW).unwrap();

    let record = engine.resolve(claim, NOW).unwrap();

    assert!(!record.outcome);
    assert_eq!(record.winning_side(), Side::Dispute);
    assert_eq!(record.total_weight_verify, record.total_weight_dispute);
    assert_eq!(record.reward_pool, vrt(2));
    assert_eq!(record.payout(&pid("b")), vrt(2));
    assert_eq!(record.payout(&pid("a")), VrtAmount::ZERO);
    assert_eq!(record.retained, vrt(18));

    assert_eq!(engine.reputation().get(&pid("a")).value(), 45.0);
    assert_eq!(engine.reputation().get(&pid("b")).value(), 52.5);
    assert_eq!(engine.ledger().balance(&pid("a")).unwrap(), vrt(90));
    assert_eq!(engine.ledger().balance(&pid("b")).unwrap(), vrt(92));
    assert_eq!(engine.claim(claim).unwrap().status, ClaimStatus::Resolved);
}

#[test]
fn reward_scales_with_losing_stake() {
    let engine = setup(&[("expert", 100), ("loser", 100)]);
    engine
        .reputation()
        .insert(pid("expert"), Reputation::new(80.0));
    let claim = post(&engine);
    engine.place_stake(claim, &pid("expert"), Side::Verify, vrt(10), NOW).unwrap();
    engine.place_stake(claim, &pid("loser"), Side::Dispute, vrt(5), NOW).unwrap();

    let record = engine.resolve(claim, NOW).unwrap();

    assert!(record.outcome);
    assert_eq!(record.reward_pool, vrt(1));
    assert_eq!(record.payout(&pid("expert")), vrt(1));
    assert_eq!(record.payout_total(), vrt(1));
    assert_eq!(engine.ledger().balance(&pid("expert")).unwrap(), vrt(91));
    assert_eq!(engine.reputation().get(&pid("expert")).value(), 81.0);
}

#[test]
fn tokens_are_conserved_across_a_resolution() {
    let engine = setup(&[("a", 100), ("b", 100), ("c", 40)]);
    let before = engine.ledger().total_holdings();

    let claim = post(&engine);
    engine.place_stake(claim, &pid("a"), Side::Verify, vrt(33), NOW).unwrap();
    engine.place_stake(claim, &pid("b"), Side::Dispute, vrt(7), NOW).unwrap();
    engine.place_stake(claim, &pid("c"), Side::Verify, vrt(3), NOW).unwrap();
    let record = engine.resolve(claim, NOW).unwrap();

    assert_eq!(
        record.payout_total() + record.retained,
        record.verify_total + record.dispute_total
    );
    assert_eq!(engine.ledger().total_holdings(), before);
}

// ---------------------------------------------------------------------------
// Resolution rules
// ---------------------------------------------------------------------------

#[test]
fn second_resolve_fails_and_first_record_stands() {
    let engine = setup(&[("a", 100), ("b", 100)]);
    let claim = post(&engine);
    engine.place_stake(claim, &pid("a"), Side::Verify, vrt(20), NOW).unwrap();
    engine.place_stake(claim, &pid("b"), Side::Dispute, vrt(10), NOW).unwrap();

    let first = engine.resolve(claim, NOW).unwrap();
    let balance_a = engine.ledger().balance(&pid("a")).unwrap();
    let rep_a = engine.reputation().get(&pid("a"));

    let again = engine.resolve(claim, Timestamp::new(NOW.as_secs() + 60));
    assert_eq!(again, Err(ConsensusError::AlreadyResolved(claim)));
    assert_eq!(engine.resolution(claim), Some(first));
    assert_eq!(engine.ledger().balance(&pid("a")).unwrap(), balance_a);
    assert_eq!(engine.reputation().get(&pid("a")), rep_a);
}

#[test]
fn ties_resolve_the_same_way_every_time() {
    for _ in 0..20 {
        let engine = setup(&[("a", 100), ("b", 100), ("c", 100)]);
        engine.reputation().insert(pid("a"), Reputation::new(60.0));
        engine.reputation().insert(pid("b"), Reputation::new(40.0));
        engine.reputation().insert(pid("c"), Reputation::new(80.0));
        let claim = post(&engine);
        // 10·60 + 5·40 = 800 = 10·80
        engine.place_stake(claim, &pid("a"), Side::Verify, vrt(10), NOW).unwrap();
        engine.place_stake(claim, &pid("b"), Side::Verify, vrt(5), NOW).unwrap();
        engine.place_stake(claim, &pid("c"), Side::Dispute, vrt(10), NOW).unwrap();

        let record = engine.resolve(claim, NOW).unwrap();
        assert_eq!(record.total_weight_verify, record.total_weight_dispute);
        assert!(!record.outcome);
        assert_eq!(record.payout(&pid("c")), vrt(3));
    }
}

#[test]
fn reputation_is_read_at_resolution_time() {
    let engine = setup(&[("a", 100), ("b", 100)]);
    let claim = post(&engine);
    engine.place_stake(claim, &pid("a"), Side::Verify, vrt(10), NOW).unwrap();
    engine.place_stake(claim, &pid("b"), Side::Dispute, vrt(10), NOW).unwrap();

    // Equal at stake time; a's standing improves before resolution.
    engine.reputation().insert(pid("a"), Reputation::new(70.0));
    let record = engine.resolve(claim, NOW).unwrap();
    assert!(record.outcome);
    assert_eq!(record.payout(&pid("a")), vrt(2));
}

#[test]
fn sub_micro_reputation_edge_decides_the_claim() {
    let engine = setup(&[("v", 100), ("d", 100)]);
    engine.reputation().insert(pid("v"), Reputation::new(50.000_000_4));
    let claim = post(&engine);
    engine.place_stake(claim, &pid("v"), Side::Verify, vrt(10), NOW).unwrap();
    engine.place_stake(claim, &pid("d"), Side::Dispute, vrt(10), NOW).unwrap();

    let record = engine.resolve(claim, NOW).unwrap();
    assert!(record.total_weight_verify > record.total_weight_dispute);
    assert!(record.outcome);
    assert_eq!(record.payout(&pid("v")), vrt(2));
}

#[test]
fn one_sided_claim_rewards_nothing_but_reputation() {
    let engine = setup(&[("a", 100), ("b", 100)]);
    let claim = post(&engine);
    engine.place_stake(claim, &pid("a"), Side::Verify, vrt(10), NOW).unwrap();
    engine.place_stake(claim, &pid("b"), Side::Verify, vrt(15), NOW).unwrap();

    let record = engine.resolve(claim, NOW).unwrap();
    assert!(record.outcome);
    assert_eq!(record.reward_pool, VrtAmount::ZERO);
    assert_eq!(engine.ledger().sum_by_side(claim, Side::Dispute), VrtAmount::ZERO);
    assert!(record.reputation_changes.iter().all(|c| c.correct));
    assert_eq!(engine.reputation().get(&pid("a")).value(), 52.5);
    assert_eq!(engine.reputation().get(&pid("b")).value(), 52.5);
}

#[test]
fn claim_without_stakes_stays_open() {
    let engine = setup(&[("a", 100)]);
    let claim = post(&engine);
    assert_eq!(engine.resolve(claim, NOW), Err(ConsensusError::NoStakes(claim)));
    assert_eq!(engine.claim(claim).unwrap().status, ClaimStatus::Open);

    // Still usable afterwards.
    engine.cast_vote(claim, &pid("a"), Side::Dispute, NOW).unwrap();
    assert!(!engine.resolve(claim, NOW).unwrap().outcome);
}

// ---------------------------------------------------------------------------
// Staking failures
// ---------------------------------------------------------------------------

#[test]
fn failed_stakes_leave_no_trace() {
    let engine = setup(&[("a", 15)]);
    let claim = post(&engine);

    let zero = engine.place_stake(claim, &pid("a"), Side::Verify, VrtAmount::ZERO, NOW);
    assert_eq!(
        zero,
        Err(ConsensusError::Ledger(LedgerError::InvalidAmount(VrtAmount::ZERO)))
    );
    let too_much = engine.place_stake(claim, &pid("a"), Side::Verify, vrt(16), NOW);
    assert_eq!(
        too_much,
        Err(ConsensusError::Ledger(LedgerError::InsufficientBalance {
            needed: vrt(16),
            available: vrt(15),
        }))
    );
    let stranger = engine.place_stake(claim, &pid("ghost"), Side::Verify, vrt(1), NOW);
    assert!(matches!(
        stranger,
        Err(ConsensusError::Ledger(LedgerError::UnknownParticipant(_)))
    ));

    assert_eq!(engine.ledger().balance(&pid("a")).unwrap(), vrt(15));
    assert!(engine.ledger().stakes_for_claim(claim).is_empty());
    assert_eq!(engine.stats().stakes_rejected, 3);
    assert_eq!(engine.stats().stakes_recorded, 0);
}

#[test]
fn repeated_stakes_accumulate_per_side() {
    let engine = setup(&[("a", 100)]);
    let claim = post(&engine);
    engine.cast_vote(claim, &pid("a"), Side::Verify, NOW).unwrap();
    engine.place_stake(claim, &pid("a"), Side::Verify, vrt(5), NOW).unwrap();

    assert_eq!(engine.claim_totals(claim).unwrap(), (vrt(15), VrtAmount::ZERO));
    assert_eq!(engine.ledger().stakes_for_claim(claim).len(), 2);
    assert_eq!(engine.stats().total_staked, vrt(15));
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn engine_honours_configured_params() {
    let config = EngineConfig::from_toml_str(
        r#"
        [params]
        post_cost = "0"
        redistribution_rate_bps = 5000
        "#,
    )
    .unwrap();
    let engine = ConsensusEngine::from_config(&config).unwrap();
    engine.open_account(pid("author"), VrtAmount::ZERO).unwrap();
    engine.open_account(pid("a"), vrt(100)).unwrap();
    engine.open_account(pid("b"), vrt(100)).unwrap();

    let claim = engine
        .submit_claim(&pid("author"), ClaimDraft::new("free", "post"), NOW)
        .unwrap();
    engine.place_stake(claim, &pid("a"), Side::Verify, vrt(10), NOW).unwrap();
    engine.place_stake(claim, &pid("b"), Side::Dispute, vrt(10), NOW).unwrap();

    let record = engine.resolve(claim, NOW).unwrap();
    assert_eq!(record.reward_pool, vrt(5));
    assert_eq!(engine.ledger().reserve(), vrt(15));
}
