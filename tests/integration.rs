//! Integration Tests - Full engine flows over raw announcement text
//!
//! Every scenario drives the whole path through the public API:
//! parse -> trigger -> publish -> verify -> edit.

use suitcast::engine::{InboundEvent, PredictionEngine, Publisher};
use suitcast::error::PublishError;
use suitcast::registry::MessageHandle;
use suitcast::{DispatchMode, EngineConfig, TransformPolicy};

const CHANNEL: i64 = -1_000_123;

/// Records every outward call
#[derive(Default)]
struct RecordingPublisher {
    published: Vec<String>,
    edits: Vec<(i64, String)>,
}

impl Publisher for RecordingPublisher {
    fn publish(&mut self, text: &str) -> Result<MessageHandle, PublishError> {
        self.published.push(text.to_string());
        Ok(MessageHandle(self.published.len() as i64))
    }

    fn edit(&mut self, handle: MessageHandle, text: &str) -> Result<(), PublishError> {
        self.edits.push((handle.0, text.to_string()));
        Ok(())
    }
}

fn engine(config: EngineConfig) -> PredictionEngine<RecordingPublisher> {
    PredictionEngine::new(RecordingPublisher::default(), config, CHANNEL)
        .with_policy(TransformPolicy::Simple)
}

fn feed(e: &mut PredictionEngine<RecordingPublisher>, text: &str) {
    e.handle_message(&InboundEvent {
        channel: CHANNEL,
        text: text.to_string(),
        is_edit: false,
    });
}

#[test]
fn standard_flow_trigger_then_confirm() {
    let mut e = engine(EngineConfig::default());

    // round 1219, odd; the trigger group observes K♥, predicting ♠ for 1220
    feed(&mut e, "#N 1219 (3♦ 7♣)(K♥ 2♣) ⏰");
    assert_eq!(e.publisher().published, vec!["Game:1220:♠️ statut :🔮"]);

    // finalized 1220 carries a spade in the first group: confirmed, attempt 0
    feed(&mut e, "#N 1220 (9♠ 4♦)(x) ✅");
    assert_eq!(e.publisher().edits.len(), 1);
    assert_eq!(
        e.publisher().edits[0],
        (1, "Game:1220:♠️ statut :✅0️⃣".to_string())
    );
    assert!(e.status().live.is_empty());
}

#[test]
fn replayed_messages_are_idempotent() {
    let mut e = engine(EngineConfig::default());

    // round 100, even; K♥ predicts ♦ for 101
    let announce = "#N 100 (3♦)(K♥) ⏰";
    feed(&mut e, announce);
    feed(&mut e, announce);
    assert_eq!(e.publisher().published.len(), 1, "one trigger per round");

    let result = "#N 101 (2♦)(x) ✅";
    feed(&mut e, result);
    feed(&mut e, result);
    assert_eq!(e.publisher().edits.len(), 1, "one resolution per text");
    assert_eq!(e.publisher().edits[0].1, "Game:101:♦️ statut :✅0️⃣");
}

#[test]
fn window_exhaustion_refutes_exactly_at_target_plus_width() {
    let mut config = EngineConfig::default();
    config.set_verification_window(2).unwrap();
    let mut e = engine(config);

    // round 499, odd; A♣ predicts ♦ for 500
    feed(&mut e, "#N 499 (x)(A♣) ⏰");
    assert_eq!(e.publisher().published, vec!["Game:500:♦️ statut :🔮"]);

    // rounds 500 and 501 lack diamonds: the record stays live
    feed(&mut e, "#N 500 (K♠)(x) ✅");
    feed(&mut e, "#N 501 (Q♥)(x) ✅");
    assert!(e.publisher().edits.is_empty());
    assert_eq!(e.status().live.len(), 1);

    // round 502 is the last allowed attempt: refuted there, not later
    feed(&mut e, "#N 502 (3♣)(x) ✅");
    assert_eq!(e.publisher().edits.len(), 1);
    assert_eq!(e.publisher().edits[0].1, "Game:500:♦️ statut :❌");
    assert!(e.status().live.is_empty());
}

#[test]
fn confirmation_carries_attempt_index() {
    let mut config = EngineConfig::default();
    config.set_verification_window(2).unwrap();
    let mut e = engine(config);

    feed(&mut e, "#N 499 (x)(A♣) ⏰"); // predicts ♦ for 500
    feed(&mut e, "#N 500 (K♠)(x) ✅"); // attempt 0 fails
    feed(&mut e, "#N 501 (Q♥)(x) ✅"); // attempt 1 fails
    feed(&mut e, "#N 502 (7♦)(x) ✅"); // attempt 2 confirms

    assert_eq!(e.publisher().edits.len(), 1);
    assert_eq!(e.publisher().edits[0].1, "Game:500:♦️ statut :✅2️⃣");
}

#[test]
fn gap_sequence_walkthrough() {
    let mut e = engine(EngineConfig::default());
    e.set_gap_sequence(vec![3, 4, 5]).unwrap();

    // first trigger fires on the next message and anchors at 100
    feed(&mut e, "#N 100 (x)(K♥) ⏰");
    assert_eq!(e.publisher().published.len(), 1);

    // round 102 < 103: waiting on the first gap
    feed(&mut e, "#N 102 (x)(K♥) ⏰");
    assert_eq!(e.publisher().published.len(), 1);

    // round 103 satisfies it: cursor moves to the 4, anchor moves to 103
    feed(&mut e, "#N 103 (x)(K♥) ⏰");
    assert_eq!(e.publisher().published.len(), 2);
    assert_eq!(e.config().gap_cursor, 1);
    assert_eq!(e.config().gap_anchor_round, 103);

    // round 106 < 107: waiting on the second gap
    feed(&mut e, "#N 106 (x)(K♥) ⏰");
    assert_eq!(e.publisher().published.len(), 2);
    feed(&mut e, "#N 107 (x)(K♥) ⏰");
    assert_eq!(e.publisher().published.len(), 3);
}

#[test]
fn gap_mode_fires_through_suppression() {
    let mut e = engine(EngineConfig::default());

    e.suppress_for_secs(600).unwrap();
    feed(&mut e, "#N 50 (x)(K♥) ⏰");
    assert!(
        e.publisher().published.is_empty(),
        "standard mode honors suppression"
    );

    e.set_gap_sequence(vec![3]).unwrap();
    feed(&mut e, "#N 51 (x)(K♥) ⏰");
    assert_eq!(
        e.publisher().published.len(),
        1,
        "gap mode fires as if no suppression existed"
    );
}

#[test]
fn bounded_stock_parks_then_promotes() {
    let mut e = engine(EngineConfig::default()).with_dispatch(DispatchMode::BoundedStock {
        max_active: 1,
        proximity: 3,
    });

    // first trigger fills the stock: prediction for 101 live
    feed(&mut e, "#N 100 (x)(K♥) ⏰");
    assert_eq!(e.publisher().published.len(), 1);
    assert_eq!(e.status().live.len(), 1);

    // stock full: the trigger for 106 parks instead of publishing
    feed(&mut e, "#N 105 (x)(A♣) ⏰");
    assert_eq!(e.publisher().published.len(), 1);
    assert_eq!(e.status().queued.len(), 1);

    // finalized 101 resolves the live record; 106 is still 5 rounds out,
    // beyond the proximity band, so it stays parked
    feed(&mut e, "#N 101 (9♠)(x) ✅");
    assert!(e.status().live.is_empty());
    assert_eq!(e.status().queued.len(), 1);

    // at round 103 the queued target is 3 rounds away: promoted and published
    feed(&mut e, "#N 103 (9♠)(x) ✅");
    assert_eq!(e.publisher().published.len(), 2);
    assert_eq!(e.publisher().published[1], "Game:106:♦️ statut :🔮");
    assert!(e.status().queued.is_empty());
}

#[test]
fn bounded_stock_drops_missed_send_window() {
    let mut e = engine(EngineConfig::default()).with_dispatch(DispatchMode::BoundedStock {
        max_active: 1,
        proximity: 3,
    });

    feed(&mut e, "#N 100 (x)(K♥) ⏰"); // live prediction for 101
    feed(&mut e, "#N 105 (x)(A♣) ⏰"); // parked prediction for 106
    assert_eq!(e.status().queued.len(), 1);

    // finalized 101 refutes the live record; 106 is still 5 rounds out,
    // beyond the proximity band, so it stays parked
    feed(&mut e, "#N 101 (9♠)(x) ✅");
    assert!(e.status().live.is_empty());
    assert_eq!(e.status().queued.len(), 1);

    // by the finalized 105 the parked target 106 is only 1 round away:
    // discarded, not retried, despite the stock having room
    feed(&mut e, "#N 105 (nothing)(x) ✅");
    assert!(e.status().queued.is_empty());
    assert_eq!(
        e.publisher().published.len(),
        1,
        "dropped entry never published"
    );
}

#[test]
fn edited_finalized_text_drives_verification_once() {
    let mut config = EngineConfig::default();
    config.set_verification_window(1).unwrap();
    let mut e = engine(config);

    feed(&mut e, "#N 201 (x)(K♥) ⏰"); // odd round, predicts ♠ for 202

    // first finalized version lacks the spade: attempt 0 fails quietly
    feed(&mut e, "#N 202 (9♦)(x) ✅");
    assert!(e.publisher().edits.is_empty());

    // edited text for the same round carries a spade: same round, new
    // fingerprint, verified exactly once
    let edited = "#N 202 (9♦ A♠)(x) ✅";
    feed(&mut e, edited);
    feed(&mut e, edited);
    assert_eq!(e.publisher().edits.len(), 1);
    assert_eq!(e.publisher().edits[0].1, "Game:202:♠️ statut :✅0️⃣");
}

#[test]
fn config_round_trip_resumes_gap_sequence() {
    let path = std::env::temp_dir().join("suitcast_integration_config.json");
    let _ = std::fs::remove_file(&path);

    {
        let mut e = engine(EngineConfig::load(&path).unwrap()).with_config_path(path.clone());
        e.set_gap_sequence(vec![3, 4, 5]).unwrap();
        feed(&mut e, "#N 100 (x)(K♥) ⏰");
        feed(&mut e, "#N 103 (x)(K♥) ⏰");
        assert_eq!(e.config().gap_cursor, 1);
    }

    // a fresh process loads the persisted state and resumes mid-sequence
    let reloaded = EngineConfig::load(&path).unwrap();
    assert!(reloaded.gap_sequence_active);
    assert_eq!(reloaded.gap_sequence, vec![3, 4, 5]);
    assert_eq!(reloaded.gap_cursor, 1);
    assert_eq!(reloaded.gap_anchor_round, 103);
    assert!(reloaded.gap_first_fire_done);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn both_policies_agree_on_odd_round_heart_king() {
    for policy in [TransformPolicy::Simple, TransformPolicy::Extended] {
        let mut e = engine(EngineConfig::default()).with_policy(policy);
        feed(&mut e, "#N 1219 (3♦)(K♥ 2♣) ⏰");
        assert_eq!(
            e.publisher().published[0],
            "Game:1220:♠️ statut :🔮",
            "{:?} policy must predict spade here",
            policy
        );
    }
}
