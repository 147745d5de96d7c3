use polish_core::{
    CorrectionMode, CorrectionResult, Effect, GateConfig, Phase, PolishError, Session,
};
use proptest::prelude::*;

fn blank_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop_oneof![Just(' '), Just('\t'), Just('\n'), Just('\r')], 0..16)
        .prop_map(|chars| chars.into_iter().collect())
}

fn any_mode() -> impl Strategy<Value = CorrectionMode> {
    prop_oneof![Just(CorrectionMode::Basic), Just(CorrectionMode::Advanced)]
}

fn dispatch_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::Dispatch(_)))
        .count()
}

proptest! {
    #[test]
    fn prop_blank_input_is_rejected(text in blank_text(), mode in any_mode()) {
        let mut session = Session::default();
        session.edit_text(text).unwrap();

        prop_assert_eq!(session.request(mode), Err(PolishError::Validation));
        prop_assert!(!session.gate().is_open());
        prop_assert_eq!(session.snapshot().last_seq, 0);
    }

    #[test]
    fn prop_basic_dispatches_exactly_once(text in "[a-zA-Z][a-zA-Z .,]{0,40}") {
        let mut session = Session::default();
        session.edit_text(text.clone()).unwrap();

        let effects = session.request(CorrectionMode::Basic).unwrap();
        prop_assert_eq!(dispatch_count(&effects), 1);
        match &effects[0] {
            Effect::Dispatch(d) => {
                prop_assert_eq!(d.request.mode(), CorrectionMode::Basic);
                prop_assert_eq!(d.request.text(), text.as_str());
            }
            other => prop_assert!(false, "unexpected effect {:?}", other),
        }
    }

    #[test]
    fn prop_locked_advanced_waits_for_full_countdown(ticks in 1u32..10, cancel_after in 0u32..10) {
        let config = GateConfig::default().with_countdown_ticks(ticks);
        let mut session = Session::new(&config);
        session.edit_text("ok so like").unwrap();

        let opened = session.request(CorrectionMode::Advanced).unwrap();
        prop_assert_eq!(dispatch_count(&opened), 0);

        let mut dispatched = 0;
        for i in 1..=ticks {
            if i == cancel_after {
                session.cancel_gate().unwrap();
            }
            dispatched += dispatch_count(&session.tick(1).unwrap());
        }

        let cancelled = cancel_after >= 1 && cancel_after <= ticks;
        prop_assert_eq!(session.is_unlocked(), !cancelled);
        prop_assert_eq!(dispatched, usize::from(!cancelled));
    }

    #[test]
    fn prop_unlock_is_monotonic(edits in proptest::collection::vec("[a-z ]{0,12}", 0..8)) {
        let mut session = Session::default();
        session.edit_text("text").unwrap();
        session.request(CorrectionMode::Advanced).unwrap();
        for _ in 0..5 {
            session.tick(1).unwrap();
        }
        prop_assert!(session.is_unlocked());

        for edit in edits {
            session.edit_text(edit).unwrap();
            let _ = session.cancel_gate();
            let _ = session.request(CorrectionMode::Advanced);
            prop_assert!(session.is_unlocked());
            prop_assert!(!session.gate().is_open());
        }
    }
}

#[test]
fn test_settlement_after_clear_is_dropped() {
    let mut session = Session::default();
    session.edit_text("text").unwrap();
    let effects = session.request(CorrectionMode::Basic).unwrap();
    let Effect::Dispatch(dispatch) = &effects[0] else {
        panic!("expected dispatch");
    };
    let seq = dispatch.seq;

    session.clear().unwrap();
    session
        .settle(seq, Ok(CorrectionResult::new("Text.")))
        .unwrap();

    assert_eq!(session.snapshot().phase, Phase::Idle);
    assert_eq!(session.copy_result(), None);
}
