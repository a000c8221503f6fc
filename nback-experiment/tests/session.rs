use nback_core::{Key, Participant, SessionPhase};
use nback_experiment::{
    RunnerEvent, SessionConfig, SessionFlow, generate_block, prepare_blocks, seeded_rng,
    target_count,
};
use nback_timing::VirtualTimer;

fn drive_until_idle(flow: &mut SessionFlow<VirtualTimer>, timer: &VirtualTimer, mut on_stimulus: impl FnMut(&mut SessionFlow<VirtualTimer>, bool)) {
    for _ in 0..100_000 {
        if flow.runner().is_none() {
            return;
        }
        timer.advance_ms(20);
        for event in flow.update() {
            if let RunnerEvent::StimulusShown { .. } = event {
                let target = flow
                    .runner()
                    .and_then(|r| r.current_trial())
                    .is_some_and(|t| t.is_target);
                on_stimulus(flow, target);
            }
        }
    }
    panic!("session did not finish");
}

#[test]
fn alpha_one_back_is_reproducible() {
    let first = generate_block(1, 15, 0.2, false, &mut seeded_rng("alpha")).unwrap();
    let second = generate_block(1, 15, 0.2, false, &mut seeded_rng("alpha")).unwrap();
    let digits = |b: &nback_experiment::Block| {
        b.trials
            .iter()
            .map(|t| (t.digit, t.is_target))
            .collect::<Vec<_>>()
    };
    assert_eq!(digits(&first), digits(&second));
    assert_eq!(first.target_positions().len(), target_count(15, 1, 0.2));
    assert_eq!(first.target_positions().len(), 3);
}

#[test]
fn every_visit_holds_invariants() {
    let config = SessionConfig::default();
    for version in 1..=5 {
        for block in prepare_blocks(&config, version, false).unwrap() {
            let n = block.n;
            assert_eq!(block.target_positions().len(), 4);
            for (i, trial) in block.trials.iter().enumerate() {
                if i < n {
                    assert!(!trial.is_target);
                } else {
                    assert_eq!(trial.is_target, trial.digit == block.trials[i - n].digit);
                }
            }
        }
    }
}

#[test]
fn silent_session_records_no_responses() {
    let timer = VirtualTimer::new(1_700_000_000_000);
    let mut flow = SessionFlow::new(SessionConfig::default(), timer.clone()).unwrap();
    flow.login(Participant::new("P07", 2, false)).unwrap();
    flow.start_training().unwrap();
    drive_until_idle(&mut flow, &timer, |_, _| {});
    assert_eq!(flow.phase(), SessionPhase::Transition);
    flow.start_experiment().unwrap();
    drive_until_idle(&mut flow, &timer, |_, _| {});

    assert!(flow.is_complete());
    let main: Vec<_> = flow.records().iter().filter(|r| !r.training).collect();
    assert_eq!(main.len(), 100);
    assert!(main.iter().all(|r| !r.response && r.reaction_time_ms.is_none()));
    assert!(main.iter().all(|r| r.accuracy == Some(!r.is_target)));
}

#[test]
fn perfect_responder_scores_every_trial() {
    let timer = VirtualTimer::new(0);
    let mut flow = SessionFlow::new(SessionConfig::default(), timer.clone()).unwrap();
    flow.login(Participant::new("P08", 4, false)).unwrap();
    flow.skip_training().unwrap();
    let press_timer = timer.clone();
    drive_until_idle(&mut flow, &timer, move |flow, target| {
        if target {
            press_timer.advance_ms(350);
            let events = flow.handle_key(Key::Space);
            assert_eq!(events, vec![RunnerEvent::ResponseRegistered { reaction_time_ms: 350 }]);
        }
    });

    assert!(flow.is_complete());
    assert!(flow.records().iter().all(|r| !r.training));
    assert!(flow.records().iter().all(|r| r.accuracy == Some(true)));
    let responded: Vec<_> = flow.records().iter().filter(|r| r.response).collect();
    assert_eq!(responded.len(), 5 * 4);
    assert!(responded.iter().all(|r| r.reaction_time_ms == Some(350)));
}
