use nback_core::Participant;
use nback_data::{EXPORT_HEADERS, ExportError, Roster, export_records};
use nback_experiment::{SessionConfig, SessionFlow};
use nback_timing::VirtualTimer;

fn run_silent_session(participant: Participant, with_tutorial: bool) -> SessionFlow<VirtualTimer> {
    let timer = VirtualTimer::new(1_700_000_000_000);
    let mut flow = SessionFlow::new(SessionConfig::default(), timer.clone()).unwrap();
    flow.login(participant).unwrap();
    if with_tutorial {
        flow.start_training().unwrap();
        while flow.runner().is_some() {
            timer.advance_ms(50);
            flow.update();
        }
        flow.start_experiment().unwrap();
    } else {
        flow.skip_training().unwrap();
    }
    while flow.runner().is_some() {
        timer.advance_ms(50);
        flow.update();
    }
    assert!(flow.is_complete());
    flow
}

#[test]
fn silent_session_exports_one_row_per_main_trial() {
    let flow = run_silent_session(Participant::new("P042", 2, true), true);
    assert!(flow.records().iter().any(|r| r.training));

    let dir = tempfile::tempdir().unwrap();
    let path = export_records(flow.records(), dir.path()).unwrap();
    assert_eq!(path, dir.path().join("nback_P042_v2.csv"));

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), EXPORT_HEADERS.to_vec());
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 100);
    for row in &rows {
        assert_eq!(&row[0], "P042");
        assert_eq!(&row[1], "2");
        assert_eq!(&row[6], "False");
        assert_eq!(&row[8], "");
        assert_eq!(&row[11], "False");
    }
    let levels: Vec<&str> = rows.iter().map(|r| r.get(2).unwrap()).collect();
    assert_eq!(levels.first(), Some(&"1"));
    assert_eq!(levels.last(), Some(&"5"));

    // no temp files left behind
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn export_replaces_previous_file() {
    let flow = run_silent_session(Participant::new("P043", 3, false), false);
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nback_P043_v3.csv");
    std::fs::write(&target, "stale").unwrap();
    export_records(flow.records(), dir.path()).unwrap();
    let text = std::fs::read_to_string(&target).unwrap();
    assert!(text.starts_with("Participant ID,"));
    assert_eq!(text.lines().count(), 101);
}

#[test]
fn tutorial_only_records_are_not_exported() {
    let timer = VirtualTimer::new(0);
    let mut flow = SessionFlow::new(SessionConfig::default(), timer.clone()).unwrap();
    flow.login(Participant::new("P044", 1, true)).unwrap();
    flow.start_training().unwrap();
    while flow.runner().is_some() {
        timer.advance_ms(50);
        flow.update();
    }
    let dir = tempfile::tempdir().unwrap();
    let err = export_records(flow.records(), dir.path()).unwrap_err();
    assert!(matches!(err, ExportError::NoExperimentalData));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn roster_login_feeds_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("sample_sheet.csv");
    std::fs::write(
        &sheet,
        "Participant,Participant iD,Trial Number\nMarie Curie,MC01,3\n",
    )
    .unwrap();
    let participant = Roster::load(&sheet).unwrap().lookup("marie", "CURIE").unwrap();
    assert_eq!(participant.version, 4);
    let flow = run_silent_session(participant, false);
    assert!(flow.records().iter().all(|r| r.participant_id == "MC01" && r.version == 4));
}
