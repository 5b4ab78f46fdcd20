use screening::workflow::assessment::{
    AssessmentPayload, Criterion, DocumentFlag, DocumentKind, DocumentationResult, MedicalResult,
    MedicalTest, PointScores, TestOutcome, Verdict,
};
use screening::workflow::candidate::{
    ActorId, ApplicationNumber, CandidateStatus, ServiceArm, Sex, StageStatus, StateCode,
};
use screening::workflow::intake::{CandidateIntake, RosterImporter};
use screening::workflow::memory::InMemoryScreeningRepository;
use screening::workflow::registry::Stage;
use screening::workflow::service::{ScreeningError, ScreeningService};
use std::sync::Arc;

fn officer() -> ActorId {
    ActorId("officer-014".to_string())
}

fn admin() -> ActorId {
    ActorId("admin-1".to_string())
}

fn service() -> ScreeningService<InMemoryScreeningRepository> {
    ScreeningService::new(Arc::new(InMemoryScreeningRepository::default()))
}

fn intake(app: &str, jamb: &str, state: &str) -> CandidateIntake {
    CandidateIntake {
        application_number: app.to_string(),
        jamb_number: jamb.to_string(),
        surname: "Bello".to_string(),
        first_name: "Sani".to_string(),
        middle_name: None,
        sex: Sex::Male,
        state: state.to_string(),
        first_choice: ServiceArm::Army,
        second_choice: ServiceArm::Navy,
        profile_image: None,
    }
}

fn clean_documentation() -> AssessmentPayload {
    AssessmentPayload::Documentation(DocumentationResult {
        verified: DocumentKind::required().into_iter().collect(),
        flags: Vec::new(),
        all_documents_confirmed: true,
        no_flags_confirmed: true,
        remarks: None,
    })
}

fn fit_medical() -> AssessmentPayload {
    AssessmentPayload::Medical(MedicalResult {
        findings: MedicalTest::required()
            .into_iter()
            .map(|test| (test, TestOutcome::Fit))
            .collect(),
        remarks: None,
    })
}

fn scores(stage: Stage, pairs: &[(Criterion, u8)]) -> AssessmentPayload {
    let sheet = PointScores {
        scores: pairs.iter().copied().collect(),
        remarks: None,
    };
    match stage {
        Stage::Physical => AssessmentPayload::Physical(sheet),
        Stage::SandModelling => AssessmentPayload::SandModelling(sheet),
        Stage::Interview => AssessmentPayload::Interview(sheet),
        other => panic!("{other} is not a point-scored stage"),
    }
}

fn physical_31() -> AssessmentPayload {
    scores(
        Stage::Physical,
        &[
            (Criterion::Race, 10),
            (Criterion::IndividualObstacle, 8),
            (Criterion::GroupObstacle, 6),
            (Criterion::RopeClimb, 7),
        ],
    )
}

fn sand_15() -> AssessmentPayload {
    scores(
        Stage::SandModelling,
        &[(Criterion::TerrainModel, 8), (Criterion::Briefing, 7)],
    )
}

fn interview_33() -> AssessmentPayload {
    scores(
        Stage::Interview,
        &[
            (Criterion::Bearing, 8),
            (Criterion::Communication, 9),
            (Criterion::GeneralKnowledge, 8),
            (Criterion::Motivation, 8),
        ],
    )
}

fn run_full_screening(
    service: &ScreeningService<InMemoryScreeningRepository>,
    candidate: &ApplicationNumber,
) {
    for (stage, payload) in [
        (Stage::Documentation, clean_documentation()),
        (Stage::Medical, fit_medical()),
        (Stage::Physical, physical_31()),
        (Stage::SandModelling, sand_15()),
        (Stage::Interview, interview_33()),
    ] {
        service
            .submit_assessment(candidate, stage, payload, &officer())
            .unwrap_or_else(|err| panic!("{stage} submission failed: {err}"));
    }
}

#[test]
fn documentation_pass_creates_pending_medical_entry() {
    let service = service();
    let candidate = service
        .register_candidate(intake("NDA-2026-0001", "30445986GF", "KD"), &admin())
        .expect("registers");

    let outcome = service
        .submit_assessment(
            &candidate.application_number,
            Stage::Documentation,
            clean_documentation(),
            &officer(),
        )
        .expect("documentation accepted");

    assert_eq!(outcome.verdict, Verdict::Pass);
    assert_eq!(outcome.advanced_to, Some(Stage::Medical));

    let progress = service
        .candidate_progress(&candidate.application_number)
        .expect("progress");
    let medical = progress
        .ledger
        .iter()
        .find(|entry| entry.stage == Stage::Medical)
        .expect("medical ledger row present");
    assert_eq!(medical.status, StageStatus::Pending);
}

#[test]
fn medical_failure_disqualifies_with_reason() {
    let service = service();
    let candidate = service
        .register_candidate(intake("NDA-2026-0001", "30445986GF", "KD"), &admin())
        .expect("registers");
    service
        .submit_assessment(
            &candidate.application_number,
            Stage::Documentation,
            clean_documentation(),
            &officer(),
        )
        .expect("documentation accepted");

    let mut findings: std::collections::BTreeMap<_, _> = MedicalTest::required()
        .into_iter()
        .map(|test| (test, TestOutcome::Fit))
        .collect();
    findings.insert(
        MedicalTest::BloodPressure,
        TestOutcome::Failed {
            reason: "Hypertensive".to_string(),
        },
    );

    let outcome = service
        .submit_assessment(
            &candidate.application_number,
            Stage::Medical,
            AssessmentPayload::Medical(MedicalResult {
                findings,
                remarks: None,
            }),
            &officer(),
        )
        .expect("medical recorded");

    match &outcome.verdict {
        Verdict::Fail { reason } => assert!(reason.contains("Hypertensive")),
        other => panic!("expected fail verdict, got {other:?}"),
    }
    assert_eq!(outcome.candidate_status, CandidateStatus::Disqualified);

    let progress = service
        .candidate_progress(&candidate.application_number)
        .expect("progress");
    assert!(
        !progress
            .ledger
            .iter()
            .any(|entry| entry.stage == Stage::Physical),
        "no physical row may exist after a medical failure"
    );
}

#[test]
fn physical_scores_store_total_and_advance() {
    let service = service();
    let candidate = service
        .register_candidate(intake("NDA-2026-0002", "30445987GF", "KD"), &admin())
        .expect("registers");
    service
        .submit_assessment(
            &candidate.application_number,
            Stage::Documentation,
            clean_documentation(),
            &officer(),
        )
        .expect("documentation accepted");
    service
        .submit_assessment(
            &candidate.application_number,
            Stage::Medical,
            fit_medical(),
            &officer(),
        )
        .expect("medical passes");

    let outcome = service
        .submit_assessment(
            &candidate.application_number,
            Stage::Physical,
            physical_31(),
            &officer(),
        )
        .expect("physical recorded");

    assert_eq!(outcome.verdict, Verdict::Completed { total: 31 });
    assert_eq!(outcome.advanced_to, Some(Stage::SandModelling));
}

#[test]
fn locked_stage_blocks_eligible_candidate() {
    let service = service();
    let candidate = service
        .register_candidate(intake("NDA-2026-0001", "30445986GF", "KD"), &admin())
        .expect("registers");
    service
        .submit_assessment(
            &candidate.application_number,
            Stage::Documentation,
            clean_documentation(),
            &officer(),
        )
        .expect("documentation accepted");
    service
        .submit_assessment(
            &candidate.application_number,
            Stage::Medical,
            fit_medical(),
            &officer(),
        )
        .expect("medical passes");

    assert!(!service.toggle_stage(Stage::Physical, &admin()));

    match service.submit_assessment(
        &candidate.application_number,
        Stage::Physical,
        physical_31(),
        &officer(),
    ) {
        Err(ScreeningError::StageLocked { stage }) => assert_eq!(stage, Stage::Physical),
        other => panic!("expected locked stage rejection, got {other:?}"),
    }

    let progress = service
        .candidate_progress(&candidate.application_number)
        .expect("progress");
    assert!(
        progress
            .assessments
            .iter()
            .all(|record| record.stage != Stage::Physical),
        "no physical assessment may be written while locked"
    );
    // The candidate stays admitted and is assessable once unlocked.
    assert!(service.toggle_stage(Stage::Physical, &admin()));
    service
        .submit_assessment(
            &candidate.application_number,
            Stage::Physical,
            physical_31(),
            &officer(),
        )
        .expect("accepted after unlock");
}

#[test]
fn full_screening_completes_candidate_and_ranks_within_state() {
    let service = service();
    let candidate = service
        .register_candidate(intake("NDA-2026-0001", "30445986GF", "KD"), &admin())
        .expect("registers");
    run_full_screening(&service, &candidate.application_number);

    let progress = service
        .candidate_progress(&candidate.application_number)
        .expect("progress");
    assert_eq!(progress.candidate.status, CandidateStatus::Completed);

    let scores = service
        .final_scores(Some(&StateCode("KD".to_string())))
        .expect("scores");
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].physical, Some(31));
    assert_eq!(scores[0].sand_modelling, Some(15));
    assert_eq!(scores[0].interview, Some(33));
    assert_eq!(scores[0].total, 79);
    assert_eq!(scores[0].rank_within_state, Some(1));
}

#[test]
fn repeated_pass_submissions_leave_single_next_stage_row() {
    let service = service();
    let candidate = service
        .register_candidate(intake("NDA-2026-0001", "30445986GF", "KD"), &admin())
        .expect("registers");

    for _ in 0..2 {
        service
            .submit_assessment(
                &candidate.application_number,
                Stage::Documentation,
                clean_documentation(),
                &officer(),
            )
            .expect("documentation accepted");
    }

    let progress = service
        .candidate_progress(&candidate.application_number)
        .expect("progress");
    assert_eq!(
        progress
            .ledger
            .iter()
            .filter(|entry| entry.stage == Stage::Medical)
            .count(),
        1,
        "duplicate submissions must not duplicate the medical row"
    );
}

#[test]
fn racing_identical_pass_submissions_create_one_medical_row() {
    let service = Arc::new(service());
    let candidate = service
        .register_candidate(intake("NDA-2026-0001", "30445986GF", "KD"), &admin())
        .expect("registers");
    let application_number = candidate.application_number;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            let candidate = application_number.clone();
            std::thread::spawn(move || {
                service.submit_assessment(
                    &candidate,
                    Stage::Documentation,
                    clean_documentation(),
                    &officer(),
                )
            })
        })
        .collect();
    for handle in handles {
        handle
            .join()
            .expect("submission thread")
            .expect("submission accepted");
    }

    let progress = service
        .candidate_progress(&application_number)
        .expect("progress");
    assert_eq!(
        progress
            .ledger
            .iter()
            .filter(|entry| entry.stage == Stage::Medical)
            .count(),
        1,
        "concurrent identical passes must admit to medical exactly once"
    );
}

#[test]
fn flagged_documentation_disqualifies_and_is_audited() {
    let service = service();
    let candidate = service
        .register_candidate(intake("NDA-2026-0001", "30445986GF", "KD"), &admin())
        .expect("registers");

    let flagged = AssessmentPayload::Documentation(DocumentationResult {
        verified: DocumentKind::required().into_iter().collect(),
        flags: vec![DocumentFlag {
            document: DocumentKind::BirthCertificate,
            reason: "Altered date of birth".to_string(),
        }],
        all_documents_confirmed: true,
        no_flags_confirmed: false,
        remarks: None,
    });

    let outcome = service
        .submit_assessment(
            &candidate.application_number,
            Stage::Documentation,
            flagged,
            &officer(),
        )
        .expect("flagged submission recorded");
    assert!(matches!(outcome.verdict, Verdict::Fail { .. }));
    assert_eq!(outcome.candidate_status, CandidateStatus::Disqualified);

    let history = service
        .assessment_history(&candidate.application_number)
        .expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].assessed_by, officer());
}

#[test]
fn roster_import_registers_valid_rows_and_reports_bad_ones() {
    let service = service();
    let csv = "\
application_number,jamb_number,surname,first_name,middle_name,sex,state,first_choice,second_choice
NDA-2026-0001,30445986GF,Bello,Sani,,male,KD,army,navy
NDA-2026-0002,30445987AB,Okafor,Chidi,Emeka,male,AN,navy,air_force
NDA-2026-0003,badjamb,Musa,Aliyu,,male,KD,army,air_force
";

    let summary = RosterImporter::import_from_reader(&service, csv.as_bytes(), &admin())
        .expect("roster parses");

    assert_eq!(summary.registered.len(), 2);
    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(summary.rejected[0].line, 4);
    assert!(summary.rejected[0].message.contains("JAMB"));

    let first = service
        .candidate_progress(&ApplicationNumber("NDA-2026-0001".to_string()))
        .expect("progress");
    assert_eq!(first.candidate.chest_number.0, "KD001");
    assert_eq!(first.current_stage, Some(Stage::Documentation));
}

#[test]
fn rankings_cover_multiple_states_deterministically() {
    let service = service();
    let entries = [
        ("NDA-2026-0001", "30445986GF", "KD"),
        ("NDA-2026-0002", "30445987GF", "KD"),
        ("NDA-2026-0003", "30445988GF", "LA"),
    ];
    for (app, jamb, state) in entries {
        let candidate = service
            .register_candidate(intake(app, jamb, state), &admin())
            .expect("registers");
        run_full_screening(&service, &candidate.application_number);
    }

    let all = service.final_scores(None).expect("scores");
    assert_eq!(all.len(), 3);
    // Equal totals within KD break on application number.
    let kd: Vec<_> = all
        .iter()
        .filter(|entry| entry.state.0 == "KD")
        .map(|entry| {
            (
                entry.application_number.0.as_str(),
                entry.rank_within_state,
            )
        })
        .collect();
    assert_eq!(
        kd,
        vec![("NDA-2026-0001", Some(1)), ("NDA-2026-0002", Some(2))]
    );

    let la_only = service
        .final_scores(Some(&StateCode("LA".to_string())))
        .expect("scores");
    assert_eq!(la_only.len(), 1);
    assert_eq!(la_only[0].rank_within_state, Some(1));
}
