use clap::Args;
use screening::error::AppError;
use screening::workflow::assessment::{
    AssessmentPayload, Criterion, DocumentKind, DocumentationResult, MedicalResult, MedicalTest,
    PointScores, TestOutcome,
};
use screening::workflow::candidate::{ActorId, ApplicationNumber, ServiceArm, Sex};
use screening::workflow::intake::{CandidateIntake, RosterImporter};
use screening::workflow::memory::InMemoryScreeningRepository;
use screening::workflow::registry::Stage;
use screening::workflow::service::ScreeningService;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional roster CSV to seed candidates instead of the built-in trio.
    #[arg(long)]
    pub(crate) roster_csv: Option<PathBuf>,
    /// Skip the stage-locking portion of the demo.
    #[arg(long)]
    pub(crate) skip_locking: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RosterImportArgs {
    /// Path to the roster CSV export
    #[arg(long)]
    pub(crate) roster_csv: PathBuf,
}

fn demo_service() -> ScreeningService<InMemoryScreeningRepository> {
    ScreeningService::new(Arc::new(InMemoryScreeningRepository::default()))
}

fn admin() -> ActorId {
    ActorId("admin-demo".to_string())
}

fn officer() -> ActorId {
    ActorId("officer-demo".to_string())
}

pub(crate) fn run_roster_import(args: RosterImportArgs) -> Result<(), AppError> {
    let service = demo_service();
    let summary = RosterImporter::import_from_path(&service, &args.roster_csv, &admin())?;

    println!("Roster import: {}", args.roster_csv.display());
    println!("  registered: {}", summary.registered.len());
    for candidate in &summary.registered {
        println!("    {candidate}");
    }
    if !summary.rejected.is_empty() {
        println!("  rejected: {}", summary.rejected.len());
        for row in &summary.rejected {
            println!("    line {}: {}", row.line, row.message);
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = demo_service();

    println!("Cadet screening demo");
    let candidates = match args.roster_csv {
        Some(path) => {
            let summary = RosterImporter::import_from_path(&service, &path, &admin())?;
            println!(
                "  seeded {} candidates from {} ({} rejected)",
                summary.registered.len(),
                path.display(),
                summary.rejected.len()
            );
            summary.registered
        }
        None => seed_builtin_candidates(&service)?,
    };

    let Some(star) = candidates.first().cloned() else {
        println!("no candidates registered; nothing to demonstrate");
        return Ok(());
    };

    // Walk the first candidate through the full screening sequence.
    for (stage, payload) in [
        (Stage::Documentation, clean_documentation()),
        (Stage::Medical, fit_medical()),
        (Stage::Physical, physical_sheet([10, 8, 6, 7])),
        (Stage::SandModelling, sand_sheet([8, 7])),
        (Stage::Interview, interview_sheet([8, 9, 8, 8])),
    ] {
        let outcome = service.submit_assessment(&star, stage, payload, &officer())?;
        match outcome.total {
            Some(total) => println!("  {}: completed ({total} points)", stage.label()),
            None => println!("  {}: {:?}", stage.label(), outcome.verdict),
        }
    }

    // Second candidate fails medical screening and is disqualified.
    if let Some(unlucky) = candidates.get(1) {
        service.submit_assessment(
            unlucky,
            Stage::Documentation,
            clean_documentation(),
            &officer(),
        )?;
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
        let outcome = service.submit_assessment(
            unlucky,
            Stage::Medical,
            AssessmentPayload::Medical(MedicalResult {
                findings,
                remarks: None,
            }),
            &officer(),
        )?;
        println!(
            "  {unlucky}: medical screening -> {:?} ({})",
            outcome.verdict, outcome.candidate_status
        );
    }

    if !args.skip_locking {
        let active = service.toggle_stage(Stage::Physical, &admin());
        println!("\nStage locking: physical active = {active}");
        if let Some(third) = candidates.get(2) {
            service.submit_assessment(
                third,
                Stage::Documentation,
                clean_documentation(),
                &officer(),
            )?;
            service.submit_assessment(third, Stage::Medical, fit_medical(), &officer())?;
            match service.submit_assessment(
                third,
                Stage::Physical,
                physical_sheet([9, 9, 9, 9]),
                &officer(),
            ) {
                Err(err) => println!("  {third}: physical rejected while locked: {err}"),
                Ok(_) => println!("  {third}: physical unexpectedly accepted"),
            }
        }
        service.toggle_stage(Stage::Physical, &admin());
    }

    println!("\nFinal rankings");
    println!(
        "  {:<16} {:<8} {:<6} {:>5} {:>5}",
        "application", "chest", "state", "total", "rank"
    );
    for entry in service.final_scores(None)? {
        let rank = entry
            .rank_within_state
            .map(|rank| rank.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<16} {:<8} {:<6} {:>5} {:>5}",
            entry.application_number.0, entry.chest_number, entry.state.0, entry.total, rank
        );
    }

    Ok(())
}

fn seed_builtin_candidates(
    service: &ScreeningService<InMemoryScreeningRepository>,
) -> Result<Vec<ApplicationNumber>, AppError> {
    let seeds = [
        ("NDA-2026-0001", "30445986GF", "Bello", "Sani", "KD"),
        ("NDA-2026-0002", "30445987AB", "Okafor", "Chidi", "AN"),
        ("NDA-2026-0003", "30445988CD", "Musa", "Aliyu", "KD"),
    ];

    let mut registered = Vec::new();
    for (app, jamb, surname, first_name, state) in seeds {
        let candidate = service.register_candidate(
            CandidateIntake {
                application_number: app.to_string(),
                jamb_number: jamb.to_string(),
                surname: surname.to_string(),
                first_name: first_name.to_string(),
                middle_name: None,
                sex: Sex::Male,
                state: state.to_string(),
                first_choice: ServiceArm::Army,
                second_choice: ServiceArm::Navy,
                profile_image: None,
            },
            &admin(),
        )?;
        println!(
            "  registered {} (chest {})",
            candidate.application_number, candidate.chest_number.0
        );
        registered.push(candidate.application_number);
    }

    Ok(registered)
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

fn physical_sheet(values: [u8; 4]) -> AssessmentPayload {
    AssessmentPayload::Physical(PointScores {
        scores: [
            (Criterion::Race, values[0]),
            (Criterion::IndividualObstacle, values[1]),
            (Criterion::GroupObstacle, values[2]),
            (Criterion::RopeClimb, values[3]),
        ]
        .into_iter()
        .collect(),
        remarks: None,
    })
}

fn sand_sheet(values: [u8; 2]) -> AssessmentPayload {
    AssessmentPayload::SandModelling(PointScores {
        scores: [
            (Criterion::TerrainModel, values[0]),
            (Criterion::Briefing, values[1]),
        ]
        .into_iter()
        .collect(),
        remarks: None,
    })
}

fn interview_sheet(values: [u8; 4]) -> AssessmentPayload {
    AssessmentPayload::Interview(PointScores {
        scores: [
            (Criterion::Bearing, values[0]),
            (Criterion::Communication, values[1]),
            (Criterion::GeneralKnowledge, values[2]),
            (Criterion::Motivation, values[3]),
        ]
        .into_iter()
        .collect(),
        remarks: None,
    })
}
