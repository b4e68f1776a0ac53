use crate::infra::{load_rubric, InMemoryAssessmentRepository, InMemoryRubricCatalog};
use chrono::Utc;
use clap::Args;
use rubric_assess::error::AppError;
use rubric_assess::workflows::assessment::{
    aggregation, AggregateScore, ApplicationId, Assessment, AssessmentId, AssessmentRequest,
    AssessmentService, Classification, PortfolioSummary, Rubric, RubricId, ScoreInput,
    SubcategoryId,
};
use rubric_assess::workflows::scoresheet::ScoreSheetImporter;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScorecardArgs {
    /// JSON rubric definition (defaults to the built-in standard rubric)
    #[arg(long)]
    pub(crate) rubric: Option<PathBuf>,
    /// CSV score sheet with Category,Subcategory,Score,Comments,Confidence columns
    #[arg(long)]
    pub(crate) scores: PathBuf,
    /// Print the scorecard as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional score sheet used instead of the sample scores
    #[arg(long)]
    pub(crate) scores: Option<PathBuf>,
    /// Stop after submission instead of approving the assessment
    #[arg(long)]
    pub(crate) skip_approval: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScorecardPreview {
    pub(crate) rubric_id: RubricId,
    pub(crate) rubric_name: String,
    #[serde(flatten)]
    pub(crate) aggregate: AggregateScore,
    pub(crate) projected_classification: Classification,
    pub(crate) ready_to_submit: bool,
}

const PREVIEW_ASSESSMENT: &str = "offline-preview";

pub(crate) fn run_scorecard(args: ScorecardArgs) -> Result<(), AppError> {
    let ScorecardArgs {
        rubric,
        scores,
        json,
    } = args;

    let rubric = load_rubric(rubric.as_deref())?;
    let sheet = std::fs::File::open(scores)?;
    let preview = build_preview(&rubric, sheet)?;

    if json {
        let rendered = serde_json::to_string_pretty(&preview).map_err(std::io::Error::other)?;
        println!("{rendered}");
    } else {
        render_preview(&preview);
    }
    Ok(())
}

pub(crate) fn build_preview<R: Read>(
    rubric: &Rubric,
    sheet: R,
) -> Result<ScorecardPreview, AppError> {
    let assessment_id = AssessmentId(PREVIEW_ASSESSMENT.to_string());
    let ledger = ScoreSheetImporter::from_reader(sheet, rubric, &assessment_id, Utc::now())?;
    let aggregate = aggregation::aggregate(rubric, &ledger.list_for(&assessment_id));

    Ok(ScorecardPreview {
        rubric_id: rubric.id.clone(),
        rubric_name: rubric.name.clone(),
        projected_classification: Classification::from_score(aggregate.overall_score),
        ready_to_submit: aggregate.is_complete(),
        aggregate,
    })
}

fn render_preview(preview: &ScorecardPreview) {
    println!("Scorecard for {} ({})", preview.rubric_name, preview.rubric_id);
    render_aggregate(&preview.aggregate);
    println!(
        "Projected classification: {}",
        preview.projected_classification.label()
    );
    if preview.ready_to_submit {
        println!("Every subcategory is scored; the assessment can be submitted.");
    } else {
        println!(
            "{} of {} subcategories still need a score before submission.",
            preview.aggregate.total_subcategories - preview.aggregate.scored_subcategories,
            preview.aggregate.total_subcategories
        );
    }
}

fn render_aggregate(aggregate: &AggregateScore) {
    println!(
        "Progress {}% ({}/{} subcategories) | overall {:.2}",
        aggregate.progress,
        aggregate.scored_subcategories,
        aggregate.total_subcategories,
        aggregate.overall_score
    );
    for category in &aggregate.categories {
        let score = category
            .score
            .map(|score| format!("{score:.2}"))
            .unwrap_or_else(|| "unscored".to_string());
        println!(
            "- {} (weight {}): {} | {}/{} scored",
            category.name, category.weight, score, category.scored, category.total
        );
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        scores,
        skip_approval,
    } = args;

    let rubric = Rubric::standard();
    let inputs = match scores {
        Some(path) => sheet_inputs(&rubric, std::fs::File::open(path)?)?,
        None => sample_inputs(&rubric),
    };

    println!("Rubric assessment demo");
    println!(
        "Rubric: {} v{} ({} categories, {} subcategories)",
        rubric.name,
        rubric.version,
        rubric.categories.len(),
        rubric.total_subcategories()
    );

    let service = demo_service(rubric.clone());
    let assessment = run_walkthrough(&service, &rubric, inputs, !skip_approval)?;

    println!("\nFinal state: {}", assessment.status_summary());
    render_portfolio(&service.portfolio_summary()?);
    Ok(())
}

type DemoService = AssessmentService<InMemoryAssessmentRepository, InMemoryRubricCatalog>;

fn demo_service(rubric: Rubric) -> DemoService {
    AssessmentService::new(
        Arc::new(InMemoryAssessmentRepository::default()),
        Arc::new(InMemoryRubricCatalog::with_rubric(rubric)),
    )
}

pub(crate) fn run_walkthrough(
    service: &DemoService,
    rubric: &Rubric,
    inputs: Vec<ScoreInput>,
    approve: bool,
) -> Result<Assessment, AppError> {
    let assessment = service.start(AssessmentRequest {
        application_id: ApplicationId("app-erp-suite".to_string()),
        rubric_id: rubric.id.clone(),
        assessor_id: "demo-assessor".to_string(),
    })?;
    println!("\nOpened {} ({})", assessment.id, assessment.status.label());

    for input in inputs {
        let subcategory_id = input.subcategory_id.clone();
        let score = input.score;
        let outcome = service.record_score(&assessment.id, input)?;
        println!(
            "- scored {subcategory_id} = {score} | progress {}% | {}",
            outcome.assessment.progress,
            outcome.assessment.status.label()
        );
    }

    let scorecard = service.scorecard(&assessment.id)?;
    println!("\nScorecard");
    render_aggregate(&scorecard.aggregate);

    let submitted = service.submit(&assessment.id)?;
    println!("\n{}", submitted.status_summary());

    if approve {
        let approved = service.approve(&assessment.id)?;
        return Ok(approved);
    }
    Ok(submitted)
}

fn sheet_inputs<R: Read>(rubric: &Rubric, sheet: R) -> Result<Vec<ScoreInput>, AppError> {
    let assessment_id = AssessmentId(PREVIEW_ASSESSMENT.to_string());
    let ledger = ScoreSheetImporter::from_reader(sheet, rubric, &assessment_id, Utc::now())?;
    Ok(ledger
        .list_for(&assessment_id)
        .into_iter()
        .map(|record| ScoreInput {
            category_id: record.category_id,
            subcategory_id: record.subcategory_id,
            score: record.score,
            comment: record.comment,
            confidence_level: Some(record.confidence_level.value()),
        })
        .collect())
}

const SAMPLE_SCORES: &[(&str, u8, &str)] = &[
    ("sub-sec-1", 4, "SSO with MFA enforced"),
    ("sub-sec-2", 4, "TLS everywhere, disks encrypted"),
    ("sub-sec-3", 3, "quarterly scans, some findings open"),
    ("sub-sec-4", 4, "audit trail retained for a year"),
    ("sub-perf-1", 3, "p95 under two seconds"),
    ("sub-perf-2", 4, "scales horizontally"),
    ("sub-perf-3", 3, "two outages last quarter"),
    ("sub-maint-1", 4, ""),
    ("sub-maint-2", 3, "runbooks are stale"),
    ("sub-maint-3", 4, ""),
    ("sub-bv-1", 5, "used by every region"),
    ("sub-bv-2", 4, ""),
    ("sub-comp-1", 4, "GDPR review passed"),
    ("sub-comp-2", 5, ""),
];

fn sample_inputs(rubric: &Rubric) -> Vec<ScoreInput> {
    SAMPLE_SCORES
        .iter()
        .filter_map(|(subcategory, score, comment)| {
            let subcategory_id = SubcategoryId((*subcategory).to_string());
            let (category, _) = rubric.locate(&subcategory_id)?;
            Some(ScoreInput {
                category_id: category.id.clone(),
                subcategory_id,
                score: *score,
                comment: (!comment.is_empty()).then(|| (*comment).to_string()),
                confidence_level: Some(4),
            })
        })
        .collect()
}

fn render_portfolio(summary: &PortfolioSummary) {
    println!("\nPortfolio summary");
    println!(
        "- {} assessments, {} finished, average progress {}%",
        summary.total, summary.finished, summary.average_progress
    );
    if let Some(average) = summary.average_overall_score {
        println!("- average overall score {average:.2}");
    }
    for entry in summary.by_classification.iter().filter(|entry| entry.count > 0) {
        println!("- {}: {}", entry.classification_label, entry.count);
    }
}
