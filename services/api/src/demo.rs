use crate::infra::{build_service, parse_benchmark_entry, parse_formula, DemoSubScoreSource};
use clap::Args;
use model_authority::authority::gateway::validate_sub_scores;
use model_authority::authority::history::{
    model_comparison, score_evolution, InMemorySnapshotRepository, NewSnapshot, SnapshotRepository,
    DEFAULT_SNAPSHOT_LIMIT,
};
use model_authority::authority::{
    estimate_share, estimate_share_with_aliases, export_url, generate_plan, AgentAction,
    AgentSimulator, AuthorityService, AuthorityServiceError, BenchmarkInput, BenchmarkStore,
    BrandBaseline, CertificationCandidate, GatewaySubScoreSource, HttpModelGateway,
    InMemoryBenchmarkStore, InMemoryMaiHistoryStore, JsonFileBenchmarkStore,
    JsonFileMaiHistoryStore, MaiFormula, MaiHistoryStore, Priority, PromptSet,
    ProtocolAuditResult, ProtocolAuditor, ScanResult, SourceError, SubScoreSet, SubScoreSource,
};
use model_authority::config::{AppConfig, ScoringConfig};
use model_authority::error::AppError;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Brand being scored
    #[arg(long)]
    pub(crate) brand: String,
    #[arg(long)]
    pub(crate) infrastructure: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) visibility: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) recommendation: f64,
    #[arg(long)]
    pub(crate) agent_execution: f64,
    #[arg(long)]
    pub(crate) protocol_compliance: f64,
    /// Share of model; selects formula 1.1.0 unless --formula is given
    #[arg(long)]
    pub(crate) som: Option<f64>,
    /// Formula version (1.0.0 or 1.1.0)
    #[arg(long, value_parser = parse_formula, conflicts_with = "geo_url")]
    pub(crate) formula: Option<MaiFormula>,
    /// Sample visibility, recommendation and SOM through MAI_GATEWAY_URL
    #[arg(long)]
    pub(crate) sample: bool,
    /// Competitor brands passed to the sampling batch
    #[arg(long = "competitor")]
    pub(crate) competitors: Vec<String>,
    /// Grade this page's GEO readability through MAI_GATEWAY_URL and use it
    /// as the fallback score
    #[arg(long)]
    pub(crate) geo_url: Option<String>,
    /// Rendered page content sent with --geo-url
    #[arg(long, default_value = "", requires = "geo_url")]
    pub(crate) geo_content: String,
}

#[derive(Args, Debug)]
pub(crate) struct SomArgs {
    #[arg(long)]
    pub(crate) brand: String,
    /// Alternate spelling of the brand (repeatable)
    #[arg(long = "alias")]
    pub(crate) aliases: Vec<String>,
    /// JSON file holding an array of sampled response strings
    #[arg(long)]
    pub(crate) responses: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct AuditArgs {
    /// Site to audit; paths and query strings are ignored
    #[arg(long)]
    pub(crate) url: String,
}

#[derive(Args, Debug)]
pub(crate) struct BenchmarkArgs {
    #[arg(long)]
    pub(crate) industry: String,
    /// Precomputed row as brand=mai:som (repeatable). Without rows the
    /// built-in demo sector is scored.
    #[arg(long = "entry", value_parser = parse_benchmark_entry)]
    pub(crate) entries: Vec<BenchmarkInput>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Brand to follow through the demo
    #[arg(long, default_value = "acme")]
    pub(crate) brand: String,
    /// Prompt library niche to list
    #[arg(long, default_value = "saas")]
    pub(crate) niche: String,
    /// Audit a live site instead of using a sample audit
    #[arg(long)]
    pub(crate) audit_url: Option<String>,
    /// Agent-facing endpoint to exercise with a GET request
    #[arg(long)]
    pub(crate) agent_endpoint: Option<String>,
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let breakdown = if args.sample {
        sample_breakdown(&config.scoring, &args).await?
    } else {
        SubScoreSet {
            infrastructure: args.infrastructure,
            visibility: args.visibility,
            recommendation: args.recommendation,
            agent_execution: args.agent_execution,
            protocol_compliance: args.protocol_compliance,
            som: args.som,
        }
    };
    validate_sub_scores(&breakdown)?;

    match config.scoring.data_dir.clone() {
        Some(dir) => {
            let service = build_service(
                &config.scoring,
                Arc::new(JsonFileMaiHistoryStore::new(&dir)),
                Arc::new(JsonFileBenchmarkStore::new(&dir)),
            );
            score_with(&service, &config.scoring, &args, breakdown).await
        }
        None => {
            let service = in_memory_service(&config.scoring);
            score_with(&service, &config.scoring, &args, breakdown).await
        }
    }
}

async fn score_with<H, B>(
    service: &AuthorityService<H, B>,
    scoring: &ScoringConfig,
    args: &ScoreArgs,
    breakdown: SubScoreSet,
) -> Result<(), AppError>
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    let result = match &args.geo_url {
        Some(url) => {
            let gateway = configured_gateway(scoring, "--geo-url")?;
            service
                .score_with_geo_readability(
                    &args.brand,
                    Some(breakdown),
                    url,
                    &args.geo_content,
                    &gateway,
                )
                .await?
        }
        None => service.score_breakdown(&args.brand, breakdown, args.formula)?,
    };
    print_json(&result);
    Ok(())
}

fn configured_gateway(scoring: &ScoringConfig, flag: &str) -> Result<HttpModelGateway, AppError> {
    let endpoint = scoring.gateway_url.clone().ok_or_else(|| {
        AppError::InvalidInput(format!("{flag} needs MAI_GATEWAY_URL to be set"))
    })?;
    Ok(HttpModelGateway::new(endpoint, scoring.audit_timeout()))
}

async fn sample_breakdown(
    scoring: &ScoringConfig,
    args: &ScoreArgs,
) -> Result<SubScoreSet, AppError> {
    let gateway = Arc::new(configured_gateway(scoring, "--sample")?);

    let mut baselines = HashMap::new();
    baselines.insert(
        args.brand.clone(),
        BrandBaseline {
            infrastructure: args.infrastructure,
            agent_execution: args.agent_execution,
            protocol_compliance: args.protocol_compliance,
        },
    );
    let source = GatewaySubScoreSource::new(gateway, baselines);

    source
        .sub_scores(&args.brand, &args.competitors)
        .await
        .map_err(|err| match err {
            SourceError::Gateway(err) => AppError::Gateway(err),
            SourceError::Missing(brand) => {
                AppError::InvalidInput(format!("no baseline for {brand}"))
            }
        })
}

pub(crate) fn run_som(args: SomArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.responses)?;
    let responses: Vec<String> = serde_json::from_str(&raw).map_err(|err| {
        AppError::InvalidInput(format!(
            "{} must hold a JSON array of strings ({err})",
            args.responses.display()
        ))
    })?;

    print_json(&estimate_share_with_aliases(
        &args.brand,
        &args.aliases,
        &responses,
    ));
    Ok(())
}

pub(crate) async fn run_audit(args: AuditArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    if args.url.trim().is_empty() {
        return Err(AppError::InvalidInput("url is required".to_string()));
    }

    let auditor = ProtocolAuditor::new(config.scoring.audit_timeout());
    print_json(&auditor.audit(&args.url).await);
    Ok(())
}

pub(crate) async fn run_benchmark(args: BenchmarkArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    match config.scoring.data_dir.clone() {
        Some(dir) => {
            let service = build_service(
                &config.scoring,
                Arc::new(JsonFileMaiHistoryStore::new(&dir)),
                Arc::new(JsonFileBenchmarkStore::new(&dir)),
            );
            benchmark_with(&service, &config.scoring, args).await
        }
        None => {
            let service = in_memory_service(&config.scoring);
            benchmark_with(&service, &config.scoring, args).await
        }
    }
}

async fn benchmark_with<H, B>(
    service: &AuthorityService<H, B>,
    scoring: &ScoringConfig,
    args: BenchmarkArgs,
) -> Result<(), AppError>
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    if args.entries.is_empty() {
        let source = DemoSubScoreSource::default();
        let report = service
            .run_sector_benchmark(&args.industry, &source.brands(), &source)
            .await?;
        print_json(&report);
        return Ok(());
    }

    let snapshot = service.record_benchmark(&args.industry, args.entries)?;
    println!(
        "Export: {}",
        export_url(&scoring.public_base_url, &args.industry, snapshot.generated_at)
    );
    print_json(&snapshot);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        brand,
        niche,
        audit_url,
        agent_endpoint,
    } = args;

    let scoring = ScoringConfig::default();
    let service = in_memory_service(&scoring);
    let source = DemoSubScoreSource::default();

    println!("Model authority demo for '{brand}'");

    let snapshots = InMemorySnapshotRepository::default();
    let models = ["gpt-4o", "claude-3-opus"];
    let mut responses = Vec::new();
    for (index, prompt) in PromptSet::default_set().prompts().iter().enumerate() {
        let model = models[index % models.len()];
        let response = canned_response(&brand, index);
        let mention = estimate_share(&brand, &[response.as_str()]);
        snapshots
            .insert(NewSnapshot {
                brand: brand.clone(),
                model: model.to_string(),
                prompt: prompt.to_string(),
                full_response: response.clone(),
                computed_score: f64::from(mention.share),
                competitors: source.brands(),
            })
            .map_err(AuthorityServiceError::from)?;
        responses.push(response);
    }

    let som = estimate_share(&brand, &responses);
    println!(
        "\nShare of model: {}% ({} of {} sampled answers)",
        som.share, som.mentions, som.total_mentions
    );

    let recent = snapshots
        .recent(&brand, DEFAULT_SNAPSHOT_LIMIT)
        .map_err(AuthorityServiceError::from)?;
    println!("Per-model average:");
    for average in model_comparison(&recent) {
        println!("  - {}: {:.1}", average.model, average.average_score);
    }
    if let Some(latest) = score_evolution(&recent).first() {
        println!("Latest snapshot score: {:.0} at {}", latest.score, latest.date);
    }

    let breakdown = match source.sub_scores(&brand, &[]).await {
        Ok(breakdown) => breakdown.with_som(f64::from(som.share)),
        Err(err) => {
            println!("  Sub-scores unavailable: {err}");
            return Ok(());
        }
    };
    let mai = service.score_breakdown(&brand, breakdown, None)?;
    println!(
        "\nModel Authority Index {} (formula {})",
        mai.score, mai.version
    );

    let audit = match audit_url {
        Some(url) => service.audit_protocols(&url).await,
        None => ProtocolAuditResult::from_checks(true, false, true),
    };
    println!(
        "Protocol audit: llm.txt={} ai-plugin.json={} mcp.json={} -> {}/100",
        audit.llm_txt, audit.ai_plugin, audit.mcp_json, audit.score
    );

    if let Some(endpoint) = agent_endpoint {
        let simulator = AgentSimulator::new(scoring.audit_timeout());
        let result = simulator.simulate(&endpoint, AgentAction::Get, None).await;
        println!(
            "Agent simulation: {} in {} ms (success: {})",
            result.endpoint, result.latency_ms, result.success
        );
    }

    let sector = service
        .run_sector_benchmark(&niche, &source.brands(), &source)
        .await?;
    println!("\nSector benchmark '{}'", sector.snapshot.industry);
    for (rank, entry) in sector.snapshot.entries.iter().enumerate() {
        println!(
            "  {}. {} | MAI {} | SOM {}",
            rank + 1,
            entry.brand,
            entry.mai,
            entry.som
        );
    }
    println!("  Export: {}", sector.export_url);

    let scan = ScanResult {
        url: format!("https://{}.io", brand.to_lowercase()),
        geo_score: None,
        protocol_audit: Some(audit),
        som: Some(som),
        mai: Some(mai.clone()),
    };
    let plan = generate_plan(&scan);
    println!("\nAction plan");
    for priority in Priority::ordered() {
        for action in plan.bucket(priority) {
            println!("  [{}] {}", priority.label(), action);
        }
    }

    let certification = service.certify(&CertificationCandidate::from_index(&brand, &mai));
    if certification.is_eligible {
        println!(
            "\nCertified AI-ready: {}",
            certification.badge_url.unwrap_or_default()
        );
    } else {
        println!("\nNot certified:");
        for reason in certification.rejection_reasons.unwrap_or_default() {
            println!("  - {reason}");
        }
    }

    let report = service.executive_report(&scan)?;
    println!(
        "\nExecutive report {} ({} history entries)",
        report.export_file_name(),
        report.history.len()
    );

    println!("\nLibrary prompts for '{niche}':");
    for template in service.niche_prompts(&niche) {
        println!("  - ({:.1}) {}", template.strategic_weight, template.text);
    }

    Ok(())
}

fn in_memory_service(
    scoring: &ScoringConfig,
) -> AuthorityService<InMemoryMaiHistoryStore, InMemoryBenchmarkStore> {
    build_service(
        scoring,
        Arc::new(InMemoryMaiHistoryStore::default()),
        Arc::new(InMemoryBenchmarkStore::default()),
    )
}

fn canned_response(brand: &str, index: usize) -> String {
    match index % 3 {
        0 => format!("{brand} is frequently cited for AI visibility tracking."),
        1 => "Several analytics suites cover this, most notably Globex.".to_string(),
        _ => format!("Teams comparing vendors often shortlist {brand} and Initech."),
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("Output unavailable: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_responses_mention_the_brand_in_three_of_five() {
        let responses: Vec<String> = (0..5).map(|index| canned_response("Acme", index)).collect();
        let som = estimate_share("Acme", &responses);
        assert_eq!(som.mentions, 3);
        assert_eq!(som.share, 60);
    }

    #[tokio::test]
    async fn demo_runs_offline() {
        let args = DemoArgs {
            brand: "acme".to_string(),
            niche: "saas".to_string(),
            audit_url: None,
            agent_endpoint: None,
        };
        run_demo(args).await.expect("demo completes");
    }

    #[tokio::test]
    async fn benchmark_without_rows_scores_demo_sector() {
        let service = in_memory_service(&ScoringConfig::default());
        let args = BenchmarkArgs {
            industry: "saas".to_string(),
            entries: Vec::new(),
        };

        benchmark_with(&service, &ScoringConfig::default(), args)
            .await
            .expect("benchmark");

        let latest = service
            .latest_benchmark()
            .expect("latest")
            .expect("snapshot");
        assert_eq!(latest.entries.len(), 3);
        assert_eq!(latest.entries[0].brand, "acme");
    }
}
