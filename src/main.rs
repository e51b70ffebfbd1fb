use anyhow::{Context, Result};
use clap::Parser;
use surveyscore::{
    charts,
    config::{Args, Config},
    power::solve_sample_size,
    process::{preprocess_and_score, AnswerKey},
    report,
    table::{load_csv, write_csv, write_parquet},
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,surveyscore=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) resolve settings ─────────────────────────────────────────
    let args = Args::parse();
    let config = Config::resolve(&args)?;
    info!(input = %config.input.display(), "startup");

    // ─── 3) load, preprocess & score ─────────────────────────────────
    let mut table = load_csv(&config.input)
        .with_context(|| format!("loading {}", config.input.display()))?;
    let (pre, summary) = preprocess_and_score(&mut table, &config.layout, &AnswerKey::STANDARD)
        .context("preprocessing responses")?;
    print!("{}", report::mapping_report(&pre, &summary));

    // ─── 4) optional write-backs ─────────────────────────────────────
    if let Some(path) = &config.output_csv {
        write_csv(&table, path).with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &config.output_parquet {
        write_parquet(&table, path).with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &config.audit_json {
        report::write_audit(path, &pre).with_context(|| format!("writing {}", path.display()))?;
    }

    // ─── 5) power analysis ───────────────────────────────────────────
    match solve_sample_size(&config.power) {
        Ok(n) => println!("Sample size/Number needed in each group: {:.3}", n),
        Err(e) => error!(error = %e, "power analysis failed"),
    }

    // ─── 6) charts ───────────────────────────────────────────────────
    if let Some(dir) = &config.chart_dir {
        let outcome = charts::write_charts(&table, dir)?;
        if !outcome.failed.is_empty() {
            info!(failed = ?outcome.failed, "some charts were skipped");
        }
    }

    // ─── 7) preview ──────────────────────────────────────────────────
    if config.preview_rows > 0 {
        print!("{}", report::render_preview(&table, config.preview_rows));
    }

    info!(respondents = summary.respondents, "done");
    Ok(())
}
