use anyhow::Result;
use clap::Parser;
use surveyscore::power::{solve_sample_size, Alternative, PowerParams};
use tracing_subscriber::{fmt, EnvFilter};

/// Sample size per group for an independent two-sample t-test.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Standardized effect size (Cohen's d)
    #[arg(long, default_value_t = 0.8)]
    effect_size: f64,

    #[arg(long, default_value_t = 0.05)]
    alpha: f64,

    /// Target power
    #[arg(long, default_value_t = 0.8)]
    power: f64,

    /// Second group size relative to the first
    #[arg(long, default_value_t = 1.0)]
    ratio: f64,

    /// Test only the upper or lower tail
    #[arg(long, conflicts_with = "smaller")]
    larger: bool,

    #[arg(long)]
    smaller: bool,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(env).init();

    let args = Args::parse();
    let alternative = match (args.larger, args.smaller) {
        (true, _) => Alternative::Larger,
        (_, true) => Alternative::Smaller,
        _ => Alternative::TwoSided,
    };
    let n = solve_sample_size(&PowerParams {
        effect_size: args.effect_size,
        alpha: args.alpha,
        power: args.power,
        ratio: args.ratio,
        alternative,
    })?;
    println!("Sample size/Number needed in each group: {:.3}", n);
    Ok(())
}
