use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use rdist_rs::TestDistribution;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Sample one of the test distributions", long_about = None)]
struct Args {
    /// Distribution tag (1-6)
    #[arg(short, long, default_value_t = 1)]
    distribution: i32,

    /// Number of variates to draw
    #[arg(short = 'n', long, default_value_t = 100_000)]
    samples: usize,

    /// Target hat/squeeze area ratio
    #[arg(short, long, default_value_t = 1.1)]
    rho: f64,

    /// Maximum number of intervals
    #[arg(short, long, default_value_t = 1001)]
    max_intervals: usize,

    /// Transform parameters, one per region or a single one for all
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    c: Option<Vec<f64>>,

    /// Initial breakpoints including the support bounds (inf allowed)
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    ib: Option<Vec<f64>>,

    /// Seed for the uniform generator
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Number of histogram bins
    #[arg(short, long, default_value_t = 40)]
    bins: usize,

    /// Print every interval of the generator
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let Some(distribution) = TestDistribution::from_tag(args.distribution) else {
        eprintln!("unknown distribution tag {}", args.distribution);
        std::process::exit(2);
    };
    let ib = args.ib.unwrap_or_else(|| distribution.breakpoints().to_vec());
    let c = args.c.unwrap_or_else(|| vec![distribution.transform()]);

    let generator = match distribution.setup(&ib, &c, args.rho, args.max_intervals) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("setup failed: {e}");
            std::process::exit(1);
        }
    };
    if args.verbose {
        print!("{generator:#}");
    } else {
        print!("{generator}");
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let xs = match generator.sample(args.samples, &mut rng) {
        Ok(xs) => xs,
        Err(e) => {
            eprintln!("sampling failed: {e}");
            std::process::exit(1);
        }
    };

    let stats = generator.stats();
    println!(
        "trials: {} accepted: {} squeeze: {} acceptance: {:.4}",
        stats.trials,
        stats.accepted,
        stats.squeeze_accepted,
        stats.acceptance_rate()
    );

    if xs.is_empty() || args.bins == 0 {
        return;
    }
    let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (hi - lo) / args.bins as f64;
    let mut hist = vec![0usize; args.bins];
    for x in &xs {
        let i = if width > 0.0 {
            (((x - lo) / width) as usize).min(args.bins - 1)
        } else {
            0
        };
        hist[i] += 1;
    }
    let peak = hist.iter().copied().max().unwrap_or(1).max(1);
    for (i, count) in hist.iter().enumerate() {
        let bar = "#".repeat(count * 60 / peak);
        println!("{:>10.4} {:>8} {}", lo + (i as f64 + 0.5) * width, count, bar);
    }
}
