use clap::Args;
use reelfeed_core::CodeGenerator;

#[derive(Args)]
pub struct CodeArgs {
    /// How many codes to print
    #[arg(long, short = 'n', default_value = "1")]
    count: usize,
    /// Seed for a reproducible sequence
    #[arg(long)]
    seed: Option<u64>,
}

pub fn run(args: CodeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let codes = match args.seed {
        Some(seed) => CodeGenerator::seeded(seed),
        None => CodeGenerator::from_entropy(),
    };
    for code in codes.take(args.count) {
        println!("{code}");
    }
    Ok(())
}
