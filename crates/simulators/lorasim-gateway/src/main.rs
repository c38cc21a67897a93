use clap::Parser;

use lorasim_runner::runner::run_simulation;

use crate::simulation::builder::SimulationBuilder;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

pub(crate) mod lora;
pub(crate) mod simulation;

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct CliArgs {
    #[arg(short = 'c', long, value_name = "CONFIG_FILE")]
    config: String,
}

fn main() {
    let args = CliArgs::parse();
    let start = std::time::Instant::now();
    let mut builder = SimulationBuilder::new(&args.config);
    let scheduler = builder.build();
    let summary = run_simulation(scheduler);
    let elapsed = start.elapsed();
    println!(
        "Simulation finished at {} ms after {} steps in {} ms.",
        summary.end_time,
        summary.steps,
        elapsed.as_millis()
    );
}
