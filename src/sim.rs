use dash_lib::error::SimulatorError;
use dash_lib::policy::SimPolicy;
use dash_lib::run_wrapper;
use env_logger::Env;
use std::env;
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    let env = Env::default()
        .filter_or("DASH_LOG", "warn")
        .write_style_or("DASH_LOG_STYLE", "auto");
    env_logger::init_from_env(env);

    let mut args = env::args().skip(1);
    let trace_file: PathBuf = args
        .next()
        .ok_or("You should specify exactly one trace file")?
        .into();

    let mut policy = SimPolicy::default();

    for arg in args {
        match arg.as_str() {
            "-v" => policy.verbose = true,
            "-h" => policy.history = true,
            "-s" => policy.step = true,
            "-c" => policy.check = true,
            _ => {
                return Err(SimulatorError::ConfigError(format!(
                    "Unknown parameter: {}",
                    arg
                ))
                .into())
            }
        }
    }

    let stats = run_wrapper::run(&trace_file, policy)?;
    println!(
        "Total access cost: {} Average access cost: {:.2}",
        stats.total_cost,
        stats.average_cost()
    );

    Ok(())
}
