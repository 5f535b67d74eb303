use std::path::Path;
use std::process;

use dash_lib::error::SimulatorError;
use dash_lib::error::SimulatorResult;
use dash_lib::policy::SimPolicy;
use dash_lib::run_wrapper::run;
use dash_lib::run_wrapper::RunStats;
use env_logger::Env;

fn main() {
    env_logger::init_from_env(Env::default().filter_or("DASH_LOG", "warn"));

    if let Err(e) = run_eval() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn report_error(e: impl std::fmt::Display) -> SimulatorError {
    SimulatorError::ReportError(e.to_string())
}

fn run_eval() -> SimulatorResult<()> {
    let trace_path = std::env::args().nth(1).ok_or_else(|| {
        SimulatorError::ConfigError(
            "You should specify exactly one trace file".to_string(),
        )
    })?;
    let trace_base_name = Path::new(&trace_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| trace_path.clone());

    let stats = run(Path::new(&trace_path), SimPolicy::default())?;

    std::fs::create_dir_all("eval")?;
    write_csv(&stats, &format!("eval/trace_eval_{}.csv", trace_base_name))?;
    plot_cumulative(
        &stats,
        &trace_base_name,
        &format!("eval/trace_eval_{}.svg", trace_base_name),
    )?;

    eprintln!(
        "{}: {} accesses, {} skipped, total cost {}, average {:.3}",
        trace_base_name,
        stats.accesses,
        stats.skipped,
        stats.total_cost,
        stats.average_cost()
    );
    Ok(())
}

fn write_csv(stats: &RunStats, output_path: &str) -> SimulatorResult<()> {
    let mut writer = csv::Writer::from_path(output_path).map_err(|e| {
        report_error(format!(
            "Failed to create CSV file '{}': {}",
            output_path, e
        ))
    })?;

    writer
        .write_record([
            "Line",
            "Node",
            "CPU",
            "Op",
            "Address",
            "Outcome",
            "Cost",
            "Cumulative",
        ])
        .map_err(report_error)?;

    let mut cumulative: u64 = 0;
    for record in &stats.records {
        let inst = &record.entry.instruction;
        cumulative += record.cost() as u64;
        writer
            .write_record([
                record.entry.line.to_string(),
                inst.node.to_string(),
                inst.cpu.to_string(),
                format!("{:?}", inst.opcode),
                inst.offset.to_string(),
                record
                    .outcome
                    .map_or("Skipped".to_string(), |o| format!("{:?}", o)),
                record.cost().to_string(),
                cumulative.to_string(),
            ])
            .map_err(report_error)?;
    }

    writer.flush()?;
    Ok(())
}

fn plot_cumulative(
    stats: &RunStats,
    trace_base_name: &str,
    output_path: &str,
) -> SimulatorResult<()> {
    use plotters::prelude::*;

    let series: Vec<(i32, i64)> = stats
        .records
        .iter()
        .scan(0i64, |total, record| {
            *total += record.cost() as i64;
            Some(*total)
        })
        .enumerate()
        .map(|(i, total)| (i as i32 + 1, total))
        .collect();
    let x_max = (series.len() as i32).max(1);
    let y_max = series.last().map_or(1, |(_, total)| (*total).max(1));

    let plot_title = format!("Cumulative access cost: {}", trace_base_name);
    let root = SVGBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(report_error)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(plot_title.as_str(), ("sans-serif", 40).into_font())
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..x_max, 0..y_max + y_max / 10 + 1)
        .map_err(report_error)?;
    ctx.configure_mesh()
        .x_desc("Instruction")
        .y_desc("Cost")
        .draw()
        .map_err(report_error)?;

    ctx.draw_series(LineSeries::new(series, &BLUE))
        .map_err(report_error)?;

    root.present().map_err(report_error)?;
    Ok(())
}
