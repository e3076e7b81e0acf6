//! Submit one cavity solve to the service and follow its progress.
//!
//! ```sh
//! RUST_LOG=lidflow_engine=info cargo run --example cavity_job -p lidflow-engine
//! ```

use lidflow_core::SimulationParameters;
use lidflow_engine::{JobStatus, ProgressEvent, ServiceConfig, SolverService};
use lidflow_solver::postprocess;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let service = SolverService::new(ServiceConfig::default())?;
    let params = SimulationParameters::new(100.0).with_grid(41, 41);

    // Subscribe before starting so no sample is missed.
    let id = service.create_job(params)?;
    let events = service.subscribe(id)?;
    service.start_job(id)?;

    for event in events {
        match event {
            ProgressEvent::Progress {
                iteration,
                residual_u,
                residual_v,
                estimated_remaining,
                ..
            } if iteration % 100 == 0 => {
                println!(
                    "iter {iteration:>6}  res_u {residual_u:.3e}  res_v {residual_v:.3e}  \
                     eta {estimated_remaining:.1}s"
                );
            }
            ProgressEvent::Progress { .. } => {}
            other => println!("{id}: {other:?}"),
        }
    }

    if service.wait(id)? != JobStatus::Completed {
        return Err(format!("{id} did not complete").into());
    }
    let result = service.result(id)?;
    println!(
        "converged={} after {} iterations in {:.2}s",
        result.converged, result.total_iterations, result.elapsed_time
    );

    println!("\n     y        u(x=0.5)");
    for (y, u) in postprocess::vertical_centerline_u(&result) {
        println!("{y:8.4}  {u:10.5}");
    }
    Ok(())
}
