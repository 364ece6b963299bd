/*!
 * algosim - task generator CLI
 *
 * Emits a 3-task JSON document to stdout: one memory-allocation task and
 * two CPU-scheduling tasks (one drawn from the non-preemptive strategy
 * family, one from the preemptive family). Diagnostics go to stderr only,
 * so stdout stays a clean, pipeable JSON document.
 */

use log::info;
use std::error::Error;
use std::io::{self, Write};

use algosim::codec;
use algosim::generator::{generate_memory_task, generate_processes_task};
use algosim::task::Task;

const REQUESTS_PER_TASK: u32 = 40;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("algosim generating {} tasks...", 3);

    let tasks: Vec<Task> = vec![
        generate_memory_task(REQUESTS_PER_TASK).into(),
        generate_processes_task(REQUESTS_PER_TASK, false).into(),
        generate_processes_task(REQUESTS_PER_TASK, true).into(),
    ];

    info!("encoding tasks to JSON");
    let document = codec::save_tasks(&tasks)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(document.as_bytes())?;
    handle.write_all(b"\n")?;

    info!("done");
    Ok(())
}
