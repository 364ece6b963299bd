/*!
 * Task generators
 *
 * Randomly produces `MemoryTask`/`ProcessesTask` values for the CLI and
 * test fixtures. Every random decision flows through an injected
 * `rand::Rng`, so generation is deterministic under a seeded RNG and the
 * `_with` variants are the ones worth testing; the plain functions just
 * plug in `rand::thread_rng()`.
 */

pub mod memory;
pub mod process;

pub use memory::{generate_memory_task, generate_memory_task_with};
pub use process::{generate_processes_task, generate_processes_task_with};
