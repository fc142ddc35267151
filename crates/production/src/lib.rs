//! Production tasks: per-order component manufacturing plans and their
//! claim/progress lifecycle.

pub mod task;

pub use task::{
    ProductionTask, TaskClaimed, TaskCompleted, TaskEvent, TaskPlanned, TaskProgressReported,
    TaskReleased, TaskStatus, TaskWorkerAssigned,
};
