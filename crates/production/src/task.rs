use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use woodshop_core::{ComponentId, DomainError, DomainResult, EmployeeId, Entity, OrderId, TaskId};
use woodshop_events::Event;

/// Stored task status. Overdue is never stored, see [`ProductionTask::is_overdue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    Claimed,
    Done,
}

impl core::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            TaskStatus::Open => "open",
            TaskStatus::Claimed => "claimed",
            TaskStatus::Done => "done",
        };
        f.write_str(s)
    }
}

/// A production task: manufacture `planned_qty` units of one component for
/// one order.
///
/// Invariant: `0 <= actual_qty <= planned_qty`. Outstanding (open or claimed)
/// tasks are unique per (order, component); additional demand merges into the
/// existing task instead of creating a second one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionTask {
    id: TaskId,
    order_id: OrderId,
    component_id: ComponentId,
    planned_qty: u64,
    actual_qty: u64,
    deadline: DateTime<Utc>,
    status: TaskStatus,
    assigned_worker: Option<EmployeeId>,
}

impl ProductionTask {
    pub fn new(
        id: TaskId,
        order_id: OrderId,
        component_id: ComponentId,
        planned_qty: u64,
        deadline: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if planned_qty == 0 {
            return Err(DomainError::validation(
                "planned quantity must be at least 1",
            ));
        }
        Ok(Self {
            id,
            order_id,
            component_id,
            planned_qty,
            actual_qty: 0,
            deadline,
            status: TaskStatus::Open,
            assigned_worker: None,
        })
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn component_id(&self) -> ComponentId {
        self.component_id
    }

    pub fn planned_qty(&self) -> u64 {
        self.planned_qty
    }

    pub fn actual_qty(&self) -> u64 {
        self.actual_qty
    }

    pub fn remaining_qty(&self) -> u64 {
        self.planned_qty - self.actual_qty
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn assigned_worker(&self) -> Option<EmployeeId> {
        self.assigned_worker
    }

    /// Overdue is a read-time projection, not a stored status.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TaskStatus::Done && now > self.deadline
    }

    pub fn is_outstanding(&self) -> bool {
        matches!(self.status, TaskStatus::Open | TaskStatus::Claimed)
    }

    /// Fold additional demand into an outstanding task. The earlier deadline
    /// wins so the merged plan still meets both orders of work.
    pub fn merge_planned(&mut self, extra_qty: u64, deadline: DateTime<Utc>) -> DomainResult<u64> {
        if extra_qty == 0 {
            return Err(DomainError::validation("merged quantity must be at least 1"));
        }
        if !self.is_outstanding() {
            return Err(DomainError::AlreadyDone);
        }
        self.planned_qty = self
            .planned_qty
            .checked_add(extra_qty)
            .ok_or_else(|| DomainError::validation("planned quantity overflow"))?;
        if deadline < self.deadline {
            self.deadline = deadline;
        }
        Ok(self.planned_qty)
    }

    /// Manager pre-assignment of an open task. Claiming is then restricted
    /// to the assigned worker.
    pub fn assign(&mut self, worker_id: EmployeeId) -> DomainResult<()> {
        match self.status {
            TaskStatus::Open => {
                self.assigned_worker = Some(worker_id);
                Ok(())
            }
            TaskStatus::Claimed => Err(DomainError::AlreadyClaimed),
            TaskStatus::Done => Err(DomainError::AlreadyDone),
        }
    }

    /// Checks every claim precondition without mutating. The engine calls
    /// this before consuming materials so a failed claim has no side effects.
    pub fn ensure_claimable(&self, worker_id: EmployeeId) -> DomainResult<()> {
        match self.status {
            TaskStatus::Claimed => return Err(DomainError::AlreadyClaimed),
            TaskStatus::Done => return Err(DomainError::AlreadyDone),
            TaskStatus::Open => {}
        }
        if let Some(assigned) = self.assigned_worker {
            if assigned != worker_id {
                return Err(DomainError::invalid_state(
                    "task is pre-assigned to another worker",
                ));
            }
        }
        Ok(())
    }

    /// Atomic open -> claimed transition.
    pub fn claim(&mut self, worker_id: EmployeeId) -> DomainResult<()> {
        self.ensure_claimable(worker_id)?;
        self.status = TaskStatus::Claimed;
        self.assigned_worker = Some(worker_id);
        Ok(())
    }

    /// Record delivered units. Returns true when the task completed with
    /// this delivery (actual reached planned).
    pub fn record_progress(&mut self, worker_id: EmployeeId, delivered: u64) -> DomainResult<bool> {
        match self.status {
            TaskStatus::Open => {
                return Err(DomainError::invalid_state(
                    "cannot report progress on an unclaimed task",
                ));
            }
            TaskStatus::Done => return Err(DomainError::AlreadyDone),
            TaskStatus::Claimed => {}
        }
        if self.assigned_worker != Some(worker_id) {
            return Err(DomainError::invalid_state(
                "only the worker who claimed the task can report progress",
            ));
        }
        if delivered == 0 {
            return Err(DomainError::validation(
                "delivered quantity must be at least 1",
            ));
        }
        let new_actual = self
            .actual_qty
            .checked_add(delivered)
            .ok_or_else(|| DomainError::validation("actual quantity overflow"))?;
        if new_actual > self.planned_qty {
            return Err(DomainError::ExceedsPlan {
                planned: self.planned_qty,
                actual: self.actual_qty,
                delivered,
            });
        }
        self.actual_qty = new_actual;
        if self.actual_qty == self.planned_qty {
            self.status = TaskStatus::Done;
        }
        Ok(self.status == TaskStatus::Done)
    }

    /// Manager override: claimed -> open, clearing the worker. Materials
    /// consumed at claim time are not refunded.
    pub fn release(&mut self) -> DomainResult<()> {
        match self.status {
            TaskStatus::Claimed => {
                self.status = TaskStatus::Open;
                self.assigned_worker = None;
                Ok(())
            }
            TaskStatus::Open => Err(DomainError::invalid_state("task is not claimed")),
            TaskStatus::Done => Err(DomainError::AlreadyDone),
        }
    }
}

impl Entity for ProductionTask {
    type Id = TaskId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlanned {
    pub task_id: TaskId,
    pub order_id: OrderId,
    pub component_id: ComponentId,
    pub planned_qty: u64,
    pub deadline: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskClaimed {
    pub task_id: TaskId,
    pub worker_id: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgressReported {
    pub task_id: TaskId,
    pub worker_id: EmployeeId,
    pub delivered_qty: u64,
    pub actual_qty: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompleted {
    pub task_id: TaskId,
    pub component_id: ComponentId,
    pub planned_qty: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReleased {
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskWorkerAssigned {
    pub task_id: TaskId,
    pub worker_id: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskEvent {
    TaskPlanned(TaskPlanned),
    TaskClaimed(TaskClaimed),
    TaskProgressReported(TaskProgressReported),
    TaskCompleted(TaskCompleted),
    TaskReleased(TaskReleased),
    TaskWorkerAssigned(TaskWorkerAssigned),
}

impl Event for TaskEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TaskEvent::TaskPlanned(_) => "production.task.planned",
            TaskEvent::TaskClaimed(_) => "production.task.claimed",
            TaskEvent::TaskProgressReported(_) => "production.task.progress_reported",
            TaskEvent::TaskCompleted(_) => "production.task.completed",
            TaskEvent::TaskReleased(_) => "production.task.released",
            TaskEvent::TaskWorkerAssigned(_) => "production.task.worker_assigned",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TaskEvent::TaskPlanned(e) => e.occurred_at,
            TaskEvent::TaskClaimed(e) => e.occurred_at,
            TaskEvent::TaskProgressReported(e) => e.occurred_at,
            TaskEvent::TaskCompleted(e) => e.occurred_at,
            TaskEvent::TaskReleased(e) => e.occurred_at,
            TaskEvent::TaskWorkerAssigned(e) => e.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_task(planned: u64) -> ProductionTask {
        ProductionTask::new(
            TaskId::new(),
            OrderId::new(),
            ComponentId::new(),
            planned,
            Utc::now() + Duration::days(5),
        )
        .unwrap()
    }

    #[test]
    fn new_task_is_open_with_zero_progress() {
        let task = test_task(10);
        assert_eq!(task.status(), TaskStatus::Open);
        assert_eq!(task.actual_qty(), 0);
        assert_eq!(task.remaining_qty(), 10);
        assert!(task.assigned_worker().is_none());
    }

    #[test]
    fn claim_sets_worker_and_blocks_second_claimant() {
        let mut task = test_task(10);
        let first = EmployeeId::new();
        let second = EmployeeId::new();

        task.claim(first).unwrap();
        assert_eq!(task.status(), TaskStatus::Claimed);
        assert_eq!(task.assigned_worker(), Some(first));

        assert!(matches!(
            task.claim(second).unwrap_err(),
            DomainError::AlreadyClaimed
        ));
    }

    #[test]
    fn preassignment_restricts_claim_to_that_worker() {
        let mut task = test_task(10);
        let assigned = EmployeeId::new();
        let other = EmployeeId::new();

        task.assign(assigned).unwrap();
        assert!(matches!(
            task.ensure_claimable(other).unwrap_err(),
            DomainError::InvalidState(_)
        ));
        task.claim(assigned).unwrap();
    }

    #[test]
    fn progress_accumulates_and_completes_exactly_at_plan() {
        let mut task = test_task(10);
        let worker = EmployeeId::new();
        task.claim(worker).unwrap();

        assert!(!task.record_progress(worker, 4).unwrap());
        assert_eq!(task.actual_qty(), 4);
        assert!(task.record_progress(worker, 6).unwrap());
        assert_eq!(task.status(), TaskStatus::Done);
        assert_eq!(task.remaining_qty(), 0);
    }

    #[test]
    fn over_delivery_is_rejected_not_clamped() {
        let mut task = test_task(10);
        let worker = EmployeeId::new();
        task.claim(worker).unwrap();
        task.record_progress(worker, 8).unwrap();

        let err = task.record_progress(worker, 5).unwrap_err();
        match err {
            DomainError::ExceedsPlan {
                planned,
                actual,
                delivered,
            } => {
                assert_eq!((planned, actual, delivered), (10, 8, 5));
            }
            other => panic!("expected ExceedsPlan, got {other:?}"),
        }
        // Rejected delivery left the counter untouched.
        assert_eq!(task.actual_qty(), 8);
    }

    #[test]
    fn only_the_claiming_worker_reports_progress() {
        let mut task = test_task(10);
        let worker = EmployeeId::new();
        task.claim(worker).unwrap();
        assert!(matches!(
            task.record_progress(EmployeeId::new(), 1).unwrap_err(),
            DomainError::InvalidState(_)
        ));
    }

    #[test]
    fn release_reopens_and_clears_worker() {
        let mut task = test_task(10);
        let worker = EmployeeId::new();
        task.claim(worker).unwrap();
        task.record_progress(worker, 3).unwrap();

        task.release().unwrap();
        assert_eq!(task.status(), TaskStatus::Open);
        assert!(task.assigned_worker().is_none());
        // Progress already delivered stays on the books.
        assert_eq!(task.actual_qty(), 3);

        // Anyone may claim again after release.
        task.claim(EmployeeId::new()).unwrap();
    }

    #[test]
    fn done_task_rejects_everything() {
        let mut task = test_task(2);
        let worker = EmployeeId::new();
        task.claim(worker).unwrap();
        task.record_progress(worker, 2).unwrap();

        assert!(matches!(
            task.claim(worker).unwrap_err(),
            DomainError::AlreadyDone
        ));
        assert!(matches!(
            task.record_progress(worker, 1).unwrap_err(),
            DomainError::AlreadyDone
        ));
        assert!(matches!(task.release().unwrap_err(), DomainError::AlreadyDone));
        assert!(matches!(
            task.merge_planned(1, Utc::now()).unwrap_err(),
            DomainError::AlreadyDone
        ));
    }

    #[test]
    fn merge_grows_plan_and_keeps_earlier_deadline() {
        let mut task = test_task(10);
        let original_deadline = task.deadline();

        let later = original_deadline + Duration::days(3);
        assert_eq!(task.merge_planned(5, later).unwrap(), 15);
        assert_eq!(task.deadline(), original_deadline);

        let earlier = original_deadline - Duration::days(2);
        task.merge_planned(5, earlier).unwrap();
        assert_eq!(task.planned_qty(), 20);
        assert_eq!(task.deadline(), earlier);
    }

    #[test]
    fn merge_into_claimed_task_extends_the_plan() {
        let mut task = test_task(10);
        let worker = EmployeeId::new();
        task.claim(worker).unwrap();
        task.record_progress(worker, 8).unwrap();

        assert_eq!(task.merge_planned(4, task.deadline()).unwrap(), 14);
        assert_eq!(task.status(), TaskStatus::Claimed);
        // The worker's cap grew with the plan.
        assert!(!task.record_progress(worker, 5).unwrap());
        assert!(task.record_progress(worker, 1).unwrap());
    }

    #[test]
    fn overdue_is_derived_from_now() {
        let task = test_task(10);
        assert!(!task.is_overdue(Utc::now()));
        assert!(task.is_overdue(task.deadline() + Duration::seconds(1)));

        let mut done = test_task(1);
        let worker = EmployeeId::new();
        done.claim(worker).unwrap();
        done.record_progress(worker, 1).unwrap();
        // Done tasks are never overdue.
        assert!(!done.is_overdue(done.deadline() + Duration::days(30)));
    }
}
