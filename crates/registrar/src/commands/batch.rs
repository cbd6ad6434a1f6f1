//! Batch enroll/cancel
//!
//! Reads a JSON array of operations and runs all of them at once against
//! one coordinator, so operations on the same offering contend for the
//! same lock exactly as separate requests would.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![warn(clippy::pedantic)]

use std::{path::Path, time::Instant};

use registrar_core::EnrollmentCoordinator;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{enrollment::parse_pair, AppContext};
use crate::{
    error::{CliError, Result},
    json::ErrorDetail,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOp {
    Enroll,
    Cancel,
}

/// A single operation within a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOperation {
    pub op: BatchOp,
    pub student: i64,
    pub offering: i64,
}

/// Result of a single batch operation
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemResult {
    /// Position in the input array
    pub index: usize,
    pub op: BatchOp,
    pub student: i64,
    pub offering: i64,
    pub success: bool,
    /// Enrollment id, for a successful enroll
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    pub duration_ms: u64,
}

/// Response from batch execution
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Individual results, in input order
    pub results: Vec<BatchItemResult>,
}

impl BatchResponse {
    #[must_use]
    pub const fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

pub fn read_operations(path: &Path) -> Result<Vec<BatchOperation>> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::BatchRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::BatchParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Run the batch in `path`.
pub async fn run(ctx: &AppContext, path: &Path) -> Result<BatchResponse> {
    let operations = read_operations(path)?;
    debug!(count = operations.len(), path = %path.display(), "batch loaded");
    Ok(execute_batch(&ctx.coordinator, operations).await)
}

/// Spawn every operation, then collect results in input order.
pub async fn execute_batch(
    coordinator: &EnrollmentCoordinator,
    operations: Vec<BatchOperation>,
) -> BatchResponse {
    let handles: Vec<_> = operations
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, operation)| {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { execute_operation(&coordinator, index, &operation).await })
        })
        .collect();

    let joined = futures::future::join_all(handles).await;
    let results: Vec<BatchItemResult> = joined
        .into_iter()
        .zip(operations)
        .enumerate()
        .map(|(index, (joined, operation))| {
            joined.unwrap_or_else(|e| {
                failed_result(
                    index,
                    &operation,
                    ErrorDetail::new("INTERNAL", format!("operation task failed: {e}")),
                    0,
                )
            })
        })
        .collect();

    let succeeded = results.iter().filter(|r| r.success).count();
    let failed = results.len() - succeeded;
    info!(total = results.len(), succeeded, failed, "batch finished");

    BatchResponse {
        total: results.len(),
        succeeded,
        failed,
        results,
    }
}

async fn execute_operation(
    coordinator: &EnrollmentCoordinator,
    index: usize,
    operation: &BatchOperation,
) -> BatchItemResult {
    let start = Instant::now();

    let outcome = match parse_pair(operation.student, operation.offering) {
        Ok((student, offering)) => match operation.op {
            BatchOp::Enroll => coordinator
                .enroll(student, offering)
                .await
                .map(|enrollment| Some(enrollment.id)),
            BatchOp::Cancel => coordinator.cancel(student, offering).await.map(|()| None),
        },
        Err(e) => Err(e),
    };

    let duration_ms = duration_to_ms(start.elapsed());
    match outcome {
        Ok(enrollment_id) => BatchItemResult {
            index,
            op: operation.op,
            student: operation.student,
            offering: operation.offering,
            success: true,
            enrollment_id,
            error: None,
            duration_ms,
        },
        Err(e) => failed_result(index, operation, ErrorDetail::from(&e), duration_ms),
    }
}

fn failed_result(
    index: usize,
    operation: &BatchOperation,
    error: ErrorDetail,
    duration_ms: u64,
) -> BatchItemResult {
    BatchItemResult {
        index,
        op: operation.op,
        student: operation.student,
        offering: operation.offering,
        success: false,
        enrollment_id: None,
        error: Some(error),
        duration_ms,
    }
}

fn duration_to_ms(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
