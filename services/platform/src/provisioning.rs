//! Two-step creations with compensating deletes.
//!
//! # Purpose
//! A college is useless without its first admin, and an assessment is useless
//! without its questions. The store only guarantees per-call atomicity, so
//! these workflows insert the parent, then the children, and delete the parent
//! again when the second step fails.
//!
//! # Failure semantics
//! - Step one fails: nothing was written; the error is returned as is.
//! - Step two fails: the parent is deleted and the step-two error returned.
//! - The compensating delete fails: logged at `error` level and counted in
//!   `campus_compensations_total{outcome="failed"}`; the parent row stays
//!   behind and the step-two error is still what the caller sees.
use crate::model::{Assessment, College, CollegeAdmin, Question};
use crate::observability;
use crate::store::{CampusStore, StoreError};
use campus_authz::Scope;
use thiserror::Error;

pub const COLLEGE_WORKFLOW: &str = "create_college_with_admin";
pub const ASSESSMENT_WORKFLOW: &str = "create_assessment_with_questions";

#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The parent row could not be created.
    #[error("creating parent failed: {0}")]
    Parent(#[source] StoreError),
    /// The parent was created but its children were not.
    #[error("creating children failed: {source}")]
    Children {
        #[source]
        source: StoreError,
        compensated: bool,
    },
}

impl ProvisionError {
    pub fn store_error(&self) -> &StoreError {
        match self {
            ProvisionError::Parent(err) => err,
            ProvisionError::Children { source, .. } => source,
        }
    }
}

pub async fn create_college_with_admin(
    store: &dyn CampusStore,
    college: College,
    admin: CollegeAdmin,
) -> Result<(College, CollegeAdmin), ProvisionError> {
    let college = store
        .create_college(college)
        .await
        .map_err(ProvisionError::Parent)?;
    let scope = Scope::College {
        college_id: college.id.clone(),
    };
    match store.create_college_admin(admin, &scope).await {
        Ok(admin) => Ok((college, admin)),
        Err(source) => {
            let compensated = compensate(COLLEGE_WORKFLOW, &college.id, &source, async {
                store.delete_college(&college.id).await
            })
            .await;
            Err(ProvisionError::Children {
                source,
                compensated,
            })
        }
    }
}

pub async fn create_assessment_with_questions(
    store: &dyn CampusStore,
    assessment: Assessment,
    questions: Vec<Question>,
    scope: &Scope,
) -> Result<(Assessment, Vec<Question>), ProvisionError> {
    let assessment = store
        .create_assessment(assessment, scope)
        .await
        .map_err(ProvisionError::Parent)?;
    match store.insert_questions(&assessment.id, questions, scope).await {
        Ok(questions) => Ok((assessment, questions)),
        Err(source) => {
            let compensated = compensate(ASSESSMENT_WORKFLOW, &assessment.id, &source, async {
                store.delete_assessment(&assessment.id, scope).await
            })
            .await;
            Err(ProvisionError::Children {
                source,
                compensated,
            })
        }
    }
}

async fn compensate<F>(workflow: &'static str, parent_id: &str, cause: &StoreError, undo: F) -> bool
where
    F: std::future::Future<Output = Result<(), StoreError>>,
{
    match undo.await {
        Ok(()) => {
            tracing::warn!(workflow, parent_id, error = %cause, "second step failed; parent removed");
            observability::record_compensation(workflow, "applied");
            true
        }
        Err(err) => {
            tracing::error!(
                workflow,
                parent_id,
                error = %err,
                cause = %cause,
                "compensating delete failed; orphaned parent row left behind"
            );
            observability::record_compensation(workflow, "failed");
            false
        }
    }
}
