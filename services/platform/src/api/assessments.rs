//! Assessment engine endpoints.
//!
//! # Purpose
//! Listing, authoring and attempting multiple-choice assessments.
//!
//! # Key invariants
//! - Students never receive `correctAnswer`.
//! - An attempt's `score` and `totalPoints` are computed once, at submission,
//!   from the questions as they are at that moment.
//! - Every lookup goes through the caller's tenant scope; assessments of other
//!   colleges are reported as not found.
use crate::api::error::{
    ApiError, api_internal, api_internal_message, api_not_found, api_validation_error,
};
use crate::api::extract::ValidatedJson;
use crate::api::types::{
    AssessmentForStudent, AssessmentListEntry, AssessmentWithQuestions, AttemptRequest,
    AttemptResponse, CreateAssessmentRequest, MessageResponse, QuestionInput,
    UpdateAssessmentRequest,
};
use crate::app::AppState;
use crate::auth::guard::scoped;
use crate::grading::score_attempt;
use crate::model::{
    AnswerLetter, Assessment, AssessmentRef, AssessmentUpdate, Attempt, AttemptWithAssessment,
    Question, QuestionView, new_id,
};
use crate::observability;
use crate::provisioning::{self, ProvisionError};
use crate::store::StoreError;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use campus_authz::{Identity, ResourceKind};
use chrono::Utc;

const NOT_FOUND: &str = "Assessment not found";
/// Upper bound for a single question's weight.
pub const MAX_QUESTION_POINTS: u32 = 1_000;

fn not_found_or_internal(err: StoreError, message: &str) -> ApiError {
    match err {
        StoreError::NotFound(_) => api_not_found(NOT_FOUND),
        other => api_internal(message, &other),
    }
}

#[utoipa::path(
    get,
    path = "/api/assessments",
    tag = "assessments",
    security(("bearer" = [])),
    responses((status = 200, description = "Visible assessments, newest first", body = [AssessmentListEntry]))
)]
pub(crate) async fn list_assessments(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<AssessmentListEntry>>, ApiError> {
    let scope = scoped(&identity, ResourceKind::Assessment, NOT_FOUND)?;
    let assessments = state
        .store
        .list_assessments(&scope)
        .await
        .map_err(|err| api_internal("Failed to fetch assessments", &err))?;
    if assessments.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let ids: Vec<String> = assessments.iter().map(|a| a.id.clone()).collect();
    let counts = state
        .store
        .assessment_counts(&ids)
        .await
        .map_err(|err| api_internal("Failed to count assessment activity", &err))?;
    let items = assessments
        .into_iter()
        .map(|assessment| AssessmentListEntry {
            count: counts.get(&assessment.id).copied().unwrap_or_default(),
            assessment,
        })
        .collect();
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/assessments/{id}",
    tag = "assessments",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Assessment id")),
    responses(
        (status = 200, description = "Assessment with questions, no answer key", body = AssessmentForStudent),
        (status = 404, description = "Not found in the caller's college")
    )
)]
pub(crate) async fn get_assessment(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<AssessmentForStudent>, ApiError> {
    let scope = scoped(&identity, ResourceKind::Question, NOT_FOUND)?;
    let assessment = state
        .store
        .get_assessment(&id, &scope)
        .await
        .map_err(|err| not_found_or_internal(err, "Failed to fetch assessment"))?;
    let questions = state
        .store
        .list_questions(&assessment.id, &scope)
        .await
        .map_err(|err| not_found_or_internal(err, "Failed to fetch questions"))?;
    Ok(Json(AssessmentForStudent {
        assessment,
        questions: questions.iter().map(QuestionView::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/assessments",
    tag = "assessments",
    security(("bearer" = [])),
    request_body = CreateAssessmentRequest,
    responses(
        (status = 201, description = "Created with questions", body = AssessmentWithQuestions),
        (status = 400, description = "Invalid assessment"),
        (status = 404, description = "College outside the caller's tenant")
    )
)]
pub(crate) async fn create_assessment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(body): ValidatedJson<CreateAssessmentRequest>,
) -> Result<(StatusCode, Json<AssessmentWithQuestions>), ApiError> {
    let scope = scoped(&identity, ResourceKind::Assessment, "College not found")?;
    let college_id = match (body.college_id.as_deref(), scope.college_id()) {
        (Some(requested), Some(own)) if requested != own => {
            return Err(api_not_found("College not found"));
        }
        (_, Some(own)) => own.to_string(),
        (Some(requested), None) => requested.to_string(),
        (None, None) => return Err(api_validation_error("College ID is required")),
    };

    let title = body.title.trim();
    if title.is_empty() || body.questions.is_empty() {
        return Err(api_validation_error(
            "Title and at least one question are required",
        ));
    }
    let assessment = Assessment {
        id: new_id(),
        title: title.to_string(),
        description: body.description.filter(|text| !text.trim().is_empty()),
        college_id,
        created_at: Utc::now(),
    };
    let questions = body
        .questions
        .iter()
        .enumerate()
        .map(|(index, input)| build_question(&assessment.id, index, input))
        .collect::<Result<Vec<_>, _>>()?;

    match provisioning::create_assessment_with_questions(
        &*state.store,
        assessment,
        questions,
        &scope,
    )
    .await
    {
        Ok((assessment, questions)) => {
            tracing::info!(
                assessment_id = %assessment.id,
                college_id = %assessment.college_id,
                questions = questions.len(),
                "assessment created"
            );
            Ok((
                StatusCode::CREATED,
                Json(AssessmentWithQuestions {
                    assessment,
                    questions,
                }),
            ))
        }
        Err(ProvisionError::Parent(StoreError::NotFound(_))) => {
            Err(api_not_found("College not found"))
        }
        Err(err @ ProvisionError::Parent(_)) => {
            Err(api_internal("Failed to create assessment", err.store_error()))
        }
        Err(err @ ProvisionError::Children { .. }) => {
            Err(api_internal("Failed to create questions", err.store_error()))
        }
    }
}

fn build_question(
    assessment_id: &str,
    index: usize,
    input: &QuestionInput,
) -> Result<Question, ApiError> {
    let position = index + 1;
    let fields = [
        &input.question,
        &input.option_a,
        &input.option_b,
        &input.option_c,
        &input.option_d,
    ];
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(api_validation_error(&format!(
            "Question {position} needs text and four options"
        )));
    }
    let correct_answer = AnswerLetter::parse(input.correct_answer.trim()).ok_or_else(|| {
        api_validation_error(&format!(
            "Question {position} correctAnswer must be one of A, B, C, D"
        ))
    })?;
    let points = match input.points {
        None | Some(0) => 1,
        Some(points) if points < 0 => {
            return Err(api_validation_error(&format!(
                "Question {position} points must be positive"
            )));
        }
        Some(points) => u32::try_from(points)
            .ok()
            .filter(|points| *points <= MAX_QUESTION_POINTS)
            .ok_or_else(|| {
                api_validation_error(&format!(
                    "Question {position} points must be at most {MAX_QUESTION_POINTS}"
                ))
            })?,
    };
    Ok(Question {
        id: new_id(),
        assessment_id: assessment_id.to_string(),
        question: input.question.clone(),
        option_a: input.option_a.clone(),
        option_b: input.option_b.clone(),
        option_c: input.option_c.clone(),
        option_d: input.option_d.clone(),
        correct_answer,
        points,
    })
}

#[utoipa::path(
    post,
    path = "/api/assessments/{id}/attempt",
    tag = "assessments",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Assessment id")),
    request_body = AttemptRequest,
    responses(
        (status = 200, description = "Graded attempt", body = AttemptResponse),
        (status = 400, description = "Malformed request body"),
        (status = 404, description = "Not found in the caller's college")
    )
)]
pub(crate) async fn submit_attempt(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(body): ValidatedJson<AttemptRequest>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let question_scope = scoped(&identity, ResourceKind::Question, NOT_FOUND)?;
    let attempt_scope = scoped(&identity, ResourceKind::Attempt, NOT_FOUND)?;
    let assessment = state
        .store
        .get_assessment(&id, &question_scope)
        .await
        .map_err(|err| not_found_or_internal(err, "Failed to fetch assessment"))?;
    let questions = state
        .store
        .list_questions(&assessment.id, &question_scope)
        .await
        .map_err(|err| not_found_or_internal(err, "Failed to fetch questions"))?;

    let Some(graded) = score_attempt(&questions, &body.answers) else {
        tracing::error!(assessment_id = %assessment.id, "assessment points overflow");
        return Err(api_internal_message("Failed to grade attempt"));
    };
    let attempt = Attempt {
        id: new_id(),
        student_id: identity.id.clone(),
        assessment_id: assessment.id.clone(),
        score: graded.score,
        total_points: graded.total_points,
        answers: body.answers,
        completed_at: Utc::now(),
    };
    let attempt = state
        .store
        .record_attempt(attempt, &attempt_scope)
        .await
        .map_err(|err| not_found_or_internal(err, "Failed to save attempt"))?;
    observability::record_attempt_submitted();
    tracing::info!(
        attempt_id = %attempt.id,
        assessment_id = %assessment.id,
        score = graded.score,
        total_points = graded.total_points,
        "attempt recorded"
    );

    Ok(Json(AttemptResponse {
        message: "Assessment submitted successfully".to_string(),
        attempt: AttemptWithAssessment {
            attempt,
            assessment: Some(AssessmentRef {
                id: assessment.id,
                title: assessment.title,
            }),
        },
        score: graded.score,
        total_points: graded.total_points,
        percentage: graded.percentage(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/assessments/{id}",
    tag = "assessments",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Assessment id")),
    request_body = UpdateAssessmentRequest,
    responses(
        (status = 200, description = "Updated assessment", body = Assessment),
        (status = 404, description = "Not found in the caller's college")
    )
)]
pub(crate) async fn update_assessment(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(body): ValidatedJson<UpdateAssessmentRequest>,
) -> Result<Json<Assessment>, ApiError> {
    let scope = scoped(&identity, ResourceKind::Assessment, NOT_FOUND)?;
    if body.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
        return Err(api_validation_error("Title cannot be empty"));
    }
    let update = AssessmentUpdate {
        title: body.title.map(|title| title.trim().to_string()),
        description: body.description,
    };
    let updated = state
        .store
        .update_assessment(&id, update, &scope)
        .await
        .map_err(|err| not_found_or_internal(err, "Failed to update assessment"))?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/assessments/{id}",
    tag = "assessments",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Assessment id")),
    responses(
        (status = 200, description = "Deleted with its questions and attempts", body = MessageResponse),
        (status = 404, description = "Not found in the caller's college")
    )
)]
pub(crate) async fn delete_assessment(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<MessageResponse>, ApiError> {
    let scope = scoped(&identity, ResourceKind::Assessment, NOT_FOUND)?;
    state
        .store
        .delete_assessment(&id, &scope)
        .await
        .map_err(|err| not_found_or_internal(err, "Failed to delete assessment"))?;
    tracing::info!(assessment_id = %id, "assessment deleted");
    Ok(Json(MessageResponse::new("Assessment deleted successfully")))
}
