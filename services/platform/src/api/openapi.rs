//! OpenAPI schema aggregation for the campus API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document served
//! at `/api/openapi.json` and rendered by Swagger UI at `/docs`.
use crate::api::{
    admin, assessments, colleges, progress, students, superadmin, system,
    types::{
        AdminCreatedResponse, AssessmentForStudent, AssessmentListEntry, AssessmentWithQuestions,
        AttemptRequest, AttemptResponse, AuthResponse, AuthUser, CollegeStats,
        CreateAccountRequest, CreateAssessmentRequest, CreateCollegeRequest,
        CreateCollegeResponse, ErrorResponse, HealthStatus, LoginRequest, MessageResponse,
        PlatformStats, ProgressOverview, ProgressRequest, QuestionInput, SignupRequest,
        StudentProfile, StudentProgressReport, StudentRosterEntry, StudentSummary,
        SuperAdminCreatedResponse, UpdateAssessmentRequest,
    },
};
use crate::auth::login;
use crate::curriculum::Topic;
use crate::model::{
    AnswerLetter, Assessment, AssessmentCounts, AssessmentRef, Attempt, AttemptWithAssessment,
    College, CollegeAdminView, CollegeSummary, PlatformAdminView, Progress, Question,
    QuestionView, StudentActivityCounts, StudentView, TopicStatus,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "campus-platform",
        version = "v1",
        description = "Campus assessment and DSA progress HTTP API"
    ),
    paths(
        system::health,
        login::student_signup,
        login::student_login,
        login::college_admin_login,
        login::superadmin_login,
        colleges::list_public_colleges,
        colleges::verify_college,
        students::profile,
        students::progress_overview,
        assessments::list_assessments,
        assessments::get_assessment,
        assessments::create_assessment,
        assessments::submit_attempt,
        assessments::update_assessment,
        assessments::delete_assessment,
        progress::list_dsa_progress,
        progress::upsert_dsa_progress,
        progress::list_topics,
        admin::list_students,
        admin::student_progress,
        admin::list_admins,
        admin::create_admin,
        admin::delete_admin,
        admin::college_stats,
        superadmin::list_colleges,
        superadmin::create_college,
        superadmin::delete_college,
        superadmin::list_superadmins,
        superadmin::create_superadmin,
        superadmin::delete_superadmin,
        superadmin::platform_stats
    ),
    components(schemas(
        ErrorResponse,
        HealthStatus,
        MessageResponse,
        SignupRequest,
        LoginRequest,
        AuthUser,
        AuthResponse,
        CreateCollegeRequest,
        CreateCollegeResponse,
        CreateAccountRequest,
        SuperAdminCreatedResponse,
        AdminCreatedResponse,
        PlatformStats,
        CollegeStats,
        StudentRosterEntry,
        StudentSummary,
        StudentProgressReport,
        ProgressOverview,
        StudentProfile,
        QuestionInput,
        CreateAssessmentRequest,
        UpdateAssessmentRequest,
        AssessmentListEntry,
        AssessmentForStudent,
        AssessmentWithQuestions,
        AttemptRequest,
        AttemptResponse,
        ProgressRequest,
        Topic,
        College,
        CollegeSummary,
        PlatformAdminView,
        CollegeAdminView,
        StudentView,
        StudentActivityCounts,
        AnswerLetter,
        Assessment,
        AssessmentCounts,
        AssessmentRef,
        Question,
        QuestionView,
        Attempt,
        AttemptWithAssessment,
        Progress,
        TopicStatus
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "system", description = "Health"),
        (name = "auth", description = "Signup and login"),
        (name = "colleges", description = "Public college directory"),
        (name = "students", description = "Student self-service"),
        (name = "assessments", description = "Assessment engine"),
        (name = "progress", description = "DSA progress tracker"),
        (name = "admin", description = "College administration"),
        (name = "superadmin", description = "Platform administration")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
