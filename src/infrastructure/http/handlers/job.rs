//! Job Handlers
//!
//! 请求体解析失败同样以 `{error}` 返回，HTTP 状态码始终为 200；
//! 结果摘要放进响应扩展供访问日志使用

use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::SynthesizeCommand;
use crate::domain::job::{JobEnvelope, JobOutput};
use crate::infrastructure::http::middleware::JobOutcome;
use crate::infrastructure::http::state::AppState;

fn respond(output: JobOutput, job_id: Option<String>) -> Response {
    let outcome = JobOutcome {
        job_id,
        success: output.is_success(),
    };
    let mut response = Json(output).into_response();
    response.extensions_mut().insert(outcome);
    response
}

pub async fn run_job(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<JobEnvelope>, JsonRejection>,
) -> Response {
    let envelope = match payload {
        Ok(Json(envelope)) => envelope,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Invalid job payload");
            let output =
                JobOutput::failure(format!("invalid job payload: {}", rejection.body_text()));
            return respond(output, None);
        }
    };

    let cmd = SynthesizeCommand::from_envelope(envelope);
    let job_id = cmd.job_id.clone();
    let output = state.synthesize_handler.run_command(cmd).await;
    respond(output, Some(job_id))
}
