use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    AppState,
    cooldown::GateDecision,
    error::AppError,
    models::{SendReportRequest, SendReportResponse},
};

/// 状态检查接口
pub async fn status(State(state): State<AppState>) -> String {
    match state.gate.check().await {
        GateDecision::Allowed => "Report relay is running, ready to send".to_string(),
        GateDecision::Denied(remaining) => format!(
            "Report relay is running, cooldown active, {} remaining",
            remaining
        ),
    }
}

pub async fn send_report(
    State(state): State<AppState>,
    payload: Result<Json<SendReportRequest>, JsonRejection>,
) -> Result<Json<SendReportResponse>, AppError> {
    // 请求体无法解析时与缺少 text 同等处理
    let text = match payload {
        Ok(Json(req)) => req.into_text(),
        Err(rejection) => {
            tracing::debug!("Rejected report body: {}", rejection);
            None
        }
    }
    .ok_or(AppError::MissingText)?;

    let pass = state.gate.enter().await.map_err(|remaining| {
        tracing::info!("Report rejected, cooldown active for {}", remaining);
        AppError::CooldownActive(remaining)
    })?;

    // 转发失败时 pass 被丢弃，冷却状态不变
    state.relay.forward(&text).await?;
    pass.record_success().await;

    Ok(Json(SendReportResponse::sent()))
}
