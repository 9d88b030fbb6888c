use serde::{Deserialize, Serialize};

/// 转发请求，仅包含一段文本
#[derive(Debug, Deserialize)]
pub struct SendReportRequest {
    #[serde(default)]
    pub text: Option<String>,
}

impl SendReportRequest {
    /// 去掉首尾空白后非空才算有效，返回原始文本
    pub fn into_text(self) -> Option<String> {
        self.text.filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct SendReportResponse {
    pub message: &'static str,
}

impl SendReportResponse {
    pub fn sent() -> Self {
        Self { message: "sent" }
    }
}
