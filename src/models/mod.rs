mod report;

pub use report::{SendReportRequest, SendReportResponse};
