use serde_json::Value;

use crate::core::error::Result;
use crate::core::http::{ApiClient, ApiContext, RequestDescriptor};

/// Optional report filters; unset fields are left out of the query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub year: Option<i32>,
    pub term_type: Option<String>,
    pub limit_count: Option<u32>,
    pub threshold: Option<f64>,
}

impl ReportFilter {
    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn with_term_type(mut self, term_type: impl Into<String>) -> Self {
        self.term_type = Some(term_type.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit_count = Some(limit);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Add the set fields among `params` as query parameters
    fn apply(&self, mut request: RequestDescriptor, params: &[ReportParam]) -> RequestDescriptor {
        for param in params {
            match param {
                ReportParam::Year => {
                    if let Some(year) = self.year {
                        request = request.query("year", year);
                    }
                }
                ReportParam::TermType => {
                    if let Some(term_type) = self.term_type.as_deref().filter(|t| !t.is_empty()) {
                        request = request.query("term_type", term_type);
                    }
                }
                ReportParam::LimitCount => {
                    if let Some(limit) = self.limit_count {
                        request = request.query("limitCount", limit);
                    }
                }
                ReportParam::Threshold => {
                    if let Some(threshold) = self.threshold {
                        request = request.query("threshold", threshold);
                    }
                }
            }
        }
        request
    }
}

/// Query parameters a report endpoint reads; other filter fields are not sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportParam {
    Year,
    TermType,
    LimitCount,
    Threshold,
}

/// `/reports`: aggregate performance views
#[derive(Clone, Debug)]
pub struct ReportsService {
    api: ApiClient,
}

impl ReportsService {
    pub fn new(ctx: &ApiContext) -> Self {
        Self {
            api: ApiClient::new(ctx),
        }
    }

    /// Uses `year`, `term_type` and `limit_count`
    pub async fn top_students(&self, filter: &ReportFilter) -> Result<Value> {
        self.report(
            "reports/topstudents",
            filter,
            &[ReportParam::Year, ReportParam::TermType, ReportParam::LimitCount],
        )
        .await
    }

    /// Average mark per subject; uses `year` and `term_type`
    pub async fn average_marks(&self, filter: &ReportFilter) -> Result<Value> {
        self.report(
            "reports/avgmarks",
            filter,
            &[ReportParam::Year, ReportParam::TermType],
        )
        .await
    }

    pub async fn teacher_performance(&self) -> Result<Value> {
        self.report("reports/teacherperformance", &ReportFilter::default(), &[])
            .await
    }

    /// Progress across terms; uses `year`
    pub async fn student_progress(&self, filter: &ReportFilter) -> Result<Value> {
        self.report("reports/studentprogress", filter, &[ReportParam::Year])
            .await
    }

    /// Uses `year` and `threshold`
    pub async fn low_performing_subjects(&self, filter: &ReportFilter) -> Result<Value> {
        self.report(
            "reports/lowperformingsubjects",
            filter,
            &[ReportParam::Year, ReportParam::Threshold],
        )
        .await
    }

    /// Uses `year` and `term_type`
    pub async fn top_courses(&self, filter: &ReportFilter) -> Result<Value> {
        self.report(
            "reports/topcourses",
            filter,
            &[ReportParam::Year, ReportParam::TermType],
        )
        .await
    }

    async fn report(
        &self,
        path: &str,
        filter: &ReportFilter,
        params: &[ReportParam],
    ) -> Result<Value> {
        self.api
            .send(filter.apply(RequestDescriptor::get(path), params))
            .await
    }
}
