//! Resource services
//!
//! One thin service per API resource. Each maps a method to an HTTP verb and
//! path and returns the decoded JSON body; entity schemas belong to the API.

mod assessment;
mod course;
mod marks;
mod reports;
mod student;
mod student_course;
mod subject;
mod user;

use std::fmt::Display;

use serde::Serialize;
use serde_json::Value;

use crate::core::error::Result;
use crate::core::http::{ApiClient, ApiContext, RequestDescriptor};

pub use assessment::TestService;
pub use course::CourseService;
pub use marks::StudentMarksService;
pub use reports::{ReportFilter, ReportsService};
pub use student::StudentService;
pub use student_course::StudentCourseService;
pub use subject::SubjectService;
pub use user::UserService;

/// Soft-delete CRUD shared by every managed resource
///
/// `GET|POST /{resource}`, `GET|PUT|DELETE /{resource}/{id}`,
/// `POST /{resource}/{id}/restore`, `GET /{resource}/deleted`.
#[derive(Clone, Debug)]
pub struct ResourceClient {
    api: ApiClient,
    resource: &'static str,
}

impl ResourceClient {
    pub fn new(ctx: &ApiContext, resource: &'static str) -> Self {
        Self {
            api: ApiClient::new(ctx),
            resource,
        }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    /// All active records
    pub async fn all(&self) -> Result<Value> {
        self.send(RequestDescriptor::get(self.resource)).await
    }

    pub async fn get(&self, id: impl Display) -> Result<Value> {
        self.send(RequestDescriptor::get(self.resource).segment(id))
            .await
    }

    pub async fn create(&self, data: &impl Serialize) -> Result<Value> {
        self.send(RequestDescriptor::post(self.resource).json(data)?)
            .await
    }

    pub async fn update(&self, id: impl Display, data: &impl Serialize) -> Result<Value> {
        self.send(RequestDescriptor::put(self.resource).segment(id).json(data)?)
            .await
    }

    /// Soft delete; the record stays restorable
    pub async fn delete(&self, id: impl Display) -> Result<Value> {
        self.send(RequestDescriptor::delete(self.resource).segment(id))
            .await
    }

    pub async fn restore(&self, id: impl Display) -> Result<Value> {
        self.send(
            RequestDescriptor::post(self.resource)
                .segment(id)
                .segment("restore"),
        )
        .await
    }

    /// Soft-deleted records
    pub async fn deleted(&self) -> Result<Value> {
        self.send(RequestDescriptor::get(self.resource).segment("deleted"))
            .await
    }

    pub(crate) async fn send(&self, request: RequestDescriptor) -> Result<Value> {
        self.api.send(request).await
    }
}

/// The management screens' view of the API: one client per managed resource
#[derive(Clone, Debug)]
pub struct ManagementService {
    pub students: StudentService,
    pub subjects: SubjectService,
    pub courses: CourseService,
    pub tests: TestService,
}

impl ManagementService {
    pub fn new(ctx: &ApiContext) -> Self {
        Self {
            students: StudentService::new(ctx),
            subjects: SubjectService::new(ctx),
            courses: CourseService::new(ctx),
            tests: TestService::new(ctx),
        }
    }
}
