use std::fmt::Display;

use serde::Serialize;
use serde_json::Value;

use crate::core::error::Result;
use crate::core::http::{ApiClient, ApiContext, RequestDescriptor};

/// Marks entry and lookup for teachers and officers
#[derive(Clone, Debug)]
pub struct StudentMarksService {
    api: ApiClient,
}

impl StudentMarksService {
    pub fn new(ctx: &ApiContext) -> Self {
        Self {
            api: ApiClient::new(ctx),
        }
    }

    /// Students sitting `test_id` within `course_id`
    pub async fn test_enrollments(&self, course_id: impl Display, test_id: impl Display) -> Result<Value> {
        self.api
            .send(
                RequestDescriptor::get("test-enrollment/course")
                    .segment(course_id)
                    .segment("test")
                    .segment(test_id),
            )
            .await
    }

    pub async fn update_mark(&self, record_id: impl Display, mark: &impl Serialize) -> Result<Value> {
        self.api
            .send(
                RequestDescriptor::put("test-enrollment")
                    .segment(record_id)
                    .segment("mark")
                    .json(mark)?,
            )
            .await
    }

    /// Course/subject assignments of one teacher
    pub async fn teacher_courses(&self, teacher_id: impl Display) -> Result<Value> {
        self.api
            .send(RequestDescriptor::get("course-subject-enrollment/teacher").segment(teacher_id))
            .await
    }

    pub async fn student_marks(&self, student_id: impl Display) -> Result<Value> {
        self.api
            .send(
                RequestDescriptor::get("reports/student")
                    .segment(student_id)
                    .segment("marks"),
            )
            .await
    }
}
