use std::fmt::Display;

use serde::Serialize;
use serde_json::Value;

use crate::core::error::Result;
use crate::core::http::{ApiClient, ApiContext, RequestDescriptor};

#[derive(Debug, Serialize)]
struct EnrollmentRequest<'a, C, S, U> {
    course_id: C,
    student_ids: &'a [S],
    user_id: U,
}

/// `/student-course`: enrollment of students into courses
#[derive(Clone, Debug)]
pub struct StudentCourseService {
    api: ApiClient,
}

impl StudentCourseService {
    pub fn new(ctx: &ApiContext) -> Self {
        Self {
            api: ApiClient::new(ctx),
        }
    }

    /// Enroll several students at once; `user_id` is the staff member recording it
    pub async fn enroll<C, S, U>(&self, course_id: C, student_ids: &[S], user_id: U) -> Result<Value>
    where
        C: Serialize,
        S: Serialize,
        U: Serialize,
    {
        let body = EnrollmentRequest {
            course_id,
            student_ids,
            user_id,
        };
        self.api
            .send(RequestDescriptor::post("student-course").json(&body)?)
            .await
    }

    pub async fn update(&self, record_id: impl Display, data: &impl Serialize) -> Result<Value> {
        self.api
            .send(
                RequestDescriptor::put("student-course")
                    .segment(record_id)
                    .json(data)?,
            )
            .await
    }

    pub async fn delete(&self, record_id: impl Display) -> Result<Value> {
        self.api
            .send(RequestDescriptor::delete("student-course").segment(record_id))
            .await
    }

    pub async fn get(&self, record_id: impl Display) -> Result<Value> {
        self.api
            .send(RequestDescriptor::get("student-course").segment(record_id))
            .await
    }

    pub async fn by_student(&self, student_id: impl Display) -> Result<Value> {
        self.api
            .send(RequestDescriptor::get("student-course/student").segment(student_id))
            .await
    }

    pub async fn by_course(&self, course_id: impl Display) -> Result<Value> {
        self.api
            .send(RequestDescriptor::get("student-course/course").segment(course_id))
            .await
    }

    /// Enrollments joined with course and subject details
    pub async fn by_student_with_details(&self, student_id: impl Display) -> Result<Value> {
        self.api
            .send(
                RequestDescriptor::get("student-course/student")
                    .segment(student_id)
                    .segment("details"),
            )
            .await
    }

    pub async fn by_course_with_details(&self, course_id: impl Display) -> Result<Value> {
        self.api
            .send(
                RequestDescriptor::get("student-course/course")
                    .segment(course_id)
                    .segment("details"),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RefreshPolicy;
    use crate::core::test_support::{MockApi, test_context};
    use serde_json::json;

    #[tokio::test]
    async fn test_bulk_enrollment_body() {
        let mock = MockApi::spawn().await;
        let (ctx, _nav) = test_context(&mock, RefreshPolicy::Coalesced);

        StudentCourseService::new(&ctx)
            .enroll(3, &[10, 11, 12], 1)
            .await
            .unwrap();

        let request = mock.last_request();
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/student-course");
        assert_eq!(
            request.body,
            json!({"course_id": 3, "student_ids": [10, 11, 12], "user_id": 1})
        );
    }

    #[tokio::test]
    async fn test_enrollment_routes() {
        let mock = MockApi::spawn().await;
        let (ctx, _nav) = test_context(&mock, RefreshPolicy::Coalesced);
        let enrollments = StudentCourseService::new(&ctx);

        enrollments.get(5).await.unwrap();
        enrollments.update(5, &json!({"status": "active"})).await.unwrap();
        enrollments.delete(5).await.unwrap();
        enrollments.by_student(10).await.unwrap();
        enrollments.by_course(3).await.unwrap();
        enrollments.by_student_with_details(10).await.unwrap();
        enrollments.by_course_with_details(3).await.unwrap();

        let calls: Vec<String> = mock
            .requests()
            .into_iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect();
        assert_eq!(
            calls,
            vec![
                "GET /api/student-course/5",
                "PUT /api/student-course/5",
                "DELETE /api/student-course/5",
                "GET /api/student-course/student/10",
                "GET /api/student-course/course/3",
                "GET /api/student-course/student/10/details",
                "GET /api/student-course/course/3/details",
            ]
        );
    }
}
