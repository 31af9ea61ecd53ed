use std::fmt::Display;
use std::ops::Deref;

use serde_json::Value;

use super::ResourceClient;
use crate::core::error::Result;
use crate::core::http::{ApiContext, RequestDescriptor};

/// `/test`: assessments such as term exams and quizzes
#[derive(Clone, Debug)]
pub struct TestService {
    resource: ResourceClient,
}

impl TestService {
    pub fn new(ctx: &ApiContext) -> Self {
        Self {
            resource: ResourceClient::new(ctx, "test"),
        }
    }

    pub async fn years(&self) -> Result<Value> {
        self.resource.send(RequestDescriptor::get("test/years")).await
    }

    pub async fn by_type(&self, test_type: &str) -> Result<Value> {
        self.resource
            .send(RequestDescriptor::get("test/types").segment(test_type))
            .await
    }

    pub async fn by_year(&self, year: impl Display) -> Result<Value> {
        self.resource
            .send(RequestDescriptor::get("test/year").segment(year))
            .await
    }

    pub async fn search_by_name(&self, name: &str) -> Result<Value> {
        self.resource
            .send(RequestDescriptor::get("test/search/name").segment(name))
            .await
    }

    pub async fn by_subject(&self, subject_id: impl Display) -> Result<Value> {
        self.resource
            .send(RequestDescriptor::get("test/subject").segment(subject_id))
            .await
    }
}

impl Deref for TestService {
    type Target = ResourceClient;

    fn deref(&self) -> &ResourceClient {
        &self.resource
    }
}
