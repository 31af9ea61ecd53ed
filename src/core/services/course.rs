use std::fmt::Display;
use std::ops::Deref;

use serde_json::Value;

use super::ResourceClient;
use crate::core::error::Result;
use crate::core::http::{ApiContext, RequestDescriptor};

/// `/course`
#[derive(Clone, Debug)]
pub struct CourseService {
    resource: ResourceClient,
}

impl CourseService {
    pub fn new(ctx: &ApiContext) -> Self {
        Self {
            resource: ResourceClient::new(ctx, "course"),
        }
    }

    /// Academic years that have at least one course
    pub async fn years(&self) -> Result<Value> {
        self.resource
            .send(RequestDescriptor::get("course/years"))
            .await
    }

    pub async fn search_by_name(&self, name: &str) -> Result<Value> {
        self.resource
            .send(RequestDescriptor::get("course/search/name").segment(name))
            .await
    }

    pub async fn search_by_year(&self, year: impl Display) -> Result<Value> {
        self.resource
            .send(RequestDescriptor::get("course/search/year").segment(year))
            .await
    }

    pub async fn search_by_name_and_year(&self, name: &str, year: impl Display) -> Result<Value> {
        self.resource
            .send(
                RequestDescriptor::get("course/search/name")
                    .segment(name)
                    .segment("year")
                    .segment(year),
            )
            .await
    }
}

impl Deref for CourseService {
    type Target = ResourceClient;

    fn deref(&self) -> &ResourceClient {
        &self.resource
    }
}
