use std::ops::Deref;

use serde_json::Value;

use super::ResourceClient;
use crate::core::error::Result;
use crate::core::http::{ApiContext, RequestDescriptor};

/// `/student`
#[derive(Clone, Debug)]
pub struct StudentService {
    resource: ResourceClient,
}

impl StudentService {
    pub fn new(ctx: &ApiContext) -> Self {
        Self {
            resource: ResourceClient::new(ctx, "student"),
        }
    }

    pub async fn search_by_name(&self, name: &str) -> Result<Value> {
        self.resource
            .send(RequestDescriptor::get("student/search").query("name", name))
            .await
    }
}

impl Deref for StudentService {
    type Target = ResourceClient;

    fn deref(&self) -> &ResourceClient {
        &self.resource
    }
}
