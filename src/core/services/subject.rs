use std::ops::Deref;

use serde_json::Value;

use super::ResourceClient;
use crate::core::error::Result;
use crate::core::http::{ApiContext, RequestDescriptor};

/// `/subject`
#[derive(Clone, Debug)]
pub struct SubjectService {
    resource: ResourceClient,
}

impl SubjectService {
    pub fn new(ctx: &ApiContext) -> Self {
        Self {
            resource: ResourceClient::new(ctx, "subject"),
        }
    }

    pub async fn search_by_name(&self, name: &str) -> Result<Value> {
        self.resource
            .send(RequestDescriptor::get("subject/search").segment(name))
            .await
    }
}

impl Deref for SubjectService {
    type Target = ResourceClient;

    fn deref(&self) -> &ResourceClient {
        &self.resource
    }
}
