use std::ops::Deref;

use serde_json::Value;

use super::ResourceClient;
use crate::core::error::Result;
use crate::core::http::{ApiContext, RequestDescriptor};

/// `/user`: staff accounts
#[derive(Clone, Debug)]
pub struct UserService {
    resource: ResourceClient,
}

impl UserService {
    pub fn new(ctx: &ApiContext) -> Self {
        Self {
            resource: ResourceClient::new(ctx, "user"),
        }
    }

    pub async fn search_by_email(&self, email: &str) -> Result<Value> {
        self.resource
            .send(RequestDescriptor::get("user/search").query("email", email))
            .await
    }
}

impl Deref for UserService {
    type Target = ResourceClient;

    fn deref(&self) -> &ResourceClient {
        &self.resource
    }
}
