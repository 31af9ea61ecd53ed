//! Client core: session storage, the request pipeline and the API services

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
mod interceptor;
pub mod navigation;
pub mod scope;
pub mod services;
pub mod session;
pub mod store;
#[cfg(test)]
pub(crate) mod test_support;

pub use auth::AuthService;
pub use config::{Config, RefreshPolicy};
pub use error::{ApiError, Result};
pub use http::{ApiClient, ApiContext, RequestDescriptor};
pub use navigation::{LogNavigator, Navigator, RecordingNavigator};
pub use scope::RequestScope;
pub use services::{
    CourseService, ManagementService, ReportFilter, ReportsService, ResourceClient,
    StudentCourseService, StudentMarksService, StudentService, SubjectService, TestService,
    UserService,
};
pub use session::{AuthResponse, Credentials, RefreshResponse, Role, Session, StoredSession, User};
pub use store::{KeyValueStorage, MemoryStorage, TokenStore};
