pub mod submission;
pub use submission::{
    RowOutcome, RowReport, SkipReason, SubmissionAdapter, SubmissionReport, SubmitError,
};

pub mod catalog_service;
pub use catalog_service::{CatalogError, CatalogService, CatalogSnapshot};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, SignUpOutcome};
pub use auth_service_impl::GoTrueAuthService;
