//! Project deliverables
//!
//! Vendors hand in up to three numbered deliverables per project, each in
//! up to three versions; clients approve them or send them back.

mod model;

pub use model::{
    check_new_version, DeliverableNumber, DeliverableStatus, DeliverableType, DeliverableVersion,
    ProjectDeliverable, VersionRejection,
};

use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDeliverableRequest {
    pub deliverable_number: DeliverableNumber,
    pub version: DeliverableVersion,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(rename = "type")]
    pub deliverable_type: DeliverableType,
    #[validate(url)]
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SubmitDeliverableRequest {
    #[validate(url)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RequestRevisionRequest {
    #[validate(length(min = 1, max = 5000))]
    pub comment: String,
}
