use serde::{Deserialize, Serialize};
use validator::Validate;

/// Arguments of the match creation job.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMatchesRequest {
    #[validate(length(min = 1, message = "domainId is required"))]
    pub domain_id: String,

    #[validate(length(min = 1, message = "groupName is required"))]
    pub group_name: String,

    #[validate(length(min = 1, message = "templateTid is required"))]
    pub template_tid: String,
}
