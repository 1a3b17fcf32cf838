use serde::{Deserialize, Serialize};
use crate::entities::submission::{Submission, SubmissionMeta, SubmissionType};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CarDesign {
    #[serde(flatten)]
    pub meta: SubmissionMeta,
    pub title: String,
    pub description: String,
    /// `data:image/...;base64,...` URL.
    pub image: String,
}

impl Submission for CarDesign {
    const TYPE: SubmissionType = SubmissionType::CarDesigns;

    fn meta(&self) -> &SubmissionMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SubmissionMeta {
        &mut self.meta
    }

    fn matches_search(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(query) || self.description.to_lowercase().contains(query)
    }
}
