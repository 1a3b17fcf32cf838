pub mod submission;
pub mod term;
pub mod record;
pub mod car_design;
pub mod plugin;

pub use crate::entities::submission::{EntityId, PublicItem, Status, Submission, SubmissionMeta, SubmissionType};
pub use crate::entities::term::{MentionTag, SkillLevel, Term, TermCategory};
pub use crate::entities::record::{Record, RecordCategory};
pub use crate::entities::car_design::CarDesign;
pub use crate::entities::plugin::Plugin;
