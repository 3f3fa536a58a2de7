mod queue;
mod vars;

pub use queue::{Notice, NoticeLevel, NoticeQueue};
pub use vars::Vars;
