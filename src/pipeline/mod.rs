pub mod pattern;
pub mod session;

pub use pattern::Pattern;
pub use session::{PlayerSpec, SchedulerSection, Session};
