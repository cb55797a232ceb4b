mod groups;
mod schedule;

pub use groups::*;
pub use schedule::*;
