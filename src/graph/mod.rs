//! The persisted graph form of a sequence: primary records joined by edges.

pub mod reconstruct;
pub mod record;
pub mod second_pass;

pub use reconstruct::reconstruct;
pub use record::*;
pub use second_pass::SecondPass;
