pub mod display;
pub mod kind;
pub mod node;
pub mod value;

pub use display::*;
pub use kind::*;
pub use node::*;
pub use value::*;
