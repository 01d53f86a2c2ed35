//! Per-family controllers.

mod blackfly_s;
mod chameleon3;
mod grasshopper3;

pub use blackfly_s::BlackflyS;
pub use chameleon3::Chameleon3;
pub use grasshopper3::Grasshopper3;
