pub mod mps;
pub mod reader;

pub use mps::{MpsError, MpsReader};
pub use reader::{DEMO_KEY, IngestError, ProblemReader};
