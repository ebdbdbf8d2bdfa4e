pub mod split;
pub mod tally;
pub mod types;

pub use split::{percentage_sum, split_by_percentage, SplitError};
pub use tally::Tally;
pub use types::{EventState, ProposalKind, ProposalOutcome};
