pub mod error;
pub mod models;
pub mod validation;
pub mod tally;
pub mod vote_state;

pub use error::{Error, ErrorCode, Result, ErrorResponse};
pub use models::*;
pub use validation::*;
pub use tally::{count_votes, category_standings, NomineeStanding, VotingProgress};
pub use vote_state::{
    LoadOutcome, LoadTicket, MemorySlot, SharedVoteStore, StateSlot, StoreError, SubmitTicket, VoteService,
    VoteState, VoteStateStore, STORAGE_KEY,
};

#[cfg(test)]
mod tests;
