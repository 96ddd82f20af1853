pub mod responses;
pub mod review_states;
