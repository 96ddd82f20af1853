//! Study core: response ledger, mastery aggregation, adaptive selection and
//! flashcard scheduling. Everything here is synchronous and free of I/O; storage
//! is reached only through the `LedgerStorage` / `ReviewStorage` traits.

pub mod assessment;
pub mod cross_review;
pub mod ledger;
pub mod mastery;
pub mod recommend;
pub mod scheduler;
pub mod selector;
pub mod types;
