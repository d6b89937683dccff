//! Index entity tests
//!
//! Writer acquisition under contention and failure, and the
//! best-effort statistics refresh.

mod test_metadata;
mod test_writer;
