//! Service lifecycle tests over real storage

mod test_lifecycle;
