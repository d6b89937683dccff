//! Startup loader tests

mod test_load;
