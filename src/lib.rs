//! Cross-crate scenario tests for the tally workspace. See `tests/`.
