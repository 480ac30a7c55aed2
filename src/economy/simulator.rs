//! Balance simulator.
//! Run with: cargo test simulate_ -- --ignored --nocapture
