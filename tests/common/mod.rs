#![allow(dead_code)]
pub mod test_runner;
pub mod utils;
