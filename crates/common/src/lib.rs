pub mod codeforces;
pub mod config;
pub mod error;
pub mod http;
pub mod leetcode;
pub mod observability;
pub mod types;
