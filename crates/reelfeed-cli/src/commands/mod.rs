pub mod code;
pub mod config;
pub mod feed;
pub mod run;
