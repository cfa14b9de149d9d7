pub mod config;
pub mod fetch;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod scale;
pub mod time_display;
pub mod traffic;
