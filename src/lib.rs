pub mod cli;
pub mod config;
pub mod ctx;
pub mod input;
pub mod io;
pub mod math;
pub mod measure;
pub mod pipeline;
pub mod schema;
pub mod scores;
