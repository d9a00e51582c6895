pub mod bot;
pub mod chart;
pub mod cliopt;
pub mod error;
pub mod http;
pub mod model;
pub mod parser;
pub mod store;
