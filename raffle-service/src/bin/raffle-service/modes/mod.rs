pub mod advance;
pub mod import;
pub mod results;
pub mod run;
