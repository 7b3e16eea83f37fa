pub mod progress;
pub mod update;
