pub mod config;
pub mod constants;
pub mod containers;
pub mod identity;
pub mod interaction;
pub mod planner;
pub mod pool;
pub mod progress;
pub mod rng;
pub mod rooms;
pub mod scheduler;
pub mod session;
pub mod slots;
pub mod timer;
pub mod types;
