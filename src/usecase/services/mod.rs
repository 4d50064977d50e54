pub mod criteria_store;
pub mod local_engine;
pub mod orchestrator;
pub mod planner;
