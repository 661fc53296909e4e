pub mod question_loader;
pub mod quiz_runner;
pub mod quiz_timer;
pub mod sampler;
pub mod session_registry;
