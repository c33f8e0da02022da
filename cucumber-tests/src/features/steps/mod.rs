pub mod access_steps;
pub mod context_steps;
pub mod integrity_steps;
