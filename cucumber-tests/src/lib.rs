//! BDD scenarios for the rampart access-control engine

pub mod features;
