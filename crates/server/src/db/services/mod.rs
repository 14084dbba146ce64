pub mod agent_service;
pub mod alert_service;
pub mod sample_service;
