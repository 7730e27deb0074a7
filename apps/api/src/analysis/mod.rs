// JD Analysis Engine
// Implements: skill extraction, company inference, round mapping, readiness scoring,
// preparation plan generation, and the capped analysis history.

pub mod company;
pub mod engine;
pub mod handlers;
pub mod plan;
pub mod scoring;
pub mod skills;
