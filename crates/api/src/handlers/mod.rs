pub mod annotations;
pub mod credentials;
pub mod dashboard;
pub mod findings;
pub mod organizations;
