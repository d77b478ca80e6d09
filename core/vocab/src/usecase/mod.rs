pub mod app;
pub mod batch;
pub mod composer;
pub mod extractor;
pub mod orchestrator;
pub mod validator;
