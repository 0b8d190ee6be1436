pub mod provider;
pub mod request;
pub mod response;
pub mod tool_arguments;
