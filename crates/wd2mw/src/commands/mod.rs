//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod upload;

pub(crate) use convert::ConvertArgs;
pub(crate) use upload::UploadArgs;
