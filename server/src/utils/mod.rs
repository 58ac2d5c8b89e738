pub mod error;
pub mod flash;
pub mod humanize;
pub mod response;
