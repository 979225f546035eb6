pub mod hooks;
pub mod init;
pub mod serve;
