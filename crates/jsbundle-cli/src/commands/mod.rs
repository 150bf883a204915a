pub mod bundle;
pub mod check;
pub mod init;
pub mod serve;
pub mod version;
