// Host-facing entry points.

pub mod init;
