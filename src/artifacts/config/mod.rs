//! Git config file format, shared by `.git/config` and `.gitmodules`

pub mod config_file;
