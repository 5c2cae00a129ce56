pub mod common;

pub mod err;

pub mod flash;

pub mod projects;
