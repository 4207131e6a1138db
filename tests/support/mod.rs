#![allow(dead_code)]

pub mod finguard_env;
pub mod tables;
