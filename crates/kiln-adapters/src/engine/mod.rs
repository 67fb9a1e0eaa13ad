//! Template engine adapter.

pub mod helpers;
mod jinja;

pub use jinja::MiniJinjaEngine;
