#![allow(dead_code)]

pub mod config;
pub mod mock_translator;
pub mod mock_whisper;
pub mod server;
