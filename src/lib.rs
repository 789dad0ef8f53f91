//! capcurate - Caption Curation for Speech Recognition Output
//!
//! Cleans machine-generated karaoke captions: fixes misheard domain terms with
//! a glossary, removes fillers, repairs truncated commands, and re-segments the
//! text into readable cues that keep the original timing.

pub mod align;
pub mod cli;
pub mod config;
pub mod curate;
pub mod error;
pub mod glossary;
pub mod subtitle;
pub mod types;
pub mod workflow;
