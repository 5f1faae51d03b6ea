//! Text analysis utilities for note content.

pub mod words;
