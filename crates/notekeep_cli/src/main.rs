//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable that runs the core end to end against an
//!   in-memory store.
//! - Verify `notekeep_core` linkage outside the test harness.

use notekeep_core::db::open_db_in_memory;
use notekeep_core::{
    CreateNoteRequest, ListFilter, NoteService, NoteTag, PageRequest, SqliteNoteRepository,
    WordFrequencyAnalyzer,
};
use std::collections::BTreeSet;

fn main() {
    println!("notekeep_core ping={}", notekeep_core::ping());
    println!("notekeep_core version={}", notekeep_core::core_version());

    if let Err(err) = run_smoke() {
        eprintln!("smoke run failed: {err}");
        std::process::exit(1);
    }
}

fn run_smoke() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = open_db_in_memory()?;
    let repo = SqliteNoteRepository::try_new(&mut conn)?;
    let mut service = NoteService::new(repo, WordFrequencyAnalyzer);

    let created = service.create(&CreateNoteRequest {
        title: "smoke note".to_string(),
        text: "note is just a note".to_string(),
        tags: BTreeSet::from([NoteTag::Personal]),
    })?;
    println!(
        "created id={} created_date={}",
        created.id, created.created_date
    );

    for (word, count) in service.fetch_unique_words(created.id)? {
        println!("word={word} count={count}");
    }

    let page = service.fetch_all(&ListFilter::All, &PageRequest::default())?;
    println!(
        "notes_listed={} applied_size={}",
        page.items.len(),
        page.applied_size
    );

    Ok(())
}
