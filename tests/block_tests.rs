//! Tests for the Block Assembler
//!
//! These tests verify:
//! - Block splitting on the file: start-of-entity field
//! - Field accumulation with last-value-wins
//! - Discarding of leading and unrecognized lines

use resona::protocol::{assemble, EntityKind, ResponseLine};

// =============================================================================
// Helper Functions
// =============================================================================

fn classify(raw: &[&str]) -> Vec<ResponseLine> {
    raw.iter().map(|line| ResponseLine::parse(*line)).collect()
}

// =============================================================================
// Splitting Tests
// =============================================================================

#[test]
fn test_two_markers_produce_two_blocks() {
    let blocks = assemble(&classify(&[
        "file: jazz/one.flac",
        "Title: One",
        "Artist: A",
        "file: jazz/two.flac",
        "Title: Two",
        "Artist: B",
    ]));

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].uri, "jazz/one.flac");
    assert_eq!(blocks[0].title.as_deref(), Some("One"));
    assert_eq!(blocks[0].artist.as_deref(), Some("A"));
    assert_eq!(blocks[1].uri, "jazz/two.flac");
    assert_eq!(blocks[1].title.as_deref(), Some("Two"));
    assert_eq!(blocks[1].artist.as_deref(), Some("B"));
}

#[test]
fn test_fields_never_leak_across_blocks() {
    let blocks = assemble(&classify(&[
        "file: one.flac",
        "Artist: A",
        "file: two.flac",
        "Title: Two Only",
    ]));

    assert_eq!(blocks[1].artist, None);
    assert_eq!(blocks[0].title, None);
}

#[test]
fn test_lines_before_first_marker_are_discarded() {
    let blocks = assemble(&classify(&[
        "Title: orphan",
        "playlist: 12",
        "file: kept.flac",
        "Title: Kept",
    ]));

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].title.as_deref(), Some("Kept"));
}

#[test]
fn test_final_in_progress_block_is_appended() {
    let blocks = assemble(&classify(&["file: tail.flac", "Title: Tail"]));
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].title.as_deref(), Some("Tail"));
}

#[test]
fn test_empty_input_produces_no_blocks() {
    assert!(assemble(&[]).is_empty());
}

// =============================================================================
// Field Accumulation Tests
// =============================================================================

#[test]
fn test_all_recognized_fields_accumulate() {
    let blocks = assemble(&classify(&[
        "file: a.flac",
        "Title: T",
        "Artist: Ar",
        "Album: Al",
        "AlbumArtist: AA",
        "Genre: G",
        "Date: 1977",
        "Track: 4",
        "Time: 251",
        "Pos: 2",
        "Id: 31",
        "Name: display",
    ]));

    let block = &blocks[0];
    assert_eq!(block.title.as_deref(), Some("T"));
    assert_eq!(block.artist.as_deref(), Some("Ar"));
    assert_eq!(block.album.as_deref(), Some("Al"));
    assert_eq!(block.album_artist.as_deref(), Some("AA"));
    assert_eq!(block.genre.as_deref(), Some("G"));
    assert_eq!(block.date.as_deref(), Some("1977"));
    assert_eq!(block.track, 4);
    assert_eq!(block.duration, 251);
    assert_eq!(block.pos, 2);
    assert_eq!(block.id, 31);
    assert_eq!(block.name.as_deref(), Some("display"));
}

#[test]
fn test_repeated_field_last_value_wins() {
    let blocks = assemble(&classify(&[
        "file: a.flac",
        "Genre: Rock",
        "Genre: Progressive Rock",
    ]));
    assert_eq!(blocks[0].genre.as_deref(), Some("Progressive Rock"));
}

#[test]
fn test_unrecognized_fields_are_ignored() {
    let blocks = assemble(&classify(&[
        "file: a.flac",
        "Composer: someone",
        "Last-Modified: 2024-05-01",
        "Title: Kept",
    ]));
    assert_eq!(blocks[0].title.as_deref(), Some("Kept"));
}

// =============================================================================
// Kind Discrimination
// =============================================================================

#[test]
fn test_kind_follows_uri_scheme() {
    let blocks = assemble(&classify(&[
        "file: local/song.mp3",
        "file: http://radio.example:8000/stream",
        "file: https://radio.example/stream",
    ]));
    assert_eq!(blocks[0].kind, EntityKind::Local);
    assert_eq!(blocks[1].kind, EntityKind::Stream);
    assert_eq!(blocks[2].kind, EntityKind::Stream);
}
