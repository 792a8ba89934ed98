//! Block Assembler
//!
//! Groups the classified lines of a "list" response into entity blocks.
//!
//! A block opens at every `file:` line; every recognized field until the
//! next `file:` line (or the end of the response) belongs to it. Lines
//! before the first `file:` are discarded, unrecognized keywords are
//! ignored, and a repeated field within one block overwrites the earlier
//! value.
//!
//! Blocks are plain tagged records — the `kind` discriminant separates
//! local songs from streams, and consumers decide any further
//! specialization themselves.

use super::line::{Keyword, ResponseLine};

/// What an entity block describes, decided by its URI scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A song file in the server's library
    Local,

    /// A network stream (http/https URI)
    Stream,
}

/// One list item: the fields between a `file:` line and the next
#[derive(Debug, Clone, PartialEq)]
pub struct EntityBlock {
    /// The path or URI from the `file:` start-of-entity line
    pub uri: String,

    /// Local song or network stream
    pub kind: EntityKind,

    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    pub date: Option<String>,

    /// Display name (streams mostly), from `name:`
    pub name: Option<String>,

    /// Track number, -1 when absent or unparsable
    pub track: i64,

    /// Duration in seconds, -1 when absent or unparsable
    pub duration: i64,

    /// Position in the play queue, -1 when absent
    pub pos: i64,

    /// Queue id, -1 when absent
    pub id: i64,
}

impl EntityBlock {
    fn new(uri: String) -> Self {
        let kind = if uri.starts_with("http://") || uri.starts_with("https://") {
            EntityKind::Stream
        } else {
            EntityKind::Local
        };
        Self {
            uri,
            kind,
            title: None,
            artist: None,
            album: None,
            album_artist: None,
            genre: None,
            date: None,
            name: None,
            track: -1,
            duration: -1,
            pos: -1,
            id: -1,
        }
    }

    /// Fold one field line into the block, last value winning
    fn absorb(&mut self, line: &ResponseLine) {
        match line.keyword() {
            Keyword::Title => self.title = Some(line.value().to_string()),
            Keyword::Artist => self.artist = Some(line.value().to_string()),
            Keyword::Album => self.album = Some(line.value().to_string()),
            Keyword::AlbumArtist => self.album_artist = Some(line.value().to_string()),
            Keyword::Genre => self.genre = Some(line.value().to_string()),
            Keyword::Date => self.date = Some(line.value().to_string()),
            Keyword::Name => self.name = Some(line.value().to_string()),
            Keyword::Track => self.track = line.int_value(),
            Keyword::Time => self.duration = line.int_value(),
            Keyword::Pos => self.pos = line.int_value(),
            Keyword::Id => self.id = line.int_value(),
            // Unrecognized fields are dropped from blocks
            _ => {}
        }
    }
}

/// Split one response's lines into entity blocks
pub fn assemble(lines: &[ResponseLine]) -> Vec<EntityBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<EntityBlock> = None;

    for line in lines {
        if line.keyword() == Keyword::File {
            if let Some(done) = current.take() {
                blocks.push(done);
            }
            current = Some(EntityBlock::new(line.value().to_string()));
        } else if let Some(block) = current.as_mut() {
            block.absorb(line);
        }
        // Lines before the first file: are discarded.
    }

    if let Some(last) = current {
        blocks.push(last);
    }

    blocks
}
