//! Response Line Classifier
//!
//! Parses one decoded text line into a (keyword, value) pair against the
//! fixed response vocabulary.
//!
//! ## Line Shapes
//! ```text
//! OK                      bare success terminator
//! OK MPD 0.23.5           banner
//! ACK [50@0] ... message  failure terminator
//! volume: 80              field line, colon separator
//! ```
//!
//! Classification never fails: lines outside the vocabulary are `Unknown`
//! and unparsable numeric values fall back to sentinels (-1, NaN).

/// Closed vocabulary of response keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Ok,
    Ack,
    State,
    Volume,
    Playlist,
    Song,
    Time,
    Random,
    Repeat,
    Single,
    Consume,
    Crossfade,
    MixRampDb,
    MixRampDelay,
    Audio,
    Error,
    File,
    Name,
    Title,
    Artist,
    AlbumArtist,
    Album,
    Genre,
    Date,
    Track,
    Id,
    Pos,
    DbUpdateTime,
    OutputId,
    OutputName,
    OutputEnabled,
    /// Anything outside the vocabulary
    Unknown,
}

/// Ordered lookup table; the first case-insensitive match wins.
///
/// `xfade` is the wire spelling some servers use for crossfade.
const VOCABULARY: &[(&str, Keyword)] = &[
    ("ok", Keyword::Ok),
    ("ack", Keyword::Ack),
    ("state", Keyword::State),
    ("volume", Keyword::Volume),
    ("playlist", Keyword::Playlist),
    ("song", Keyword::Song),
    ("time", Keyword::Time),
    ("random", Keyword::Random),
    ("repeat", Keyword::Repeat),
    ("single", Keyword::Single),
    ("consume", Keyword::Consume),
    ("crossfade", Keyword::Crossfade),
    ("xfade", Keyword::Crossfade),
    ("mixrampdb", Keyword::MixRampDb),
    ("mixrampdelay", Keyword::MixRampDelay),
    ("audio", Keyword::Audio),
    ("error", Keyword::Error),
    ("file", Keyword::File),
    ("name", Keyword::Name),
    ("title", Keyword::Title),
    ("artist", Keyword::Artist),
    ("albumartist", Keyword::AlbumArtist),
    ("album", Keyword::Album),
    ("genre", Keyword::Genre),
    ("date", Keyword::Date),
    ("track", Keyword::Track),
    ("id", Keyword::Id),
    ("pos", Keyword::Pos),
    ("db-update-time", Keyword::DbUpdateTime),
    ("outputid", Keyword::OutputId),
    ("outputname", Keyword::OutputName),
    ("outputenabled", Keyword::OutputEnabled),
];

/// One classified line of server output
#[derive(Debug, Clone)]
pub struct ResponseLine {
    /// The line exactly as received (no trailing newline)
    raw: String,

    /// Classified keyword, `Unknown` if outside the vocabulary
    keyword: Keyword,

    /// Everything after the first `:` or space separator, with further
    /// leading separators skipped
    value: String,
}

impl ResponseLine {
    /// Classify one decoded line
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();

        let sep = raw.find([':', ' ']);
        let token = match sep {
            Some(i) => &raw[..i],
            None => raw.as_str(),
        };

        let keyword = VOCABULARY
            .iter()
            .find(|(name, _)| token.eq_ignore_ascii_case(name))
            .map(|&(_, kw)| kw)
            .unwrap_or(Keyword::Unknown);

        let value = match sep {
            Some(i) => raw[i + 1..].trim_start_matches([':', ' ']).to_string(),
            None => String::new(),
        };

        Self { raw, keyword, value }
    }

    /// The raw line literal
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The classified keyword
    pub fn keyword(&self) -> Keyword {
        self.keyword
    }

    /// The value substring after the separator
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether this line terminates a command's response
    pub fn is_terminal(&self) -> bool {
        matches!(self.keyword, Keyword::Ok | Keyword::Ack)
    }

    // -------------------------------------------------------------------------
    // Derived Conversions (best-effort, sentinel on failure)
    // -------------------------------------------------------------------------

    /// The value as an integer, -1 if it does not parse
    pub fn int_value(&self) -> i64 {
        self.value.trim().parse().unwrap_or(-1)
    }

    /// The value as a colon-delimited integer list, -1 per failed segment.
    ///
    /// `audio: 44100:24:2` and `time: 123:240` use this shape.
    pub fn int_list_value(&self) -> Vec<i64> {
        self.value
            .split(':')
            .map(|part| part.trim().parse().unwrap_or(-1))
            .collect()
    }

    /// The value as a float, NaN if it does not parse
    pub fn float_value(&self) -> f64 {
        self.value.trim().parse().unwrap_or(f64::NAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_case_insensitively() {
        assert_eq!(ResponseLine::parse("Volume: 80").keyword(), Keyword::Volume);
        assert_eq!(ResponseLine::parse("VOLUME: 80").keyword(), Keyword::Volume);
    }

    #[test]
    fn xfade_aliases_crossfade() {
        assert_eq!(ResponseLine::parse("xfade: 3").keyword(), Keyword::Crossfade);
    }

    #[test]
    fn bare_ok_is_terminal_with_empty_value() {
        let line = ResponseLine::parse("OK");
        assert!(line.is_terminal());
        assert_eq!(line.value(), "");
    }

    #[test]
    fn banner_value_carries_product_and_version() {
        let line = ResponseLine::parse("OK MPD 0.23.5");
        assert_eq!(line.keyword(), Keyword::Ok);
        assert_eq!(line.value(), "MPD 0.23.5");
    }
}
