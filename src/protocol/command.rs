//! Command definitions
//!
//! The fixed set of commands this client issues, each owning its own wire
//! serialization.
//!
//! ## Wire Format
//! ```text
//! operation[ "quoted-arg1"[ "quoted-arg2"]]\n
//! ```
//!
//! Every argument is double-quoted; `\` and `"` are backslash-escaped.
//! Booleans render as `1`/`0`, floats in invariant decimal with the
//! literal token `nan` for not-a-number.

/// Response shape expected for a command, the closed mapping the
/// dispatcher routes by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Raw classified lines, passed through unfiltered
    Lines,

    /// Entity blocks split on the `file:` start-of-entity field
    Entities,
}

/// Coalescable polling commands; at most one of each class is ever
/// queued or in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoalesceClass {
    Status,
    Stats,
}

/// A command to send to the server
///
/// Immutable once constructed; consumed exactly once by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // -------------------------------------------------------------------------
    // Connection / Auth
    // -------------------------------------------------------------------------
    Password { password: String },
    Close,

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------
    Status,
    Stats,
    CurrentSong,
    /// Full library listing
    ListAllInfo,
    /// Contents of the play queue
    PlaylistInfo,
    /// Names of the stored playlists
    ListPlaylists,
    /// Contents of one stored playlist
    ListPlaylistInfo { name: String },
    Outputs,

    // -------------------------------------------------------------------------
    // Stored Playlists
    // -------------------------------------------------------------------------
    Load { name: String },
    Save { name: String },
    Rename { from: String, to: String },
    Rm { name: String },
    Shuffle,

    // -------------------------------------------------------------------------
    // Queue Edits
    // -------------------------------------------------------------------------
    Add { uri: String },
    AddId { uri: String },
    DeleteId { id: i64 },
    MoveId { id: i64, to: i64 },

    // -------------------------------------------------------------------------
    // Playback Control
    // -------------------------------------------------------------------------
    Play,
    PlayId { id: i64 },
    Pause { paused: bool },
    Stop,
    Next,
    Previous,
    Seek { pos: i64, seconds: i64 },

    // -------------------------------------------------------------------------
    // Playback Options
    // -------------------------------------------------------------------------
    Random { on: bool },
    Repeat { on: bool },
    Single { on: bool },
    Consume { on: bool },
    Crossfade { seconds: i64 },
    MixRampDb { decibels: f64 },
    MixRampDelay { seconds: f64 },
    SetVol { volume: i64 },

    // -------------------------------------------------------------------------
    // Outputs
    // -------------------------------------------------------------------------
    EnableOutput { id: i64 },
    DisableOutput { id: i64 },
}

impl Command {
    /// The wire operation name
    pub fn operation(&self) -> &'static str {
        match self {
            Command::Password { .. } => "password",
            Command::Close => "close",
            Command::Status => "status",
            Command::Stats => "stats",
            Command::CurrentSong => "currentsong",
            Command::ListAllInfo => "listallinfo",
            Command::PlaylistInfo => "playlistinfo",
            Command::ListPlaylists => "listplaylists",
            Command::ListPlaylistInfo { .. } => "listplaylistinfo",
            Command::Outputs => "outputs",
            Command::Load { .. } => "load",
            Command::Save { .. } => "save",
            Command::Rename { .. } => "rename",
            Command::Rm { .. } => "rm",
            Command::Shuffle => "shuffle",
            Command::Add { .. } => "add",
            Command::AddId { .. } => "addid",
            Command::DeleteId { .. } => "deleteid",
            Command::MoveId { .. } => "moveid",
            Command::Play => "play",
            Command::PlayId { .. } => "playid",
            Command::Pause { .. } => "pause",
            Command::Stop => "stop",
            Command::Next => "next",
            Command::Previous => "previous",
            Command::Seek { .. } => "seek",
            Command::Random { .. } => "random",
            Command::Repeat { .. } => "repeat",
            Command::Single { .. } => "single",
            Command::Consume { .. } => "consume",
            Command::Crossfade { .. } => "crossfade",
            Command::MixRampDb { .. } => "mixrampdb",
            Command::MixRampDelay { .. } => "mixrampdelay",
            Command::SetVol { .. } => "setvol",
            Command::EnableOutput { .. } => "enableoutput",
            Command::DisableOutput { .. } => "disableoutput",
        }
    }

    /// Serialize to the wire line (no trailing newline)
    pub fn wire(&self) -> String {
        let mut line = String::from(self.operation());

        match self {
            Command::Password { password } => push_arg(&mut line, password),
            Command::ListPlaylistInfo { name }
            | Command::Load { name }
            | Command::Save { name }
            | Command::Rm { name } => push_arg(&mut line, name),
            Command::Rename { from, to } => {
                push_arg(&mut line, from);
                push_arg(&mut line, to);
            }
            Command::Add { uri } | Command::AddId { uri } => push_arg(&mut line, uri),
            Command::DeleteId { id }
            | Command::PlayId { id }
            | Command::EnableOutput { id }
            | Command::DisableOutput { id } => push_int(&mut line, *id),
            Command::MoveId { id, to } => {
                push_int(&mut line, *id);
                push_int(&mut line, *to);
            }
            Command::Seek { pos, seconds } => {
                push_int(&mut line, *pos);
                push_int(&mut line, *seconds);
            }
            Command::Pause { paused } => push_bool(&mut line, *paused),
            Command::Random { on }
            | Command::Repeat { on }
            | Command::Single { on }
            | Command::Consume { on } => push_bool(&mut line, *on),
            Command::Crossfade { seconds } => push_int(&mut line, *seconds),
            Command::MixRampDb { decibels } => push_float(&mut line, *decibels),
            Command::MixRampDelay { seconds } => push_float(&mut line, *seconds),
            Command::SetVol { volume } => push_int(&mut line, *volume),
            // No-argument commands
            Command::Close
            | Command::Status
            | Command::Stats
            | Command::CurrentSong
            | Command::ListAllInfo
            | Command::PlaylistInfo
            | Command::ListPlaylists
            | Command::Outputs
            | Command::Shuffle
            | Command::Play
            | Command::Stop
            | Command::Next
            | Command::Previous => {}
        }

        line
    }

    /// The response shape the dispatcher assembles for this command
    pub fn response_shape(&self) -> ResponseShape {
        match self {
            Command::CurrentSong
            | Command::ListAllInfo
            | Command::PlaylistInfo
            | Command::ListPlaylistInfo { .. } => ResponseShape::Entities,
            _ => ResponseShape::Lines,
        }
    }

    /// The playlist name an entity response belongs to, for commands whose
    /// consumers need it echoed back
    pub fn playlist_name(&self) -> Option<&str> {
        match self {
            Command::ListPlaylistInfo { name } => Some(name),
            _ => None,
        }
    }

    /// The coalescing class, for the redundant-poll optimization
    pub(crate) fn coalesce_class(&self) -> Option<CoalesceClass> {
        match self {
            Command::Status => Some(CoalesceClass::Status),
            Command::Stats => Some(CoalesceClass::Stats),
            _ => None,
        }
    }

    /// Whether the wire line is safe to echo into logs.
    ///
    /// Credentials are logged as the operation name only.
    pub fn loggable(&self) -> String {
        match self {
            Command::Password { .. } => "password \"*****\"".to_string(),
            _ => self.wire(),
        }
    }
}

// =============================================================================
// Argument Rendering
// =============================================================================

/// Escape and double-quote one string argument
pub fn quote(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if c == '\\' || c == '"' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Inverse of [`quote`]: strip the wrapping quotes and unescape.
///
/// Returns `None` if the token is not a well-formed quoted argument.
pub fn unquote(token: &str) -> Option<String> {
    let inner = token.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next()?);
        } else if c == '"' {
            return None;
        } else {
            out.push(c);
        }
    }
    Some(out)
}

fn push_arg(line: &mut String, arg: &str) {
    line.push(' ');
    line.push_str(&quote(arg));
}

fn push_int(line: &mut String, value: i64) {
    push_arg(line, &value.to_string());
}

fn push_bool(line: &mut String, value: bool) {
    push_arg(line, if value { "1" } else { "0" });
}

/// Invariant (non-locale) decimal rendering, `nan` for not-a-number
fn push_float(line: &mut String, value: f64) {
    let rendered = if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{value}")
    };
    push_arg(line, &rendered);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_argument_commands_are_bare() {
        assert_eq!(Command::Status.wire(), "status");
        assert_eq!(Command::Next.wire(), "next");
    }

    #[test]
    fn bools_render_as_digits() {
        assert_eq!(Command::Random { on: true }.wire(), "random \"1\"");
        assert_eq!(Command::Consume { on: false }.wire(), "consume \"0\"");
    }

    #[test]
    fn two_argument_commands() {
        assert_eq!(
            Command::Seek { pos: 3, seconds: 125 }.wire(),
            "seek \"3\" \"125\""
        );
        assert_eq!(
            Command::MoveId { id: 7, to: 0 }.wire(),
            "moveid \"7\" \"0\""
        );
    }

    #[test]
    fn nan_renders_as_literal_token() {
        assert_eq!(
            Command::MixRampDb { decibels: f64::NAN }.wire(),
            "mixrampdb \"nan\""
        );
    }

    #[test]
    fn password_never_logged() {
        let cmd = Command::Password {
            password: "hunter2".to_string(),
        };
        assert!(!cmd.loggable().contains("hunter2"));
    }
}
