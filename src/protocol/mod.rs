//! Protocol Module
//!
//! The wire layer for the line-oriented, UTF-8 text protocol.
//!
//! ## Protocol Format
//!
//! ### Client → Server
//! ```text
//! operation[ "quoted-arg1"[ "quoted-arg2"]]\n
//! ```
//!
//! ### Server → Client
//! ```text
//! OK MPD 0.23.5            banner, once per connection
//! keyword: value           zero or more field lines per command
//! OK                       success terminator
//! ACK <error text>         failure terminator (connection stays up)
//! ```
//!
//! The layers, leaf-first: [`framer`] turns raw socket bytes into lines,
//! [`line`] classifies one line against the fixed vocabulary, [`block`]
//! groups classified lines into entity blocks, and [`command`] owns the
//! outgoing serialization.

mod block;
mod command;
mod framer;
mod line;
mod response;

pub use block::{assemble, EntityBlock, EntityKind};
pub use command::{quote, unquote, Command, ResponseShape};
pub use framer::LineFramer;
pub use line::{Keyword, ResponseLine};
pub use response::{Response, ResponseStatus};

pub(crate) use command::CoalesceClass;
