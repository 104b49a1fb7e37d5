//! Shared Types
//!
//! Types shared between the server and its clients: the recursive thread
//! tree, the message header codec, realtime event payloads, and the common
//! error taxonomy. Everything in here is pure data with no I/O and no
//! server dependencies, so clients can deserialize and render without
//! pulling in the backend.

pub mod error;
pub mod event;
pub mod prefix;
pub mod thread;

pub use error::ConversationError;
pub use event::{ClientFrame, ThreadUpdate};
pub use prefix::{decode_header, encode_header, sender_tag, strip_header, DecodedHeader, HeaderStamp};
pub use thread::{flatten, resolve, ConversationDocument, FlatMessage, ThreadMessage};
