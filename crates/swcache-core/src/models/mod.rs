//! Request and response snapshots exchanged at the host boundary.
//!
//! These mirror the parts of a browser `Request`/`Response` the cache
//! actually looks at: method, URL and mode on the way in; status, type,
//! headers and body on the way out.

pub mod request;
pub mod response;

pub use request::{Request, RequestKey, RequestMode};
pub use response::{Response, ResponseType};
