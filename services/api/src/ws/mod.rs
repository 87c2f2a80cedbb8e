//! WebSocket Session Management
//!
//! - `protocol`: the JSON frames exchanged with the browser client.
//! - `channel`: the `SessionChannel` implementation over an axum WebSocket.
//! - `session`: the upgrade handler that runs one quiz session per connection.

mod channel;
pub mod protocol;
pub mod session;

pub use channel::WsChannel;
pub use session::ws_handler;
