mod session;
mod window;

pub use session::{Browser, BrowserSession};
pub use window::{expand_key_tokens, WindowRef};
