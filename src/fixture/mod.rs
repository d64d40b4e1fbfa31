mod latch;
mod server;

pub use latch::PageServed;
pub use server::FixtureServer;
