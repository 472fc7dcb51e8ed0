pub mod client;
pub mod gateway;
pub mod io_msg;
pub mod server;

mod url;
pub use url::*;

#[cfg(test)]
mod tests;
