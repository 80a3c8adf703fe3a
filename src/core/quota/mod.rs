pub mod poller;
pub mod window;
