mod subscriber;

pub use subscriber::*;
