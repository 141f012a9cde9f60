mod alert_service;
mod dispatcher;
mod error;
mod message;
mod notification;

pub use alert_service::*;
pub use dispatcher::*;
pub use error::*;
pub use message::*;
pub use notification::*;
