//! Message feed

mod message_feed;

pub use message_feed::RealtimeMessageFeed;
