pub(crate) mod category;
pub(crate) mod comment;
pub(crate) mod error;
pub(crate) mod policy;
pub(crate) mod post;
pub(crate) mod slug;
pub(crate) mod time_since;
pub(crate) mod user;
