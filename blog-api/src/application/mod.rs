pub(crate) mod auth_service;
pub(crate) mod blog_service;
pub(crate) mod category_service;
pub(crate) mod slug_assigner;
pub(crate) mod user_service;

/// How an update request treats fields the client left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpdateMode {
    /// PUT: mandatory fields must be present.
    Replace,
    /// PATCH: missing fields keep their stored value.
    Partial,
}
