//! Per-call authorization rules for posts, users and categories.
//!
//! Services receive an [`AccessPolicy`] at construction and consult it before
//! touching the repositories. Object-level targets carry the owner id that
//! the decision depends on, so callers load the object first.

use super::error::DomainError;

/// Who is performing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Actor {
    Anonymous,
    User { id: i64, is_admin: bool },
}

impl Actor {
    pub(crate) fn user_id(&self) -> Option<i64> {
        match self {
            Actor::Anonymous => None,
            Actor::User { id, .. } => Some(*id),
        }
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User { .. })
    }

    pub(crate) fn is_admin(&self) -> bool {
        matches!(self, Actor::User { is_admin: true, .. })
    }

    /// Id of an authenticated actor, `Unauthenticated` otherwise.
    pub(crate) fn require_user_id(&self) -> Result<i64, DomainError> {
        self.user_id().ok_or(DomainError::Unauthenticated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
    Comment,
    ToggleLike,
    ToggleSave,
    ListSaved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Posts,
    Post { author_id: i64 },
    Users,
    User { user_id: i64 },
    Categories,
    Category,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AccessPolicy;

impl AccessPolicy {
    pub(crate) fn allowed(&self, actor: &Actor, action: Action, target: Target) -> bool {
        let authenticated = actor.is_authenticated();
        let admin = actor.is_admin();
        let owns = |owner_id: i64| actor.user_id() == Some(owner_id);

        match (target, action) {
            (Target::Posts, Action::List) | (Target::Post { .. }, Action::Retrieve) => true,
            (Target::Posts, Action::Create | Action::ListSaved) => authenticated,
            (Target::Post { author_id }, Action::Update | Action::Delete) => {
                owns(author_id) || admin
            }
            (
                Target::Post { .. },
                Action::Comment | Action::ToggleLike | Action::ToggleSave,
            ) => authenticated,

            (Target::Users, Action::Create) => true,
            (Target::Users, Action::List) => admin,
            (Target::User { user_id }, Action::Retrieve | Action::Update) => {
                owns(user_id) || admin
            }
            (Target::User { .. }, Action::Delete) => admin,

            (Target::Categories, Action::List) | (Target::Category, Action::Retrieve) => true,
            (Target::Categories, Action::Create)
            | (Target::Category, Action::Update | Action::Delete) => admin,

            _ => false,
        }
    }

    /// Like [`AccessPolicy::allowed`], but reports a denial as 401 for
    /// anonymous actors and 403 for authenticated ones.
    pub(crate) fn authorize(
        &self,
        actor: &Actor,
        action: Action,
        target: Target,
    ) -> Result<(), DomainError> {
        if self.allowed(actor, action, target) {
            return Ok(());
        }
        if actor.is_authenticated() {
            Err(DomainError::Forbidden)
        } else {
            Err(DomainError::Unauthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessPolicy, Action, Actor, Target};
    use crate::domain::error::DomainError;

    const ANON: Actor = Actor::Anonymous;
    const ALICE: Actor = Actor::User {
        id: 1,
        is_admin: false,
    };
    const BOB: Actor = Actor::User {
        id: 2,
        is_admin: false,
    };
    const ADMIN: Actor = Actor::User {
        id: 3,
        is_admin: true,
    };

    #[test]
    fn posts_are_readable_by_anyone() {
        let policy = AccessPolicy;
        assert!(policy.allowed(&ANON, Action::List, Target::Posts));
        assert!(policy.allowed(&ANON, Action::Retrieve, Target::Post { author_id: 1 }));
    }

    #[test]
    fn creating_posts_requires_authentication() {
        let policy = AccessPolicy;
        assert!(!policy.allowed(&ANON, Action::Create, Target::Posts));
        assert!(policy.allowed(&BOB, Action::Create, Target::Posts));
    }

    #[test]
    fn post_mutation_is_author_or_admin() {
        let policy = AccessPolicy;
        let post = Target::Post { author_id: 1 };
        assert!(policy.allowed(&ALICE, Action::Update, post));
        assert!(policy.allowed(&ALICE, Action::Delete, post));
        assert!(!policy.allowed(&BOB, Action::Update, post));
        assert!(!policy.allowed(&BOB, Action::Delete, post));
        assert!(policy.allowed(&ADMIN, Action::Update, post));
        assert!(policy.allowed(&ADMIN, Action::Delete, post));
    }

    #[test]
    fn interactions_need_only_authentication() {
        let policy = AccessPolicy;
        let post = Target::Post { author_id: 1 };
        for action in [Action::Comment, Action::ToggleLike, Action::ToggleSave] {
            assert!(!policy.allowed(&ANON, action, post));
            assert!(policy.allowed(&BOB, action, post));
        }
        assert!(!policy.allowed(&ANON, Action::ListSaved, Target::Posts));
        assert!(policy.allowed(&BOB, Action::ListSaved, Target::Posts));
    }

    #[test]
    fn user_records_are_self_or_admin() {
        let policy = AccessPolicy;
        let alice = Target::User { user_id: 1 };
        assert!(policy.allowed(&ALICE, Action::Retrieve, alice));
        assert!(policy.allowed(&ALICE, Action::Update, alice));
        assert!(!policy.allowed(&ALICE, Action::Delete, alice));
        assert!(!policy.allowed(&BOB, Action::Retrieve, alice));
        assert!(!policy.allowed(&ANON, Action::Retrieve, alice));
        assert!(policy.allowed(&ADMIN, Action::Delete, alice));
        assert!(!policy.allowed(&ALICE, Action::List, Target::Users));
        assert!(policy.allowed(&ADMIN, Action::List, Target::Users));
        assert!(policy.allowed(&ANON, Action::Create, Target::Users));
    }

    #[test]
    fn categories_are_admin_managed() {
        let policy = AccessPolicy;
        assert!(policy.allowed(&ANON, Action::List, Target::Categories));
        assert!(policy.allowed(&ANON, Action::Retrieve, Target::Category));
        assert!(!policy.allowed(&ALICE, Action::Create, Target::Categories));
        assert!(!policy.allowed(&ALICE, Action::Update, Target::Category));
        assert!(policy.allowed(&ADMIN, Action::Create, Target::Categories));
        assert!(policy.allowed(&ADMIN, Action::Delete, Target::Category));
    }

    #[test]
    fn authorize_distinguishes_anonymous_from_forbidden() {
        let policy = AccessPolicy;
        let err = policy
            .authorize(&ANON, Action::Create, Target::Posts)
            .expect_err("anonymous must be rejected");
        assert!(matches!(err, DomainError::Unauthenticated));

        let err = policy
            .authorize(&BOB, Action::Update, Target::Post { author_id: 1 })
            .expect_err("non-author must be rejected");
        assert!(matches!(err, DomainError::Forbidden));
    }
}
