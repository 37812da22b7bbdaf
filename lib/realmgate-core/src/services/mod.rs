//! One service per entity kind, bound to a realm.
//!
//! Every operation obtains a fresh [`AdminClient`](crate::AdminClient), issues its
//! call(s), and passes each reply through [`normalize`](crate::normalize). Operations
//! are independent: nothing spans several provider calls transactionally.

use http::StatusCode;

mod group;
mod role;
mod user;

pub use self::group::GroupService;
pub use self::role::RoleService;
pub use self::user::UserService;

/// Successful result of a service operation: the provider status and the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    /// Status of the (last) provider reply.
    pub status: StatusCode,
    /// Operation result.
    pub payload: T,
}

impl<T> Outcome<T> {
    /// Creates an outcome.
    pub fn new(status: StatusCode, payload: T) -> Self {
        Self { status, payload }
    }

    /// Maps the payload, keeping the status.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            status: self.status,
            payload: f(self.payload),
        }
    }
}

impl Outcome<()> {
    /// An outcome carrying only a status.
    pub fn status_only(status: StatusCode) -> Self {
        Self {
            status,
            payload: (),
        }
    }
}
