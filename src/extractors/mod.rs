/*!
 * Identity extractors for handlers behind the auth middleware.
 */
mod current_user;

pub use current_user::{CurrentUser, MaybeUser};
