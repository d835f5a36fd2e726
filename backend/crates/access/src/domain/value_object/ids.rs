//! Typed document ids for the access collections

use kernel::id::DocumentId;

pub struct UserMarker;
pub type UserId = DocumentId<UserMarker>;

pub struct RoleMarker;
pub type RoleId = DocumentId<RoleMarker>;

pub struct IdpSessionMarker;
pub type IdpSessionId = DocumentId<IdpSessionMarker>;

pub struct MailMarker;
pub type MailId = DocumentId<MailMarker>;
