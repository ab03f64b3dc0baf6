//! Leader election policy
//!
//! The earliest-connected member leads. Equal instants fall back to the
//! connection handle, which follows accept order.

use crate::connection::Connection;

/// Pick the leader among `members`, or None if there are none
pub fn elect<'a, I>(members: I) -> Option<&'a Connection>
where
    I: IntoIterator<Item = &'a Connection>,
{
    members
        .into_iter()
        .min_by_key(|c| (c.connected_at, c.id))
}
