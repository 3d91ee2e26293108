//! AuthorRow -> Profile mapper

use alpaca_core::Profile;

use crate::models::AuthorRow;

impl AuthorRow {
    /// Author profile, or `None` when the join produced nothing
    pub fn into_profile(self) -> Option<Profile> {
        let user_id = self.user_id;
        self.profiles.map(|p| Profile {
            id: p.id.unwrap_or(user_id),
            username: p.username,
            avatar_url: p.avatar_url,
        })
    }
}
