//! BlogPostRow -> BlogPost mapper

use alpaca_core::BlogPost;

use crate::models::BlogPostRow;

/// Convert a post row, flattening the embedded tag links
impl From<BlogPostRow> for BlogPost {
    fn from(row: BlogPostRow) -> Self {
        BlogPost {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
            tags: row
                .blog_post_tags
                .into_iter()
                .filter_map(|link| link.tags)
                .collect(),
        }
    }
}
