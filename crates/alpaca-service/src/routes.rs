//! Navigation routes
//!
//! Maps URL paths to views and back.

use std::fmt;

use alpaca_core::RecordId;

/// A view reachable by path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    DiscordConnect,
    /// Chat with no channel selected
    Chat,
    Channel(RecordId),
    Dashboard,
    Notes,
    Journals,
    Journal(RecordId),
    Blog,
    NewBlogPost,
    EditBlogPost(RecordId),
    BlogPost(RecordId),
    NotFound,
}

impl Route {
    /// Parse a path; query strings, fragments and a trailing slash are ignored
    pub fn parse(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["discord-connect"] => Self::DiscordConnect,
            ["chat"] => Self::Chat,
            ["chat", id] => id_route(id, Self::Channel),
            ["dashboard"] => Self::Dashboard,
            ["notes"] => Self::Notes,
            ["journals"] => Self::Journals,
            ["journals", id] => id_route(id, Self::Journal),
            ["blog"] => Self::Blog,
            ["blog", "new"] => Self::NewBlogPost,
            ["blog", "edit", id] => id_route(id, Self::EditBlogPost),
            ["blog", id] => id_route(id, Self::BlogPost),
            _ => Self::NotFound,
        }
    }

    /// Path that renders this route
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::DiscordConnect => "/discord-connect".to_string(),
            Self::Chat => "/chat".to_string(),
            Self::Channel(id) => format!("/chat/{id}"),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Notes => "/notes".to_string(),
            Self::Journals => "/journals".to_string(),
            Self::Journal(id) => format!("/journals/{id}"),
            Self::Blog => "/blog".to_string(),
            Self::NewBlogPost => "/blog/new".to_string(),
            Self::EditBlogPost(id) => format!("/blog/edit/{id}"),
            Self::BlogPost(id) => format!("/blog/{id}"),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// Channel selected by this route
    pub fn channel_id(&self) -> Option<RecordId> {
        match self {
            Self::Channel(id) => Some(*id),
            _ => None,
        }
    }
}

fn id_route(raw: &str, route: fn(RecordId) -> Route) -> Route {
    RecordId::parse(raw).map_or(Route::NotFound, route)
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
