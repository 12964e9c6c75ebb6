//! User mention resolution.

use crate::collaborators::{UserDirectory, UserIdType};
use std::collections::HashMap;
use tracing::debug;

/// Turns a mentioned user id into the text that appears in the output.
pub trait MentionLookup {
    /// Rendered mention for `user_id`, including the leading `@`.
    fn mention(&mut self, user_id: &str) -> String;
}

/// Renders mentions as `@<id>` without any lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawMentions;

impl MentionLookup for RawMentions {
    fn mention(&mut self, user_id: &str) -> String {
        format!("@{user_id}")
    }
}

/// Resolves mentions through a [`UserDirectory`], caching every answer for
/// the lifetime of the resolver (one render pass).
pub struct MentionResolver<'a> {
    directory: &'a dyn UserDirectory,
    cache: HashMap<String, String>,
}

impl<'a> MentionResolver<'a> {
    /// Resolver with an empty cache.
    pub fn new(directory: &'a dyn UserDirectory) -> Self {
        Self {
            directory,
            cache: HashMap::new(),
        }
    }

    /// Display text for `user_id`: `@name`, `@en_name`, or `@<id>` when the
    /// lookup fails or returns nothing.
    pub fn resolve(&mut self, user_id: &str) -> String {
        if let Some(hit) = self.cache.get(user_id) {
            return hit.clone();
        }

        let id_type = UserIdType::classify(user_id);
        let name = match self.directory.lookup_user(user_id, id_type) {
            Ok(Some(info)) => info.display_name().map(str::to_string),
            Ok(None) => None,
            Err(e) => {
                debug!(user_id, %id_type, error = %e, "user lookup failed");
                None
            },
        };

        let rendered = format!("@{}", name.as_deref().unwrap_or(user_id));
        self.cache.insert(user_id.to_string(), rendered.clone());
        rendered
    }

    /// Number of cached resolutions.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl MentionLookup for MentionResolver<'_> {
    fn mention(&mut self, user_id: &str) -> String {
        self.resolve(user_id)
    }
}
