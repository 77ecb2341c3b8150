use serde::{Deserialize, Deserializer, Serialize};

/// A single search hit. `object_id` is the identity key within a result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub num_comments: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: i64,
}

/// Body of `GET {base}/search?query=..&page=..`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<Story>,
    #[serde(default)]
    pub page: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoriesState {
    pub data: Vec<Story>,
    pub page: u32,
    pub is_loading: bool,
    pub is_error: bool,
}

// Ask HN posts and deleted authors come back as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
pub(crate) fn story(id: &str, title: &str, num_comments: i64, points: i64) -> Story {
    Story {
        object_id: id.to_string(),
        url: format!("https://example.com/{id}"),
        title: title.to_string(),
        author: format!("{title} author"),
        num_comments,
        points,
    }
}
