use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Hard ceiling on client-requested page sizes.
pub const MAX_PAGE_SIZE: usize = 25;

/// Pagination parameters for list operations.
///
/// `page` is 1-based. `page_size` defaults to [`DEFAULT_PAGE_SIZE`] and is
/// clamped to [`MAX_PAGE_SIZE`]; asking for more silently returns the maximum.
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: usize,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListParams {
    /// Page size after clamping to the allowed range.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for the requested page. Saturates on absurd `page`
    /// values and stays within SQLite's signed OFFSET range.
    pub fn offset(&self) -> usize {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.effective_page_size())
            .min(i64::MAX as usize)
    }
}

/// One page of results from a list operation.
#[derive(Debug, Clone, Serialize)]
pub struct ListResult<T: Serialize> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T: Serialize> ListResult<T> {
    pub fn new(items: Vec<T>, total: usize, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page.max(1),
            page_size: params.effective_page_size(),
        }
    }
}

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Merge a JSON patch into a base value (RFC 7386 semantics).
///
/// For each key in `patch`: `null` removes the key, objects merge
/// recursively, anything else replaces the base value.
pub fn merge_patch(base: &mut serde_json::Value, patch: &serde_json::Value) {
    if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            if value.is_null() {
                base_obj.remove(key);
            } else if value.is_object() {
                let entry = base_obj
                    .entry(key.clone())
                    .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
                merge_patch(entry, value);
            } else {
                base_obj.insert(key.clone(), value.clone());
            }
        }
    } else {
        *base = patch.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_defaults_and_clamp() {
        let p = ListParams::default();
        assert_eq!(p.effective_page_size(), 10);
        assert_eq!(p.offset(), 0);

        let p = ListParams { page: 3, page_size: 100 };
        assert_eq!(p.effective_page_size(), 25);
        assert_eq!(p.offset(), 50);

        let p = ListParams { page: 0, page_size: 0 };
        assert_eq!(p.effective_page_size(), 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let p = ListParams { page: usize::MAX / 10, page_size: 25 };
        assert!(p.offset() <= i64::MAX as usize);

        let p = ListParams { page: usize::MAX, page_size: 25 };
        assert_eq!(p.offset(), i64::MAX as usize);
    }

    #[test]
    fn params_from_query_string() {
        let p: ListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 10);

        let p: ListParams = serde_json::from_str(r#"{"page": 2, "page_size": 5}"#).unwrap();
        assert_eq!(p.page, 2);
        assert_eq!(p.effective_page_size(), 5);
    }

    #[test]
    fn new_id_shape() {
        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
    }

    #[test]
    fn merge_patch_semantics() {
        let mut base = serde_json::json!({"a": 1, "b": 2, "c": {"d": 3}});
        let patch = serde_json::json!({"b": null, "c": {"e": 4}, "f": 5});
        merge_patch(&mut base, &patch);
        assert_eq!(base, serde_json::json!({"a": 1, "c": {"d": 3, "e": 4}, "f": 5}));
    }
}
