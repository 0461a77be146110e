//! Link building for link pages
//!
//! Links are request paths with the incoming query preserved and only the
//! pagination key replaced.

use super::types::Links;
use crate::types::ceil_div;

/// Replace (or append) `key` in the query of `uri`
pub fn update_path(uri: &str, key: &str, value: u64) -> String {
    let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
    let value = value.to_string();

    let mut replaced = false;
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, current) in url::form_urlencoded::parse(query.as_bytes()) {
        if name == key {
            if !replaced {
                serializer.append_pair(key, &value);
                replaced = true;
            }
        } else {
            serializer.append_pair(&name, &current);
        }
    }
    if !replaced {
        serializer.append_pair(key, &value);
    }
    format!("{path}?{}", serializer.finish())
}

/// Links for page/size pages
///
/// Without a total, `last` is unknown and `next` is offered only when the
/// page came back full.
pub fn page_size_links(
    uri: &str,
    page_key: &str,
    page: u64,
    size: Option<u64>,
    total: Option<u64>,
    items_len: usize,
) -> Links {
    let mut links = Links {
        first: Some(update_path(uri, page_key, 1)),
        self_: Some(uri.to_string()),
        ..Links::default()
    };
    let Some(size) = size.filter(|size| *size > 0) else {
        return links;
    };

    match total {
        Some(total) => {
            let last = ceil_div(total, size).unwrap_or(1).max(1);
            links.last = Some(update_path(uri, page_key, last));
            if page.saturating_mul(size) < total {
                links.next = Some(update_path(uri, page_key, page + 1));
            }
        }
        None => {
            if items_len as u64 >= size {
                links.next = Some(update_path(uri, page_key, page + 1));
            }
        }
    }
    if page > 1 {
        links.prev = Some(update_path(uri, page_key, page - 1));
    }
    links
}

/// Links for limit/offset pages
///
/// `last` is the greatest multiple of `limit` strictly below `total`. `prev`
/// only exists once a whole page fits before the current offset, so an
/// offset that is not a multiple of `limit` never links back to a negative
/// offset.
pub fn limit_offset_links(
    uri: &str,
    offset_key: &str,
    limit: Option<u64>,
    offset: u64,
    total: Option<u64>,
    items_len: usize,
) -> Links {
    let mut links = Links {
        first: Some(update_path(uri, offset_key, 0)),
        self_: Some(uri.to_string()),
        ..Links::default()
    };
    let Some(limit) = limit.filter(|limit| *limit > 0) else {
        return links;
    };

    match total {
        Some(total) => {
            let last = total.saturating_sub(1) / limit * limit;
            links.last = Some(update_path(uri, offset_key, last));
            if offset.saturating_add(limit) < total {
                links.next = Some(update_path(uri, offset_key, offset + limit));
            }
        }
        None => {
            if items_len as u64 >= limit {
                links.next = Some(update_path(uri, offset_key, offset + limit));
            }
        }
    }
    if offset >= limit {
        links.prev = Some(update_path(uri, offset_key, offset - limit));
    }
    links
}
