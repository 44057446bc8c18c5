//! Folder listing classification.
//!
//! The store has a flat key space plus a folder index that may lag behind or miss
//! folders entirely (objects written before folders were tracked). [`classify`] merges
//! both signals into one listing without touching the network.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::item::{FolderRecord, ListingItem, ObjectRecord};
use super::path::CanonicalPath;

/// Where a key sits relative to the listed folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement<'a> {
    /// Direct child file with this basename
    File(&'a str),
    /// Descendant of the immediate subfolder with this name
    InFolder(&'a str),
    /// Outside the listed folder
    Outside,
}

/// Locate `key` relative to `folder`.
///
/// At the root, keys without the root folder prefix are legacy uploads; only the
/// ones without any `/` belong to this namespace.
pub fn place<'a>(key: &'a str, folder: &CanonicalPath, root_folder: &str) -> Placement<'a> {
    let store_path = folder.store_path(root_folder);

    let relative = if store_path.is_empty() {
        Some(key)
    } else {
        let prefix = format!("{}/", store_path);
        match key.strip_prefix(prefix.as_str()) {
            Some(rest) => Some(rest),
            None if folder.is_root() && !key.contains('/') => Some(key),
            None => None,
        }
    };

    match relative {
        None | Some("") => Placement::Outside,
        Some(rel) => match rel.split_once('/') {
            None => Placement::File(rel),
            Some(("", _)) => Placement::Outside,
            Some((first, _)) => Placement::InFolder(first),
        },
    }
}

/// Build the listing of `folder` from every object under it and its declared subfolders.
///
/// Folders come first: declared ones in store order, then folders inferred from
/// deeper keys in first-seen order. Files follow in object order. Names are unique:
/// a folder shadows a file with the same name, and when several objects share a key
/// the most recently created one is listed in the slot of the first.
pub fn classify(
    objects: &[ObjectRecord],
    declared: &[FolderRecord],
    folder: &CanonicalPath,
    root_folder: &str,
) -> Vec<ListingItem> {
    let store_path = folder.store_path(root_folder);
    let child_path = |name: &str| {
        if store_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", store_path, name)
        }
    };

    let mut seen = HashSet::new();
    let mut folders = Vec::new();
    let mut files: Vec<ListingItem> = Vec::new();

    for record in declared {
        if record.name.is_empty() || record.name.contains('/') {
            warn!(folder = %folder, name = %record.name, "skipping malformed folder record");
            continue;
        }
        let path = child_path(&record.name);
        if seen.insert(path.clone()) {
            folders.push(ListingItem::folder(&path));
        }
    }

    let mut direct = Vec::new();
    for object in objects {
        match place(&object.key, folder, root_folder) {
            Placement::File(_) => direct.push(object),
            Placement::InFolder(name) => {
                let path = child_path(name);
                if seen.insert(path.clone()) {
                    folders.push(ListingItem::folder(&path));
                }
            }
            Placement::Outside => {}
        }
    }

    // Copies of one key can live in different resource kinds.
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for object in direct {
        if let Some(&slot) = slots.get(object.key.as_str()) {
            if files[slot].created_at < Some(object.created_at) {
                files[slot] = ListingItem::file(object);
            }
        } else if seen.insert(object.key.clone()) {
            slots.insert(&object.key, files.len());
            files.push(ListingItem::file(object));
        }
    }

    folders.extend(files);
    folders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ResourceKind;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    const ROOT: &str = "root";

    fn object(key: &str) -> ObjectRecord {
        ObjectRecord {
            key: key.to_string(),
            size_bytes: key.len() as u64,
            url: format!("https://cdn.example/{}", key),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            resource_kind: ResourceKind::Raw,
        }
    }

    fn objects(keys: &[&str]) -> Vec<ObjectRecord> {
        keys.iter().map(|k| object(k)).collect()
    }

    fn path(raw: &str) -> CanonicalPath {
        CanonicalPath::parse(raw, ROOT).unwrap()
    }

    fn names(items: &[ListingItem]) -> Vec<(&str, bool)> {
        items
            .iter()
            .map(|i| (i.basename.as_str(), i.is_folder))
            .collect()
    }

    #[test]
    fn test_place() {
        let root = CanonicalPath::root();
        assert_eq!(place("root/a.txt", &root, ROOT), Placement::File("a.txt"));
        assert_eq!(place("root/sub/b.txt", &root, ROOT), Placement::InFolder("sub"));
        assert_eq!(place("a_legacy.txt", &root, ROOT), Placement::File("a_legacy.txt"));
        assert_eq!(place("other/x", &root, ROOT), Placement::Outside);

        let sub = path("sub");
        assert_eq!(place("root/sub/b.txt", &sub, ROOT), Placement::File("b.txt"));
        assert_eq!(place("root/a.txt", &sub, ROOT), Placement::Outside);
        assert_eq!(place("b.txt", &sub, ROOT), Placement::Outside);
        assert_eq!(place("root/subway/c", &sub, ROOT), Placement::Outside);
    }

    #[test]
    fn test_legacy_and_prefixed_keys_at_root() {
        let objs = objects(&["root/a.txt", "root/sub/b.txt", "a_legacy.txt"]);
        let items = classify(&objs, &[], &CanonicalPath::root(), ROOT);
        assert_eq!(
            names(&items),
            vec![("sub", true), ("a.txt", false), ("a_legacy.txt", false)]
        );
        assert!(items.iter().all(|i| i.basename != "b.txt"));
    }

    #[test]
    fn test_listing_subfolder() {
        let objs = objects(&["root/a.txt", "root/sub/b.txt", "a_legacy.txt"]);
        let items = classify(&objs, &[], &path("root/sub"), ROOT);
        assert_eq!(names(&items), vec![("b.txt", false)]);
        assert_eq!(items[0].name, "root/sub/b.txt");
    }

    #[test]
    fn test_declared_and_inferred_folders_merge() {
        let objs = objects(&["root/docs/x", "root/pics/y/z", "root/file"]);
        let declared = vec![
            FolderRecord::from_path("root/docs"),
            FolderRecord::from_path("root/empty"),
        ];
        let items = classify(&objs, &declared, &CanonicalPath::root(), ROOT);
        assert_eq!(
            names(&items),
            vec![
                ("docs", true),
                ("empty", true),
                ("pics", true),
                ("file", false)
            ]
        );
        assert_eq!(items[0].name, "root/docs");
    }

    #[test]
    fn test_duplicate_objects_deduplicated() {
        let objs = objects(&["root/a", "root/a", "root/b"]);
        let items = classify(&objs, &[], &CanonicalPath::root(), ROOT);
        assert_eq!(names(&items), vec![("a", false), ("b", false)]);
    }

    #[test]
    fn test_newest_copy_of_a_key_wins() {
        let mut older = object("root/report");
        older.url = "old".to_string();
        older.resource_kind = ResourceKind::Image;
        let mut newer = object("root/report");
        newer.url = "new".to_string();
        newer.created_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let other = object("root/other");

        let objs = vec![older.clone(), other, newer.clone()];
        let items = classify(&objs, &[], &CanonicalPath::root(), ROOT);
        assert_eq!(names(&items), vec![("report", false), ("other", false)]);
        assert_eq!(items[0].url, "new");

        // Order of the copies does not matter.
        let items = classify(&[newer, older], &[], &CanonicalPath::root(), ROOT);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "new");
    }

    #[test]
    fn test_folder_shadows_file_with_same_name() {
        let objs = objects(&["root/dup", "root/dup/inner"]);
        let items = classify(&objs, &[], &CanonicalPath::root(), ROOT);
        assert_eq!(names(&items), vec![("dup", true)]);
    }

    #[test]
    fn test_malformed_declared_names_skipped() {
        let declared = vec![
            FolderRecord {
                name: String::new(),
                path: "root/".to_string(),
            },
            FolderRecord {
                name: "a/b".to_string(),
                path: "root/a/b".to_string(),
            },
            FolderRecord::from_path("root/ok"),
        ];
        let items = classify(&[], &declared, &CanonicalPath::root(), ROOT);
        assert_eq!(names(&items), vec![("ok", true)]);
    }

    #[test]
    fn test_empty_root_folder() {
        let objs = objects(&["a", "b/c", "b/d/e"]);
        let items = classify(&objs, &[], &CanonicalPath::root(), "");
        assert_eq!(names(&items), vec![("b", true), ("a", false)]);
        assert_eq!(items[0].name, "b");

        let b = CanonicalPath::parse("b", "").unwrap();
        let items = classify(&objs, &[], &b, "");
        assert_eq!(names(&items), vec![("d", true), ("c", false)]);
        assert_eq!(items[0].name, "b/d");
    }

    #[test]
    fn test_keys_with_empty_segments_ignored() {
        let objs = objects(&["root//x", "root/ok"]);
        let items = classify(&objs, &[], &CanonicalPath::root(), ROOT);
        assert_eq!(names(&items), vec![("ok", false)]);
    }

    fn key_strategy() -> impl Strategy<Value = String> {
        let segment = prop::sample::select(vec!["a", "b", "c", "a.txt", "root", "sub"]);
        (prop::bool::ANY, prop::collection::vec(segment, 1..4)).prop_map(|(prefixed, segs)| {
            let joined = segs.join("/");
            if prefixed {
                format!("root/{}", joined)
            } else {
                joined
            }
        })
    }

    proptest! {
        #[test]
        fn prop_names_unique_and_folders_first(
            keys in prop::collection::vec(key_strategy(), 0..24),
            declared in prop::collection::vec(prop::sample::select(vec!["a", "b", "sub", "x"]), 0..6),
            listed in prop::sample::select(vec!["", "a", "sub", "a/b"]),
        ) {
            let folder = CanonicalPath::parse(listed, ROOT).unwrap();
            let objs: Vec<ObjectRecord> = keys.iter().map(|k| object(k)).collect();
            let store_path = folder.store_path(ROOT);
            let records: Vec<FolderRecord> = declared
                .iter()
                .map(|n| FolderRecord::from_path(format!("{}/{}", store_path, n)))
                .collect();

            let items = classify(&objs, &records, &folder, ROOT);

            let mut seen = HashSet::new();
            for item in &items {
                prop_assert!(seen.insert(item.name.clone()), "duplicate {}", item.name);
                prop_assert!(!item.basename.contains('/'));
            }
            if let Some(first_file) = items.iter().position(|i| !i.is_folder) {
                prop_assert!(items[first_file..].iter().all(|i| !i.is_folder));
            }
        }
    }
}
