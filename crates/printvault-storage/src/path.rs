//! Record path conventions.
//!
//! A record's `file_path` is either *internal* (relative, resolved under
//! the managed storage root, eligible for physical deletion once no live
//! record references it) or *external* (a link to a file the application
//! does not own and must never delete).

use uuid::Uuid;

/// Whether a record path points outside the managed storage root.
///
/// External iff it contains a drive-letter-style colon (`C:\...`) or is
/// POSIX-absolute (`/home/...`). Everything else resolves relative to the
/// storage root.
pub fn is_external(path: &str) -> bool {
    path.contains(':') || path.starts_with('/')
}

/// Generate a unique storage name for an uploaded or copied-in file.
///
/// The original file name is kept (whitespace collapsed to underscores)
/// so the stored file remains recognizable on disk; a random prefix makes
/// simultaneous uploads of identically named files collision-free.
pub fn unique_storage_name(original_name: &str) -> String {
    let sanitized: String = original_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{}-{}", Uuid::new_v4().simple(), sanitized)
}

/// The final path component of an internal or external path.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// The file name without its final extension, used to pair toolpath files
/// with the mesh they were sliced from.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Whether a file name carries the given extension (case-insensitive).
pub fn has_extension(name: &str, ext: &str) -> bool {
    name.rsplit('.')
        .next()
        .is_some_and(|e| e.eq_ignore_ascii_case(ext) && e.len() < name.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_paths() {
        assert!(is_external("C:\\models\\bracket.stl"));
        assert!(is_external("/home/user/models/bracket.stl"));
        assert!(!is_external("ab12cd-bracket.stl"));
        assert!(!is_external("meshes/bracket.stl"));
    }

    #[test]
    fn test_unique_names_differ() {
        let a = unique_storage_name("front panel.stl");
        let b = unique_storage_name("front panel.stl");
        assert_ne!(a, b);
        assert!(a.ends_with("front_panel.stl"));
    }

    #[test]
    fn test_file_name_handles_both_separators() {
        assert_eq!(file_name("C:\\models\\bracket.stl"), "bracket.stl");
        assert_eq!(file_name("/home/user/bracket.stl"), "bracket.stl");
        assert_eq!(file_name("bracket.stl"), "bracket.stl");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("bracket.stl"), "bracket");
        assert_eq!(file_stem("bracket.v2.stl"), "bracket.v2");
        assert_eq!(file_stem("bracket"), "bracket");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("bracket.STL", "stl"));
        assert!(has_extension("part.gcode", "gcode"));
        assert!(!has_extension("bracket.stl", "gcode"));
        assert!(!has_extension("stl", "stl"));
    }
}
