//! Where the command table and demo context live on disk.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::debug;

/// Set to a directory to skip the search below.
pub const DATA_DIR_VAR: &str = "WAYFARER_DATA";

const CRATE_DATA: &str = "wayfarer_parser/data";

static DATA_ROOT: LazyLock<PathBuf> = LazyLock::new(|| {
    let exe = env::current_exe().ok();
    let explicit = env::var_os(DATA_DIR_VAR).map(PathBuf::from);
    let root = find_data_root(explicit, &search_bases(exe.as_deref()));
    debug!("data root is {}", root.display());
    root
});

/// `relative` joined onto the data root.
pub fn data_path(relative: impl AsRef<Path>) -> PathBuf {
    DATA_ROOT.join(relative)
}

/// The working directory, then the executable's directory and its parent
/// (`target/debug` and `target`).
fn search_bases(exe: Option<&Path>) -> Vec<PathBuf> {
    let mut bases = vec![PathBuf::new()];
    if let Some(dir) = exe.and_then(Path::parent) {
        bases.push(dir.to_path_buf());
        if let Some(parent) = dir.parent() {
            bases.push(parent.to_path_buf());
        }
    }
    bases
}

/// An explicit directory wins outright. Otherwise the first base holding the
/// workspace layout or a flat `data/`, falling back to the workspace layout.
fn find_data_root(explicit: Option<PathBuf>, bases: &[PathBuf]) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    bases
        .iter()
        .flat_map(|base| [base.join(CRATE_DATA), base.join("data")])
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| PathBuf::from(CRATE_DATA))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn explicit_directory_wins() {
        let root = find_data_root(Some(PathBuf::from("/srv/wayfarer")), &search_bases(None));
        assert_eq!(root, PathBuf::from("/srv/wayfarer"));
    }

    #[test]
    fn bases_cover_executable_dir_and_parent() {
        let bases = search_bases(Some(Path::new("/opt/wf/target/debug/wayfarer")));
        assert_eq!(
            bases,
            vec![PathBuf::new(), PathBuf::from("/opt/wf/target/debug"), PathBuf::from("/opt/wf/target")]
        );
        assert_eq!(search_bases(None), vec![PathBuf::new()]);
    }

    #[test]
    fn first_base_with_data_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("bin");
        let full = dir.path().join("install");
        fs::create_dir_all(&empty).unwrap();
        fs::create_dir_all(full.join("data")).unwrap();
        fs::create_dir_all(full.join(CRATE_DATA)).unwrap();

        let root = find_data_root(None, &[empty.clone(), full.clone()]);
        assert_eq!(root, full.join(CRATE_DATA));
        assert_eq!(find_data_root(None, &[empty]), PathBuf::from(CRATE_DATA));
    }
}
