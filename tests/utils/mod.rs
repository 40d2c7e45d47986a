use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory standing in for the directory benchmatrix is run from
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to a path relative to the workspace, creating parents.
    pub fn write_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, contents).expect("Failed to write file");
        path
    }

    /// Create a benchmark source directory with a trivial test file.
    pub fn source_dir(&self, relative: &str) -> PathBuf {
        self.write_file(
            &format!("{}/bench_test.go", relative),
            "package main\n\nimport \"testing\"\n\nfunc BenchmarkNop(b *testing.B) {}\n",
        )
        .parent()
        .map(Path::to_path_buf)
        .expect("source file has a parent")
    }

    /// Artifact root the engine uses by default (`<workspace>/tmp`).
    pub fn tmp_root(&self) -> PathBuf {
        self.dir.path().join("tmp")
    }

    /// Names of the entries directly under `relative`, sorted.
    pub fn list(&self, relative: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.dir.path().join(relative))
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Shell script that behaves enough like `go` for end-to-end runs:
/// `test -c ... -o OUT` writes a fake test binary, `tool pprof -proto FILES`
/// concatenates its inputs. Every invocation is appended to `<root>/go.log`.
/// Setting `FAKE_GO_FAIL=1` in the environment makes it exit 2.
const FAKE_GO: &str = r##"#!/bin/sh
here=$(cd "$(dirname "$0")/.." && pwd)
echo "$*" >> "$here/go.log"
if [ "$FAKE_GO_FAIL" = "1" ]; then
  echo "fake go: failing on request" >&2
  exit 2
fi
case "$1" in
test)
  out=""
  pgo=""
  while [ $# -gt 0 ]; do
    case "$1" in
      -o) shift; out="$1" ;;
      -pgo=*) pgo="${1#-pgo=}" ;;
    esac
    shift
  done
  cat > "$out" <<'BIN'
#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    -test.cpuprofile=*) echo "cpu" > "${arg#-test.cpuprofile=}" ;;
  esac
done
echo "BenchmarkNop-8   1000000000   0.25 ns/op"
if [ -n "$FAKE_BENCH_ARGS" ]; then echo "args: $*" >> "$FAKE_BENCH_ARGS"; fi
exit 0
BIN
  echo "# pgo=$pgo" >> "$out"
  chmod +x "$out"
  ;;
tool)
  shift 3
  cat "$@"
  ;;
*)
  echo "fake go: unsupported command $1" >&2
  exit 2
  ;;
esac
"##;

/// Install the fake `go` under `<root>/bin/go` and return `root`.
#[cfg(unix)]
pub fn install_fake_go(root: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let bin = root.join("bin");
    fs::create_dir_all(&bin).expect("Failed to create toolchain bin directory");
    let go = bin.join("go");
    fs::write(&go, FAKE_GO).expect("Failed to write fake go");
    fs::set_permissions(&go, fs::Permissions::from_mode(0o755)).expect("Failed to chmod fake go");
    root.to_path_buf()
}

#[cfg(not(unix))]
pub fn install_fake_go(root: &Path) -> PathBuf {
    root.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_go_script_is_complete() {
        assert!(FAKE_GO.starts_with("#!/bin/sh\n"));
        assert!(FAKE_GO.contains("echo \"# pgo=$pgo\" >> \"$out\""));
        assert!(FAKE_GO.trim_end().ends_with("esac"));
    }

    #[cfg(unix)]
    #[test]
    fn test_install_fake_go_writes_executable() {
        use std::os::unix::fs::PermissionsExt;

        let ws = TestWorkspace::new();
        let root = install_fake_go(&ws.path().join("go"));
        let go = root.join("bin").join("go");
        assert_eq!(fs::read_to_string(&go).unwrap(), FAKE_GO);
        let mode = fs::metadata(&go).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
