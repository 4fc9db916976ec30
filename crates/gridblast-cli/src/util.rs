use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use gridblast_evaluator::weight_store::tmp_path_for;
use serde::{Serialize, de::DeserializeOwned};

/// Where a command prints its JSON result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonTarget {
    Stdout,
    File(PathBuf),
}

impl JsonTarget {
    /// A file target when `--output` was given, stdout otherwise.
    #[must_use]
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }

    /// Writes `value` as pretty JSON; `kind` names the document in errors.
    pub fn write<T>(&self, kind: &str, value: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        match self {
            Self::Stdout => write_pretty(io::stdout().lock(), value)
                .with_context(|| format!("cannot print {kind} to stdout")),
            Self::File(path) => write_json_atomic(kind, path, value),
        }
    }
}

fn write_pretty<W, T>(mut writer: W, value: &T) -> io::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()
}

/// Reads a JSON document of the given `kind` (e.g. "game config").
pub fn read_json_file<T, P>(kind: &str, path: P) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read {kind} file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{kind} file {} is not valid", path.display()))
}

/// Replaces `path` with `value` as JSON, so readers never see a partial file.
pub fn write_json_atomic<T, P>(kind: &str, path: P, value: &T) -> anyhow::Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let tmp_path = tmp_path_for(path);
    let file = File::create(&tmp_path)
        .with_context(|| format!("cannot create {kind} file {}", tmp_path.display()))?;
    write_pretty(BufWriter::new(file), value)
        .with_context(|| format!("cannot write {kind} file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("cannot replace {kind} file {}", path.display()))
}
