use super::producer::Producer;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Line-by-line reader over a text file. Line terminators are stripped.
pub struct FileLines {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line: u64,
}

impl FileLines {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line: 0,
        })
    }
}

impl Producer<String> for FileLines {
    fn produce(&mut self) -> Result<Option<String>> {
        self.line += 1;
        self.lines
            .next()
            .transpose()
            .with_context(|| format!("reading {} at line {}", self.path.display(), self.line))
    }
}
