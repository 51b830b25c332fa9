/// Generated files on disk versus a fresh generation run

use crate::codegen::GeneratedFile;
use crate::error::Result;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    Missing,
    /// 1-based line of the first difference
    Differs { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleOutput {
    pub path: PathBuf,
    pub reason: StaleReason,
}

impl fmt::Display for StaleOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            StaleReason::Missing => write!(f, "{}: missing", self.path.display()),
            StaleReason::Differs { line } => {
                write!(f, "{}: out of date (first difference at line {})", self.path.display(), line)
            }
        }
    }
}

/// Compare each generated file byte for byte with what is on disk
pub fn check_outputs(generated: &[GeneratedFile]) -> Result<Vec<StaleOutput>> {
    let mut stale = Vec::new();

    for file in generated {
        let on_disk = match fs::read(&file.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                stale.push(StaleOutput {
                    path: file.path.clone(),
                    reason: StaleReason::Missing,
                });
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if on_disk != file.contents.as_bytes() {
            stale.push(StaleOutput {
                path: file.path.clone(),
                reason: StaleReason::Differs {
                    line: first_difference(&String::from_utf8_lossy(&on_disk), &file.contents),
                },
            });
        } else {
            tracing::debug!("{} is up to date", file.path.display());
        }
    }

    Ok(stale)
}

fn first_difference(a: &str, b: &str) -> usize {
    let mut a_lines = a.split('\n');
    let mut b_lines = b.split('\n');
    let mut line = 1;
    loop {
        match (a_lines.next(), b_lines.next()) {
            (Some(x), Some(y)) if x == y => line += 1,
            _ => return line,
        }
    }
}
