use eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader, BufWriter};

pub type Input = Box<dyn AsyncBufRead + Unpin + Send>;
pub type Output = Box<dyn AsyncWrite + Unpin + Send>;

// Opens `name` for reading; "stdin" and "-" read standard input.
pub async fn open_input(name: &str) -> Result<Input> {
    match name {
        "stdin" | "-" => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
        _ => {
            let f = File::open(name)
                .await
                .wrap_err_with(|| format!("opening {}", name))?;
            Ok(Box::new(BufReader::new(f)))
        }
    }
}

// Creates `name` for writing; "stdout" and "-" write standard output.
pub async fn create_output(name: &str) -> Result<Output> {
    match name {
        "stdout" | "-" => Ok(Box::new(BufWriter::new(tokio::io::stdout()))),
        _ => {
            let f = File::create(name)
                .await
                .wrap_err_with(|| format!("creating {}", name))?;
            Ok(Box::new(BufWriter::new(f)))
        }
    }
}

/// Files written next to their final path and moved into place together.
///
/// Nothing is visible under the final names until `commit`. A failed
/// `commit` removes what it already moved along with the remaining
/// temporaries; `abort` removes the temporaries.
#[derive(Debug, Default)]
pub struct Staged {
    files: Vec<(PathBuf, PathBuf)>,
}

impl Staged {
    /// Creates the temporary file for `path` and returns a writer to it.
    pub async fn create(&mut self, path: &Path) -> Result<BufWriter<File>> {
        if self.files.iter().any(|(_, p)| p == path) {
            eyre::bail!("{} is already staged", path.display());
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let f = File::create(&tmp)
            .await
            .wrap_err_with(|| format!("creating {}", tmp.display()))?;
        self.files.push((tmp, path.to_path_buf()));
        Ok(BufWriter::new(f))
    }

    pub async fn commit(self) -> Result<Vec<PathBuf>> {
        let mut done = Vec::with_capacity(self.files.len());
        for (i, (tmp, path)) in self.files.iter().enumerate() {
            if let Err(e) = tokio::fs::rename(tmp, path).await {
                for moved in &done {
                    let _ = tokio::fs::remove_file(moved).await;
                }
                for (pending, _) in &self.files[i..] {
                    let _ = tokio::fs::remove_file(pending).await;
                }
                return Err(eyre::Report::new(e).wrap_err(format!(
                    "renaming {} to {}",
                    tmp.display(),
                    path.display()
                )));
            }
            done.push(path.clone());
        }
        Ok(done)
    }

    pub async fn abort(self) {
        for (tmp, _) in &self.files {
            let _ = tokio::fs::remove_file(tmp).await;
        }
    }
}
