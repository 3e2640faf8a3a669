use crate::ColabMsaError;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{debug, info};

/// Unpack the single member named `member` from a `.tar.gz` archive into
/// `dest_dir`, returning the path of the extracted file.
pub fn extract_member(archive: &Path, member: &str, dest_dir: &Path) -> Result<PathBuf, ColabMsaError> {
    let file = File::open(archive)?;
    let mut tar = Archive::new(GzDecoder::new(BufReader::new(file)));

    let entries = tar
        .entries()
        .map_err(|e| ColabMsaError::Archive(format!("{}: {}", archive.display(), e)))?;

    for entry in entries {
        let mut entry =
            entry.map_err(|e| ColabMsaError::Archive(format!("{}: {}", archive.display(), e)))?;
        let path = entry.path()?.into_owned();
        let name = path.strip_prefix(".").unwrap_or(path.as_path());
        if name != Path::new(member) {
            continue;
        }

        fs::create_dir_all(dest_dir)?;
        let unpacked = entry.unpack_in(dest_dir)?;
        if !unpacked {
            return Err(ColabMsaError::Archive(format!(
                "refusing to unpack '{}' outside of {}",
                member,
                dest_dir.display()
            )));
        }
        debug!("Extracted {} into {}", member, dest_dir.display());
        return Ok(dest_dir.join(name));
    }

    Err(ColabMsaError::Archive(format!(
        "{} has no member named '{}'",
        archive.display(),
        member
    )))
}

/// Read every entry of a `.tar.gz` archive, failing if it is not one.
/// Catches error pages saved in place of the result archive.
pub fn verify_archive(archive: &Path) -> Result<usize, ColabMsaError> {
    let invalid = |e: std::io::Error| {
        ColabMsaError::Archive(format!("{} is not a gzip tar archive: {}", archive.display(), e))
    };
    let file = File::open(archive)?;
    let mut tar = Archive::new(GzDecoder::new(BufReader::new(file)));

    let mut members = 0;
    for entry in tar.entries().map_err(invalid)? {
        let mut entry = entry.map_err(invalid)?;
        io::copy(&mut entry, &mut io::sink()).map_err(invalid)?;
        members += 1;
    }
    if members == 0 {
        return Err(ColabMsaError::Archive(format!(
            "{} holds no files",
            archive.display()
        )));
    }
    Ok(members)
}

/// Move a file, falling back to copy-and-delete across filesystems
pub fn move_file(from: &Path, to: &Path) -> Result<(), ColabMsaError> {
    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    if fs::rename(from, to).is_err() {
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}

/// Where the extracted alignment goes and what it is called on the way
#[derive(Debug, Clone)]
pub struct ExtractionPlan<'a> {
    pub archive: &'a Path,
    pub member: &'a str,
    pub job_dir: PathBuf,
    pub job_label: &'a str,
    pub final_path: &'a Path,
}

impl ExtractionPlan<'_> {
    pub fn renamed_member(&self) -> PathBuf {
        self.job_dir.join(format!("{}_mmseqs2_hits.a3m", self.job_label))
    }

    /// Extract, rename, move into place, then remove the job directory and
    /// the archive.
    pub fn execute(&self) -> Result<(), ColabMsaError> {
        let extracted = extract_member(self.archive, self.member, &self.job_dir)?;
        let renamed = self.renamed_member();
        fs::rename(&extracted, &renamed)?;
        move_file(&renamed, self.final_path)?;

        // Fails if anything besides the member ended up in the job directory
        fs::remove_dir(&self.job_dir)?;
        fs::remove_file(self.archive)?;

        info!("Alignment written to {}", self.final_path.display());
        Ok(())
    }
}
