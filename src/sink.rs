use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Destination for downloaded products, keyed by logical identifier.
pub trait ProductSink {
    /// Where `identifier` would be stored.
    fn path_for(&self, identifier: &str) -> io::Result<PathBuf>;

    /// Persists `bytes` and returns the final location.
    fn write(&self, identifier: &str, bytes: &[u8]) -> io::Result<PathBuf>;

    /// The stored location of `identifier`, if it is already there.
    fn existing(&self, identifier: &str) -> Option<PathBuf> {
        self.path_for(identifier).ok().filter(|path| path.exists())
    }
}

/// Identifiers become a single file name inside the sink directory.
fn check_identifier(identifier: &str) -> io::Result<()> {
    let mut components = Path::new(identifier).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == identifier => Ok(()),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{identifier}' is not a plain file name"),
        )),
    }
}

/// Writes each product as `<dir>/<identifier>.zip`.
#[derive(Debug, Clone)]
pub struct ZipDirectorySink {
    dir: PathBuf,
}

impl ZipDirectorySink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl ProductSink for ZipDirectorySink {
    fn path_for(&self, identifier: &str) -> io::Result<PathBuf> {
        check_identifier(identifier)?;
        Ok(self.dir.join(format!("{identifier}.zip")))
    }

    fn write(&self, identifier: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let dst = self.path_for(identifier)?;
        write_complete(&dst, |file| file.write_all(bytes))?;
        Ok(dst)
    }
}

/// Fills `<dst>.partial` and renames it to `dst` once `fill` and the sync
/// succeed. Only complete files carry the final name; a failed partial is removed.
fn write_complete<F>(dst: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut partial = dst.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let mut file = File::create(&partial)?;
    if let Err(e) = fill(&mut file).and_then(|_| file.sync_all()) {
        drop(file);
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    fs::rename(&partial, dst)
}
