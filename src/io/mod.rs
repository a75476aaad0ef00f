//! Opening data files that may be stored compressed.
use std::io::{self, BufRead};
use std::error::Error;
use std::fs::File;
use std::path::{self, Path, PathBuf};

/// Helper function for creating `io::Error` with
/// `io::ErrorKind::InvalidData`.
pub fn invalid_data<E: Into<Box<dyn Error + Send + Sync>>>(error: E)
                                                           -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, error)
}

/// Splits `a/b.gz` into `("a/b", ".gz")`.  A dot inside a directory name
/// does not count; without an extension the second part is empty.  Paths
/// must be UTF-8.
pub fn split_extension(path: &Path) -> io::Result<(&str, &str)> {
    let path = path.to_str()
        .ok_or_else(|| invalid_data("path is not UTF-8"))?;
    match path.rfind('.') {
        None => Ok((path, "")),
        Some(i) => {
            let ext = &path[i ..];
            if ext.chars().any(|c| path::is_separator(c)) {
                Ok((path, ""))
            } else {
                Ok((&path[.. i], ext))
            }
        }
    }
}

/// Compression suffixes recognized by [`open_compressed`], in the order
/// they are probed by [`find_compressed`].
pub const COMPRESSED_EXTENSIONS: [&str; 2] = [".gz", ".xz"];

/// Opens `path`, decompressing on the fly when it ends in `.gz` or `.xz`.
pub fn open_compressed(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let (_, ext) = split_extension(path)?;
    let ext = if ext.ends_with('z') { ext } else { "" };
    Ok(match ext {
        "" => Box::new(io::BufReader::new(file)),
        ".gz" => Box::new(io::BufReader::new(
            flate2::read::GzDecoder::new(file))),
        ".xz" => Box::new(io::BufReader::new(
            xz2::read::XzDecoder::new(file))),
        _ => return Err(invalid_data(
            format!("unrecognized compression format: {}", ext),
        )),
    })
}

/// Locate `path` either as given or with one of the compression suffixes
/// appended.  Returns `None` if none of them exist.
pub fn find_compressed(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_owned());
    }
    COMPRESSED_EXTENSIONS.iter().find_map(|ext| {
        let mut name = path.as_os_str().to_owned();
        name.push(ext);
        let candidate = PathBuf::from(name);
        if candidate.is_file() { Some(candidate) } else { None }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a/b.gz".as_ref()).unwrap(), ("a/b", ".gz"));
        assert_eq!(split_extension("a.d/b".as_ref()).unwrap(), ("a.d/b", ""));
        assert_eq!(split_extension("b".as_ref()).unwrap(), ("b", ""));
    }

    #[test]
    fn test_open_compressed() {
        let path = Path::new("data/so5cg-gz/v2=1/SO5CG_1_1-1-2_2");
        assert!(open_compressed(path).is_err());
        let found = find_compressed(path).unwrap();
        assert_eq!(found, Path::new("data/so5cg-gz/v2=1/SO5CG_1_1-1-2_2.gz"));
        let lines: Vec<String> = open_compressed(&found).unwrap()
            .lines().collect::<io::Result<_>>().unwrap();
        assert_eq!(lines, vec!["1 1 2 1 2", "1 1 2 1 4"]);
        assert!(find_compressed("data/so5cg-gz/v2=1/missing".as_ref())
                .is_none());
    }
}
