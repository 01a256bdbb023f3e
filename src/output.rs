//! Delimited text output of gene pairs and orthologous groups
//!
//! All writers accept any [`std::io::Write`] and a field separator,
//! usually `,` or `\t`.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::error;

use crate::relations::GenePair;
use crate::selector::MaximalOg;
use crate::{OrthoXmlError, OrthoXmlResult};

/// Writes one `gene1<sep>gene2` line per pair
///
/// # Errors
///
/// [`OrthoXmlError::Io`] if writing fails
///
/// # Examples
///
/// ```
/// use orthoxml::output::write_pairs;
///
/// let mut buffer = Vec::new();
/// write_pairs(&mut buffer, &[("HUMAN1", "MOUSE1"), ("HUMAN1", "RAT1")], "\t").unwrap();
/// assert_eq!(String::from_utf8(buffer).unwrap(), "HUMAN1\tMOUSE1\nHUMAN1\tRAT1\n");
/// ```
pub fn write_pairs<W: Write>(writer: &mut W, pairs: &[GenePair<'_>], sep: &str) -> OrthoXmlResult<()> {
    for (gene1, gene2) in pairs {
        writeln!(writer, "{gene1}{sep}{gene2}")?;
    }
    Ok(())
}

/// Writes one line per orthologous group, with all genes joined by `sep`
///
/// # Errors
///
/// [`OrthoXmlError::Io`] if writing fails
pub fn write_ogs<W: Write>(writer: &mut W, ogs: &[MaximalOg<'_>], sep: &str) -> OrthoXmlResult<()> {
    for og in ogs {
        writeln!(writer, "{}", og.genes().join(sep))?;
    }
    Ok(())
}

/// Creates the file `path` for buffered writing
///
/// # Errors
///
/// [`OrthoXmlError::CannotOpenFile`] if the file cannot be created
///
/// # Examples
///
/// ```no_run
/// use orthoxml::output::{create_file, write_pairs};
///
/// let mut file = create_file("orthologs.tsv").unwrap();
/// write_pairs(&mut file, &[("HUMAN1", "MOUSE1")], "\t").unwrap();
/// ```
pub fn create_file<P: AsRef<Path>>(path: P) -> OrthoXmlResult<BufWriter<File>> {
    let path = path.as_ref();
    File::create(path).map(BufWriter::new).map_err(|_| {
        error!("Unable to create file {}", path.display());
        OrthoXmlError::CannotOpenFile(path.display().to_string())
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures;

    #[test]
    fn ogs_per_line() {
        let tree = fixtures::example_tree();
        let ogs = tree.maximal_ogs().unwrap();
        let mut buffer = Vec::new();
        write_ogs(&mut buffer, &ogs, crate::DEFAULT_SEPARATOR).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "HUMAN1,MOUSE1,RAT1,CHICK1\nHUMAN3,CHICK3\n"
        );
    }

    #[test]
    fn pairs_to_file() {
        let dir = std::env::temp_dir().join("orthoxml-output");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pairs.csv");

        let tree = fixtures::example_tree();
        let pairs = tree.ortholog_pairs_of_gene("RAT1").unwrap();
        let mut file = create_file(&path).unwrap();
        write_pairs(&mut file, &pairs, ",").unwrap();
        file.flush().unwrap();
        drop(file);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "HUMAN1,RAT1\nMOUSE1,RAT1\nRAT1,CHICK1\nRAT1,CHICK2\n"
        );
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory() {
        let path = std::env::temp_dir()
            .join("orthoxml-does-not-exist")
            .join("nested")
            .join("pairs.csv");
        assert!(matches!(
            create_file(path),
            Err(OrthoXmlError::CannotOpenFile(_))
        ));
    }
}
