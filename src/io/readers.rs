use crate::{core::source::InputFormat, error::VcxError, utils::util::Result};
use flate2::read::MultiGzDecoder;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

/// Gzip magic plus the BGZF `BC` extra subfield distinguish bgzip from
/// plain gzip. The flags are informational; validation does not depend
/// on them.
pub fn sniff_input_format(magic: &[u8]) -> InputFormat {
    let mut format = InputFormat::VCF;
    if magic.len() >= 2 && magic[..2] == [0x1f, 0x8b] {
        let is_bgzf = magic.len() >= 14
            && magic[3] & 0x04 != 0
            && magic[12] == b'B'
            && magic[13] == b'C';
        format = format
            | if is_bgzf {
                InputFormat::BGZIP
            } else {
                InputFormat::GZIP
            };
    }
    format
}

fn sniff_file(path: &Path) -> Result<InputFormat> {
    let mut file = File::open(path)
        .map_err(|error| crate::vcx_error!("Failed to open file {}: {error}", path.display()))?;
    let mut magic = [0u8; 16];
    let n = file
        .read(&mut magic)
        .map_err(|error| crate::vcx_error!("Failed to read {}: {error}", path.display()))?;
    Ok(sniff_input_format(&magic[..n]))
}

fn is_gzip_named(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".gzip") || path_str.ends_with(".bgz")
}

/// Opens a VCF input, transparently decompressing gzip/BGZF streams.
pub fn open_vcf_reader(path: &Path) -> Result<(BufReader<Box<dyn Read>>, InputFormat)> {
    let format = sniff_file(path)?;
    if is_gzip_named(path)
        && !format.contains(InputFormat::GZIP)
        && !format.contains(InputFormat::BGZIP)
    {
        return Err(VcxError::InvalidGzipHeader {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path)
        .map_err(|error| crate::vcx_error!("Failed to open file {}: {error}", path.display()))?;

    if format.contains(InputFormat::GZIP) || format.contains(InputFormat::BGZIP) {
        let decoder = MultiGzDecoder::new(file);
        Ok((BufReader::new(Box::new(decoder)), format))
    } else {
        Ok((BufReader::new(Box::new(file)), format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::{BufRead, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn plain_text_is_vcf_only() {
        let format = sniff_input_format(b"##fileformat=VCF");
        assert!(format.contains(InputFormat::VCF));
        assert!(!format.contains(InputFormat::GZIP));
        assert!(!format.contains(InputFormat::BGZIP));
    }

    #[test]
    fn gzip_magic_is_flagged() {
        let format = sniff_input_format(&[0x1f, 0x8b, 0x08, 0x00]);
        assert!(format.contains(InputFormat::GZIP));
        assert!(!format.contains(InputFormat::BGZIP));
    }

    #[test]
    fn bgzf_extra_subfield_is_flagged() {
        let magic = [
            0x1f, 0x8b, 0x08, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0x06, 0x00, b'B', b'C',
            0x02, 0x00,
        ];
        let format = sniff_input_format(&magic);
        assert!(format.contains(InputFormat::BGZIP));
        assert!(!format.contains(InputFormat::GZIP));
    }

    #[test]
    fn open_vcf_reader_reads_plain_files() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "##fileformat=VCFv4.2")?;
        file.flush()?;

        let (reader, format) = open_vcf_reader(file.path())?;
        assert!(format.contains(InputFormat::VCF));
        let first = reader.lines().next().expect("one line")?;
        assert_eq!(first, "##fileformat=VCFv4.2");
        Ok(())
    }

    #[test]
    fn gzip_named_files_must_carry_the_gzip_magic() {
        let mut file = tempfile::Builder::new()
            .suffix(".vcf.gz")
            .tempfile()
            .expect("temp file should be created");
        writeln!(file, "##fileformat=VCFv4.2").unwrap();
        file.flush().unwrap();

        let err = match open_vcf_reader(file.path()) {
            Err(e) => e,
            Ok(_) => panic!("expected an error"),
        };
        assert!(matches!(err, VcxError::InvalidGzipHeader { .. }));
    }

    #[test]
    fn open_vcf_reader_decompresses_gzip() -> Result<()> {
        let file = NamedTempFile::new()?;
        let mut encoder = GzEncoder::new(file.reopen()?, Compression::default());
        writeln!(encoder, "##fileformat=VCFv4.1")?;
        encoder.finish()?;

        let (reader, format) = open_vcf_reader(file.path())?;
        assert!(format.contains(InputFormat::GZIP));
        let first = reader.lines().next().expect("one line")?;
        assert_eq!(first, "##fileformat=VCFv4.1");
        Ok(())
    }
}
