//! Manifest text decoding.
//!
//! Visual Studio writes solutions and projects as UTF-8 (with or without a
//! byte-order mark) or as UTF-16 with a mark. Anything without a UTF-16 mark
//! is decoded as UTF-8, lossily.

use std::path::Path;

use crate::error::ParseError;

/// Read a manifest file and decode it according to its byte-order mark.
///
/// # Errors
///
/// Returns `ParseError::Read` if the file cannot be read.
pub fn read_manifest(path: &Path) -> Result<String, ParseError> {
    let bytes = std::fs::read(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode(&bytes))
}

/// Decode manifest bytes. The byte-order mark, if any, is dropped.
#[must_use]
pub fn decode(bytes: &[u8]) -> String {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utf16le(text: &str) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
        bytes
    }

    fn utf16be(text: &str) -> Vec<u8> {
        let mut bytes = vec![0xFE, 0xFF];
        bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
        bytes
    }

    #[test]
    fn utf8_with_and_without_bom() {
        assert_eq!(decode(b"<Project />"), "<Project />");
        assert_eq!(decode(b"\xEF\xBB\xBF<Project />"), "<Project />");
    }

    #[test]
    fn utf16_is_decoded_by_bom() {
        let text = "SolutionGuid = {ABC}\r\nProjekt Ä";
        assert_eq!(decode(&utf16le(text)), text);
        assert_eq!(decode(&utf16be(text)), text);
    }

    #[test]
    fn read_manifest_decodes_utf16_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("App.csproj");
        std::fs::write(&path, utf16le("<Project Sdk=\"Microsoft.NET.Sdk\" />")).unwrap();
        assert_eq!(
            read_manifest(&path).unwrap(),
            "<Project Sdk=\"Microsoft.NET.Sdk\" />"
        );
    }
}
