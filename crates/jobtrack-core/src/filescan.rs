//! Attachment content scanning.
//!
//! Uploads arrive through presigned URLs, so the request tier never sees the
//! bytes at upload time. This module holds the after-the-fact checks an admin
//! runs against uploaded binaries: magic bytes, size, and a blunt pattern
//! scan for embedded active content. Attachments are PDF-only.

use thiserror::Error;

/// PDF header magic bytes.
const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Patterns that have no business inside a CV or job description.
const SUSPICIOUS_PATTERNS: &[&[u8]] = &[
    b"<script",
    b"javascript:",
    b"eval(",
    b"<iframe",
    b"<?php",
    b"<%",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FileScanError {
    #[error("File is empty")]
    EmptyFile,

    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("Invalid PDF file signature")]
    InvalidSignature,

    #[error("PDF missing EOF marker (possibly truncated)")]
    MissingEofMarker,

    #[error("Suspicious pattern detected: {0}")]
    SuspiciousContent(String),
}

/// Scan one uploaded PDF attachment. Returns `Ok(())` when the binary is
/// acceptable; the caller decides what to do with rejects (the admin
/// endpoint deletes them).
pub fn scan_pdf(data: &[u8], max_bytes: u64) -> Result<(), FileScanError> {
    if data.is_empty() {
        return Err(FileScanError::EmptyFile);
    }
    if data.len() as u64 > max_bytes {
        return Err(FileScanError::TooLarge {
            size: data.len() as u64,
            max: max_bytes,
        });
    }
    if !data.starts_with(PDF_SIGNATURE) {
        return Err(FileScanError::InvalidSignature);
    }
    if !contains(data, b"%%EOF") {
        return Err(FileScanError::MissingEofMarker);
    }

    let lowered = data.to_ascii_lowercase();
    for pattern in SUSPICIOUS_PATTERNS {
        if contains(&lowered, pattern) {
            return Err(FileScanError::SuspiciousContent(
                String::from_utf8_lossy(pattern).into_owned(),
            ));
        }
    }

    // Embedded scripting and auto-actions are legal PDF but worth flagging
    // for manual review; they do not fail the scan on their own.
    for marker in [&b"/JavaScript"[..], b"/JS", b"/Launch", b"/SubmitForm"] {
        if contains(data, marker) {
            tracing::warn!(
                marker = %String::from_utf8_lossy(marker),
                "PDF contains potentially suspicious action"
            );
        }
    }

    Ok(())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u64 = 10 * 1024 * 1024;

    fn minimal_pdf() -> Vec<u8> {
        b"%PDF-1.7\nsome objects\n%%EOF\n".to_vec()
    }

    #[test]
    fn test_valid_pdf_passes() {
        assert_eq!(scan_pdf(&minimal_pdf(), MAX), Ok(()));
    }

    #[test]
    fn test_empty_and_oversized_rejected() {
        assert_eq!(scan_pdf(b"", MAX), Err(FileScanError::EmptyFile));

        let data = minimal_pdf();
        let err = scan_pdf(&data, 4).unwrap_err();
        assert!(matches!(err, FileScanError::TooLarge { .. }));
    }

    #[test]
    fn test_wrong_signature_rejected() {
        assert_eq!(
            scan_pdf(b"PK\x03\x04not a pdf %%EOF", MAX),
            Err(FileScanError::InvalidSignature)
        );
    }

    #[test]
    fn test_truncated_pdf_rejected() {
        assert_eq!(
            scan_pdf(b"%PDF-1.7\nno eof marker", MAX),
            Err(FileScanError::MissingEofMarker)
        );
    }

    #[test]
    fn test_suspicious_content_rejected() {
        let mut data = b"%PDF-1.7\n<SCRIPT>alert(1)</script>\n%%EOF".to_vec();
        let err = scan_pdf(&data, MAX).unwrap_err();
        assert!(matches!(err, FileScanError::SuspiciousContent(_)));

        data = b"%PDF-1.7\n<?php system($_GET['c']); ?>\n%%EOF".to_vec();
        assert!(scan_pdf(&data, MAX).is_err());
    }
}
