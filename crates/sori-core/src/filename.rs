//! Audio filenames — `NNNN_hhhhhh.mp3` from list position and text fingerprint.

/// Audio file extension, without the dot.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Hex characters of the BLAKE3 digest kept in a filename.
pub const FINGERPRINT_LEN: usize = 6;

/// Short content fingerprint of `text` (lower-case hex).
pub fn fingerprint(text: &str) -> String {
    let hash = blake3::hash(text.as_bytes());
    hash.to_hex()[..FINGERPRINT_LEN].to_string()
}

/// Filename for the text at zero-based `index` of a subject's sorted text set.
///
/// The position prefix alone keeps names unique within a subject; the
/// fingerprint changes the name whenever the text behind a slot changes.
pub fn derive_filename(text: &str, index: usize) -> String {
    format!("{index:04}_{}.{AUDIO_EXTENSION}", fingerprint(text))
}

/// Pair every text with its filename, preserving order.
pub fn assign_filenames(texts: &[String]) -> Vec<(String, String)> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| (text.clone(), derive_filename(text, i)))
        .collect()
}
