//! Compound `bucket,key` references stored in a single record field

use std::fmt;

const SEPARATOR: char = ',';

/// Location of an object in the blob store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobReference {
    /// Bucket name
    pub bucket: String,
    /// Object key, including its leading slash
    pub key: String,
}

impl BlobReference {
    /// Reference to `key` in `bucket`
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Packs the reference into its stored `bucket,key` form
    #[must_use]
    pub fn encode(&self) -> String {
        encode(&self.bucket, &self.key)
    }
}

impl fmt::Display for BlobReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Joins `bucket` and `key` with a comma
#[must_use]
pub fn encode(bucket: &str, key: &str) -> String {
    format!("{bucket}{SEPARATOR}{key}")
}

/// Splits a stored value back into a [`BlobReference`]
///
/// Returns `None` when the value is not a reference (no comma or an empty part).
/// Callers hand such values through unchanged as plain URLs.
#[must_use]
pub fn decode(stored: &str) -> Option<BlobReference> {
    let (bucket, key) = stored.split_once(SEPARATOR)?;
    if bucket.is_empty() || key.is_empty() {
        return None;
    }
    Some(BlobReference::new(bucket, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_joins_with_comma() {
        assert_eq!(
            encode("tubely-videos", "/landscape/abc.mp4"),
            "tubely-videos,/landscape/abc.mp4"
        );
        assert_eq!(
            BlobReference::new("b", "k").to_string(),
            "b,k".to_string()
        );
    }

    #[test]
    fn test_decode_inverts_encode() {
        let cases = [
            ("tubely-videos", "/portrait/xyz.mp4"),
            ("b", "k"),
            ("my.bucket", "/other/Zm9vYmFy-_.mp4"),
        ];

        for (bucket, key) in cases {
            let decoded = decode(&encode(bucket, key)).unwrap();
            assert_eq!(decoded, BlobReference::new(bucket, key));
        }
    }

    #[test]
    fn test_single_value_is_not_a_reference() {
        assert_eq!(decode("singlevalue"), None);
        assert_eq!(decode("https://example.com/video.mp4"), None);
        assert_eq!(decode(""), None);
    }

    #[test]
    fn test_empty_parts_are_not_a_reference() {
        assert_eq!(decode(",key"), None);
        assert_eq!(decode("bucket,"), None);
        assert_eq!(decode(","), None);
    }
}
