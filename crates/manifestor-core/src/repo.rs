use crate::error::{ManifestorError, Result};
use percent_encoding::percent_decode_str;
use url::Url;

/// Derive the `owner/name` repository identifier from a source URL.
///
/// Uses the first two non-empty path segments, percent-decoded but otherwise
/// verbatim, so `https://github.com/acme/api.git` yields `acme/api.git` and
/// `https://github.com/o/my%20repo` yields `o/my repo`.
///
/// The URL must be absolute: a scheme-less source such as `github.com/o/r`
/// is rejected as [`ManifestorError::MalformedSourceUrl`].
pub fn repository_from_url(source_url: &str) -> Result<String> {
    let malformed = |source: Box<dyn std::error::Error + Send + Sync>| {
        ManifestorError::MalformedSourceUrl {
            url: source_url.to_string(),
            source,
        }
    };
    let parsed = Url::parse(source_url).map_err(|e| malformed(e.into()))?;
    let mut segments = parsed
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty());
    let (owner, name) = match (segments.next(), segments.next()) {
        (Some(owner), Some(name)) => (owner, name),
        _ => {
            return Err(ManifestorError::InvalidRepositoryPath(
                source_url.to_string(),
            ))
        }
    };
    let decode = |segment: &str| {
        percent_decode_str(segment)
            .decode_utf8()
            .map(|s| s.into_owned())
            .map_err(|e| malformed(e.into()))
    };
    Ok(format!("{}/{}", decode(owner)?, decode(name)?))
}
