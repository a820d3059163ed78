// Video identifier extraction from watch URLs and bare ids

use regex::Regex;

use super::errors::ResolveError;

lazy_static::lazy_static! {
    static ref URL_ID_RE: Regex = Regex::new(
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/)([a-zA-Z0-9_-]{11})"
    ).unwrap();
    static ref BARE_ID_RE: Regex = Regex::new(r"^([a-zA-Z0-9_-]{11})$").unwrap();
}

/// Extract the 11-character video id from a watch/short/embed/shorts URL or a
/// bare id. Anything unrecognizable is `InvalidIdentifier`.
pub fn extract_video_id(input: &str) -> Result<String, ResolveError> {
    let input = input.trim();

    for re in [&*URL_ID_RE, &*BARE_ID_RE] {
        if let Some(caps) = re.captures(input) {
            if let Some(m) = caps.get(1) {
                return Ok(m.as_str().to_string());
            }
        }
    }

    Err(ResolveError::InvalidIdentifier(input.to_string()))
}
