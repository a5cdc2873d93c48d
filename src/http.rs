use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::Client;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Global HTTP client timeout covering DNS + connect + response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(8);
const MAX_REDIRECTS: usize = 5;

/// Characters to percent-encode in a single URL path segment.
/// Unlike a path, a segment must not keep `/`.
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

pub fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .user_agent(crate::USER_AGENT)
        .build()
}

pub fn encode_segment(s: &str) -> String {
    utf8_percent_encode(s, SEGMENT_ENCODE_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_segment_escapes_separators() {
        assert_eq!(encode_segment("a/b"), "a%2Fb");
        assert_eq!(encode_segment("what?"), "what%3F");
        assert_eq!(encode_segment("ice cream"), "ice%20cream");
        assert_eq!(encode_segment("100%"), "100%25");
    }

    #[test]
    fn encode_segment_keeps_plain_words() {
        assert_eq!(encode_segment("well-being"), "well-being");
        assert_eq!(encode_segment("o'clock"), "o'clock");
    }

    #[test]
    fn encode_segment_escapes_non_ascii_as_utf8() {
        assert_eq!(encode_segment("hus"), "hus");
        assert_eq!(encode_segment("på"), "p%C3%A5");
    }
}
