use regex::Regex;
use url::Url;

/// Run an ordered chain of strategies over the same input; the first one that
/// yields a value wins.
#[inline]
pub fn first_match<I: ?Sized, T>(strategies: &[fn(&I) -> Option<T>], input: &I) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(input))
}

#[inline]
pub fn capture_group_1<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First match of `re`: its first capture group if the pattern has one,
/// otherwise the whole match.
#[inline]
pub fn first_capture_or_match<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| m.as_str())
}

/// First line (trailing whitespace ignored) ending with `suffix`.
pub fn first_line_ending_with<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    text.lines()
        .map(str::trim_end)
        .find(|line| line.ends_with(suffix))
        .map(str::trim_start)
}

/// Resolve a playlist reference against the playlist's own URL.
/// Absolute references are returned unchanged.
pub fn resolve_reference(base: &Url, reference: &str) -> Option<String> {
    base.join(reference).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none(_: &str) -> Option<u8> {
        None
    }

    fn one(_: &str) -> Option<u8> {
        Some(1)
    }

    fn two(_: &str) -> Option<u8> {
        Some(2)
    }

    #[test]
    fn test_first_match_respects_order() {
        let chain: [fn(&str) -> Option<u8>; 3] = [none, two, one];
        assert_eq!(first_match(&chain, "x"), Some(2));

        let empty: [fn(&str) -> Option<u8>; 2] = [none, none];
        assert_eq!(first_match(&empty, "x"), None);
    }

    #[test]
    fn test_first_capture_or_match() {
        let grouped = Regex::new(r#""videoUrl":"([^"]*)""#).unwrap();
        assert_eq!(
            first_capture_or_match(&grouped, r#"{"videoUrl":"https://a/b.mp4"}"#),
            Some("https://a/b.mp4")
        );

        let plain = Regex::new(r"https://h/[^ ]*\.mp4").unwrap();
        assert_eq!(
            first_capture_or_match(&plain, "see https://h/x.mp4 and https://h/y.mp4"),
            Some("https://h/x.mp4")
        );
    }

    #[test]
    fn test_first_line_ending_with() {
        let playlist = "#EXTM3U\r\n#EXT-X-MAP:URI=\"init.mp4\"\r\nseg_720w.cmfv\r\nother.cmfv\r\n";
        assert_eq!(first_line_ending_with(playlist, ".cmfv"), Some("seg_720w.cmfv"));
        assert_eq!(first_line_ending_with(playlist, ".cmfa"), None);
    }

    #[test]
    fn test_resolve_reference() {
        let base = Url::parse("https://v1.pinimg.com/videos/iht/hls/ab/cd/ef.m3u8").unwrap();
        assert_eq!(
            resolve_reference(&base, "ef_audio.m3u8").as_deref(),
            Some("https://v1.pinimg.com/videos/iht/hls/ab/cd/ef_audio.m3u8")
        );
        assert_eq!(
            resolve_reference(&base, "https://cdn.example/x.cmfv").as_deref(),
            Some("https://cdn.example/x.cmfv")
        );
    }
}
