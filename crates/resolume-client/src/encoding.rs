//! Request bodies that carry a URI.
//!
//! Paths and names are escaped the way a browser's `encodeURI` does:
//! reserved URI characters such as `/`, `:` and `?` stay as they are, while
//! spaces, quotes, brackets and non-ASCII bytes are percent-encoded.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use resolume_core::constants::{VIDEO_EFFECT_URI, VIDEO_SOURCE_URI};

/// Characters escaped in addition to controls and non-ASCII.
const URI: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode `input`, keeping URI delimiters intact.
pub fn encode_uri(input: &str) -> String {
    utf8_percent_encode(input, URI).to_string()
}

/// How a clip path is sent to the open endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClipEncoding {
    /// `file://<encoded path>` for local media files.
    #[default]
    File,
    /// `source://<encoded path>` for generators and other sources.
    Source,
    /// The path exactly as given.
    Raw,
}

impl ClipEncoding {
    /// Build the request body for `path`.
    #[must_use]
    pub fn body(self, path: &str) -> String {
        match self {
            Self::File => format!("file://{}", encode_uri(path)),
            Self::Source => format!("source://{}", encode_uri(path)),
            Self::Raw => path.to_owned(),
        }
    }

    /// Name used on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Source => "source",
            Self::Raw => "raw",
        }
    }
}

impl FromStr for ClipEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "source" => Ok(Self::Source),
            "raw" => Ok(Self::Raw),
            other => Err(format!("unknown clip encoding '{other}' (expected file, source or raw)")),
        }
    }
}

impl fmt::Display for ClipEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body for adding the video effect called `name`.
pub fn video_effect_uri(name: &str) -> String {
    format!("{VIDEO_EFFECT_URI}{}", encode_uri(name))
}

/// Body for opening the video source called `name`.
pub fn video_source_uri(name: &str) -> String {
    format!("{VIDEO_SOURCE_URI}{}", encode_uri(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_keeps_reserved_characters() {
        assert_eq!(encode_uri("/a/b:c?d=e&f#g"), "/a/b:c?d=e&f#g");
        assert_eq!(encode_uri("it's(ok)!*~-_."), "it's(ok)!*~-_.");
    }

    #[test]
    fn encode_escapes_spaces_and_unsafe_ascii() {
        assert_eq!(encode_uri("My Clip.mov"), "My%20Clip.mov");
        assert_eq!(encode_uri("100%"), "100%25");
        assert_eq!(encode_uri("a[b]{c}|d"), "a%5Bb%5D%7Bc%7D%7Cd");
    }

    #[test]
    fn encode_escapes_non_ascii_as_utf8() {
        assert_eq!(encode_uri("café"), "caf%C3%A9");
    }

    #[test]
    fn file_body() {
        assert_eq!(
            ClipEncoding::File.body("/Users/vj/Media/My Clip.mov"),
            "file:///Users/vj/Media/My%20Clip.mov"
        );
    }

    #[test]
    fn source_body() {
        assert_eq!(
            ClipEncoding::Source.body("/video/Solid Color"),
            "source:///video/Solid%20Color"
        );
    }

    #[test]
    fn raw_body_is_untouched() {
        assert_eq!(ClipEncoding::Raw.body("C:\\clips\\a b.mov"), "C:\\clips\\a b.mov");
    }

    #[test]
    fn default_encoding_is_file() {
        assert_eq!(ClipEncoding::default(), ClipEncoding::File);
    }

    #[test]
    fn parse_encoding() {
        assert_eq!("source".parse::<ClipEncoding>(), Ok(ClipEncoding::Source));
        assert!("ftp".parse::<ClipEncoding>().is_err());
    }

    #[test]
    fn effect_and_source_uris() {
        assert_eq!(video_effect_uri("Hue Rotate"), "effect:///video/Hue%20Rotate");
        assert_eq!(video_source_uri("Solid Color"), "source:///video/Solid%20Color");
    }
}
