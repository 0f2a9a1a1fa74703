use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Top-level domain hint for charset detection; the site serves German text.
const SITE_TLD: &[u8] = b"de";

/// A page body converted to UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    pub text: String,
    pub encoding_label: String,
    /// Malformed byte sequences were replaced with U+FFFD.
    pub had_replacements: bool,
}

/// Decode a page body into UTF-8 using: BOM -> Content-Type charset -> chardetng guess.
///
/// Never fails. Listing pages with a stray Latin-1 byte in a photo title still
/// carry valid markup, so malformed sequences are replaced rather than
/// rejecting the page.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> DecodedPage {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(charset_label)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(Some(SITE_TLD), true)
        });

    let (text, used, had_replacements) = encoding.decode(bytes);
    DecodedPage {
        text: text.into_owned(),
        encoding_label: used.name().to_string(),
        had_replacements,
    }
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim_matches([' ', '"', '\''].as_ref()).to_string())
    })
}
